//! Markdown to Teams rich-text conversion.
//!
//! Flowise answers in GitHub-flavoured markdown. Teams renders a narrower
//! dialect: single-asterisk italics, no heading levels, and list bullets
//! that survive inside an Adaptive Card `TextBlock`. [`translate`] rewrites
//! the former into the latter with a fixed sequence of whole-text passes.

pub mod languages;
pub mod translate;

pub use languages::display_language;
pub use translate::{translate, Translator, BULLET, INDENT};
