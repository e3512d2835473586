//! The rewrite passes.
//!
//! Order is fixed: fences, inline code, headers, emphasis, list items, links.
//! Each pass runs over the output of the previous one, so later passes must
//! not re-match text an earlier pass produced. Patterns are compiled once on
//! first use.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::languages::display_language;

/// Glyph that replaces the `-` of a markdown list item.
pub const BULLET: char = '\u{2022}';

/// One indentation level in front of a bullet (two source spaces).
pub const INDENT: &str = " ";

/// ```` ```tag\nbody``` ````, body matched lazily across lines.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```([A-Za-z0-9_]+)?\n((?s:.*?))```").unwrap());

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

// `\s+` may cross a line break, same as `\s*` in LIST_RE.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mR)^(#{1,6})\s+(.+)$").unwrap());

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?R)\*\*(.+?)\*\*").unwrap());

static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?R)_(.+?)_").unwrap());

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^(\s*)-\s+(.+)$").unwrap());

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Markdown → Teams converter.
///
/// The default (compatible) mode runs every pass over the whole text, so
/// header, emphasis and list rewrites also reach into code bodies. The
/// fence-aware mode confines those passes to the prose between fences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Translator {
    fence_aware: bool,
}

impl Translator {
    pub fn compatible() -> Self {
        Self { fence_aware: false }
    }

    pub fn fence_aware() -> Self {
        Self { fence_aware: true }
    }

    /// Rewrite `source` into the Teams dialect. Never fails; text without
    /// any markdown construct comes back unchanged.
    pub fn translate(&self, source: &str) -> String {
        if self.fence_aware {
            translate_outside_fences(source)
        } else {
            let fenced = FENCE_RE.replace_all(source, |caps: &Captures| render_fence(caps));
            rewrite_prose(&fenced)
        }
    }
}

/// Convert with the compatible translator.
pub fn translate(source: &str) -> String {
    Translator::compatible().translate(source)
}

fn render_fence(caps: &Captures) -> String {
    let tag = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());
    format!("```{}\n{}```", display_language(tag), body)
}

/// Passes 2–6.
fn rewrite_prose(text: &str) -> String {
    // inline code and bold already use the Teams syntax; run them anyway so
    // the ordering against fences and italics stays explicit
    let text = INLINE_CODE_RE.replace_all(text, "`${1}`");
    let text = HEADER_RE.replace_all(&text, |caps: &Captures| format!("**{}**\n", &caps[2]));
    let text = BOLD_RE.replace_all(&text, "**${1}**");
    let text = ITALIC_RE.replace_all(&text, "*${1}*");
    let text = LIST_RE.replace_all(&text, |caps: &Captures| {
        let level = caps[1].chars().count() / 2;
        format!("{}{} {}", INDENT.repeat(level), BULLET, &caps[2])
    });
    let text = LINK_RE.replace_all(&text, "[${1}](${2})");
    text.into_owned()
}

fn translate_outside_fences(source: &str) -> String {
    // Fences are swapped for placeholders that no pass matches, so line
    // anchors around them behave as in the compatible mode. The marker pair
    // must not occur in the source, or prose could be mistaken for a fence.
    let Some((open, close)) = free_marker_pair(source) else {
        return Translator::compatible().translate(source);
    };
    let mut fences = Vec::new();
    let masked = FENCE_RE.replace_all(source, |caps: &Captures| {
        fences.push(render_fence(caps));
        format!("{open}{}{close}", fences.len() - 1)
    });
    let prose = rewrite_prose(&masked);

    // single left-to-right pass; restored bodies are never rescanned
    let mut pieces = prose.split(open);
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let restored = piece.split_once(close).and_then(|(index, rest)| {
            let fence = fences.get(index.parse::<usize>().ok()?)?;
            Some((fence, rest))
        });
        match restored {
            Some((fence, rest)) => {
                out.push_str(fence);
                out.push_str(rest);
            }
            None => {
                out.push(open);
                out.push_str(piece);
            }
        }
    }
    out
}

/// First pair of private-use characters absent from `source`.
fn free_marker_pair(source: &str) -> Option<(char, char)> {
    (0xE000..0xF8FE_u32)
        .chain(0xF_0000..0xF_FFFC)
        .step_by(2)
        .filter_map(|c| Some((char::from_u32(c)?, char::from_u32(c + 1)?)))
        .find(|(open, close)| !source.contains(*open) && !source.contains(*close))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        let text = "Hello there. Nothing to see here, really!\nSecond line.";
        assert_eq!(translate(text), text);
        assert_eq!(translate(""), "");
    }

    #[test]
    fn fence_label_is_resolved() {
        assert_eq!(
            translate("```python\nprint(1)\n```"),
            "```Python\nprint(1)\n```"
        );
        assert_eq!(translate("```JS\nx()\n```"), "```JavaScript\nx()\n```");
    }

    #[test]
    fn fence_without_tag_keeps_empty_label() {
        assert_eq!(translate("```\nls -la\n```"), "```\nls -la\n```");
    }

    #[test]
    fn fence_with_unknown_tag_is_kept() {
        assert_eq!(translate("```zzz\nbody\n```"), "```zzz\nbody\n```");
    }

    #[test]
    fn header_becomes_bold_line() {
        assert_eq!(translate("## Title"), "**Title**\n");
        assert_eq!(translate("###### Deep"), "**Deep**\n");
    }

    #[test]
    fn header_inside_text_keeps_following_line() {
        assert_eq!(
            translate("# Intro\nSome text"),
            "**Intro**\n\nSome text"
        );
    }

    #[test]
    fn seven_hashes_is_not_a_header() {
        assert_eq!(translate("####### nope"), "####### nope");
    }

    #[test]
    fn hash_without_space_is_not_a_header() {
        assert_eq!(translate("#hashtag"), "#hashtag");
    }

    #[test]
    fn italic_underscores_become_asterisks() {
        assert_eq!(translate("this is _important_"), "this is *important*");
    }

    #[test]
    fn bold_is_preserved() {
        assert_eq!(translate("**bold** and _it_"), "**bold** and *it*");
    }

    #[test]
    fn list_items_get_bullets() {
        assert_eq!(translate("- one\n- two"), "\u{2022} one\n\u{2022} two");
    }

    #[test]
    fn list_indentation_levels() {
        assert_eq!(translate("  -  item"), " \u{2022} item");
        assert_eq!(translate("    - item"), "  \u{2022} item");
        // odd widths round down
        assert_eq!(translate("   - item"), " \u{2022} item");
    }

    #[test]
    fn blank_line_before_list_is_absorbed() {
        // the leading `\s*` starts on the empty line and swallows its newline
        assert_eq!(translate("intro\n\n- item"), "intro\n\u{2022} item");
    }

    #[test]
    fn links_and_inline_code_pass_through() {
        let text = "see [docs](https://example.com/docs) or run `cargo doc`";
        assert_eq!(translate(text), text);
    }

    #[test]
    fn compatible_mode_rewrites_inside_fences() {
        let out = translate("```bash\n# install\n- step\n```");
        assert_eq!(out, "```Bash\n**install**\n\u{2022} step\n```");
    }

    #[test]
    fn fence_aware_mode_leaves_code_bodies_alone() {
        let src = "# Setup\n```bash\n# install\nrm -rf my_dir_name\n```\n- done";
        let out = Translator::fence_aware().translate(src);
        assert_eq!(
            out,
            "**Setup**\n\n```Bash\n# install\nrm -rf my_dir_name\n```\n\u{2022} done"
        );
    }

    #[test]
    fn fence_aware_mode_keeps_private_use_text_in_place() {
        let src = "note \u{E000}0\u{E001} here\n```py\nx = 1\n```";
        assert_eq!(Translator::fence_aware().translate(src), src);
    }

    #[test]
    fn fence_aware_mode_restores_fences_in_order() {
        let src = "```\n\u{E000}1\u{E001}\n```\ntext\n```\nsecond\n```";
        assert_eq!(Translator::fence_aware().translate(src), src);
    }

    #[test]
    fn crlf_lines_keep_their_terminator() {
        assert_eq!(translate("a\r\n  - x"), "a\r\n \u{2022} x");
        assert_eq!(translate("# T\r\nnext"), "**T**\n\r\nnext");
    }

    #[test]
    fn unicode_line_separator_does_not_end_a_line() {
        assert_eq!(translate("# T\u{2028}more"), "**T\u{2028}more**\n");
        assert_eq!(translate("- a\u{2028}- b"), "\u{2022} a\u{2028}- b");
    }

    #[test]
    fn fence_aware_mode_matches_compatible_without_fences() {
        let src = "## Heading\nSome _text_ with **bold**\n  - nested";
        assert_eq!(Translator::fence_aware().translate(src), translate(src));
    }
}
