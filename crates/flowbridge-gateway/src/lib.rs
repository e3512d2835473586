//! HTTP front of the bridge: Bot Framework ingress and health probe.

pub mod app;
pub mod http;
