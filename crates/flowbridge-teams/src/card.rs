//! Adaptive Card payloads.

use serde_json::json;

use crate::activity::Attachment;

pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
pub const ADAPTIVE_CARD_VERSION: &str = "1.0";

/// A card made of word-wrapped text blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveCard {
    pub blocks: Vec<String>,
}

impl AdaptiveCard {
    /// Single `TextBlock` card, the shape every relayed answer uses.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![text.into()],
        }
    }

    pub fn to_attachment(&self) -> Attachment {
        let body: Vec<_> = self
            .blocks
            .iter()
            .map(|text| json!({ "type": "TextBlock", "text": text, "wrap": true }))
            .collect();
        Attachment {
            content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
            content: json!({
                "type": "AdaptiveCard",
                "version": ADAPTIVE_CARD_VERSION,
                "body": body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_card_shape() {
        let att = AdaptiveCard::text("**Hello**").to_attachment();
        assert_eq!(att.content_type, "application/vnd.microsoft.card.adaptive");
        assert_eq!(
            att.content,
            json!({
                "type": "AdaptiveCard",
                "version": "1.0",
                "body": [{ "type": "TextBlock", "text": "**Hello**", "wrap": true }]
            })
        );
    }
}
