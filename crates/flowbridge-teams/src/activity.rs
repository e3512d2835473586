//! Bot Framework activity model.
//!
//! Only the fields the relay reads or writes are modelled. Unknown fields in
//! inbound JSON are ignored; absent ones are left out of outbound JSON.

use serde::{Deserialize, Serialize};

pub const MESSAGE: &str = "message";
pub const CONVERSATION_UPDATE: &str = "conversationUpdate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Activity entity. Teams uses `mention` entities to mark `<at>…</at>` spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentioned: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content: serde_json::Value,
}

impl Activity {
    pub fn is_message(&self) -> bool {
        self.kind.eq_ignore_ascii_case(MESSAGE)
    }

    pub fn is_conversation_update(&self) -> bool {
        self.kind.eq_ignore_ascii_case(CONVERSATION_UPDATE)
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation
            .as_ref()
            .map(|c| c.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Message text with the bot's own `<at>…</at>` mention removed, trimmed.
    ///
    /// Mentions of other users are kept.
    pub fn text_without_recipient_mention(&self) -> String {
        let mut text = self.text.clone().unwrap_or_default();
        if let Some(ref bot) = self.recipient {
            for entity in &self.entities {
                let mentions_bot = entity.kind.eq_ignore_ascii_case("mention")
                    && entity.mentioned.as_ref().is_some_and(|m| m.id == bot.id);
                if let (true, Some(span)) = (mentions_bot, entity.text.as_deref()) {
                    text = text.replace(span, "");
                }
            }
        }
        text.trim().to_string()
    }

    /// Skeleton of a reply: a message in the same conversation with sender
    /// and recipient swapped.
    pub fn reply(&self) -> Activity {
        Activity {
            kind: MESSAGE.to_string(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            conversation: self.conversation.clone(),
            channel_id: self.channel_id.clone(),
            reply_to_id: self.id.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(id: &str, text: &str) -> Entity {
        Entity {
            kind: "mention".to_string(),
            mentioned: Some(ChannelAccount {
                id: id.to_string(),
                name: None,
            }),
            text: Some(text.to_string()),
        }
    }

    fn message(text: &str, entities: Vec<Entity>) -> Activity {
        Activity {
            kind: MESSAGE.to_string(),
            text: Some(text.to_string()),
            recipient: Some(ChannelAccount {
                id: "28:bot".to_string(),
                name: Some("Helper".to_string()),
            }),
            entities,
            ..Default::default()
        }
    }

    #[test]
    fn strips_only_the_bot_mention() {
        let act = message(
            "<at>Helper</at> ask <at>Alice</at> about it ",
            vec![mention("28:bot", "<at>Helper</at>"), mention("29:alice", "<at>Alice</at>")],
        );
        assert_eq!(act.text_without_recipient_mention(), "ask <at>Alice</at> about it");
    }

    #[test]
    fn text_without_mentions_is_trimmed() {
        let act = message("  What is the VPN address?\n", vec![]);
        assert_eq!(act.text_without_recipient_mention(), "What is the VPN address?");
    }

    #[test]
    fn missing_text_is_empty() {
        let act = Activity {
            kind: MESSAGE.to_string(),
            ..Default::default()
        };
        assert_eq!(act.text_without_recipient_mention(), "");
    }

    #[test]
    fn reply_swaps_accounts() {
        let inbound = Activity {
            kind: MESSAGE.to_string(),
            id: Some("act-1".to_string()),
            from: Some(ChannelAccount {
                id: "29:user".to_string(),
                name: None,
            }),
            recipient: Some(ChannelAccount {
                id: "28:bot".to_string(),
                name: None,
            }),
            conversation: Some(ConversationAccount {
                id: "a:conv".to_string(),
                ..Default::default()
            }),
            service_url: Some("https://smba.example.com/".to_string()),
            ..Default::default()
        };
        let reply = inbound.reply();
        assert!(reply.is_message());
        assert_eq!(reply.from.unwrap().id, "28:bot");
        assert_eq!(reply.recipient.unwrap().id, "29:user");
        assert_eq!(reply.reply_to_id.as_deref(), Some("act-1"));
        assert_eq!(reply.conversation.unwrap().id, "a:conv");
        assert!(reply.service_url.is_none());
    }

    #[test]
    fn empty_conversation_id_is_none() {
        let act = Activity {
            conversation: Some(ConversationAccount::default()),
            ..Default::default()
        };
        assert!(act.conversation_id().is_none());
    }
}
