use std::sync::Arc;

use async_trait::async_trait;

use crate::{activity::Activity, card::AdaptiveCard, error::ConnectorError};

/// Content of one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message.
    Text(String),
    /// Rich-text answer rendered as an Adaptive Card.
    Card(AdaptiveCard),
}

impl Reply {
    /// Turn the reply into a full activity addressed back to `inbound`'s sender.
    pub fn into_activity(self, inbound: &Activity) -> Activity {
        let mut out = inbound.reply();
        match self {
            Reply::Text(text) => out.text = Some(text),
            Reply::Card(card) => out.attachments = vec![card.to_attachment()],
        }
        out
    }
}

/// Outbound side of the chat platform.
///
/// `&self` so one sender can serve concurrent event tasks.
#[async_trait]
pub trait ActivitySender: Send + Sync {
    /// Post `reply` into the conversation `inbound` came from.
    async fn send(&self, inbound: &Activity, reply: Reply) -> Result<(), ConnectorError>;
}

#[async_trait]
impl<T: ActivitySender + ?Sized> ActivitySender for Arc<T> {
    async fn send(&self, inbound: &Activity, reply: Reply) -> Result<(), ConnectorError> {
        (**self).send(inbound, reply).await
    }
}
