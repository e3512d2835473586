use async_trait::async_trait;
use tracing::{debug, warn};

use flowbridge_core::config::TeamsConfig;

use crate::activity::Activity;
use crate::auth::AppTokenProvider;
use crate::error::ConnectorError;
use crate::sender::{ActivitySender, Reply};

/// REST client for the Bot Framework connector at an activity's `serviceUrl`.
pub struct ConnectorClient {
    client: reqwest::Client,
    tokens: AppTokenProvider,
}

impl ConnectorClient {
    pub fn new(config: &TeamsConfig) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder().build()?;
        let tokens = AppTokenProvider::new(client.clone(), config);
        Ok(Self { client, tokens })
    }

    /// Replace the token provider, e.g. one pointed at a local login host.
    pub fn with_tokens(mut self, tokens: AppTokenProvider) -> Self {
        self.tokens = tokens;
        self
    }
}

/// `{serviceUrl}/v3/conversations/{conversationId}/activities`.
pub fn activities_url(service_url: &str, conversation_id: &str) -> String {
    format!(
        "{}/v3/conversations/{}/activities",
        service_url.trim_end_matches('/'),
        urlencoding::encode(conversation_id)
    )
}

#[async_trait]
impl ActivitySender for ConnectorClient {
    async fn send(&self, inbound: &Activity, reply: Reply) -> Result<(), ConnectorError> {
        let service_url = inbound
            .service_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConnectorError::MissingField("serviceUrl"))?;
        let conversation_id = inbound
            .conversation_id()
            .ok_or(ConnectorError::MissingField("conversation.id"))?;

        let url = activities_url(service_url, conversation_id);
        let activity = reply.into_activity(inbound);

        debug!(url = %url, "posting activity to connector");

        let mut builder = self.client.post(&url).json(&activity);
        if let Some(token) = self.tokens.token().await? {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "connector rejected activity");
            return Err(ConnectorError::Api {
                status,
                message: text,
            });
        }
        Ok(())
    }
}
