use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use flowbridge_core::config::FlowiseConfig;

use crate::error::FlowiseError;
use crate::prediction::{PredictionApi, PredictionRequest, PredictionResponse};

/// HTTP client for one Flowise chatflow.
pub struct FlowiseClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl FlowiseClient {
    pub fn new(config: &FlowiseConfig) -> Result<Self, FlowiseError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.prediction_url(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// Fully built prediction endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PredictionApi for FlowiseClient {
    async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, FlowiseError> {
        debug!(
            url = %self.url,
            session = %req.override_config.session_id,
            "sending prediction request to Flowise"
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(req);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await?;

        // anything but 200 is a failure, other 2xx included
        let status = resp.status().as_u16();
        if status != 200 {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Flowise API error");
            return Err(FlowiseError::Api {
                status,
                message: text,
            });
        }

        let body = resp.bytes().await?;
        let parsed: PredictionResponse =
            serde_json::from_slice(&body).map_err(|e| FlowiseError::Parse(e.to_string()))?;

        debug!(has_text = parsed.text().is_some(), "Flowise response received");
        Ok(parsed)
    }
}
