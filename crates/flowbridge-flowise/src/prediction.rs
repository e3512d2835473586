use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use flowbridge_core::SessionId;

use crate::error::FlowiseError;

/// Body of `POST /api/v1/prediction/{chatflow_id}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub question: String,
    pub override_config: OverrideConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideConfig {
    pub session_id: String,
    /// Flow variables, readable inside the chatflow as `$vars.<name>`.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
}

impl PredictionRequest {
    /// A user question within `session`.
    pub fn question(text: impl Into<String>, session: &SessionId) -> Self {
        Self {
            question: text.into(),
            override_config: OverrideConfig {
                session_id: session.to_string(),
                vars: Map::new(),
            },
        }
    }

    /// Empty question flagged with `isFirstMessage`, asking the flow for its
    /// greeting.
    pub fn welcome(session: &SessionId) -> Self {
        let mut req = Self::question("", session);
        req.override_config
            .vars
            .insert("isFirstMessage".to_string(), Value::Bool(true));
        req
    }
}

/// Prediction result. Only `text` is consumed; anything else the flow
/// returns (source documents, chat ids, …) is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PredictionResponse {
    #[serde(default)]
    pub text: Option<String>,
}

impl PredictionResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The answer text, if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// A remote chatflow that answers questions.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// One request, no retry.
    async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, FlowiseError>;
}

#[async_trait]
impl<T: PredictionApi + ?Sized> PredictionApi for Arc<T> {
    async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, FlowiseError> {
        (**self).predict(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_wire_format() {
        let req = PredictionRequest::question("hello", &SessionId::for_conversation("c1"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "question": "hello",
                "overrideConfig": { "sessionId": "teams_c1" }
            })
        );
    }

    #[test]
    fn welcome_wire_format() {
        let req = PredictionRequest::welcome(&SessionId::for_conversation("c1"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["question"], "");
        assert_eq!(json["overrideConfig"]["sessionId"], "teams_c1");
        assert_eq!(json["overrideConfig"]["vars"]["isFirstMessage"], true);
    }

    #[test]
    fn empty_object_has_no_text() {
        let resp: PredictionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let resp: PredictionResponse = serde_json::from_str(r#"{"text":""}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let resp: PredictionResponse = serde_json::from_str(
            r#"{"text":"hi","chatId":"x","sourceDocuments":[{"pageContent":"..."}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), Some("hi"));
    }
}
