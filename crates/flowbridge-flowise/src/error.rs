/// Failures of a prediction call. All of them end the same way for the
/// user (a fixed apology); the variants exist for logging.
#[derive(Debug, thiserror::Error)]
pub enum FlowiseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}
