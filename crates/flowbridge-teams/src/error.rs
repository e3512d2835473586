/// Errors talking to the Bot Framework connector or token service.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connector API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Token acquisition failed: {0}")]
    Auth(String),

    #[error("Activity is missing {0}")]
    MissingField(&'static str),
}
