pub mod client;
pub mod error;
pub mod prediction;

pub use client::FlowiseClient;
pub use error::FlowiseError;
pub use prediction::{OverrideConfig, PredictionApi, PredictionRequest, PredictionResponse};
