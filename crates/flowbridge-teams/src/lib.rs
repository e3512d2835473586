pub mod activity;
pub mod auth;
pub mod card;
pub mod connector;
pub mod error;
pub mod relay;
pub mod sender;

pub use activity::Activity;
pub use card::AdaptiveCard;
pub use connector::ConnectorClient;
pub use error::ConnectorError;
pub use relay::{MessageRelay, RelayOutcome};
pub use sender::{ActivitySender, Reply};
