use serde::Deserialize;
use thiserror::Error;

/// Client-side error types
///
/// Every wallet call resolves to one of these. The workflow treats them all
/// the same way: log, record, and stop before the next step.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Connection refused, reset, or an IO failure while reading the body
    #[error("Transport error: {0}")]
    Transport(String),

    /// The wallet service answered with a status other than 200
    #[error("Wallet service returned status {status}: {body}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A body could not be embedded into the next request or decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Rejected configuration values
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error body the wallet service writes next to non-200 statuses
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: String,
}

impl WalletError {
    /// HTTP status of a service error, `None` for every other kind
    pub fn status(&self) -> Option<u16> {
        match self {
            WalletError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `error` message from a service error body, when the service sent one
    pub fn service_message(&self) -> Option<String> {
        match self {
            WalletError::Service { body, .. } => serde_json::from_str::<ServiceErrorBody>(body)
                .ok()
                .map(|b| b.error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::InvalidPayload(err.to_string())
    }
}
