use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection, DNS, or other transport-level failure.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("{entity} is a read-only collection")]
    ReadOnly { entity: &'static str },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("address lookup widget is not loaded yet; try again shortly")]
    WidgetUnavailable,
}

impl ClientError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status when the server answered; `None` for transport and local errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message stored in an entity's `error` field. Falls back when the error renders blank.
    pub fn failure_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    /// Validation and missing-widget errors are reported to the user directly
    /// and never reach the store.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::WidgetUnavailable)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(
                status.as_u16(),
                format!("Request failed with status code {}", status.as_u16()),
            )
        } else {
            Self::Transport(err.to_string())
        }
    }
}
