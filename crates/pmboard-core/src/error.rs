use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmboardError {
    /// A required field was missing. Raised before any request is sent.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with an envelope whose `data` was null.
    #[error("{0}")]
    Backend(String),

    /// The request itself failed: network error or non-2xx response.
    #[error("request failed{}: {}", status_suffix(.status), .message.as_deref().unwrap_or("no details"))]
    Transport {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PmboardError {
    /// Text to show the user. Validation and backend failures are shown
    /// verbatim; transport failures fall back to `fallback` when the response
    /// carried no message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(msg) | Self::Backend(msg) => msg.clone(),
            Self::Transport {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            Self::Transport { .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }

    /// `true` for failures reported by the backend or the transport, as
    /// opposed to local validation or configuration problems.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Transport { .. })
    }
}

impl From<reqwest::Error> for PmboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, PmboardError>;
