use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Remote answered with a non-2xx status
    #[error("upstream API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Network failure, including timeouts
    #[error("request to upstream failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("invalid API key format")]
    InvalidApiKey,

    #[error("{0} is required")]
    MissingSetting(&'static str),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RelayError {
    /// HTTP status returned by the remote, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
