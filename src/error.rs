use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhosInSpaceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Request to {0} was cancelled")]
    Cancelled(String),

    #[error("Failed to parse {field}: {message}")]
    Parse {
        field: &'static str,
        message: String,
    },

    #[error("No profile page found for '{0}'")]
    UnknownName(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    UnknownName,
    Other,
}

impl WhosInSpaceError {
    pub fn parse(field: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } | Self::Timeout(_) | Self::Cancelled(_) => {
                ErrorKind::Network
            }
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnknownName(_) => ErrorKind::UnknownName,
            Self::Config(_) | Self::Json(_) | Self::Io(_) => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, WhosInSpaceError>;
