use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by catalog, TMDB and local console operations.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },

    /// TMDB rejected both the bearer token and the api_key fallback
    #[error("Not authorized by {url}")]
    Unauthorized { url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required form field was empty or a precondition did not hold
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;
