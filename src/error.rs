use thiserror::Error;

#[derive(Error, Debug)]
pub enum SorterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, SorterError>;

/// Outcome classes of a single remote catalog lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// The server answered 429; back off and try again
    #[error("rate limited by catalog (HTTP 429)")]
    RateLimited,

    /// Connection-level failure before any HTTP status was received
    #[error("network error: {0}")]
    Transport(String),

    /// Any non-2xx status other than 429
    #[error("API error: {0}")]
    Status(u16),

    /// A 2xx response whose body could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    PermanentPerItem,
}

impl LookupError {
    pub fn classify(&self) -> ErrorClass {
        match self {
            LookupError::RateLimited | LookupError::Transport(_) => ErrorClass::Transient,
            LookupError::Status(_) | LookupError::Malformed(_) => ErrorClass::PermanentPerItem,
        }
    }
}
