use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum IssueMapError {
    #[error("Issue source error: {0}")]
    Source(#[from] SourceError),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Issue source errors (file or HTTP)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload is neither an issue list nor an object with an \"issues\" list")]
    UnexpectedPayload,
}

/// TUI errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for issuemap operations
pub type Result<T> = std::result::Result<T, IssueMapError>;

impl IssueMapError {
    /// Check if this error is recoverable (should retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IssueMapError::Source(source) if source.is_recoverable())
    }
}

impl SourceError {
    /// Transient failures worth retrying on the next poll
    pub fn is_recoverable(&self) -> bool {
        match self {
            SourceError::Http(_) => true,
            SourceError::HttpStatus(status) => status.is_server_error(),
            SourceError::Io(e) => e.kind() != std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
