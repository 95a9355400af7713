use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{EntryId, ErrorKind, FeedId};

/// Transport-level failure while obtaining raw feed content.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Unreachable: {0}")]
    Unreachable(String),
}

/// Content was fetched but is not a recognized feed document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Feed parsing error: {0}")]
    Format(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL: {0}")]
    Invalid(String),

    #[error("URL already added: {0}")]
    AlreadyAdded(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Feed already exists: {0}")]
    DuplicateUrl(String),

    #[error("Feed not found: {0}")]
    UnknownFeed(FeedId),

    #[error("Entry not found: {0}")]
    UnknownEntry(EntryId),
}

/// Failure of one synchronization step, classified for the status fields.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Unknown(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Fetch(_) => ErrorKind::NetworkFault,
            SyncError::Parse(_) => ErrorKind::ParsingFault,
            SyncError::Validation(_) => ErrorKind::ValidationError,
            // A duplicate url slipping past validation is still the caller's input.
            SyncError::Store(StoreError::DuplicateUrl(_)) => ErrorKind::ValidationError,
            SyncError::Store(_) | SyncError::Unknown(_) => ErrorKind::UnknownError,
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedsyncError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SyncError::from(FetchError::Timeout).kind(),
            ErrorKind::NetworkFault
        );
        assert_eq!(
            SyncError::from(ParseError::Format("empty".into())).kind(),
            ErrorKind::ParsingFault
        );
        assert_eq!(
            SyncError::from(ValidationError::Invalid("x".into())).kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            SyncError::from(StoreError::DuplicateUrl("u".into())).kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            SyncError::from(StoreError::UnknownFeed(9)).kind(),
            ErrorKind::UnknownError
        );
        assert_eq!(
            SyncError::Unknown("boom".into()).kind(),
            ErrorKind::UnknownError
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP status 404");
        assert_eq!(
            SyncError::from(ParseError::Format("no root".into())).to_string(),
            "Feed parsing error: no root"
        );
    }
}
