use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessState {
    #[default]
    Filling,
    Loading,
    Success,
    Fault,
}

/// Failure classification handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    ValidationError,
    NetworkFault,
    ParsingFault,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validationError",
            ErrorKind::NetworkFault => "networkFault",
            ErrorKind::ParsingFault => "parsingFault",
            ErrorKind::UnknownError => "unknownError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub process_state: ProcessState,
    pub error: Option<ErrorKind>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            process_state: ProcessState::Filling,
            error: None,
            updated_at: Utc::now(),
        }
    }
}
