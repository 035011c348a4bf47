use std::fmt;

use jsrunner_core::{ConsoleRecord, ExecutionResult, LearnLinks};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Output(ConsoleRecord),
    SourceLoaded {
        code: String,
    },
    SourceFailed(SourceError),
    ExecutionFinished {
        run: u64,
        result: ExecutionResult,
        finished_at: String,
    },
    TopicsScored {
        generation: u64,
        links: LearnLinks,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SourceError {
    pub kind: FailureKind,
    pub message: String,
}

impl SourceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidLocation,
    NotFound,
    Io,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidLocation => write!(f, "invalid source location"),
            FailureKind::NotFound => write!(f, "source not found"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "source too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable source"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
