//! Unified Error Model
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a single check.
///
/// None of these are retried: every input is static state at check time.
#[derive(Error, Debug)]
pub enum TzCompatError {
    #[error("FORMAT/SHORT_READ: {origin} has {actual} bytes, expected {expected}")]
    ShortRead {
        origin: String,
        expected: usize,
        actual: usize,
    },

    #[error("FORMAT/MISSING_FIELD: no {field} in {content:?} (split on '{delimiter}')")]
    MissingField {
        field: &'static str,
        delimiter: char,
        content: String,
    },

    #[error("FORMAT/NOT_ASCII: {origin} preamble contains non-ASCII bytes")]
    NotAscii { origin: String },

    #[error("FORMAT/ARGUMENT: {0}")]
    InvalidArgument(String),

    #[error("POLICY/GAP: no policy entry for release {release}; the table needs a rule for it")]
    PolicyGap { release: String },

    #[error("POLICY/SIGNAL: release {release} is resolved by build signal, but none was supplied")]
    MissingBuildSignal { release: String },

    #[error(
        "COMPAT/MISMATCH: release {release} expects major format version {expected}, module has {observed}"
    )]
    Incompatible {
        release: String,
        expected: String,
        observed: String,
    },

    #[error("CONSISTENCY/{source_name}: module tzdb version {module}, {source_name} reports {reported}")]
    Inconsistent {
        source_name: String,
        module: String,
        reported: String,
    },

    #[error("IO/{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG/{0}")]
    Config(String),
}

/// Coarse classification of [`TzCompatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Format,
    PolicyGap,
    Compatibility,
    Inconsistency,
    Io,
    Config,
}

impl TzCompatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShortRead { .. }
            | Self::MissingField { .. }
            | Self::NotAscii { .. }
            | Self::InvalidArgument(_) => ErrorKind::Format,
            Self::PolicyGap { .. } | Self::MissingBuildSignal { .. } => ErrorKind::PolicyGap,
            Self::Incompatible { .. } => ErrorKind::Compatibility,
            Self::Inconsistent { .. } => ErrorKind::Inconsistency,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TzCompatError>;
