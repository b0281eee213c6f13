//! Shared error types across cellprobe crates.

use thiserror::Error;

/// Why a serving-cell response could not be turned into a `Reading`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `+QENG:` marker is absent (error reply, empty body, wrong page).
    #[error("malformed response: missing +QENG: marker")]
    MalformedResponse,
    /// The marker is present but the payload is too short for any known mode.
    #[error("truncated response: {fields} fields, need at least {required}")]
    TruncatedResponse { fields: usize, required: usize },
    /// A numeric position holds text that does not parse as a number.
    #[error("field {index} is not numeric: {raw_value:?}")]
    FieldConversion { index: usize, raw_value: String },
}

/// Stable error codes (log fields and metric labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedResponse,
    TruncatedResponse,
    FieldConversion,
    Transport,
    Timeout,
    Config,
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and the `outcome` metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::TruncatedResponse => "truncated_response",
            ErrorKind::FieldConversion => "field_conversion",
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CellProbeError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum CellProbeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("transport: {0}")]
    Transport(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CellProbeError {
    /// Map the error to its stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CellProbeError::Parse(ParseError::MalformedResponse) => ErrorKind::MalformedResponse,
            CellProbeError::Parse(ParseError::TruncatedResponse { .. }) => {
                ErrorKind::TruncatedResponse
            }
            CellProbeError::Parse(ParseError::FieldConversion { .. }) => ErrorKind::FieldConversion,
            CellProbeError::Transport(_) => ErrorKind::Transport,
            CellProbeError::Timeout(_) => ErrorKind::Timeout,
            CellProbeError::Config(_) => ErrorKind::Config,
            CellProbeError::Internal(_) => ErrorKind::Internal,
        }
    }
}
