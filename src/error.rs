//! Error types for coordination analysis.
//!
//! All errors are immediate, synchronous failures of the operation that
//! detected them. Engine operations validate their inputs before touching any
//! channel, intermod or conflict list, so an `Err` always means the engine
//! state is exactly as it was before the call.
//!
//! ## Error Categories
//!
//! - **Invalid Frequency**: a frequency off the equipment tuning grid, or
//!   outside the channel's bound range
//! - **Invalid Argument**: a missing channel, a duplicate id, or a malformed
//!   equipment profile
//! - **Missing Range**: a generation request for a channel with no bound range
//! - **Parse / File**: catalogue and snapshot decoding, encoding or I/O
//!   failures. Encoding failures carry a context ending in `encoding`.
//!
//! A search that runs out of candidates is *not* an error; see
//! [`SearchOutcome`](crate::generator::SearchOutcome).
//!
//! ## Helper Constructors
//!
//! ```rust
//! use rfcoord::{ChannelId, CoordinationError};
//!
//! let off_grid = CoordinationError::off_grid(500_451, 25);
//! assert!(off_grid.to_string().contains("500451"));
//!
//! let missing = CoordinationError::unknown_channel(ChannelId(7));
//! assert!(!missing.is_retryable());
//! for suggestion in missing.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{ChannelId, Range};

/// Result type alias for coordination operations.
pub type Result<T, E = CoordinationError> = std::result::Result<T, E>;

/// Main error type for coordination operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoordinationError {
    #[error("Invalid frequency {frequency} kHz: {reason}")]
    InvalidFrequency { frequency: i32, reason: String },

    #[error("Invalid argument: {details}")]
    InvalidArgument { details: String },

    #[error("Channel {channel} has no tuning range assigned")]
    MissingRange { channel: ChannelId },

    /// Decoding or encoding of a document failed.
    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoordinationError {
    /// Returns whether retrying the same call could succeed.
    ///
    /// Only I/O failures qualify. Every other variant describes an input that
    /// will be rejected again until the caller changes it.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoordinationError::File { .. } => true,
            CoordinationError::InvalidFrequency { .. } => false,
            CoordinationError::InvalidArgument { .. } => false,
            CoordinationError::MissingRange { .. } => false,
            CoordinationError::Parse { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CoordinationError::InvalidFrequency { .. } => vec![
                "Pick a frequency that is a multiple of the equipment tuning accuracy",
                "Check the frequency lies inside the channel's bound range",
                "Clear the bound range before retuning outside it",
            ],
            CoordinationError::InvalidArgument { .. } => vec![
                "Check the channel id exists in the coordination",
                "Use a fresh channel id for new channels",
                "Verify the equipment profile has a positive tuning accuracy",
            ],
            CoordinationError::MissingRange { .. } => vec![
                "Assign one of the equipment's tuning ranges to the channel",
                "Use assignable_ranges() to list ranges containing the current frequency",
            ],
            CoordinationError::Parse { .. } => vec![
                "Check the document is valid JSON or YAML",
                "Verify field names match the equipment profile schema",
            ],
            CoordinationError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Use a .json, .yaml or .yml extension",
            ],
        }
    }

    /// Helper constructor for a frequency that is not on the tuning grid.
    pub fn off_grid(frequency: i32, tuning_accuracy: i32) -> Self {
        CoordinationError::InvalidFrequency {
            frequency,
            reason: format!("not on the {tuning_accuracy} kHz tuning accuracy grid"),
        }
    }

    /// Helper constructor for a frequency outside a bound range.
    pub fn out_of_range(frequency: i32, range: &Range) -> Self {
        CoordinationError::InvalidFrequency {
            frequency,
            reason: format!("outside range {range}"),
        }
    }

    /// Helper constructor for invalid arguments.
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        CoordinationError::InvalidArgument {
            details: details.into(),
        }
    }

    /// Helper constructor for a channel id that is not present.
    pub fn unknown_channel(id: ChannelId) -> Self {
        CoordinationError::InvalidArgument {
            details: format!("channel {id} not found"),
        }
    }

    /// Helper constructor for decoding and encoding failures.
    pub fn parse_error(context: impl Into<String>, details: impl ToString) -> Self {
        CoordinationError::Parse {
            context: context.into(),
            details: details.to_string(),
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        CoordinationError::File { path, source }
    }
}

impl From<std::io::Error> for CoordinationError {
    fn from(err: std::io::Error) -> Self {
        CoordinationError::File {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}
