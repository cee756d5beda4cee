//! Error types for scan sessions.
//!
//! None of these escape to the user. The scheduler turns every error into a
//! [`crate::ScanStatus::Failed`] session and moves on to the next document.

use thiserror::Error;

use crate::types::DocumentId;

/// Errors reported by a [`crate::TextProbe`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
	/// The extraction pattern could not be compiled.
	#[error("invalid extraction pattern {pattern:?}: {message}")]
	InvalidPattern {
		/// The pattern as configured.
		pattern: String,
		/// Compiler diagnostic.
		message: String,
	},
}

/// Reasons a scan session could not start or continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
	/// The registry knows the document but cannot expose its text.
	#[error("cannot attach to {0}")]
	InvalidTarget(DocumentId),
	/// The document was closed before its scan started.
	#[error("{0} is no longer open")]
	StaleTarget(DocumentId),
	/// The text probe rejected the search.
	#[error(transparent)]
	Probe(#[from] ProbeError),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
