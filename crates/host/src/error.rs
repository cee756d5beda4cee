//! Error types for loading styles and documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a styles file.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a file from disk.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A `function_regex_sort` value is not one of the known modes.
	#[error("invalid sort mode: {0} (expected 0, 1, 2, \"none\", \"case-insensitive\" or \"alternate\")")]
	InvalidSortMode(String),

	/// A `display_mode` value is not one of the known modes.
	#[error("invalid display mode: {0} (expected \"name\", \"name-and-args\" or \"signature\")")]
	InvalidDisplayMode(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
