#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Reference host for the signature scanner.
//!
//! Supplies concrete collaborators for [`sigscan_core::Scheduler`]:
//!
//! - [`Workspace`] - open documents stored as ropes, a [`DocumentRegistry`](sigscan_core::DocumentRegistry)
//! - [`RopeProbe`] - multi-line regex search over one document
//! - [`LanguageStyles`] - per-language patterns loaded from TOML
//! - [`KeywordTable`] - discovered names per language
//! - [`ScanDriver`] - a tokio task turning timer requests into sleeps

pub mod driver;
pub mod error;
pub mod keywords;
pub mod probe;
pub mod styles;
pub mod workspace;

pub use driver::{DriverCommand, DriverError, DriverHandle, ScanDriver, ScanEvent};
pub use error::{ConfigError, Result};
pub use keywords::KeywordTable;
pub use probe::{PatternCache, RopeProbe};
pub use styles::{LanguageStyle, LanguageStyles, parse_display_mode};
pub use workspace::{Document, Workspace};
