#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Background signature discovery for a multi-document editor.
//!
//! The engine scans open documents for function signatures with a
//! per-language extraction pattern, a bounded slice at a time, so that the
//! editing surface never waits on it.
//!
//! # Main Types
//!
//! - [`Scheduler`] - admits lifecycle events, picks the next document, drives slices
//! - [`ScanCursor`] - resumable scan state for a single document
//! - [`PendingQueue`] - deduplicated LIFO queue of documents awaiting a scan
//! - [`ResultStore`] - the symbol list of the displayed document
//!
//! # Architecture
//!
//! ```text
//! host event ──► Scheduler::notify_lifecycle ──► PendingQueue + TimerRequest
//! timer fire ──► Scheduler::on_timer_fire ──► ScanCursor::resume(budget)
//!                                              ├── TextProbe (matches)
//!                                              ├── signature::parse
//!                                              ├── KeywordSink (names)
//!                                              └── ResultStore (displayed doc)
//! ```
//!
//! Everything runs on one logical thread. The host translates each returned
//! [`TimerRequest`] into whatever deferred-call primitive it has.

pub mod clock;
pub mod cursor;
pub mod error;
pub mod host;
pub mod queue;
pub mod results;
pub mod scheduler;
pub mod signature;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use cursor::{ScanCursor, ScanStats, SliceBudget};
pub use error::{ProbeError, ScanError};
pub use host::{
	DocumentRegistry, KeywordSink, ProbeMatch, ScanHost, ScanObserver, StyleConfig, TextProbe,
};
pub use queue::PendingQueue;
pub use results::ResultStore;
pub use scheduler::{Scheduler, SchedulerConfig, TimerRequest};
pub use types::{
	DisplayMode, DisplayResults, DocumentId, FunctionInfo, JumpTarget, ScanReason, ScanStatus,
	SortMode,
};

#[cfg(test)]
pub(crate) mod fakes;
