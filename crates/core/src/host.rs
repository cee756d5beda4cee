//! Collaborator seams.
//!
//! The engine owns no text, no configuration and no highlighter state. The
//! host supplies them through these traits, bundled per call in a
//! [`ScanHost`].

use crate::cursor::ScanStats;
use crate::error::ProbeError;
use crate::types::{DocumentId, SortMode};

/// Byte span of a single pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeMatch {
	pub start: usize,
	pub end: usize,
}

/// Regex search over one document's content.
///
/// Offsets are byte offsets into the document. A probe is attached for the
/// duration of one slice and [`detach`](TextProbe::detach)ed afterwards so
/// other consumers of the same buffer never see leftover search state.
pub trait TextProbe {
	/// Finds the first match of `pattern` starting at or after `from`.
	fn find_next(&mut self, pattern: &str, from: usize) -> Result<Option<ProbeMatch>, ProbeError>;

	/// Returns the text in `start..end`.
	fn text_range(&self, start: usize, end: usize) -> String;

	/// Document length in bytes.
	fn len(&self) -> usize;

	/// Returns true for an empty document.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Zero-based line containing `offset`.
	fn line_of(&self, offset: usize) -> usize;

	/// Releases any search state held against the document.
	fn detach(&mut self) {}
}

/// Read-only per-language extraction settings.
pub trait StyleConfig {
	/// Extraction pattern for `language`; empty when the language has none.
	fn extraction_pattern(&self, language: &str) -> String;

	/// Literal substrings removed from every match before parsing.
	fn trim_tokens(&self, language: &str) -> Vec<String>;

	fn sort_mode(&self, language: &str) -> SortMode;
}

/// The host's set of open documents.
pub trait DocumentRegistry {
	fn is_open(&self, doc: DocumentId) -> bool;

	/// Language name of `doc`, if it has one.
	fn language(&self, doc: DocumentId) -> Option<String>;

	/// Document currently shown in the editing surface.
	fn displayed(&self) -> Option<DocumentId>;

	/// Attaches a probe to the content of `doc`.
	fn attach(&self, doc: DocumentId) -> Option<Box<dyn TextProbe + '_>>;
}

/// Highlighter user-keyword table fed with discovered names.
pub trait KeywordSink {
	/// Registers `name` for `language`. Returns true if the keyword set grew.
	fn add_keyword(&mut self, language: &str, name: &str) -> bool;

	/// Asks the highlighter to pick up newly added keywords for `language`.
	fn refresh_lexer(&mut self, language: &str);
}

/// Notifications for the presentation layer and diagnostics.
///
/// All methods default to no-ops.
pub trait ScanObserver {
	/// A scan of `previous` was abandoned in favour of `next`.
	fn on_interrupted(&mut self, _previous: DocumentId, _next: DocumentId) {}

	/// A scan session of `doc` completed.
	fn on_finished(&mut self, _doc: DocumentId, _stats: &ScanStats) {}

	/// The symbol list for `doc` is stale or was replaced.
	fn invalidate_results(&mut self, _doc: DocumentId) {}

	/// The enabled state of the symbol-list command for `doc` may have changed.
	fn invalidate_enabled(&mut self, _doc: DocumentId) {}
}

impl ScanObserver for () {}

/// Borrowed collaborators for one scheduler call.
pub struct ScanHost<'a> {
	pub registry: &'a dyn DocumentRegistry,
	pub styles: &'a dyn StyleConfig,
	pub keywords: &'a mut dyn KeywordSink,
	pub observer: &'a mut dyn ScanObserver,
}
