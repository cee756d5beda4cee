use std::fmt;

/// Stable identifier for an open document.
///
/// Survives tab reordering; meaningless once the document is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "doc#{}", self.0)
	}
}

/// Why a document was (re)scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanReason {
	/// The displayed tab changed to this document.
	TabChange,
	/// The document was opened.
	DocOpened,
	/// The document's text changed.
	DocModified,
	/// The document was saved (possibly under a new language).
	DocSaved,
	/// Internal: the head document's scan ran out of budget and continues.
	ContinueScan,
	/// Internal: the head document finished and the next one is up.
	AdvanceToNext,
}

impl ScanReason {
	/// Returns true for reasons that come from the host rather than the scheduler itself.
	pub const fn is_host_originated(self) -> bool {
		matches!(
			self,
			Self::TabChange | Self::DocOpened | Self::DocModified | Self::DocSaved
		)
	}
}

/// Lifecycle of the single active scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
	#[default]
	NotStarted,
	/// A slice stopped on budget with document text remaining.
	InProgress,
	/// No further match exists (includes "language has no pattern").
	Finished,
	/// The target could not be scanned at all.
	Failed,
}

impl ScanStatus {
	/// Returns true once the session can no longer make progress.
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Finished | Self::Failed)
	}
}

/// How a discovered symbol is rendered in the symbol list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
	/// `alpha`
	Name,
	/// `alpha (x)`
	#[default]
	NameAndArgs,
	/// `int alpha (x)`
	Signature,
}

/// Per-language ordering applied once a displayed document finishes scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
	/// Document order.
	#[default]
	None,
	/// Case-insensitive on the display text.
	CaseInsensitive,
	/// Case-insensitive on the declarator that precedes the final parameter list.
	AlternateKey,
}

/// One discovered signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
	/// Zero-based line of the cleaned match start.
	pub line: usize,
	/// Normalized signature text (comments, noise and trim tokens removed).
	pub raw_signature: String,
	/// Canonical name, or the whole signature when no name could be parsed.
	pub name: String,
	/// Text shown to the user, shaped by [`DisplayMode`].
	pub display_text: String,
}

/// Navigation target produced by selecting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
	pub doc: DocumentId,
	pub line: usize,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayResults {
	/// False while the displayed document has no completed scan.
	pub ready: bool,
	pub functions: Vec<FunctionInfo>,
}
