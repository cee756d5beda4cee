//! Symbol list of the displayed document.

use crate::types::{DisplayResults, DocumentId, FunctionInfo, JumpTarget};

/// Latest complete symbol list, tagged with the document it describes.
///
/// The list is only ever replaced wholesale. Invalidation clears readiness
/// but keeps the last list around until a replacement arrives.
#[derive(Debug, Default)]
pub struct ResultStore {
	doc: Option<DocumentId>,
	functions: Vec<FunctionInfo>,
	ready: bool,
	generation: u64,
}

impl ResultStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the list as stale.
	pub fn invalidate(&mut self) {
		self.ready = false;
	}

	/// Installs `functions` for `doc` if `doc` is still the displayed document.
	///
	/// Returns false (and drops the list) when the user has navigated away.
	pub fn replace(
		&mut self,
		doc: DocumentId,
		displayed: Option<DocumentId>,
		functions: Vec<FunctionInfo>,
	) -> bool {
		if displayed != Some(doc) {
			tracing::debug!(%doc, ?displayed, "discarding results for non-displayed document");
			return false;
		}
		self.doc = Some(doc);
		self.functions = functions;
		self.ready = true;
		self.generation = self.generation.wrapping_add(1);
		true
	}

	/// Forgets everything known about `doc`.
	pub fn forget(&mut self, doc: DocumentId) {
		if self.doc == Some(doc) {
			*self = Self {
				generation: self.generation.wrapping_add(1),
				..Self::default()
			};
		}
	}

	/// Returns true if a completed list for `displayed` is installed.
	pub fn is_ready_for(&self, displayed: Option<DocumentId>) -> bool {
		self.ready && displayed.is_some() && self.doc == displayed
	}

	/// Snapshot for the presentation layer.
	pub fn for_display(&self, displayed: Option<DocumentId>) -> DisplayResults {
		if !self.is_ready_for(displayed) {
			return DisplayResults::default();
		}
		DisplayResults {
			ready: true,
			functions: self.functions.clone(),
		}
	}

	/// Maps a list index back to a navigation target.
	pub fn jump_target(&self, index: usize) -> Option<JumpTarget> {
		let doc = self.doc?;
		let info = self.functions.get(index)?;
		Some(JumpTarget { doc, line: info.line })
	}

	/// First entry named exactly `name`.
	pub fn find_by_name(&self, name: &str) -> Option<JumpTarget> {
		let doc = self.doc?;
		self.functions
			.iter()
			.find(|f| f.name == name)
			.map(|f| JumpTarget { doc, line: f.line })
	}

	pub fn doc(&self) -> Option<DocumentId> {
		self.doc
	}

	pub fn functions(&self) -> &[FunctionInfo] {
		&self.functions
	}

	/// Bumped on every replacement.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}
