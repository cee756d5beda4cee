//! In-memory set of open documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ropey::Rope;
use sigscan_core::{DocumentId, DocumentRegistry, TextProbe};

use crate::error::{ConfigError, Result};
use crate::probe::{PatternCache, RopeProbe};
use crate::styles::LanguageStyles;

/// One open document.
#[derive(Debug, Clone)]
pub struct Document {
	pub content: Rope,
	pub language: Option<String>,
	pub path: Option<PathBuf>,
}

/// Open documents keyed by id, plus the one shown in the editing surface.
///
/// Ids are never reused within a workspace.
#[derive(Debug, Default)]
pub struct Workspace {
	docs: BTreeMap<DocumentId, Document>,
	displayed: Option<DocumentId>,
	next_id: u64,
	patterns: PatternCache,
}

impl Workspace {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens an unnamed document.
	pub fn open(&mut self, text: &str, language: Option<&str>) -> DocumentId {
		self.insert(Document {
			content: Rope::from_str(text),
			language: language.map(str::to_string),
			path: None,
		})
	}

	/// Reads `path` from disk and opens it, picking the language by extension.
	pub fn open_path(&mut self, path: &Path, styles: &LanguageStyles) -> Result<DocumentId> {
		let text = fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let language = styles.language_for_path(path).map(str::to_string);
		tracing::debug!(path = %path.display(), ?language, "opened document");
		Ok(self.insert(Document {
			content: Rope::from_str(&text),
			language,
			path: Some(path.to_path_buf()),
		}))
	}

	fn insert(&mut self, doc: Document) -> DocumentId {
		self.next_id += 1;
		let id = DocumentId(self.next_id);
		self.docs.insert(id, doc);
		id
	}

	/// Replaces the whole content of `doc`. Returns false if it is not open.
	pub fn set_text(&mut self, doc: DocumentId, text: &str) -> bool {
		self.edit(doc, |rope| *rope = Rope::from_str(text))
	}

	/// Applies `f` to the content of `doc`. Returns false if it is not open.
	pub fn edit(&mut self, doc: DocumentId, f: impl FnOnce(&mut Rope)) -> bool {
		match self.docs.get_mut(&doc) {
			Some(d) => {
				f(&mut d.content);
				true
			}
			None => false,
		}
	}

	/// Changes the language of `doc`, as a save under a new name does.
	pub fn set_language(&mut self, doc: DocumentId, language: Option<&str>) -> bool {
		match self.docs.get_mut(&doc) {
			Some(d) => {
				d.language = language.map(str::to_string);
				true
			}
			None => false,
		}
	}

	/// Closes `doc`. Closing the displayed document leaves nothing displayed.
	pub fn close(&mut self, doc: DocumentId) -> Option<Document> {
		if self.displayed == Some(doc) {
			self.displayed = None;
		}
		self.docs.remove(&doc)
	}

	/// Shows `doc`. Returns false if it is not open.
	pub fn set_displayed(&mut self, doc: DocumentId) -> bool {
		if !self.docs.contains_key(&doc) {
			return false;
		}
		self.displayed = Some(doc);
		true
	}

	pub fn get(&self, doc: DocumentId) -> Option<&Document> {
		self.docs.get(&doc)
	}

	pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
		self.docs.keys().copied()
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}
}

impl DocumentRegistry for Workspace {
	fn is_open(&self, doc: DocumentId) -> bool {
		self.docs.contains_key(&doc)
	}

	fn language(&self, doc: DocumentId) -> Option<String> {
		self.docs.get(&doc)?.language.clone()
	}

	fn displayed(&self) -> Option<DocumentId> {
		self.displayed
	}

	fn attach(&self, doc: DocumentId) -> Option<Box<dyn TextProbe + '_>> {
		let d = self.docs.get(&doc)?;
		Some(Box::new(RopeProbe::new(&d.content, &self.patterns)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_are_not_reused_after_close() {
		let mut ws = Workspace::new();
		let a = ws.open("a", None);
		ws.close(a);
		let b = ws.open("b", None);
		assert_ne!(a, b);
		assert!(!ws.is_open(a));
	}

	#[test]
	fn closing_displayed_document_clears_display() {
		let mut ws = Workspace::new();
		let a = ws.open("a", Some("demo"));
		assert!(ws.set_displayed(a));
		ws.close(a);
		assert_eq!(ws.displayed(), None);
		assert!(!ws.set_displayed(a));
	}

	#[test]
	fn attach_exposes_current_content() {
		let mut ws = Workspace::new();
		let a = ws.open("one\n", Some("demo"));
		ws.edit(a, |rope| rope.insert(0, "zero\n"));
		let probe = ws.attach(a).unwrap();
		assert_eq!(probe.len(), 9);
		assert_eq!(probe.text_range(0, 4), "zero");
		assert_eq!(probe.line_of(5), 1);
	}
}
