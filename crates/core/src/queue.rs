//! Deduplicated LIFO queue of documents awaiting a scan.

use crate::types::DocumentId;

/// Documents awaiting a scan, most recently requested last.
///
/// Membership has set semantics: pushing a queued id moves it to the head
/// instead of adding a second entry. The queue never outgrows the number of
/// open documents, so every operation is a linear scan.
#[derive(Debug, Default, Clone)]
pub struct PendingQueue {
	ids: Vec<DocumentId>,
}

impl PendingQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `doc` as the most recent request.
	pub fn push(&mut self, doc: DocumentId) {
		self.ids.retain(|&d| d != doc);
		self.ids.push(doc);
	}

	/// The next document to scan (the most recent request).
	pub fn head(&self) -> Option<DocumentId> {
		self.ids.last().copied()
	}

	/// Removes `doc`, returning whether it was queued.
	pub fn remove(&mut self, doc: DocumentId) -> bool {
		let before = self.ids.len();
		self.ids.retain(|&d| d != doc);
		self.ids.len() != before
	}

	/// Drops every id for which `is_open` returns false and returns them.
	pub fn retain_open(&mut self, mut is_open: impl FnMut(DocumentId) -> bool) -> Vec<DocumentId> {
		let mut stale = Vec::new();
		self.ids.retain(|&d| {
			let keep = is_open(d);
			if !keep {
				stale.push(d);
			}
			keep
		});
		stale
	}

	pub fn contains(&self, doc: DocumentId) -> bool {
		self.ids.contains(&doc)
	}

	pub fn clear(&mut self) {
		self.ids.clear();
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Iterates in processing order, head first.
	pub fn iter(&self) -> impl Iterator<Item = DocumentId> + '_ {
		self.ids.iter().rev().copied()
	}
}
