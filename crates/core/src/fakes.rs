//! In-memory collaborators for unit tests.
//!
//! [`FakeProbe`] treats an extraction pattern as a literal line prefix: a
//! match is a whole line that starts with the pattern. A pattern starting
//! with `(` is rejected as invalid.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::cursor::ScanStats;
use crate::error::ProbeError;
use crate::host::{
	DocumentRegistry, KeywordSink, ProbeMatch, ScanHost, ScanObserver, StyleConfig, TextProbe,
};
use crate::types::{DocumentId, SortMode};

pub(crate) struct FakeDoc {
	pub(crate) text: String,
	pub(crate) language: Option<String>,
	/// Refuse to attach, as if the buffer were gone.
	pub(crate) detached: bool,
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
	pub(crate) docs: HashMap<DocumentId, FakeDoc>,
	pub(crate) displayed: Option<DocumentId>,
	pub(crate) attaches: Cell<usize>,
	pub(crate) detaches: Cell<usize>,
}

impl FakeRegistry {
	pub(crate) fn open(&mut self, id: u64, language: &str, text: &str) -> DocumentId {
		let doc = DocumentId(id);
		self.docs.insert(
			doc,
			FakeDoc {
				text: text.to_string(),
				language: (!language.is_empty()).then(|| language.to_string()),
				detached: false,
			},
		);
		doc
	}

	pub(crate) fn close(&mut self, doc: DocumentId) {
		self.docs.remove(&doc);
		if self.displayed == Some(doc) {
			self.displayed = None;
		}
	}

	pub(crate) fn display(&mut self, doc: DocumentId) {
		self.displayed = Some(doc);
	}

	/// Attached probes not yet detached.
	pub(crate) fn live_probes(&self) -> usize {
		self.attaches.get() - self.detaches.get()
	}
}

impl DocumentRegistry for FakeRegistry {
	fn is_open(&self, doc: DocumentId) -> bool {
		self.docs.contains_key(&doc)
	}

	fn language(&self, doc: DocumentId) -> Option<String> {
		self.docs.get(&doc).and_then(|d| d.language.clone())
	}

	fn displayed(&self) -> Option<DocumentId> {
		self.displayed
	}

	fn attach(&self, doc: DocumentId) -> Option<Box<dyn TextProbe + '_>> {
		let d = self.docs.get(&doc).filter(|d| !d.detached)?;
		self.attaches.set(self.attaches.get() + 1);
		Some(Box::new(FakeProbe {
			text: &d.text,
			detaches: &self.detaches,
		}))
	}
}

pub(crate) struct FakeProbe<'a> {
	text: &'a str,
	detaches: &'a Cell<usize>,
}

impl TextProbe for FakeProbe<'_> {
	fn find_next(&mut self, pattern: &str, from: usize) -> Result<Option<ProbeMatch>, ProbeError> {
		if pattern.starts_with('(') {
			return Err(ProbeError::InvalidPattern {
				pattern: pattern.to_string(),
				message: "unbalanced group".to_string(),
			});
		}
		let mut line_start = 0;
		for line in self.text.split_inclusive('\n') {
			let start = line_start;
			line_start += line.len();
			if start < from {
				continue;
			}
			if line.starts_with(pattern) {
				let body = line.trim_end_matches(['\n', '\r']);
				return Ok(Some(ProbeMatch {
					start,
					end: start + body.len(),
				}));
			}
		}
		Ok(None)
	}

	fn text_range(&self, start: usize, end: usize) -> String {
		self.text[start..end].to_string()
	}

	fn len(&self) -> usize {
		self.text.len()
	}

	fn line_of(&self, offset: usize) -> usize {
		self.text[..offset.min(self.text.len())].matches('\n').count()
	}

	fn detach(&mut self) {
		self.detaches.set(self.detaches.get() + 1);
	}
}

#[derive(Default)]
pub(crate) struct FakeStyles {
	pub(crate) langs: HashMap<String, (String, Vec<String>, SortMode)>,
}

impl FakeStyles {
	pub(crate) fn with(mut self, language: &str, pattern: &str) -> Self {
		self.langs.insert(
			language.to_string(),
			(pattern.to_string(), Vec::new(), SortMode::None),
		);
		self
	}

	pub(crate) fn sorted(mut self, language: &str, sort: SortMode) -> Self {
		if let Some(entry) = self.langs.get_mut(language) {
			entry.2 = sort;
		}
		self
	}

	pub(crate) fn trimming(mut self, language: &str, tokens: &[&str]) -> Self {
		if let Some(entry) = self.langs.get_mut(language) {
			entry.1 = tokens.iter().map(|t| t.to_string()).collect();
		}
		self
	}
}

impl StyleConfig for FakeStyles {
	fn extraction_pattern(&self, language: &str) -> String {
		self.langs
			.get(language)
			.map(|l| l.0.clone())
			.unwrap_or_default()
	}

	fn trim_tokens(&self, language: &str) -> Vec<String> {
		self.langs
			.get(language)
			.map(|l| l.1.clone())
			.unwrap_or_default()
	}

	fn sort_mode(&self, language: &str) -> SortMode {
		self.langs.get(language).map(|l| l.2).unwrap_or_default()
	}
}

#[derive(Default)]
pub(crate) struct FakeKeywords {
	pub(crate) received: Vec<(String, String)>,
	pub(crate) table: HashSet<(String, String)>,
	pub(crate) refreshes: Vec<String>,
}

impl FakeKeywords {
	pub(crate) fn count(&self, name: &str) -> usize {
		self.received.iter().filter(|(_, n)| n == name).count()
	}
}

impl KeywordSink for FakeKeywords {
	fn add_keyword(&mut self, language: &str, name: &str) -> bool {
		self.received.push((language.to_string(), name.to_string()));
		self.table.insert((language.to_string(), name.to_string()))
	}

	fn refresh_lexer(&mut self, language: &str) {
		self.refreshes.push(language.to_string());
	}
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
	pub(crate) interrupted: Vec<(DocumentId, DocumentId)>,
	pub(crate) finished: Vec<(DocumentId, ScanStats)>,
	pub(crate) invalidated_results: Vec<DocumentId>,
	pub(crate) invalidated_enabled: Vec<DocumentId>,
}

impl ScanObserver for RecordingObserver {
	fn on_interrupted(&mut self, previous: DocumentId, next: DocumentId) {
		self.interrupted.push((previous, next));
	}

	fn on_finished(&mut self, doc: DocumentId, stats: &ScanStats) {
		self.finished.push((doc, *stats));
	}

	fn invalidate_results(&mut self, doc: DocumentId) {
		self.invalidated_results.push(doc);
	}

	fn invalidate_enabled(&mut self, doc: DocumentId) {
		self.invalidated_enabled.push(doc);
	}
}

/// Clock that advances by a fixed step on every reading.
pub(crate) struct StepClock {
	base: Instant,
	step: Duration,
	ticks: AtomicU64,
}

impl StepClock {
	pub(crate) fn new(step: Duration) -> Self {
		Self {
			base: Instant::now(),
			step,
			ticks: AtomicU64::new(0),
		}
	}
}

impl Clock for StepClock {
	fn now(&self) -> Instant {
		let n = self.ticks.fetch_add(1, Ordering::Relaxed);
		self.base + self.step * n as u32
	}
}

/// Owns one of each fake and lends them out as a [`ScanHost`].
#[derive(Default)]
pub(crate) struct TestHost {
	pub(crate) registry: FakeRegistry,
	pub(crate) styles: FakeStyles,
	pub(crate) keywords: FakeKeywords,
	pub(crate) observer: RecordingObserver,
}

impl TestHost {
	pub(crate) fn host(&mut self) -> ScanHost<'_> {
		ScanHost {
			registry: &self.registry,
			styles: &self.styles,
			keywords: &mut self.keywords,
			observer: &mut self.observer,
		}
	}
}

/// `count` lines of `func fN(i)` separated by filler lines.
pub(crate) fn numbered_source(count: usize) -> String {
	let mut text = String::new();
	for i in 0..count {
		text.push_str(&format!("// filler {i}\nfunc f{i}(i)\n"));
	}
	text
}
