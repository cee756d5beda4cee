//! Resumable, budgeted scanning of a single document.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{Result, ScanError};
use crate::host::{DocumentRegistry, KeywordSink, ProbeMatch, ScanHost, StyleConfig, TextProbe};
use crate::signature;
use crate::types::{DisplayMode, DocumentId, FunctionInfo, ScanStatus, SortMode};

/// How long a single slice may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceBudget {
	/// Stop after the first match that pushes the slice past this duration.
	Timed(Duration),
	/// Run to the end of the document.
	Unlimited,
}

/// Per-session counters, reported when a session completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
	/// Number of `resume` calls the session took.
	pub slices: u32,
	/// Raw pattern matches, including ones that normalized to nothing.
	pub matches: usize,
	/// Wall time from session start to the end of the latest slice.
	pub elapsed: Duration,
}

/// Leftovers of the previous construct that patterns often drag into a match.
fn is_leading_noise(c: char) -> bool {
	matches!(c, '\r' | '\n' | ';' | '}' | ' ' | '\t')
}

/// Scan state for one document, carried across slices.
///
/// The document length, pattern and trim tokens are captured when the
/// session starts and never re-read. An edit to the document arrives as a
/// lifecycle event and discards the cursor; it is never detected here.
#[derive(Debug)]
pub struct ScanCursor {
	target: DocumentId,
	language: String,
	pattern: String,
	trim_tokens: Vec<String>,
	display_mode: DisplayMode,
	search_from: usize,
	document_length: usize,
	started_at: Instant,
	/// Whether matches are kept as [`FunctionInfo`] (target was displayed at start).
	collect: bool,
	functions: Vec<FunctionInfo>,
	/// Names already handed to the keyword sink during this session.
	announced: HashSet<String>,
	stats: ScanStats,
}

impl ScanCursor {
	/// Opens a scan session for `doc`.
	///
	/// Returns `Ok(None)` when there is nothing to scan: the document has no
	/// language, its language has no extraction pattern, or it is longer than
	/// `size_cap`. Callers treat that as an immediately finished session.
	pub fn start(
		registry: &dyn DocumentRegistry,
		styles: &dyn StyleConfig,
		doc: DocumentId,
		display_mode: DisplayMode,
		size_cap: Option<usize>,
		now: Instant,
	) -> Result<Option<Self>> {
		if !registry.is_open(doc) {
			return Err(ScanError::StaleTarget(doc));
		}
		let Some(language) = registry.language(doc).filter(|l| !l.is_empty()) else {
			tracing::debug!(%doc, "no language, nothing to scan");
			return Ok(None);
		};
		let pattern = styles.extraction_pattern(&language);
		if pattern.is_empty() {
			tracing::debug!(%doc, %language, "no extraction pattern");
			return Ok(None);
		}

		let mut probe = registry.attach(doc).ok_or(ScanError::InvalidTarget(doc))?;
		let document_length = probe.len();
		probe.detach();

		if let Some(cap) = size_cap
			&& document_length > cap
		{
			tracing::debug!(%doc, document_length, cap, "document too large for background scan");
			return Ok(None);
		}

		Ok(Some(Self {
			target: doc,
			trim_tokens: styles.trim_tokens(&language),
			language,
			pattern,
			display_mode,
			search_from: 0,
			document_length,
			started_at: now,
			collect: registry.displayed() == Some(doc),
			functions: Vec::new(),
			announced: HashSet::new(),
			stats: ScanStats::default(),
		}))
	}

	/// Runs one slice.
	///
	/// The budget is checked after each match, so one slow match can overrun
	/// it. Returns [`ScanStatus::InProgress`] when the budget ran out with
	/// text left to search and [`ScanStatus::Finished`] when no match remains.
	/// The probe is detached before returning, on success or error.
	pub fn resume(
		&mut self,
		host: &mut ScanHost<'_>,
		budget: SliceBudget,
		clock: &dyn Clock,
	) -> Result<ScanStatus> {
		let slice_start = clock.now();
		self.stats.slices += 1;

		let registry = host.registry;
		let mut probe = registry
			.attach(self.target)
			.ok_or(ScanError::InvalidTarget(self.target))?;
		let outcome = self.scan_slice(probe.as_mut(), &mut *host.keywords, budget, clock, slice_start);
		probe.detach();
		drop(probe);

		let (status, grew) = outcome?;
		self.stats.elapsed = clock.now().saturating_duration_since(self.started_at);

		// Only the displayed document's lexer benefits from a refresh.
		let displayed_language = registry.displayed().and_then(|d| registry.language(d));
		if grew && displayed_language.as_deref() == Some(self.language.as_str()) {
			host.keywords.refresh_lexer(&self.language);
		}

		tracing::debug!(
			doc = %self.target,
			?status,
			search_from = self.search_from,
			document_length = self.document_length,
			found = self.functions.len(),
			"scan slice"
		);
		Ok(status)
	}

	fn scan_slice(
		&mut self,
		probe: &mut dyn TextProbe,
		keywords: &mut dyn KeywordSink,
		budget: SliceBudget,
		clock: &dyn Clock,
		slice_start: Instant,
	) -> Result<(ScanStatus, bool)> {
		let mut grew = false;
		while self.search_from < self.document_length {
			let Some(m) = probe.find_next(&self.pattern, self.search_from)? else {
				break;
			};
			if m.start >= self.document_length {
				break;
			}
			// Skip one byte past the match so empty matches still make progress.
			self.search_from = m.end.max(m.start) + 1;
			grew |= self.record_match(probe, keywords, m);

			if let SliceBudget::Timed(limit) = budget
				&& self.search_from < self.document_length
				&& clock.now().saturating_duration_since(slice_start) > limit
			{
				return Ok((ScanStatus::InProgress, grew));
			}
		}
		Ok((ScanStatus::Finished, grew))
	}

	/// Parses one match. Returns true if the keyword sink grew.
	fn record_match(
		&mut self,
		probe: &dyn TextProbe,
		keywords: &mut dyn KeywordSink,
		m: ProbeMatch,
	) -> bool {
		self.stats.matches += 1;
		let raw = probe.text_range(m.start, m.end);
		let cleaned = raw.trim_start_matches(is_leading_noise);
		let sig = signature::normalize(cleaned, &self.trim_tokens);
		if sig.is_empty() {
			return false;
		}
		let line = probe.line_of(m.start + (raw.len() - cleaned.len()));

		let mut grew = false;
		if let Some(parsed) = signature::parse(&sig)
			&& self.announced.insert(parsed.name.to_string())
		{
			grew = keywords.add_keyword(&self.language, parsed.name);
		}
		if self.collect {
			self.functions
				.push(signature::function_info(line, sig, self.display_mode));
		}
		grew
	}

	/// Consumes the cursor, returning its symbols ordered by `sort`.
	pub fn into_results(self, sort: SortMode) -> (Vec<FunctionInfo>, ScanStats) {
		let mut functions = self.functions;
		sort_functions(&mut functions, sort);
		(functions, self.stats)
	}

	pub fn target(&self) -> DocumentId {
		self.target
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	/// Byte offset the next slice starts searching from.
	pub fn search_from(&self) -> usize {
		self.search_from
	}

	pub fn document_length(&self) -> usize {
		self.document_length
	}

	/// Returns true if this session builds a symbol list.
	pub fn is_collecting(&self) -> bool {
		self.collect
	}

	/// Symbols found so far, in document order.
	pub fn functions(&self) -> &[FunctionInfo] {
		&self.functions
	}

	pub fn stats(&self) -> ScanStats {
		self.stats
	}
}

/// Orders a completed symbol list. Stable, so ties keep document order.
pub fn sort_functions(functions: &mut [FunctionInfo], sort: SortMode) {
	match sort {
		SortMode::None => {}
		SortMode::CaseInsensitive => {
			functions.sort_by_cached_key(|f| f.display_text.to_lowercase());
		}
		SortMode::AlternateKey => {
			functions.sort_by_cached_key(|f| signature::alternate_sort_key(&f.raw_signature));
		}
	}
}
