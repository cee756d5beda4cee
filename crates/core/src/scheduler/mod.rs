//! Admission, ordering and resumption of scan sessions.
//!
//! # Purpose
//!
//! The scheduler decides which document is scanned next, runs one bounded
//! slice per timer fire, and tells the host when to fire again. It owns the
//! [`PendingQueue`], the single live [`ScanCursor`] and the [`ResultStore`].
//!
//! # Lifecycle
//!
//! 1. A host event (`notify_lifecycle`) abandons any in-progress session,
//!    invalidates the symbol list if it concerns the displayed document,
//!    queues the document and arms the timer with the host delay.
//! 2. A timer fire (`on_timer_fire`) drops closed documents, takes the most
//!    recently queued one and runs a slice on it.
//! 3. A slice that ran out of budget re-arms `ContinueScan`. A finished or
//!    failed session leaves the queue and re-arms `AdvanceToNext` while
//!    documents remain.
//!
//! # Invariants
//!
//! - At most one session exists. Its cursor targets the queue head.
//! - A host event during an in-progress session always abandons it. The
//!   abandoned document restarts from offset zero on its next turn.
//! - Only a session that started on the displayed document, and finished
//!   while it was still displayed, replaces the symbol list.

mod policy;

use std::sync::Arc;

pub use policy::{DEFAULT_MAX_BACKGROUND_LEN, SchedulerConfig, TimerRequest};

use crate::clock::{Clock, SystemClock};
use crate::cursor::{ScanCursor, ScanStats, SliceBudget};
use crate::error::{Result, ScanError};
use crate::host::ScanHost;
use crate::queue::PendingQueue;
use crate::results::ResultStore;
use crate::types::{DisplayResults, DocumentId, FunctionInfo, JumpTarget, ScanReason, ScanStatus};

/// Single-threaded scan scheduler.
///
/// Every mutating entry point borrows the host's collaborators for the
/// duration of the call and returns the [`TimerRequest`] the host must apply.
pub struct Scheduler {
	config: SchedulerConfig,
	clock: Arc<dyn Clock>,
	queue: PendingQueue,
	cursor: Option<ScanCursor>,
	status: ScanStatus,
	results: ResultStore,
	autoscan: bool,
	timer: TimerRequest,
	/// Bumped whenever `timer` is re-armed or disarmed.
	timer_generation: u64,
}

impl Scheduler {
	pub fn new(config: SchedulerConfig) -> Self {
		Self::with_clock(config, Arc::new(SystemClock))
	}

	/// Creates a scheduler that measures slice budgets with `clock`.
	pub fn with_clock(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
		Self {
			autoscan: config.autoscan,
			config,
			clock,
			queue: PendingQueue::new(),
			cursor: None,
			status: ScanStatus::NotStarted,
			results: ResultStore::new(),
			timer: TimerRequest::Disarm,
			timer_generation: 0,
		}
	}

	/// Admits a host lifecycle event for `doc`.
	///
	/// Internal reasons (`ContinueScan`, `AdvanceToNext`) are produced by the
	/// scheduler itself and are ignored here.
	pub fn notify_lifecycle(
		&mut self,
		host: &mut ScanHost<'_>,
		doc: DocumentId,
		reason: ScanReason,
	) -> TimerRequest {
		if !reason.is_host_originated() {
			tracing::warn!(%doc, ?reason, "ignoring internal scan reason from host");
			return self.timer;
		}

		if self.status == ScanStatus::InProgress {
			self.interrupt(host, doc);
		}

		if host.registry.displayed() == Some(doc) {
			self.results.invalidate();
			host.observer.invalidate_results(doc);
			host.observer.invalidate_enabled(doc);
		}

		if !self.autoscan {
			return self.timer;
		}

		if !host.registry.is_open(doc) {
			tracing::debug!(%doc, ?reason, "event for closed document");
			return self.timer;
		}
		self.queue.push(doc);
		tracing::debug!(%doc, ?reason, queued = self.queue.len(), "scan.enqueue");
		self.arm(reason)
	}

	/// Drops every trace of a closed document.
	pub fn notify_closed(&mut self, doc: DocumentId) -> TimerRequest {
		self.queue.remove(doc);
		if self.cursor.as_ref().is_some_and(|c| c.target() == doc) {
			tracing::debug!(%doc, "closed during scan");
			self.abandon();
		}
		self.results.forget(doc);
		if self.queue.is_empty() && self.timer.is_armed() {
			self.set_timer(TimerRequest::Disarm);
		}
		self.timer
	}

	/// Turns background scanning on or off.
	///
	/// Disabling abandons the in-flight session. Queued documents are dropped
	/// the next time the timer fires.
	pub fn set_autoscan_enabled(&mut self, enabled: bool) -> TimerRequest {
		if self.autoscan == enabled {
			return self.timer;
		}
		self.autoscan = enabled;
		tracing::debug!(enabled, queued = self.queue.len(), "autoscan toggled");
		if !enabled {
			self.abandon();
		} else if !self.queue.is_empty() && !self.timer.is_armed() {
			return self.arm(ScanReason::AdvanceToNext);
		}
		self.timer
	}

	/// Runs one slice on the most recently queued open document.
	pub fn on_timer_fire(&mut self, host: &mut ScanHost<'_>) -> TimerRequest {
		self.set_timer(TimerRequest::Disarm);

		if !self.autoscan {
			if !self.queue.is_empty() {
				tracing::debug!(dropped = self.queue.len(), "autoscan off, clearing queue");
			}
			self.queue.clear();
			self.abandon();
			return self.timer;
		}

		let registry = host.registry;
		for doc in self.queue.retain_open(|d| registry.is_open(d)) {
			tracing::debug!(%doc, "dropping closed document from queue");
		}
		if self
			.cursor
			.as_ref()
			.is_some_and(|c| !registry.is_open(c.target()))
		{
			self.abandon();
		}

		let Some(doc) = self.queue.head() else {
			return self.timer;
		};
		if self.cursor.as_ref().is_some_and(|c| c.target() != doc) {
			self.abandon();
		}

		if self.cursor.is_none() {
			match ScanCursor::start(
				registry,
				host.styles,
				doc,
				self.config.display_mode,
				self.config.max_background_len,
				self.clock.now(),
			) {
				Ok(Some(cursor)) => self.cursor = Some(cursor),
				Ok(None) => {
					self.finish_without_scan(host, doc);
					return self.advance();
				}
				Err(error) => {
					self.fail(doc, &error);
					return self.advance();
				}
			}
		}

		let budget = SliceBudget::Timed(self.config.slice_budget);
		match self.run_slice(host, budget) {
			Ok(ScanStatus::InProgress) => {
				self.status = ScanStatus::InProgress;
				self.arm(ScanReason::ContinueScan)
			}
			Ok(_) => {
				self.complete(host);
				self.advance()
			}
			Err(error) => {
				self.fail(doc, &error);
				self.advance()
			}
		}
	}

	/// Symbol list for the displayed document.
	///
	/// When no completed list is installed, the displayed document is scanned
	/// to the end right away, ignoring the slice budget and the size cap. The
	/// forced scan takes the document off the queue and may change the timer;
	/// consult [`armed_timer`](Self::armed_timer) afterwards.
	pub fn results_for_display(&mut self, host: &mut ScanHost<'_>) -> DisplayResults {
		let displayed = host.registry.displayed();
		if self.results.is_ready_for(displayed) {
			return self.results.for_display(displayed);
		}
		let Some(doc) = displayed else {
			return DisplayResults::default();
		};
		self.force_scan(host, doc);
		self.results.for_display(displayed)
	}

	fn force_scan(&mut self, host: &mut ScanHost<'_>, doc: DocumentId) {
		if self.status == ScanStatus::InProgress {
			self.interrupt(host, doc);
		}
		self.queue.remove(doc);

		match ScanCursor::start(
			host.registry,
			host.styles,
			doc,
			self.config.display_mode,
			None,
			self.clock.now(),
		) {
			Ok(Some(cursor)) => {
				self.cursor = Some(cursor);
				match self.run_slice(host, SliceBudget::Unlimited) {
					Ok(_) => self.complete(host),
					Err(error) => self.fail(doc, &error),
				}
			}
			Ok(None) => self.finish_without_scan(host, doc),
			Err(error) => self.fail(doc, &error),
		}

		if self.autoscan && !self.queue.is_empty() {
			self.arm(ScanReason::AdvanceToNext);
		} else if self.timer.is_armed() {
			self.set_timer(TimerRequest::Disarm);
		}
	}

	/// Navigation target for the `index`th entry of the symbol list.
	pub fn select_result(&self, index: usize) -> Option<JumpTarget> {
		self.results.jump_target(index)
	}

	/// Navigation target for the first symbol named `name`.
	pub fn goto_symbol(&self, name: &str) -> Option<JumpTarget> {
		self.results.find_by_name(name)
	}

	/// Whether the symbol-list command should be enabled.
	///
	/// True when the displayed document's language has an extraction pattern
	/// and its symbol list is complete.
	pub fn command_enabled(&self, host: &ScanHost<'_>) -> bool {
		let displayed = host.registry.displayed();
		let has_pattern = displayed
			.and_then(|d| host.registry.language(d))
			.is_some_and(|lang| !host.styles.extraction_pattern(&lang).is_empty());
		has_pattern && self.results.is_ready_for(displayed)
	}

	/// The timer state as of the last entry point.
	pub fn armed_timer(&self) -> TimerRequest {
		self.timer
	}

	/// Counter that changes every time the timer is re-armed or disarmed.
	///
	/// Entry points that leave a pending timer alone return the same
	/// [`TimerRequest`] again; a host compares generations to tell a fresh
	/// request from an unchanged one and must not restart its deadline for
	/// the latter.
	pub fn timer_generation(&self) -> u64 {
		self.timer_generation
	}

	/// Status of the current (or most recent) session.
	pub fn status(&self) -> ScanStatus {
		self.status
	}

	pub fn queue(&self) -> &PendingQueue {
		&self.queue
	}

	pub fn results(&self) -> &ResultStore {
		&self.results
	}

	/// The live cursor, if a session is in progress.
	pub fn cursor(&self) -> Option<&ScanCursor> {
		self.cursor.as_ref()
	}

	pub fn config(&self) -> &SchedulerConfig {
		&self.config
	}

	pub fn autoscan_enabled(&self) -> bool {
		self.autoscan
	}

	fn run_slice(
		&mut self,
		host: &mut ScanHost<'_>,
		budget: SliceBudget,
	) -> Result<ScanStatus> {
		match self.cursor.as_mut() {
			Some(cursor) => cursor.resume(host, budget, self.clock.as_ref()),
			None => Ok(ScanStatus::Finished),
		}
	}

	fn arm(&mut self, reason: ScanReason) -> TimerRequest {
		let delay = self.config.delay_for(reason);
		tracing::debug!(?reason, ?delay, "scan.arm");
		self.set_timer(TimerRequest::Arm { delay, reason })
	}

	fn set_timer(&mut self, timer: TimerRequest) -> TimerRequest {
		self.timer = timer;
		self.timer_generation = self.timer_generation.wrapping_add(1);
		self.timer
	}

	/// Re-arms for the next queued document, or goes idle.
	fn advance(&mut self) -> TimerRequest {
		if self.queue.is_empty() {
			tracing::debug!("scan queue drained");
			self.set_timer(TimerRequest::Disarm)
		} else {
			self.arm(ScanReason::AdvanceToNext)
		}
	}

	/// Drops the live session without reporting it.
	fn abandon(&mut self) {
		self.cursor = None;
		if self.status == ScanStatus::InProgress {
			self.status = ScanStatus::NotStarted;
		}
	}

	fn interrupt(&mut self, host: &mut ScanHost<'_>, next: DocumentId) {
		let Some(cursor) = self.cursor.take() else {
			self.status = ScanStatus::NotStarted;
			return;
		};
		let previous = cursor.target();
		tracing::debug!(
			%previous,
			%next,
			search_from = cursor.search_from(),
			"scan interrupted"
		);
		self.status = ScanStatus::NotStarted;
		host.observer.on_interrupted(previous, next);
	}

	fn complete(&mut self, host: &mut ScanHost<'_>) {
		let Some(cursor) = self.cursor.take() else {
			return;
		};
		let doc = cursor.target();
		let collecting = cursor.is_collecting();
		let sort = host.styles.sort_mode(cursor.language());
		let (functions, stats) = cursor.into_results(sort);
		self.queue.remove(doc);
		self.status = ScanStatus::Finished;

		tracing::debug!(
			%doc,
			slices = stats.slices,
			matches = stats.matches,
			elapsed = ?stats.elapsed,
			"scan finished"
		);
		if collecting {
			self.install(host, doc, functions);
		}
		host.observer.on_finished(doc, &stats);
	}

	/// Ends a session that had nothing to scan (no pattern, no language, too large).
	fn finish_without_scan(&mut self, host: &mut ScanHost<'_>, doc: DocumentId) {
		self.queue.remove(doc);
		self.cursor = None;
		self.status = ScanStatus::Finished;
		if host.registry.displayed() == Some(doc) {
			self.install(host, doc, Vec::new());
		}
		host.observer.on_finished(doc, &ScanStats::default());
	}

	fn install(
		&mut self,
		host: &mut ScanHost<'_>,
		doc: DocumentId,
		functions: Vec<FunctionInfo>,
	) {
		if self
			.results
			.replace(doc, host.registry.displayed(), functions)
		{
			host.observer.invalidate_results(doc);
			host.observer.invalidate_enabled(doc);
		}
	}

	fn fail(&mut self, doc: DocumentId, error: &ScanError) {
		match error {
			ScanError::StaleTarget(_) => tracing::debug!(%doc, %error, "scan target gone"),
			_ => tracing::warn!(%doc, %error, "scan failed"),
		}
		self.queue.remove(doc);
		self.cursor = None;
		self.status = ScanStatus::Failed;
	}
}
