//! Tokio driver that runs a [`Scheduler`] on one task.
//!
//! The scheduler never overlaps with itself: commands and timer expiries are
//! multiplexed by a single `select!` loop, and each is handled to completion
//! before the next is polled. The scheduler's [`TimerRequest`]s become a
//! `sleep_until` deadline. A deadline is only restarted when the scheduler
//! re-armed or disarmed; repeating an unchanged request leaves it alone so
//! that frequent queries cannot postpone a pending scan.

use sigscan_core::{
	DisplayResults, DocumentId, JumpTarget, ScanHost, ScanObserver, ScanReason, ScanStats,
	ScanStatus, Scheduler, TimerRequest,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::keywords::KeywordTable;
use crate::styles::LanguageStyles;
use crate::workspace::Workspace;

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 64;

/// Notifications forwarded from the scheduler to interested listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
	Interrupted {
		previous: DocumentId,
		next: DocumentId,
	},
	Finished {
		doc: DocumentId,
		stats: ScanStats,
	},
	/// The symbol list or command state of `doc` changed.
	ResultsChanged(DocumentId),
}

/// [`ScanObserver`] that forwards to an optional channel.
#[derive(Debug, Default)]
struct EventForwarder {
	tx: Option<mpsc::UnboundedSender<ScanEvent>>,
}

impl EventForwarder {
	fn send(&mut self, event: ScanEvent) {
		if let Some(tx) = &self.tx
			&& tx.send(event).is_err()
		{
			self.tx = None;
		}
	}
}

impl ScanObserver for EventForwarder {
	fn on_interrupted(&mut self, previous: DocumentId, next: DocumentId) {
		self.send(ScanEvent::Interrupted { previous, next });
	}

	fn on_finished(&mut self, doc: DocumentId, stats: &ScanStats) {
		self.send(ScanEvent::Finished { doc, stats: *stats });
	}

	fn invalidate_results(&mut self, doc: DocumentId) {
		self.send(ScanEvent::ResultsChanged(doc));
	}
}

/// Requests accepted by a running driver.
#[derive(Debug)]
pub enum DriverCommand {
	/// Opens an unnamed document and reports `DocOpened`.
	Open {
		text: String,
		language: Option<String>,
		reply: oneshot::Sender<DocumentId>,
	},
	/// Reports a lifecycle event for a document already in the workspace.
	Lifecycle { doc: DocumentId, reason: ScanReason },
	/// Replaces the text of `doc` and reports `DocModified`.
	Edit { doc: DocumentId, text: String },
	/// Records a save, possibly under a new language, and reports `DocSaved`.
	Save {
		doc: DocumentId,
		language: Option<String>,
	},
	/// Shows `doc` and reports `TabChange`.
	Display(DocumentId),
	Close(DocumentId),
	SetAutoscan(bool),
	/// Symbol list of the displayed document, scanning it now if needed.
	Results {
		reply: oneshot::Sender<DisplayResults>,
	},
	Select {
		index: usize,
		reply: oneshot::Sender<Option<JumpTarget>>,
	},
	Goto {
		name: String,
		reply: oneshot::Sender<Option<JumpTarget>>,
	},
	CommandEnabled {
		reply: oneshot::Sender<bool>,
	},
	Keywords {
		language: String,
		reply: oneshot::Sender<Vec<String>>,
	},
	/// Replies once the queue is drained and no timer is armed.
	WaitIdle { reply: oneshot::Sender<()> },
}

/// Owns the scheduler and every collaborator it borrows.
pub struct ScanDriver {
	scheduler: Scheduler,
	workspace: Workspace,
	styles: LanguageStyles,
	keywords: KeywordTable,
	observer: EventForwarder,
	deadline: Option<Instant>,
	/// Scheduler timer generation the deadline was computed from.
	applied_generation: u64,
	idle_waiters: Vec<oneshot::Sender<()>>,
}

impl ScanDriver {
	/// Creates a driver using the `[scan]` settings of `styles`.
	pub fn new(workspace: Workspace, styles: LanguageStyles) -> Self {
		let scheduler = Scheduler::new(styles.scheduler_config());
		Self::with_scheduler(scheduler, workspace, styles)
	}

	pub fn with_scheduler(scheduler: Scheduler, workspace: Workspace, styles: LanguageStyles) -> Self {
		Self {
			applied_generation: scheduler.timer_generation(),
			deadline: deadline_for(scheduler.armed_timer()),
			scheduler,
			workspace,
			styles,
			keywords: KeywordTable::new(),
			observer: EventForwarder::default(),
			idle_waiters: Vec::new(),
		}
	}

	/// Returns a receiver for [`ScanEvent`]s. Replaces any earlier receiver.
	pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ScanEvent> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.observer.tx = Some(tx);
		rx
	}

	pub fn workspace(&self) -> &Workspace {
		&self.workspace
	}

	pub fn keywords(&self) -> &KeywordTable {
		&self.keywords
	}

	pub fn scheduler(&self) -> &Scheduler {
		&self.scheduler
	}

	/// Spawns the driver loop on the current runtime.
	pub fn spawn(self) -> DriverHandle {
		let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
		let cancel = CancellationToken::new();
		let task = tokio::spawn(self.run(rx, cancel.clone()));
		DriverHandle { tx, cancel, task }
	}

	/// Runs until cancelled or every sender is dropped, then hands the driver back.
	pub async fn run(mut self, mut rx: mpsc::Receiver<DriverCommand>, cancel: CancellationToken) -> Self {
		loop {
			let deadline = self.deadline;
			tokio::select! {
				biased;
				_ = cancel.cancelled() => break,
				cmd = rx.recv() => match cmd {
					Some(cmd) => self.handle(cmd),
					None => break,
				},
				_ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
					self.deadline = None;
					self.with_host(|s, host| s.on_timer_fire(host));
					self.sync_timer();
				}
			}
			self.notify_idle();
		}
		tracing::debug!(queued = self.scheduler.queue().len(), "scan driver stopped");
		self
	}

	fn with_host<R>(&mut self, f: impl FnOnce(&mut Scheduler, &mut ScanHost<'_>) -> R) -> R {
		let mut host = ScanHost {
			registry: &self.workspace,
			styles: &self.styles,
			keywords: &mut self.keywords,
			observer: &mut self.observer,
		};
		f(&mut self.scheduler, &mut host)
	}

	fn lifecycle(&mut self, doc: DocumentId, reason: ScanReason) {
		self.with_host(|s, host| s.notify_lifecycle(host, doc, reason));
		self.sync_timer();
	}

	/// Moves the deadline to the scheduler's latest timer request, if it changed.
	fn sync_timer(&mut self) {
		let generation = self.scheduler.timer_generation();
		if generation == self.applied_generation {
			return;
		}
		self.applied_generation = generation;
		self.deadline = deadline_for(self.scheduler.armed_timer());
	}

	fn is_idle(&self) -> bool {
		self.deadline.is_none() && self.scheduler.status() != ScanStatus::InProgress
	}

	fn notify_idle(&mut self) {
		if self.is_idle() {
			for waiter in self.idle_waiters.drain(..) {
				let _ = waiter.send(());
			}
		}
	}

	/// Applies one command.
	pub fn handle(&mut self, cmd: DriverCommand) {
		match cmd {
			DriverCommand::Open {
				text,
				language,
				reply,
			} => {
				let doc = self.workspace.open(&text, language.as_deref());
				self.lifecycle(doc, ScanReason::DocOpened);
				let _ = reply.send(doc);
			}
			DriverCommand::Lifecycle { doc, reason } => self.lifecycle(doc, reason),
			DriverCommand::Edit { doc, text } => {
				if self.workspace.set_text(doc, &text) {
					self.lifecycle(doc, ScanReason::DocModified);
				} else {
					tracing::warn!(%doc, "edit for unknown document");
				}
			}
			DriverCommand::Save { doc, language } => {
				if let Some(language) = language {
					self.workspace.set_language(doc, Some(&language));
				}
				self.lifecycle(doc, ScanReason::DocSaved);
			}
			DriverCommand::Display(doc) => {
				if self.workspace.set_displayed(doc) {
					self.lifecycle(doc, ScanReason::TabChange);
				} else {
					tracing::warn!(%doc, "display of unknown document");
				}
			}
			DriverCommand::Close(doc) => {
				self.workspace.close(doc);
				self.scheduler.notify_closed(doc);
				self.sync_timer();
			}
			DriverCommand::SetAutoscan(enabled) => {
				self.scheduler.set_autoscan_enabled(enabled);
				self.sync_timer();
			}
			DriverCommand::Results { reply } => {
				let results = self.with_host(|s, host| s.results_for_display(host));
				self.sync_timer();
				let _ = reply.send(results);
			}
			DriverCommand::Select { index, reply } => {
				let _ = reply.send(self.scheduler.select_result(index));
			}
			DriverCommand::Goto { name, reply } => {
				let _ = reply.send(self.scheduler.goto_symbol(&name));
			}
			DriverCommand::CommandEnabled { reply } => {
				let enabled = self.with_host(|s, host| s.command_enabled(host));
				let _ = reply.send(enabled);
			}
			DriverCommand::Keywords { language, reply } => {
				let _ = reply.send(self.keywords.keywords(&language));
			}
			DriverCommand::WaitIdle { reply } => self.idle_waiters.push(reply),
		}
	}
}

fn deadline_for(timer: TimerRequest) -> Option<Instant> {
	match timer {
		TimerRequest::Arm { delay, .. } => Some(Instant::now() + delay),
		TimerRequest::Disarm => None,
	}
}

/// Errors from talking to a driver task.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
	#[error("scan driver is not running")]
	Stopped,
}

/// Client side of a spawned [`ScanDriver`].
pub struct DriverHandle {
	tx: mpsc::Sender<DriverCommand>,
	cancel: CancellationToken,
	task: JoinHandle<ScanDriver>,
}

impl DriverHandle {
	pub async fn send(&self, cmd: DriverCommand) -> Result<(), DriverError> {
		self.tx.send(cmd).await.map_err(|_| DriverError::Stopped)
	}

	async fn request<T>(
		&self,
		make: impl FnOnce(oneshot::Sender<T>) -> DriverCommand,
	) -> Result<T, DriverError> {
		let (reply, rx) = oneshot::channel();
		self.send(make(reply)).await?;
		rx.await.map_err(|_| DriverError::Stopped)
	}

	pub async fn open(&self, text: impl Into<String>, language: Option<&str>) -> Result<DocumentId, DriverError> {
		let text = text.into();
		let language = language.map(str::to_string);
		self.request(|reply| DriverCommand::Open {
			text,
			language,
			reply,
		})
		.await
	}

	pub async fn notify(&self, doc: DocumentId, reason: ScanReason) -> Result<(), DriverError> {
		self.send(DriverCommand::Lifecycle { doc, reason }).await
	}

	pub async fn edit(&self, doc: DocumentId, text: impl Into<String>) -> Result<(), DriverError> {
		self.send(DriverCommand::Edit {
			doc,
			text: text.into(),
		})
		.await
	}

	pub async fn display(&self, doc: DocumentId) -> Result<(), DriverError> {
		self.send(DriverCommand::Display(doc)).await
	}

	pub async fn close(&self, doc: DocumentId) -> Result<(), DriverError> {
		self.send(DriverCommand::Close(doc)).await
	}

	pub async fn set_autoscan(&self, enabled: bool) -> Result<(), DriverError> {
		self.send(DriverCommand::SetAutoscan(enabled)).await
	}

	pub async fn results(&self) -> Result<DisplayResults, DriverError> {
		self.request(|reply| DriverCommand::Results { reply }).await
	}

	pub async fn select(&self, index: usize) -> Result<Option<JumpTarget>, DriverError> {
		self.request(|reply| DriverCommand::Select { index, reply })
			.await
	}

	pub async fn goto(&self, name: impl Into<String>) -> Result<Option<JumpTarget>, DriverError> {
		let name = name.into();
		self.request(|reply| DriverCommand::Goto { name, reply })
			.await
	}

	pub async fn command_enabled(&self) -> Result<bool, DriverError> {
		self.request(|reply| DriverCommand::CommandEnabled { reply })
			.await
	}

	pub async fn keywords(&self, language: impl Into<String>) -> Result<Vec<String>, DriverError> {
		let language = language.into();
		self.request(|reply| DriverCommand::Keywords { language, reply })
			.await
	}

	/// Waits until every queued document has been scanned.
	pub async fn wait_idle(&self) -> Result<(), DriverError> {
		self.request(|reply| DriverCommand::WaitIdle { reply }).await
	}

	/// Stops the driver and returns it with whatever state it reached.
	pub async fn shutdown(self) -> Result<ScanDriver, DriverError> {
		self.cancel.cancel();
		self.task.await.map_err(|_| DriverError::Stopped)
	}
}
