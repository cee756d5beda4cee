use std::time::Duration;

use crate::types::{DisplayMode, ScanReason};

/// Background scans skip documents longer than this many bytes.
pub const DEFAULT_MAX_BACKGROUND_LEN: usize = 1000 * 1024;

/// Timing and presentation knobs for a [`super::Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
	/// Delay before a host event (open, edit, save, tab switch) starts scanning.
	///
	/// Bursts of events inside this window collapse into one scan.
	pub host_delay: Duration,
	/// Delay between slices and between consecutive documents.
	pub continue_delay: Duration,
	/// Soft wall-clock budget for one background slice.
	pub slice_budget: Duration,
	/// Size cap for background scans. `None` scans everything.
	pub max_background_len: Option<usize>,
	/// How symbols are rendered in the list.
	pub display_mode: DisplayMode,
	/// Whether lifecycle events trigger background scans at all.
	pub autoscan: bool,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			host_delay: Duration::from_millis(200),
			continue_delay: Duration::from_millis(50),
			slice_budget: Duration::from_millis(50),
			max_background_len: Some(DEFAULT_MAX_BACKGROUND_LEN),
			display_mode: DisplayMode::default(),
			autoscan: true,
		}
	}
}

impl SchedulerConfig {
	/// Delay to arm for an event of kind `reason`.
	pub fn delay_for(&self, reason: ScanReason) -> Duration {
		if reason.is_host_originated() {
			self.host_delay
		} else {
			self.continue_delay
		}
	}
}

/// What the host should do with its single resumption timer.
///
/// Arming always replaces a pending deadline; there is never more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerRequest {
	#[default]
	Disarm,
	Arm {
		delay: Duration,
		reason: ScanReason,
	},
}

impl TimerRequest {
	pub fn is_armed(self) -> bool {
		matches!(self, Self::Arm { .. })
	}
}
