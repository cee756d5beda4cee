//! Time source for slice budgets.

use std::time::Instant;

/// Monotonic time source sampled by the matching loop.
pub trait Clock: Send + Sync {
	fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}
