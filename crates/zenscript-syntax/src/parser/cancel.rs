//! Cooperative cancellation and timeouts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::ParseError;

/// Shared flag another thread can set to abort an in-progress parse.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag so the next parse can run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Polls the cancellation flag and deadline every `interval` ticks.
#[derive(Debug, Clone)]
pub(crate) struct Interrupt {
    flag: Option<CancellationFlag>,
    deadline: Option<Instant>,
    interval: u32,
    countdown: u32,
}

impl Interrupt {
    /// The deadline is measured from now; a zero timeout means none.
    pub fn new(flag: Option<CancellationFlag>, timeout_micros: u64, interval: u32) -> Self {
        let deadline =
            (timeout_micros > 0).then(|| Instant::now() + Duration::from_micros(timeout_micros));
        let interval = interval.max(1);
        Self {
            flag,
            deadline,
            interval,
            countdown: interval,
        }
    }

    /// Counts one unit of work, checking the flag and deadline when the interval elapses.
    #[inline]
    pub fn tick(&mut self) -> Result<(), ParseError> {
        if self.countdown > 0 {
            self.countdown -= 1;
            return Ok(());
        }
        self.countdown = self.interval;
        self.check()
    }

    pub fn check(&self) -> Result<(), ParseError> {
        if self.flag.as_ref().is_some_and(CancellationFlag::is_cancelled) {
            return Err(ParseError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(ParseError::TimedOut);
        }
        Ok(())
    }
}
