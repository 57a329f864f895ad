//! Progress reporting for long-running bulk operations.
//!
//! Reading or writing every shape in a large file reports progress through a
//! sink injected at the call site.  The sink is advisory: it is invoked
//! synchronously on the calling thread at whole-percent steps, never
//! per-record, and it never affects control flow except through the
//! cooperative [`ProgressSink::is_cancelled`] signal, which the shape loop
//! checks between records.

/// Receives a monotonically increasing current value against a known end
/// value.  May expose a cancel signal.
pub trait ProgressSink {
    /// Report progress.  `current` never decreases and never exceeds `end`.
    fn update(&mut self, current: u64, end: u64);

    /// Cooperative cancellation signal, checked between shapes.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A sink that discards all progress reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&mut self, _current: u64, _end: u64) {}
}

/// Collects every reported value; used by tests to verify the coarse
/// whole-percent reporting contract.
#[derive(Debug, Default, Clone)]
pub struct CollectingProgress {
    pub reports: Vec<(u64, u64)>,
    pub cancel_after: Option<usize>,
}

impl ProgressSink for CollectingProgress {
    fn update(&mut self, current: u64, end: u64) {
        self.reports.push((current, end));
    }

    fn is_cancelled(&self) -> bool {
        match self.cancel_after {
            Some(n) => self.reports.len() >= n,
            None => false,
        }
    }
}

/// Tracks the last whole-percent step reported, so the shape loop only
/// invokes the sink when the percentage actually changes.
#[derive(Debug)]
pub struct PercentStepper {
    end: u64,
    last_percent: i32,
}

impl PercentStepper {
    pub fn new(end: u64) -> Self {
        Self {
            end,
            last_percent: -1,
        }
    }

    /// Report `current` to `sink` if it crosses a new whole-percent step.
    pub fn step(&mut self, current: u64, sink: &mut dyn ProgressSink) {
        if self.end == 0 {
            return;
        }
        let percent = ((current * 100) / self.end) as i32;
        if percent != self.last_percent {
            self.last_percent = percent;
            sink.update(current, self.end);
        }
    }
}
