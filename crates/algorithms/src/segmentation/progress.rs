//! Progress reporting for long-running stages

/// Receives stage messages and step counts from the pipeline.
///
/// Both methods default to no-ops so callers override only what they show.
pub trait Progress {
    fn message(&mut self, _msg: &str) {}

    fn step(&mut self, _done: usize, _total: usize) {}
}

/// Discards every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Forwards `step` roughly every tenth of the work, plus the final step.
#[derive(Debug, Clone)]
pub(crate) struct Ticker {
    total: usize,
    every: usize,
}

impl Ticker {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            every: (total / 10).max(1),
        }
    }

    pub(crate) fn tick(&self, done: usize, progress: &mut dyn Progress) {
        if done % self.every == 0 || done == self.total {
            progress.step(done, self.total);
        }
    }
}
