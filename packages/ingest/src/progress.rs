//! Progress reporting for the startup load.
//!
//! [`crate::load_dataset`] reports one step per metric file read, then one
//! for the join and one for aggregation ([`crate::LOAD_STEPS`] in total). The
//! CLI renders these with an `indicatif` bar; the server and tests pass
//! [`NullProgress`].

use std::sync::Arc;

/// Receives load steps from [`crate::load_dataset`].
///
/// Shared behind an [`Arc`], so implementations must be `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Number of steps the load will report.
    fn set_total(&self, total: u64);

    /// Marks `delta` more steps as done.
    fn inc(&self, delta: u64);

    /// Describes the step in progress (file being read, join policy, ...).
    fn set_message(&self, msg: String);

    /// Called once after a successful load with a summary of the dataset.
    fn finish(&self, msg: String);

    /// Called instead of [`ProgressCallback::finish`] when the load fails,
    /// before the error is returned.
    fn finish_and_clear(&self);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
