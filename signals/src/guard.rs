use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lets at most one closure run at a time through any clone of the guard.
///
/// Used to break feedback loops, such as two cells connected to each other:
/// the write echoed back from the other side finds the guard taken and is
/// dropped.
///
/// ```
/// use pulse_signals::ReentrancyGuard;
///
/// let guard = ReentrancyGuard::new();
/// let mut inner_ran = false;
/// guard.run(|| {
///     assert!(!guard.run(|| inner_ran = true));
/// });
/// assert!(!inner_ran);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReentrancyGuard(Arc<AtomicBool>);

struct Release<'a>(&'a AtomicBool);

impl Drop for Release<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release) }
}

impl ReentrancyGuard {
    pub fn new() -> Self { Self::default() }

    /// Runs `f` unless a run is already in progress. Returns whether `f` ran.
    pub fn run(&self, f: impl FnOnce()) -> bool { self.run_or(f, || {}) }

    /// Runs `f`, or `fallback` if a run is already in progress
    pub fn run_or(&self, f: impl FnOnce(), fallback: impl FnOnce()) -> bool {
        if self.0.swap(true, Ordering::AcqRel) {
            fallback();
            return false;
        }
        let _release = Release(&self.0);
        f();
        true
    }

    pub fn is_running(&self) -> bool { self.0.load(Ordering::Acquire) }
}
