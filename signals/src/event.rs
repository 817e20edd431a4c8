use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    broadcast::{IntoListener, Subscribers, Subscription},
    dispose::Disposable,
};

/// A single disposable event stream.
///
/// Once disposed, it drops its listeners, ignores new ones and fires nothing.
///
/// ```
/// use pulse_signals::*;
///
/// let saved = Event::<String>::new();
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
/// let _sub = saved.listen({
///     let seen = seen.clone();
///     move |path: String| seen.lock().unwrap().push(path)
/// });
/// saved.fire("a.txt".to_string());
/// saved.dispose();
/// saved.fire("b.txt".to_string());
/// assert_eq!(*seen.lock().unwrap(), vec!["a.txt"]);
/// ```
pub struct Event<T> {
    subscribers: Subscribers<T>,
    disposed: AtomicBool,
}

impl<T> Default for Event<T> {
    fn default() -> Self { Self { subscribers: Subscribers::new(), disposed: AtomicBool::new(false) } }
}

impl<T: Clone + 'static> Event<T> {
    pub fn new() -> Self { Self::default() }

    /// Delivers `event` to every listener, in registration order
    pub fn fire(&self, event: T) {
        if !self.is_disposed() {
            self.subscribers.send(event);
        }
    }

    /// Adds a listener. Returns an inactive handle if the event was disposed.
    pub fn listen<L>(&self, listener: L) -> Subscription
    where L: IntoListener<T> {
        if self.is_disposed() {
            return Subscription::empty();
        }
        self.subscribers.listen(listener)
    }

    pub fn listener_count(&self) -> usize { self.subscribers.len() }

    pub fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }

    /// Drops every listener. Idempotent.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.subscribers.clear();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Disposable for Event<T> {
    fn dispose(&self) { Event::dispose(self) }
}
