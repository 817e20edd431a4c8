use tracing::trace;

use crate::{
    broadcast::{BroadcastId, Subscribers, Subscription},
    equality::SafeEq,
    signal::{Read, Readable, Signal, Writable},
    value::ValueCell,
};

/// A writable cell holding a value and a set of subscribers.
///
/// Behaves like a behavior subject: subscribing replays the present value, unless
/// the cell has none yet. Writes that are equal to the present value (see
/// [`SafeEq`]) are dropped without notifying.
///
/// Cloning yields another handle to the same cell.
pub struct Val<T> {
    value: ValueCell<T>,
    subscribers: Subscribers<T>,
}

impl<T> Clone for Val<T> {
    fn clone(&self) -> Self { Self { value: self.value.clone(), subscribers: self.subscribers.clone() } }
}

impl<T> Val<T> {
    pub fn new(value: T) -> Self { Self { value: ValueCell::new(Some(value)), subscribers: Subscribers::new() } }

    /// A cell without a first value. Subscribers are not called until it is set.
    pub fn unset() -> Self { Self { value: ValueCell::new(None), subscribers: Subscribers::new() } }

    /// Calls a closure with a borrow of the present value
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R { self.value.with(f) }

    /// Read-only handle sharing this cell's value and subscribers
    pub fn read(&self) -> Read<T> { self.read_with(Vec::new()) }

    /// Read-only handle that also owns the subscriptions feeding this cell
    pub(crate) fn read_with(&self, upstream: Vec<Subscription>) -> Read<T> {
        Read::new(self.value.clone(), self.subscribers.clone(), upstream)
    }
}

impl<T: SafeEq + Clone> Val<T> {
    /// Stores `value` and notifies every subscriber, in subscription order, unless
    /// `value` equals the present value.
    ///
    /// Propagation is synchronous and depth-first: every dependent cell has been
    /// updated by the time this returns. A panicking subscriber aborts the rest of
    /// the pass.
    pub fn set(&self, value: T) {
        match self.value.replace_if_changed(value) {
            Some(value) => {
                trace!("value of {} changed", self.subscribers.id());
                self.subscribers.send(value);
            }
            None => trace!("value of {} unchanged", self.subscribers.id()),
        }
    }
}

impl<T> Default for Val<T> {
    fn default() -> Self { Self::unset() }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Val<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.with(|value| f.debug_struct("Val").field("value", &value).field("listeners", &self.subscribers.len()).finish())
    }
}

/// Creates a writable cell, with or without a first value.
///
/// ```
/// use pulse_signals::*;
///
/// let count = writable(Some(0));
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
/// let _sub = count.subscribe({
///     let seen = seen.clone();
///     move |v: i32| seen.lock().unwrap().push(v)
/// });
/// count.set(1);
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
/// ```
pub fn writable<T>(initial: Option<T>) -> Val<T> {
    match initial {
        Some(value) => Val::new(value),
        None => Val::unset(),
    }
}

impl<T> Signal for Val<T> {
    fn broadcast_id(&self) -> BroadcastId { self.subscribers.id() }

    fn is_ready(&self) -> bool { self.value.is_set() }

    fn listener_count(&self) -> usize { self.subscribers.len() }

    fn reset(&self) { self.subscribers.clear() }
}

impl<T: Clone + Send + Sync + 'static> Readable for Val<T> {
    type Value = T;

    fn subscribers(&self) -> &Subscribers<T> { &self.subscribers }

    fn peek(&self) -> Option<T> { self.value.value() }
}

impl<T: SafeEq + Clone + Send + Sync + 'static> Writable for Val<T> {
    fn set(&self, value: T) { Val::set(self, value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let push = {
            let seen = seen.clone();
            move |v: T| seen.lock().unwrap().push(v)
        };
        (seen, push)
    }

    #[test]
    fn test_set_dedups_plain_values() {
        let cell = Val::new(1);
        let (seen, push) = recorder();
        let _sub = cell.subscribe(push);

        cell.set(1);
        cell.set(2);
        cell.set(2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_float_writes_compare_nan_and_zero_loosely() {
        let cell = Val::new(0.0f64);
        let count = Arc::new(Mutex::new(0));
        let _sub = {
            let count = count.clone();
            crate::reaction(&cell, move |_: f64| *count.lock().unwrap() += 1)
        };

        cell.set(f64::NAN);
        cell.set(f64::NAN);
        cell.set(-0.0);
        cell.set(0.0);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_same_collection_written_back_notifies() {
        let cell = Val::new(vec![1]);
        let (seen, push) = recorder();
        let _sub = cell.subscribe(push);

        let mut list = cell.peek().unwrap();
        list.push(2);
        cell.set(list.clone());
        cell.set(list);
        assert_eq!(*seen.lock().unwrap(), vec![vec![1], vec![1, 2], vec![1, 2]]);
    }

    #[test]
    fn test_unset_cell_does_not_replay() {
        let cell = Val::<String>::unset();
        let (seen, push) = recorder();
        let _sub = cell.subscribe(push);
        assert!(seen.lock().unwrap().is_empty());
        assert!(!cell.is_ready());

        cell.set("first".to_string());
        assert_eq!(*seen.lock().unwrap(), vec!["first".to_string()]);
        assert!(cell.is_ready());
    }

    #[test]
    fn test_clones_share_state() {
        let cell = Val::new(1u8);
        let other = cell.clone();
        other.set(9);
        assert_eq!(cell.peek(), Some(9));
        assert_eq!(cell.broadcast_id(), other.broadcast_id());
    }
}
