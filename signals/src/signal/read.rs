use std::sync::Arc;

use crate::{
    broadcast::{BroadcastId, Subscribers, Subscription},
    signal::{Readable, Signal},
    value::ValueCell,
};

/// Shared ownership of the subscriptions feeding a combinator output
pub type Upstream = Arc<Vec<Subscription>>;

/// Read-only cell.
///
/// Either a view of a [`Val`](crate::Val) or the output of a combinator, in which
/// case it keeps the subscriptions to its sources alive. Once every handle to a
/// combinator output is dropped, it detaches from its sources.
pub struct Read<T> {
    value: ValueCell<T>,
    subscribers: Subscribers<T>,
    upstream: Upstream,
}

impl<T> Read<T> {
    pub(crate) fn new(value: ValueCell<T>, subscribers: Subscribers<T>, upstream: Vec<Subscription>) -> Self {
        Self { value, subscribers, upstream: Arc::new(upstream) }
    }

    /// Calls a closure with a borrow of the present value
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R { self.value.with(f) }
}

impl<T> Clone for Read<T> {
    fn clone(&self) -> Self { Self { value: self.value.clone(), subscribers: self.subscribers.clone(), upstream: self.upstream.clone() } }
}

impl<T> Signal for Read<T> {
    fn broadcast_id(&self) -> BroadcastId { self.subscribers.id() }

    fn is_ready(&self) -> bool { self.value.is_set() }

    fn listener_count(&self) -> usize { self.subscribers.len() }

    fn reset(&self) { self.subscribers.clear() }
}

impl<T: Clone + Send + Sync + 'static> Readable for Read<T> {
    type Value = T;

    fn subscribers(&self) -> &Subscribers<T> { &self.subscribers }

    fn peek(&self) -> Option<T> { self.value.value() }

    fn upstream(&self) -> Option<Upstream> { (!self.upstream.is_empty()).then(|| self.upstream.clone()) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Read<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.with(|value| f.debug_struct("Read").field("value", &value).field("sources", &self.upstream.len()).finish())
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Read<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.with(|value| match value {
            Some(value) => write!(f, "{value}"),
            None => Ok(()),
        })
    }
}
