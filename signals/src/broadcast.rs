use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::trace;

use crate::value::{lock, read, write};

/// A unique identifier for a listener set. Used for deduplication and in log output.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BroadcastId(usize);

impl std::fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:x}", self.0) }
}

/// A callback receiving every value sent through a listener set
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Trait for types that can be converted into listeners.
pub trait IntoListener<T> {
    fn into_listener(self) -> Listener<T>;
}

/// An ordered set of listeners. Delivery order is registration order.
///
/// Cloning yields another handle to the same set.
pub struct Subscribers<T>(Arc<Inner<T>>);

struct Inner<T> {
    listeners: RwLock<BTreeMap<u64, Listener<T>>>,
    next_id: AtomicU64,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self { Self::new() }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers").field("id", &self.id()).field("listeners", &self.len()).finish()
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self { Self(Arc::new(Inner { listeners: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(0) })) }

    pub fn id(&self) -> BroadcastId { BroadcastId(Arc::as_ptr(&self.0) as *const () as usize) }

    pub fn len(&self) -> usize { read(&self.0.listeners).len() }

    pub fn is_empty(&self) -> bool { read(&self.0.listeners).is_empty() }

    /// Drops every registered listener. Outstanding [`Subscription`]s become no-ops.
    pub fn clear(&self) { write(&self.0.listeners).clear(); }
}

impl<T: 'static> Subscribers<T> {
    /// Registers a listener without replaying any present value.
    pub fn listen<L>(&self, listener: L) -> Subscription
    where L: IntoListener<T> {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        write(&self.0.listeners).insert(id, listener.into_listener());
        trace!("listener {id} added to {}", self.id());

        let inner: Weak<Inner<T>> = Arc::downgrade(&self.0);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                write(&inner.listeners).remove(&id);
            }
        })
    }
}

impl<T: Clone> Subscribers<T> {
    /// Sends `value` to every listener registered when the call started.
    pub fn send(&self, value: T) {
        // Snapshot so listeners may subscribe or unsubscribe while we deliver
        let listeners = read(&self.0.listeners).values().cloned().collect::<Vec<_>>();
        trace!("sending to {} listeners of {}", listeners.len(), self.id());

        if let Some((last, rest)) = listeners.split_last() {
            for listener in rest {
                listener(value.clone());
            }
            last(value);
        }
    }
}

/// Handle to a registered listener.
///
/// Releasing it (explicitly with [`Subscription::unsubscribe`] or by dropping it)
/// removes the listener. Releasing more than once has no further effect.
#[must_use = "dropping a Subscription unsubscribes immediately; call .detach() to keep the listener"]
pub struct Subscription {
    release: Mutex<Option<Box<dyn FnOnce() + Send + Sync>>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self { Self { release: Mutex::new(Some(Box::new(release))) } }

    /// A subscription with nothing to release
    pub fn empty() -> Self { Self { release: Mutex::new(None) } }

    /// Removes the listener. Idempotent.
    pub fn unsubscribe(&self) {
        let release = lock(&self.release).take();
        if let Some(release) = release {
            release();
        }
    }

    pub fn is_active(&self) -> bool { lock(&self.release).is_some() }

    /// Keeps the listener registered for as long as its source lives.
    pub fn detach(self) { lock(&self.release).take(); }
}

impl Drop for Subscription {
    fn drop(&mut self) { self.unsubscribe(); }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

impl<F, T> IntoListener<T> for F
where F: Fn(T) + Send + Sync + 'static
{
    fn into_listener(self) -> Listener<T> { Arc::new(self) }
}

impl<T> IntoListener<T> for Arc<dyn Fn(T) + Send + Sync + 'static> {
    fn into_listener(self) -> Listener<T> { self }
}

#[cfg(feature = "tokio")]
impl<T> IntoListener<T> for tokio::sync::mpsc::UnboundedSender<T>
where T: Send + Sync + 'static
{
    fn into_listener(self) -> Listener<T> {
        Arc::new(move |value| {
            let _ = self.send(value); // receiver may be gone
        })
    }
}

impl<T> IntoListener<T> for std::sync::mpsc::Sender<T>
where T: Send + Sync + 'static
{
    fn into_listener(self) -> Listener<T> {
        Arc::new(move |value| {
            let _ = self.send(value); // receiver may be gone
        })
    }
}
