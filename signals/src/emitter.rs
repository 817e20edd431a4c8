use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use tracing::trace;

use crate::{
    broadcast::{IntoListener, Subscribers, Subscription},
    value::{read, write},
};

/// Keyed event emitter. Each key has its own ordered listener set.
///
/// ```
/// use pulse_signals::Emitter;
///
/// let emitter = Emitter::<&str, u32>::new();
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
/// let sub = emitter.on("a", {
///     let seen = seen.clone();
///     move |v: u32| seen.lock().unwrap().push(v)
/// });
/// emitter.emit(&"a", 1);
/// emitter.emit(&"b", 2);
/// sub.unsubscribe();
/// emitter.emit(&"a", 3);
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct Emitter<K, D> {
    events: RwLock<HashMap<K, Subscribers<D>>>,
}

impl<K, D> Default for Emitter<K, D> {
    fn default() -> Self { Self { events: RwLock::new(HashMap::new()) } }
}

impl<K, D> Emitter<K, D>
where
    K: Eq + Hash + Clone,
    D: Clone + 'static,
{
    pub fn new() -> Self { Self::default() }

    /// Adds a listener for `key`
    pub fn on<L>(&self, key: K, listener: L) -> Subscription
    where L: IntoListener<D> {
        let mut events = write(&self.events);
        events.retain(|_, subscribers| !subscribers.is_empty());
        events.entry(key).or_default().listen(listener)
    }

    /// Delivers `data` to the listeners of `key`, in registration order
    pub fn emit(&self, key: &K, data: D) {
        let subscribers = read(&self.events).get(key).cloned();
        match subscribers {
            Some(subscribers) => subscribers.send(data),
            None => trace!("emit without listeners"),
        }
    }

    /// Removes every listener of `key`
    pub fn clear(&self, key: &K) {
        if let Some(subscribers) = write(&self.events).remove(key) {
            subscribers.clear();
        }
    }

    /// Removes every listener of every key
    pub fn clear_all(&self) {
        for (_, subscribers) in write(&self.events).drain() {
            subscribers.clear();
        }
    }

    pub fn listener_count(&self, key: &K) -> usize { read(&self.events).get(key).map_or(0, Subscribers::len) }

    /// Keys with at least one listener
    pub fn keys(&self) -> Vec<K> {
        read(&self.events).iter().filter(|(_, subscribers)| !subscribers.is_empty()).map(|(key, _)| key.clone()).collect()
    }
}
