//! Side-effect bookkeeping: things that must be torn down exactly once.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::{
    broadcast::Subscription,
    error::{Error, Result},
    value::lock,
};

pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

impl Disposable for Subscription {
    fn dispose(&self) { self.unsubscribe() }
}

/// Runs a closure on first disposal, and never again
pub struct FnDisposable(Mutex<Option<Box<dyn FnOnce() + Send + Sync>>>);

impl Disposable for FnDisposable {
    fn dispose(&self) {
        let f = lock(&self.0).take();
        if let Some(f) = f {
            f();
        }
    }
}

pub fn to_disposable(f: impl FnOnce() + Send + Sync + 'static) -> FnDisposable { FnDisposable(Mutex::new(Some(Box::new(f)))) }

/// Disposes the last item first
pub fn dispose_all(mut disposables: Vec<Box<dyn Disposable>>) {
    while let Some(item) = disposables.pop() {
        item.dispose();
    }
}

/// A collection of disposables torn down together.
///
/// Items added after the store was disposed are disposed on the spot. The store
/// disposes its contents when dropped.
#[derive(Default)]
pub struct DisposableStore {
    items: Mutex<Vec<Box<dyn Disposable>>>,
    disposed: AtomicBool,
}

impl DisposableStore {
    pub fn new() -> Self { Self::default() }

    pub fn add(&self, item: impl Disposable + 'static) {
        if let Err(Error::Disposed) = self.try_add(item) {
            warn!("item added to a disposed store was disposed immediately");
        }
    }

    /// Like [`add`](Self::add), but reports whether the store was already disposed
    pub fn try_add(&self, item: impl Disposable + 'static) -> Result<()> {
        {
            let mut items = lock(&self.items);
            if !self.disposed.load(Ordering::Acquire) {
                items.push(Box::new(item));
                return Ok(());
            }
        }
        item.dispose();
        Err(Error::Disposed)
    }

    /// Disposes the contents. The store stays usable.
    pub fn clear(&self) {
        let items = std::mem::take(&mut *lock(&self.items));
        for item in items {
            item.dispose();
        }
    }

    /// Disposes the contents and every later addition. Idempotent.
    pub fn dispose(&self) {
        let items = {
            let mut items = lock(&self.items);
            if self.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *items)
        };
        for item in items {
            item.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }

    pub fn len(&self) -> usize { lock(&self.items).len() }

    pub fn is_empty(&self) -> bool { lock(&self.items).is_empty() }
}

impl Disposable for DisposableStore {
    fn dispose(&self) { DisposableStore::dispose(self) }
}

impl Drop for DisposableStore {
    fn drop(&mut self) { self.dispose() }
}

/// A list of cleanup closures flushed together
///
/// ```
/// use pulse_signals::*;
///
/// let count = writable(Some(0));
/// let disposer = Disposer::new();
/// disposer.push(reaction(&count, |_| {}));
/// assert_eq!(count.listener_count(), 1);
/// disposer.flush();
/// assert_eq!(count.listener_count(), 0);
/// ```
#[derive(Default)]
pub struct Disposer(Mutex<Vec<Box<dyn Disposable>>>);

impl Disposer {
    pub fn new() -> Self { Self::default() }

    pub fn push(&self, item: impl Disposable + 'static) { lock(&self.0).push(Box::new(item)) }

    pub fn push_fn(&self, f: impl FnOnce() + Send + Sync + 'static) { self.push(to_disposable(f)) }

    /// Runs every pushed item in push order and empties the list
    pub fn flush(&self) {
        let items = std::mem::take(&mut *lock(&self.0));
        for item in items {
            item.dispose();
        }
    }

    pub fn len(&self) -> usize { lock(&self.0).len() }

    pub fn is_empty(&self) -> bool { lock(&self.0).is_empty() }
}

/// Holds the cleanup of at most one effect. Running a new effect tears down the
/// previous one first.
#[derive(Default)]
pub struct Singleton(Mutex<Option<Box<dyn Disposable>>>);

impl Singleton {
    pub fn new() -> Self { Self::default() }

    /// Flushes the previous effect, then runs `effect` and keeps its cleanup
    pub fn run<D>(&self, effect: impl FnOnce() -> Option<D>)
    where D: Disposable + 'static {
        self.flush();
        let cleanup = effect();
        *lock(&self.0) = cleanup.map(|d| Box::new(d) as Box<dyn Disposable>);
    }

    pub fn flush(&self) {
        let cleanup = lock(&self.0).take();
        if let Some(cleanup) = cleanup {
            cleanup.dispose();
        }
    }

    pub fn is_active(&self) -> bool { lock(&self.0).is_some() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    struct Counted(Arc<AtomicUsize>);

    impl Disposable for Counted {
        fn dispose(&self) { self.0.fetch_add(1, Ordering::SeqCst); }
    }

    #[test]
    fn test_fn_disposable_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let disposable = {
            let count = count.clone();
            to_disposable(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        disposable.dispose();
        disposable.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_all_in_reverse() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let items: Vec<Box<dyn Disposable>> = (0..3)
            .map(|i| {
                let order = order.clone();
                Box::new(to_disposable(move || order.lock().unwrap().push(i))) as Box<dyn Disposable>
            })
            .collect();
        dispose_all(items);
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_store_disposes_late_additions() {
        let count = Arc::new(AtomicUsize::new(0));
        let store = DisposableStore::new();
        store.add(Counted(count.clone()));
        store.add(Counted(count.clone()));
        assert_eq!(store.len(), 2);

        store.dispose();
        store.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(store.is_disposed());

        assert!(matches!(store.try_add(Counted(count.clone())), Err(Error::Disposed)));
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear_keeps_store_usable() {
        let count = Arc::new(AtomicUsize::new(0));
        let store = DisposableStore::new();
        store.add(Counted(count.clone()));
        store.clear();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        store.add(Counted(count.clone()));
        assert_eq!(store.len(), 1);
        drop(store);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_singleton_flushes_previous_effect() {
        let count = Arc::new(AtomicUsize::new(0));
        let runner = Singleton::new();

        runner.run(|| Some(Counted(count.clone())));
        assert!(runner.is_active());
        runner.run(|| Some(Counted(count.clone())));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        runner.run(|| None::<Counted>);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!runner.is_active());
        runner.flush();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disposer_flushes_in_push_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let disposer = Disposer::new();
        for i in 0..3 {
            let order = order.clone();
            disposer.push_fn(move || order.lock().unwrap().push(i));
        }
        disposer.flush();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert!(disposer.is_empty());
    }
}
