//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use crate::{
    broadcast::{Subscribers, Subscription},
    dispose::{DisposableStore, to_disposable},
};

struct Inner {
    cancelled: AtomicBool,
    subscribers: Subscribers<()>,
}

/// Read side of a cancellation. Cloning yields another handle to the same token.
#[derive(Clone)]
pub struct CancellationToken(Arc<Inner>);

impl CancellationToken {
    fn new(cancelled: bool) -> Self { Self(Arc::new(Inner { cancelled: AtomicBool::new(cancelled), subscribers: Subscribers::new() })) }

    /// A token that is never cancelled
    pub fn none() -> Self { Self::new(false) }

    /// A token that is already cancelled
    pub fn cancelled() -> Self { Self::new(true) }

    pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

    /// Calls `listener` once when cancellation is requested. If it already was,
    /// `listener` runs before this returns.
    pub fn on_cancelled(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        if self.is_cancelled() {
            listener();
            return Subscription::empty();
        }
        let subscription = self.0.subscribers.listen(move |()| listener());
        // cancel() may have run between the check and the listen
        if self.is_cancelled() {
            subscription.unsubscribe();
        }
        subscription
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken").field("cancelled", &self.is_cancelled()).finish()
    }
}

/// Write side of a cancellation.
///
/// ```
/// use pulse_signals::CancellationSource;
///
/// let source = CancellationSource::new();
/// let token = source.token();
/// let _sub = token.on_cancelled(|| println!("stopping"));
/// source.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug)]
pub struct CancellationSource {
    token: Option<CancellationToken>,
}

impl Default for CancellationSource {
    fn default() -> Self { Self::new() }
}

impl CancellationSource {
    pub fn new() -> Self { Self { token: Some(CancellationToken::none()) } }

    /// Another handle to the token this source controls
    pub fn token(&self) -> CancellationToken { self.token.clone().unwrap_or_else(CancellationToken::none) }

    /// Marks the token cancelled and notifies its listeners, once. Listeners are
    /// dropped afterwards.
    pub fn cancel(&self) {
        let Some(token) = &self.token else { return };
        if token.0.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        trace!("cancelling {} listeners", token.0.subscribers.len());
        token.0.subscribers.send(());
        token.0.subscribers.clear();
    }

    /// Drops the token's listeners, optionally cancelling first. Tokens handed out
    /// earlier keep their state; later calls to [`token`](Self::token) get a token
    /// that never cancels.
    pub fn dispose(&mut self, cancel: bool) {
        if cancel {
            self.cancel();
        }
        if let Some(token) = self.token.take() {
            token.0.subscribers.clear();
        }
    }
}

/// A token cancelled when `store` is disposed
pub fn cancel_on_dispose(store: &DisposableStore) -> CancellationToken {
    let source = CancellationSource::new();
    let token = source.token();
    store.add(to_disposable(move || source.cancel()));
    token
}
