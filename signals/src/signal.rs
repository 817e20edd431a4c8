mod read;
mod val;

pub use read::*;
pub use val::*;

use tracing::debug;

use crate::broadcast::{BroadcastId, IntoListener, Subscribers, Subscription};

/// Payload-agnostic view of a cell. Object safe, so cells of different value
/// types can be handled together (see [`reset_all`]).
pub trait Signal {
    /// Identity of the cell's listener set
    fn broadcast_id(&self) -> BroadcastId;

    /// Whether the cell has received its first value
    fn is_ready(&self) -> bool;

    fn listener_count(&self) -> usize;

    /// Removes every listener. The present value is kept.
    fn reset(&self);
}

/// A cell that can be read and subscribed to
pub trait Readable {
    type Value: Clone + Send + Sync + 'static;

    /// The raw listener set of this cell
    fn subscribers(&self) -> &Subscribers<Self::Value>;

    /// Returns a clone of the present value without subscribing
    fn peek(&self) -> Option<Self::Value>;

    /// The subscriptions feeding this cell from its own sources, for combinator
    /// outputs. Downstream cells hold a clone so the chain stays attached after
    /// the handle they were built from is dropped.
    fn upstream(&self) -> Option<Upstream> { None }

    /// Registers `listener` and, if the cell already holds a value, calls it with
    /// that value before returning.
    fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: IntoListener<Self::Value>,
        Self: Sized,
    {
        let listener = listener.into_listener();
        let subscription = self.subscribers().listen(listener.clone());
        if let Some(value) = self.peek() {
            listener(value);
        }
        subscription
    }
}

/// A cell that accepts values from outside
pub trait Writable: Readable {
    fn set(&self, value: Self::Value);
}

impl<R: Readable + ?Sized> Readable for &R {
    type Value = R::Value;

    fn subscribers(&self) -> &Subscribers<Self::Value> { (**self).subscribers() }

    fn peek(&self) -> Option<Self::Value> { (**self).peek() }

    fn upstream(&self) -> Option<Upstream> { (**self).upstream() }
}

impl<W: Writable + ?Sized> Writable for &W {
    fn set(&self, value: Self::Value) { (**self).set(value) }
}

/// Keeps the upstream of `source` attached for as long as the returned handle lives
pub(crate) fn retain<R: Readable + ?Sized>(source: &R) -> Option<Subscription> {
    source.upstream().map(|upstream: Upstream| Subscription::new(move || drop(upstream)))
}

/// Sets the cell to `f(present value)`.
///
/// ```
/// use pulse_signals::*;
///
/// let count = writable(Some(0));
/// update(&count, |c| c.unwrap_or_default() + 1);
/// assert_eq!(count.peek(), Some(1));
/// ```
pub fn update<W: Writable>(cell: &W, f: impl FnOnce(Option<W::Value>) -> W::Value) { cell.set(f(cell.peek())) }

/// Adds a listener without calling it with the present value.
pub fn reaction<R, L>(cell: &R, listener: L) -> Subscription
where
    R: Readable,
    L: IntoListener<R::Value>,
{
    cell.subscribers().listen(listener)
}

/// Clears all listeners of a cell
pub fn reset(cell: &dyn Signal) {
    debug!("resetting {} listeners of {}", cell.listener_count(), cell.broadcast_id());
    cell.reset();
}

/// Clears all listeners of every given cell
pub fn reset_all(cells: &[&dyn Signal]) {
    for cell in cells {
        reset(*cell);
    }
}

/// Tells whether a cell has not received its first value yet
pub fn not_ready(cell: &dyn Signal) -> bool { !cell.is_ready() }
