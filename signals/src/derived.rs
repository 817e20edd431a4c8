use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::{
    combine::Sources,
    equality::SafeEq,
    signal::{Read, Val, writable},
    value::lock,
};

/// Teardown returned by an imperative derivation. Runs before the next rerun.
pub type Cleanup = Box<dyn FnOnce() + Send + Sync + 'static>;

/// Write access to the output of an imperative derivation
pub struct Setter<T>(Val<T>);

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: SafeEq + Clone> Setter<T> {
    pub fn set(&self, value: T) { self.0.set(value) }
}

/// How a derivation turns its inputs into output values
pub enum Derive<I, O> {
    /// The returned value becomes the output
    Pure(Box<dyn Fn(I) -> O + Send + Sync + 'static>),
    /// The function writes the output itself, any number of times, and may hand
    /// back a [`Cleanup`] to run before the next rerun
    Imperative(Box<dyn Fn(I, &Setter<O>) -> Option<Cleanup> + Send + Sync + 'static>),
}

impl<I, O> Derive<I, O> {
    pub fn pure(f: impl Fn(I) -> O + Send + Sync + 'static) -> Self { Derive::Pure(Box::new(f)) }

    pub fn imperative(f: impl Fn(I, &Setter<O>) -> Option<Cleanup> + Send + Sync + 'static) -> Self { Derive::Imperative(Box::new(f)) }
}

/// A cell computed from other cells.
///
/// Like [`combine`](crate::combine), nothing is computed until every source has
/// produced a value. After that, every firing of any source reruns the derivation,
/// running the previous [`Cleanup`] first if there is one. `initial` seeds the
/// output before the first computation.
///
/// ```
/// use pulse_signals::*;
///
/// let a = writable(Some(3));
/// let b = writable(Some(5));
/// let sum = derived((&a, &b), Derive::pure(|(a, b): (i32, i32)| a + b), None);
/// assert_eq!(sum.peek(), Some(8));
///
/// b.set(10);
/// assert_eq!(sum.peek(), Some(13));
/// ```
pub fn derived<S, O>(sources: S, derive: Derive<S::Output, O>, initial: Option<O>) -> Read<O>
where
    S: Sources,
    O: SafeEq + Clone + Send + Sync + 'static,
{
    let inner = writable(initial);
    let setter = Setter(inner.clone());
    let cleanup: Arc<Mutex<Option<Cleanup>>> = Arc::new(Mutex::new(None));

    let upstream = sources.attach(Arc::new(move |inputs: S::Output| {
        let previous = lock(&cleanup).take();
        if let Some(previous) = previous {
            trace!("running cleanup before rerun");
            previous();
        }
        match &derive {
            Derive::Pure(f) => setter.set(f(inputs)),
            Derive::Imperative(f) => {
                let next = f(inputs, &setter);
                *lock(&cleanup) = next;
            }
        }
    }));

    inner.read_with(upstream)
}
