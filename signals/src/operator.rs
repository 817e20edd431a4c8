use std::sync::{Arc, Mutex};

use crate::{
    broadcast::Subscription,
    equality::SafeEq,
    signal::{Read, Readable, Val, Writable, retain},
    value::lock,
};

/// Receiving end of an operator chain
pub type Sink<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// A stage in a value pipeline, written in continuation-passing style: given the
/// sink that accepts its output, it returns the sink that accepts its input and
/// decides whether and what to forward.
///
/// ```
/// use std::sync::Arc;
/// use pulse_signals::*;
///
/// let add_three = Operator::new(|sink: Sink<i32>| -> Sink<i32> { Arc::new(move |v: i32| sink(v + 3)) });
/// let source = writable(Some(0));
/// assert_eq!(pipe(&source, add_three).peek(), Some(3));
/// ```
pub struct Operator<In, Out>(Arc<dyn Fn(Sink<Out>) -> Sink<In> + Send + Sync + 'static>);

impl<In, Out> Clone for Operator<In, Out> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<In: 'static, Out: 'static> Operator<In, Out> {
    pub fn new(f: impl Fn(Sink<Out>) -> Sink<In> + Send + Sync + 'static) -> Self { Self(Arc::new(f)) }

    /// Wraps `sink` with this stage
    pub fn apply(&self, sink: Sink<Out>) -> Sink<In> { (self.0)(sink) }

    /// Runs this stage, then `next`
    pub fn then<Next: 'static>(self, next: Operator<Out, Next>) -> Operator<In, Next> {
        Operator::new(move |sink: Sink<Next>| self.apply(next.apply(sink)))
    }
}

/// Composes same-typed stages; the first element sees the input first.
pub fn merge_ops<T: 'static>(ops: Vec<Operator<T, T>>) -> Operator<T, T> {
    Operator::new(move |sink: Sink<T>| ops.iter().rev().fold(sink, |sink, op| op.apply(sink)))
}

/// Forwards `transform(v)` for every value
pub fn map<I: 'static, O: 'static>(transform: impl Fn(I) -> O + Send + Sync + 'static) -> Operator<I, O> {
    let transform = Arc::new(transform);
    Operator::new(move |sink: Sink<O>| -> Sink<I> {
        let transform = transform.clone();
        Arc::new(move |value: I| sink(transform(value)))
    })
}

/// Forwards only the values matching `predicate`; the rest stop silently
pub fn filter<T: 'static>(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Operator<T, T> {
    let predicate = Arc::new(predicate);
    Operator::new(move |sink: Sink<T>| -> Sink<T> {
        let predicate = predicate.clone();
        Arc::new(move |value: T| {
            if predicate(&value) {
                sink(value)
            }
        })
    })
}

/// Running accumulation. The accumulator belongs to the operator, so every chain
/// built from the same `scan` (or its clones) shares it.
pub fn scan<Acc, I>(scanner: impl Fn(Acc, I) -> Acc + Send + Sync + 'static, seed: Acc) -> Operator<I, Acc>
where
    Acc: Clone + Send + 'static,
    I: 'static,
{
    let scanner = Arc::new(scanner);
    let state = Arc::new(Mutex::new(seed));
    Operator::new(move |sink: Sink<Acc>| -> Sink<I> {
        let scanner = scanner.clone();
        let state = state.clone();
        Arc::new(move |value: I| {
            let current = lock(&state).clone();
            let next = scanner(current, value);
            *lock(&state) = next.clone();
            sink(next)
        })
    })
}

/// Feeds every value of `source` through `op` into a fresh cell.
pub fn pipe<R, O>(source: R, op: Operator<R::Value, O>) -> Read<O>
where
    R: Readable,
    O: SafeEq + Clone + Send + Sync + 'static,
{
    let inner = Val::<O>::unset();
    let sink: Sink<O> = {
        let inner = inner.clone();
        Arc::new(move |value: O| inner.set(value))
    };
    let mut upstream = vec![source.subscribe(op.apply(sink))];
    upstream.extend(retain(&source));
    inner.read_with(upstream)
}

/// Mirrors every value of `from` into `to`, starting with the present one.
///
/// ```
/// use pulse_signals::*;
///
/// let foo = writable(Some(0));
/// let bar = writable(None);
/// let _link = connect(&foo, &bar);
/// foo.set(1);
/// assert_eq!(foo.peek(), bar.peek());
/// ```
pub fn connect<R, W>(from: &R, to: &W) -> Subscription
where
    R: Readable,
    W: Writable<Value = R::Value> + Clone + Send + Sync + 'static,
{
    let to = to.clone();
    from.subscribe(move |value: R::Value| to.set(value))
}
