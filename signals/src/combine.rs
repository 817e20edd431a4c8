use std::sync::{Arc, Mutex};

use crate::{
    broadcast::Subscription,
    equality::SafeEq,
    signal::{Read, Readable, Val, retain},
    value::lock,
};

/// Receives a snapshot of every source value
pub type Emit<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Tracks which inputs of a combinator have produced at least one value.
/// Width is unbounded; bits are never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMask {
    words: Vec<u64>,
    len: usize,
    filled: usize,
}

impl CompletionMask {
    pub fn new(len: usize) -> Self { Self { words: vec![0; len.div_ceil(64)], len, filled: 0 } }

    /// Marks input `index` as seen. Returns true if it was not seen before.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.len, "input index {index} out of range for {} inputs", self.len);
        let (word, bit) = (index / 64, 1u64 << (index % 64));
        if self.words[word] & bit != 0 {
            return false;
        }
        self.words[word] |= bit;
        self.filled += 1;
        true
    }

    pub fn contains(&self, index: usize) -> bool { index < self.len && self.words[index / 64] & (1u64 << (index % 64)) != 0 }

    /// True once every input has been seen
    pub fn is_full(&self) -> bool { self.filled == self.len }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}

/// A fixed group of input cells.
///
/// Implemented for tuples of one to eight [`Readable`]s (of any value types) and
/// for `Vec`s and slices of same-typed readables.
pub trait Sources {
    type Output: SafeEq + Clone + Send + Sync + 'static;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Subscribes to every source, in order. Once each source has produced a value,
    /// `emit` receives a snapshot of the latest values on every further firing of
    /// any source. The returned handles also keep the upstream of every combinator
    /// source attached.
    fn attach(&self, emit: Emit<Self::Output>) -> Vec<Subscription>;
}

struct Gate<S> {
    slots: S,
    mask: CompletionMask,
}

trait Snapshot {
    type Output;
    fn snapshot(&self) -> Option<Self::Output>;
}

impl<S: Snapshot> Gate<S> {
    fn ready(&self) -> Option<S::Output> { if self.mask.is_full() { self.slots.snapshot() } else { None } }
}

impl<T: Clone> Snapshot for Vec<Option<T>> {
    type Output = Vec<T>;
    fn snapshot(&self) -> Option<Vec<T>> { self.iter().cloned().collect() }
}

macro_rules! tuple_sources {
    ($len:expr => $($name:ident $idx:tt),+) => {
        impl<$($name: Clone),+> Snapshot for ($(Option<$name>,)+) {
            type Output = ($($name,)+);
            fn snapshot(&self) -> Option<Self::Output> { Some(($(self.$idx.clone()?,)+)) }
        }

        impl<$($name: Readable),+> Sources for ($($name,)+) {
            type Output = ($(<$name as Readable>::Value,)+);

            fn len(&self) -> usize { $len }

            fn attach(&self, emit: Emit<Self::Output>) -> Vec<Subscription> {
                let gate = Arc::new(Mutex::new(Gate {
                    slots: ($(Option::< <$name as Readable>::Value >::None,)+),
                    mask: CompletionMask::new($len),
                }));
                let mut subscriptions = vec![$({
                    let gate = gate.clone();
                    let emit = emit.clone();
                    self.$idx.subscribe(move |value: <$name as Readable>::Value| {
                        let snapshot = {
                            let mut gate = lock(&gate);
                            gate.slots.$idx = Some(value);
                            gate.mask.insert($idx);
                            gate.ready()
                        };
                        if let Some(values) = snapshot {
                            emit(values);
                        }
                    })
                }),+];
                subscriptions.extend([$(retain(&self.$idx)),+].into_iter().flatten());
                subscriptions
            }
        }
    };
}

tuple_sources!(1 => A 0);
tuple_sources!(2 => A 0, B 1);
tuple_sources!(3 => A 0, B 1, C 2);
tuple_sources!(4 => A 0, B 1, C 2, D 3);
tuple_sources!(5 => A 0, B 1, C 2, D 3, E 4);
tuple_sources!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
tuple_sources!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_sources!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

impl<R: Readable> Sources for [R] {
    type Output = Vec<R::Value>;

    fn len(&self) -> usize { <[R]>::len(self) }

    fn attach(&self, emit: Emit<Self::Output>) -> Vec<Subscription> {
        let gate = Arc::new(Mutex::new(Gate { slots: vec![None; self.len()], mask: CompletionMask::new(self.len()) }));
        let mut subscriptions: Vec<Subscription> = self
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let gate = gate.clone();
                let emit = emit.clone();
                source.subscribe(move |value: R::Value| {
                    let snapshot = {
                        let mut gate = lock(&gate);
                        gate.slots[index] = Some(value);
                        gate.mask.insert(index);
                        gate.ready()
                    };
                    if let Some(values) = snapshot {
                        emit(values);
                    }
                })
            })
            .collect();
        subscriptions.extend(self.iter().filter_map(retain));
        subscriptions
    }
}

impl<R: Readable> Sources for Vec<R> {
    type Output = Vec<R::Value>;

    fn len(&self) -> usize { Vec::len(self) }

    fn attach(&self, emit: Emit<Self::Output>) -> Vec<Subscription> { self.as_slice().attach(emit) }
}

impl<S: Sources + ?Sized> Sources for &S {
    type Output = S::Output;

    fn len(&self) -> usize { (**self).len() }

    fn attach(&self, emit: Emit<Self::Output>) -> Vec<Subscription> { (**self).attach(emit) }
}

/// Merges several cells into one cell holding all of their values.
///
/// The output stays silent until every source has produced a value. From then on,
/// each firing of any single source re-emits the full snapshot. Sources may be
/// passed by value; the output keeps combinator sources attached.
///
/// ```
/// use pulse_signals::*;
///
/// let foo = writable(Some(0));
/// let bar = writable::<String>(None);
/// let foobar = combine((&foo, &bar));
/// assert_eq!(foobar.peek(), None);
///
/// bar.set("a".to_string());
/// assert_eq!(foobar.peek(), Some((0, "a".to_string())));
/// ```
pub fn combine<S: Sources>(sources: S) -> Read<S::Output> {
    let inner = Val::<S::Output>::unset();
    let upstream = {
        let inner = inner.clone();
        sources.attach(Arc::new(move |values: S::Output| inner.set(values)))
    };
    inner.read_with(upstream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_fills_once_per_index() {
        let mut mask = CompletionMask::new(3);
        assert!(mask.insert(1));
        assert!(!mask.insert(1));
        assert!(!mask.is_full());
        mask.insert(0);
        mask.insert(2);
        assert!(mask.is_full());
        assert!(mask.contains(2));
        assert!(!mask.contains(3));
    }

    #[test]
    fn test_mask_wider_than_a_word() {
        let mut mask = CompletionMask::new(130);
        for index in (0..130).rev() {
            assert!(!mask.is_full());
            mask.insert(index);
        }
        assert!(mask.is_full());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mask_rejects_unknown_input() { CompletionMask::new(2).insert(2); }
}
