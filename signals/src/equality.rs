//! Change detection used by [`Val::set`](crate::Val::set).
//!
//! Plain values (numbers, booleans, characters, strings) are compared by value, with
//! floats treating `NaN` as equal to itself and `-0.0` as equal to `0.0`. Anything else
//! is considered changed on every write, so a collection that was modified and written
//! back still notifies.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

pub trait SafeEq {
    /// Returns true when writing `other` over `self` must notify subscribers.
    /// The default treats every write as a change.
    fn safe_ne(&self, _other: &Self) -> bool { true }
}

macro_rules! by_value {
    ($($ty:ty),* $(,)?) => {
        $(impl SafeEq for $ty {
            fn safe_ne(&self, other: &Self) -> bool { self != other }
        })*
    };
}

by_value!(bool, char, (), u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String, &str);

macro_rules! float {
    ($($ty:ty),*) => {
        $(impl SafeEq for $ty {
            fn safe_ne(&self, other: &Self) -> bool {
                if self.is_nan() {
                    !other.is_nan()
                } else {
                    self != other
                }
            }
        })*
    };
}

float!(f32, f64);

impl<T: SafeEq> SafeEq for Option<T> {
    fn safe_ne(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.safe_ne(b),
            (None, None) => false,
            _ => true,
        }
    }
}

impl SafeEq for Cow<'_, str> {
    fn safe_ne(&self, other: &Self) -> bool { self != other }
}

impl<T> SafeEq for Vec<T> {}
impl<T> SafeEq for VecDeque<T> {}
impl<T: ?Sized> SafeEq for Box<T> {}
impl<T: ?Sized> SafeEq for Arc<T> {}
impl<K, V, S> SafeEq for HashMap<K, V, S> {}
impl<K, S> SafeEq for HashSet<K, S> {}
impl<K, V> SafeEq for BTreeMap<K, V> {}
impl<K> SafeEq for BTreeSet<K> {}

macro_rules! tuple {
    ($($name:ident),+) => {
        impl<$($name),+> SafeEq for ($($name,)+) {}
    };
}

tuple!(A);
tuple!(A, B);
tuple!(A, B, C);
tuple!(A, B, C, D);
tuple!(A, B, C, D, E);
tuple!(A, B, C, D, E, F);
tuple!(A, B, C, D, E, F, G);
tuple!(A, B, C, D, E, F, G, H);

impl<T, const N: usize> SafeEq for [T; N] {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_equals_nan() {
        assert!(!f64::NAN.safe_ne(&f64::NAN));
        assert!(f64::NAN.safe_ne(&1.0));
        assert!(1.0f64.safe_ne(&f64::NAN));
    }

    #[test]
    fn test_signed_zero() {
        assert!(!(-0.0f64).safe_ne(&0.0));
        assert!(!0.0f32.safe_ne(&-0.0));
    }

    #[test]
    fn test_plain_values() {
        assert!(!1u32.safe_ne(&1));
        assert!(1i64.safe_ne(&2));
        assert!(!"a".to_string().safe_ne(&"a".to_string()));
        assert!(!Some(3u8).safe_ne(&Some(3)));
        assert!(Some(3u8).safe_ne(&None));
    }

    #[test]
    fn test_objects_always_change() {
        let list = vec![1, 2, 3];
        assert!(list.safe_ne(&list));
        let pair = (1, 2);
        assert!(pair.safe_ne(&pair));
        let shared = Arc::new(5);
        assert!(shared.safe_ne(&shared));
    }
}
