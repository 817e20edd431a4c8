mod common;
use common::watcher;
use pulse_signals::*;

#[test]
fn test_pure_derivation_recomputes() {
    let a = writable(Some(3));
    let b = writable(Some(5));
    let sum = derived((&a, &b), Derive::pure(|(a, b): (i32, i32)| a + b), None);

    let (accumulate, check) = watcher();
    let _sub = sum.subscribe(accumulate);
    assert_eq!(check(), [8]);

    a.set(10);
    assert_eq!(check(), [15]);
    b.set(0);
    assert_eq!(check(), [10]);
}

#[test]
fn test_imperative_countdown_emits_many_values() {
    let start = writable::<u32>(None);
    let countdown = derived(
        (&start,),
        Derive::imperative(|(n,): (u32,), set: &Setter<u32>| {
            for i in (0..n).rev() {
                set.set(i);
            }
            None
        }),
        None,
    );

    let (accumulate, check) = watcher();
    let _sub = countdown.subscribe(accumulate);

    start.set(3);
    assert_eq!(check(), [2, 1, 0]);

    start.set(5);
    assert_eq!(check(), [4, 3, 2, 1, 0]);
}

#[test]
fn test_imperative_may_skip_emission() {
    let source = writable(Some(1));
    let odd_only = derived(
        (&source,),
        Derive::imperative(|(n,): (i32,), set: &Setter<i32>| {
            if n % 2 == 1 {
                set.set(n);
            }
            None
        }),
        None,
    );

    source.set(2);
    assert_eq!(odd_only.peek(), Some(1));
    source.set(3);
    assert_eq!(odd_only.peek(), Some(3));
}

#[test]
fn test_diamond_runs_twice_with_intermediate_value() {
    let a = writable(Some(1));
    let b = derived((&a,), Derive::pure(|(a,): (i32,)| a * 10), None);

    let (accumulate, check) = watcher();
    let c = derived(
        (&a, &b),
        Derive::pure(move |(a, b): (i32, i32)| {
            accumulate((a, b));
            a + b
        }),
        None,
    );
    assert_eq!(check(), [(1, 10)]);

    a.set(2);
    // b subscribed to a before c did, so c first sees the new b with the stale a
    assert_eq!(check(), [(1, 20), (2, 20)]);
    assert_eq!(c.peek(), Some(22));
}

#[test]
fn test_diamond_with_late_wired_branch_sees_stale_branch() {
    let a = writable(Some(1));
    let b = writable::<i32>(None);

    let (accumulate, check) = watcher();
    let c = derived(
        (&a, &b),
        Derive::pure(move |(a, b): (i32, i32)| {
            accumulate((a, b));
            a + b
        }),
        None,
    );

    let tens = pipe(&a, map(|a: i32| a * 10));
    let _link = connect(&tens, &b);
    assert_eq!(check(), [(1, 10)]);

    a.set(2);
    // now c is ahead of the branch, so it pairs the new a with the stale b first
    assert_eq!(check(), [(2, 10), (2, 20)]);
    assert_eq!(c.peek(), Some(22));
}

#[test]
fn test_derived_over_vec_sources() {
    let prices: Vec<_> = [3u32, 4, 5].into_iter().map(|p| writable(Some(p))).collect();
    let total = derived(&prices, Derive::pure(|values: Vec<u32>| values.iter().sum::<u32>()), None);
    assert_eq!(total.peek(), Some(12));

    prices[1].set(10);
    assert_eq!(total.peek(), Some(18));
}

#[test]
fn test_derived_over_derived_passed_by_value() {
    let celsius = writable(Some(0.0f64));
    let fahrenheit = derived(
        (derived((&celsius,), Derive::pure(|(c,): (f64,)| c * 9.0 / 5.0), None),),
        Derive::pure(|(scaled,): (f64,)| scaled + 32.0),
        None,
    );
    assert_eq!(fahrenheit.peek(), Some(32.0));

    celsius.set(100.0);
    assert_eq!(fahrenheit.peek(), Some(212.0));

    let copy = fahrenheit.clone();
    drop(fahrenheit);
    celsius.set(-40.0);
    assert_eq!(copy.peek(), Some(-40.0));
    drop(copy);
    assert_eq!(celsius.listener_count(), 0);
}
