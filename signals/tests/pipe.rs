mod common;
use common::watcher;
use pulse_signals::*;

#[test]
fn test_connect_mirrors_source() {
    let foo = writable(Some(0));
    let bar = writable::<i32>(None);
    let (accumulate, check) = watcher();
    let _watch = bar.subscribe(accumulate);
    assert!(check().is_empty());

    let _link = connect(&foo, &bar);
    assert_eq!(check(), [0]);

    foo.set(1);
    assert_eq!(check(), [1]);
    assert_eq!(foo.peek(), bar.peek());
}

#[test]
fn test_connect_from_unset_source_is_silent() {
    let foo = writable::<i32>(None);
    let bar = writable::<i32>(None);
    let (accumulate, check) = watcher();
    let _watch = bar.subscribe(accumulate);

    let link = connect(&foo, &bar);
    assert!(check().is_empty());

    foo.set(7);
    assert_eq!(check(), [7]);

    link.unsubscribe();
    foo.set(8);
    assert!(check().is_empty());
    assert_eq!(bar.peek(), Some(7));
}

#[test]
fn test_pipe_applies_ops_in_declared_order() {
    let add2 = map(|v: i32| v + 2);
    let mul2 = map(|v: i32| v * 2);

    let source = writable(Some(0));
    let out = pipe(&source, add2.then(mul2));
    assert_eq!(out.peek(), Some(4));

    source.set(1);
    assert_eq!(out.peek(), Some(6));
}

#[test]
fn test_scan_state_outlives_a_single_pipe() {
    let total = scan(|acc: i32, v: i32| acc + v, 0);

    let first = writable(Some(1));
    let running = pipe(&first, total.clone());
    first.set(2);
    assert_eq!(running.peek(), Some(3));

    // a second chain built from the same operator continues the same sum
    let second = writable(Some(10));
    let resumed = pipe(&second, total);
    assert_eq!(resumed.peek(), Some(13));
}

#[test]
fn test_filter_then_scan_counts_matches() {
    let source = writable::<u32>(None);
    let evens = pipe(&source, filter(|v: &u32| v % 2 == 0).then(scan(|count: usize, _: u32| count + 1, 0)));
    let (accumulate, check) = watcher();
    let _sub = evens.subscribe(accumulate);

    for v in 1..=6 {
        source.set(v);
    }
    assert_eq!(check(), [1, 2, 3]);
}

#[test]
fn test_pipe_from_derived_passed_by_value() {
    let a = writable(Some(1));
    let out = pipe(derived((&a,), Derive::pure(|(a,): (i32,)| a * 10), None), map(|v: i32| v + 1));
    assert_eq!(out.peek(), Some(11));

    a.set(2);
    assert_eq!(out.peek(), Some(21));

    drop(out);
    assert_eq!(a.listener_count(), 0);
}

#[test]
fn test_chained_pipes_stay_attached() {
    let a = writable(Some(1));
    let out = {
        let doubled = pipe(&a, map(|v: i32| v * 2));
        let label = pipe(doubled, map(|v: i32| format!("#{v}")));
        pipe(label, filter(|v: &String| v.len() < 4))
    };
    let (accumulate, check) = watcher();
    let _sub = out.subscribe(accumulate);
    assert_eq!(check(), ["#2"]);

    a.set(4);
    a.set(60);
    assert_eq!(check(), ["#8"]);
    assert_eq!(out.peek().as_deref(), Some("#8"));
}

#[test]
fn test_two_way_sync_through_guard() {
    // Vec values always count as changed, so an unguarded echo would never settle
    let left = writable(Some(vec![1]));
    let right = writable::<Vec<i32>>(None);
    let guard = ReentrancyGuard::new();

    let _left_to_right = {
        let (guard, right) = (guard.clone(), right.clone());
        reaction(&left, move |v: Vec<i32>| {
            guard.run(|| right.set(v));
        })
    };
    let _right_to_left = {
        let (guard, left) = (guard.clone(), left.clone());
        reaction(&right, move |v: Vec<i32>| {
            guard.run(|| left.set(v));
        })
    };

    let (accumulate, check) = watcher();
    let _watch = reaction(&left, accumulate);

    left.set(vec![2]);
    assert_eq!(right.peek(), Some(vec![2]));
    assert_eq!(check(), [vec![2]]);

    right.set(vec![3]);
    assert_eq!(left.peek(), Some(vec![3]));
    assert_eq!(check(), [vec![3]]);
}
