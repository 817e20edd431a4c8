/*!
Push-based reactive cells for pulse

# Design requirements:
- A write propagates synchronously and depth-first through every dependent cell before `set` returns
- Subscribing replays the present value, unless the cell has none yet
- Writes equal to the present value are dropped; collections and other non-plain values always count as changes
- Combinators stay silent until each of their sources has produced a value
- Subscriptions are RAII handles; releasing one twice is harmless
- No lock is held while user code runs, so listeners may freely read, write and subscribe

Propagation is recursive and unguarded: a cycle built by hand recurses until the
stack overflows, and a diamond-shaped graph lets downstream cells observe
intermediate values (it is not glitch-free).

# Basic usage

```rust
use pulse_signals::*;

let count = writable(Some(0));
let _sub = count.subscribe(|value: i32| println!("count: {value}"));
count.set(1);
// Should print:
// count: 0
// count: 1
```

# Combinators

```rust
use pulse_signals::*;

let name = writable(Some("Buffy".to_string()));
let age = writable::<u32>(None);

let greeting = derived((&name, &age), Derive::pure(|(name, age): (String, u32)| format!("{name} is {age}")), None);
assert_eq!(greeting.peek(), None); // age has no value yet

age.set(29);
assert_eq!(greeting.peek().as_deref(), Some("Buffy is 29"));

let doubled = pipe(&age, map(|age: u32| age * 2).then(filter(|age: &u32| *age > 60)));
assert_eq!(doubled.peek(), None);
age.set(31);
assert_eq!(doubled.peek(), Some(62));
```
*/

mod broadcast;
mod cancel;
mod combine;
mod derived;
mod dispose;
mod emitter;
mod equality;
mod error;
mod event;
mod guard;
mod operator;
mod signal;
mod value;
#[cfg(feature = "tokio")]
mod wait;

pub use broadcast::*;
pub use cancel::*;
pub use combine::*;
pub use derived::*;
pub use dispose::*;
pub use emitter::*;
pub use equality::*;
pub use error::*;
pub use event::*;
pub use guard::*;
pub use operator::*;
pub use signal::*;
#[cfg(feature = "tokio")]
pub use wait::*;
