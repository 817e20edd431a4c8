/*!
Singleton service registry for pulse

# Design requirements:
- The registry is an explicit value, never a process-wide global
- Each service is built at most once, after every service it depends on
- Dependency cycles and missing registrations are reported as errors, not panics
- Services are disposed in reverse creation order

```rust
use pulse_services::*;

struct Store;
impl Service for Store {}

const STORE: ServiceId<Store> = ServiceId::new("store");

let mut services = Services::new();
services.register(STORE, &[], |_| Ok(Store));
assert!(!services.is_created(STORE));
services.get(STORE)?;
assert!(services.is_created(STORE));
# Ok::<(), pulse_services::Error>(())
```
*/

mod error;
mod graph;
mod registry;

pub use error::*;
pub use registry::*;
