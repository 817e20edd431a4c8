use std::sync::{Arc, Mutex, Once};

/// Returns a recording listener and a function draining what it recorded so far
#[allow(unused)]
pub fn watcher<T: Send + 'static>() -> (impl Fn(T) + Send + Sync + Clone + 'static, impl Fn() -> Vec<T>) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let watcher = {
        let changes = changes.clone();
        move |value: T| changes.lock().unwrap().push(value)
    };

    let check = move || changes.lock().unwrap().drain(..).collect::<Vec<T>>();

    (watcher, check)
}

#[allow(unused)]
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
    });
}
