use crate::{
    error::{Error, Result},
    signal::Readable,
};

/// Trait for waiting on cell values asynchronously
pub trait Wait<T: 'static> {
    /// Wait for the cell to hold `target`
    fn wait_value(&self, target: T) -> impl std::future::Future<Output = Result<()>> + Send
    where T: PartialEq + Send + Sync;

    /// Wait for the first value, present or future, matching the given predicate
    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = Result<R::Output>> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult;
}

/// Helper trait for `wait_for` to allow flexible predicate return types.
///
/// ## Semantics
/// - `result()` returns `Some(output)` to stop waiting and return `output`
/// - `result()` returns `None` to continue waiting for the next value
pub trait WaitResult {
    type Output;
    fn result(self) -> Option<Self::Output>;
}

// true = stop with (), false = continue waiting
impl WaitResult for bool {
    type Output = ();
    fn result(self) -> Option<Self::Output> { if self { Some(()) } else { None } }
}

impl<T> WaitResult for Option<T> {
    type Output = T;
    fn result(self) -> Option<Self::Output> { self }
}

impl<S> Wait<S::Value> for S
where S: Readable + Sync
{
    fn wait_value(&self, target: S::Value) -> impl std::future::Future<Output = Result<()>> + Send
    where S::Value: PartialEq + Send + Sync {
        self.wait_for(move |value: &S::Value| *value == target)
    }

    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = Result<R::Output>> + Send
    where
        F: Fn(&S::Value) -> R + Send + Sync + 'static,
        R: WaitResult,
    {
        async move {
            // Bridge the synchronous listener into the async world. Subscribing
            // replays the present value, so it is checked first.
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<S::Value>();
            let _subscription = self.subscribe(tx);

            while let Some(value) = rx.recv().await {
                if let Some(result) = predicate(&value).result() {
                    return Ok(result);
                }
            }
            // The listener holding the sender was dropped by a reset
            Err(Error::Closed)
        }
    }
}
