use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::TOKIO;

/// The runtime of the calling task, or the one captured by [`crate::init`] when called from outside a runtime
///
/// # Panics
///
/// Panics if the caller is not inside a runtime and no handle was ever captured
fn handle() -> Handle {
    Handle::try_current()
        .ok()
        .or_else(|| TOKIO.get().cloned())
        .expect("tokio runtime not initialized, call tagbridge_tokio::init from inside a runtime first")
}

pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    handle().spawn_blocking(f)
}
