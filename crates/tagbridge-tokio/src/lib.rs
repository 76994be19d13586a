pub mod task;
pub mod unblock;

use std::sync::OnceLock;
use tokio::runtime::Handle;

pub(crate) static TOKIO: OnceLock<Handle> = OnceLock::new();

/// Capture the runtime the library was first used from
///
/// Does nothing when called outside a tokio runtime, or when a handle was already captured
pub fn init() {
    if is_tokio_initialized() {
        return;
    }

    match Handle::try_current() {
        Ok(handle) => {
            let _ = TOKIO.set(handle);
        }
        Err(_) => tracing::debug!("no tokio runtime yet, falling back to the caller's runtime"),
    }
}

pub fn is_tokio_initialized() -> bool {
    TOKIO.get().is_some()
}
