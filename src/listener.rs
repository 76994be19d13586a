use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::trace;

use crate::{
    bridge::TransformableEvent,
    error::{ListenerError, NfcErrorEvent},
};

#[uniffi::export(with_foreign)]
pub trait TagReadListener: Send + Sync + 'static {
    /// Returning an error stops delivery of this tag to the listeners registered after this one
    fn on_read(&self, event: Arc<TransformableEvent>) -> Result<(), ListenerError>;
}

#[uniffi::export(with_foreign)]
pub trait WriteSuccessListener: Send + Sync + 'static {
    fn on_write(&self);
}

#[uniffi::export(with_foreign)]
pub trait ErrorListener: Send + Sync + 'static {
    fn on_error(&self, error: NfcErrorEvent);
}

/// Ordered listeners for one event kind
///
/// Insertion order is call order, the same listener may be added more than once,
/// and the only way to remove anything is [`ListenerRegistry::clear`].
pub struct ListenerRegistry<L: ?Sized> {
    listeners: Mutex<Vec<Arc<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Arc<L>) {
        let mut listeners = self.listeners.lock();
        listeners.push(listener);
        trace!("listener added, {} registered", listeners.len());
    }

    /// Remove every listener, returns how many were removed
    pub fn clear(&self) -> usize {
        let removed = std::mem::take(&mut *self.listeners.lock());
        removed.len()
    }

    /// The listeners registered right now, unaffected by later `add` or `clear` calls
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Wraps a Rust closure so it can be registered as a listener
pub struct Callback<F>(pub F);

impl<F> TagReadListener for Callback<F>
where
    F: Fn(Arc<TransformableEvent>) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    fn on_read(&self, event: Arc<TransformableEvent>) -> Result<(), ListenerError> {
        (self.0)(event)
    }
}

impl<F> WriteSuccessListener for Callback<F>
where
    F: Fn() + Send + Sync + 'static,
{
    fn on_write(&self) {
        (self.0)()
    }
}

impl<F> ErrorListener for Callback<F>
where
    F: Fn(NfcErrorEvent) + Send + Sync + 'static,
{
    fn on_error(&self, error: NfcErrorEvent) {
        (self.0)(error)
    }
}

pub fn read_listener<F>(f: F) -> Arc<dyn TagReadListener>
where
    F: Fn(Arc<TransformableEvent>) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(Callback(f))
}

pub fn write_listener<F>(f: F) -> Arc<dyn WriteSuccessListener>
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(Callback(f))
}

pub fn error_listener<F>(f: F) -> Arc<dyn ErrorListener>
where
    F: Fn(NfcErrorEvent) + Send + Sync + 'static,
{
    Arc::new(Callback(f))
}
