use std::sync::Arc;

use tagbridge_ndef::NormalizedWriteRequest;

use crate::{bridge::EventBridge, error::NativeBridgeError};

/// The event channels the native layer emits on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, uniffi::Enum,
)]
pub enum NfcEventKind {
    #[strum(to_string = "nfcTag")]
    TagRead,

    #[strum(to_string = "nfcWriteSuccess")]
    WriteSuccess,

    #[strum(to_string = "nfcError")]
    Error,
}

/// Implemented by the platform (CoreNFC on iOS, `NfcAdapter` on Android)
///
/// Methods that start work may block until the platform accepts or rejects the
/// request, they are always called from the blocking pool.
#[uniffi::export(callback_interface)]
pub trait NativeNfc: Send + Sync + std::fmt::Debug + 'static {
    /// Called exactly once, when the facade is created. Every native event for
    /// the facade's lifetime goes to `bridge.dispatch`.
    fn subscribe(&self, bridge: Arc<EventBridge>);

    fn is_supported(&self) -> bool;

    fn start_scan(&self) -> Result<(), NativeBridgeError>;

    /// Payloads are always numeric, never strings or raw bytes
    fn write_ndef(&self, request: NormalizedWriteRequest) -> Result<(), NativeBridgeError>;

    /// Android only, asks the platform to stop waiting for a tag to write to
    fn cancel_write_android(&self) -> Result<(), NativeBridgeError>;

    /// Drop any platform side subscriptions for `kind`
    fn remove_all_listeners(&self, kind: NfcEventKind);
}
