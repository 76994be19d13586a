//! Cross-platform NFC facade
//!
//! The native layer (Swift / Kotlin) implements [`native::NativeNfc`] and pushes
//! every tag, write-success and error event into the [`bridge::EventBridge`] it
//! receives on construction. Application code talks to [`nfc::Nfc`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod native;
pub mod nfc;

pub use bridge::{EventBridge, NativeEvent, TransformableEvent};
pub use config::{ListenerFailurePolicy, NfcConfig};
pub use error::{ListenerError, NativeBridgeError, NfcErrorEvent, WriteError};
pub use native::{NativeNfc, NfcEventKind};
pub use nfc::Nfc;

pub use tagbridge_ndef as ndef;

uniffi::setup_scaffolding!();

#[uniffi::export]
fn init_logging() {
    logging::init();
}
