use tagbridge_ndef::{DecodeError, UnsupportedPayloadError};

/// A failure reported by the native NFC layer, passed on as-is
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum NativeBridgeError {
    #[error("{message}")]
    Native {
        message: String,
        code: Option<String>,
    },

    /// The native callback threw something it did not declare, or panicked on the blocking pool
    #[error("unexpected native failure: {0}")]
    Unexpected(String),
}

impl NativeBridgeError {
    pub fn new(message: impl Into<String>, code: Option<&str>) -> Self {
        Self::Native {
            message: message.into(),
            code: code.map(str::to_string),
        }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for NativeBridgeError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.to_string())
    }
}

/// Raised by a read listener, stops the dispatch it was raised in
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum ListenerError {
    #[error("listener failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unexpected listener failure: {0}")]
    Unexpected(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ListenerError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unexpected(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum WriteError {
    #[error(transparent)]
    UnsupportedPayload(#[from] UnsupportedPayloadError),

    #[error(transparent)]
    Native(#[from] NativeBridgeError),
}

/// What error listeners receive
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum NfcErrorEvent {
    Native(NativeBridgeError),

    /// Only sent when read listener failures are reported instead of propagated
    Listener(ListenerError),
}
