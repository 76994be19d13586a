use std::sync::Arc;

use tagbridge_ndef::{
    DecodeError, DecodedEvent, RawTagEvent, Representation, StringDecoding, decode_with,
};
use tagbridge_util::num::saturating_u32;
use tracing::{debug, warn};

use crate::{
    config::{ListenerFailurePolicy, NfcConfig},
    error::{ListenerError, NativeBridgeError, NfcErrorEvent},
    listener::{ErrorListener, ListenerRegistry, TagReadListener, WriteSuccessListener},
};

type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Error code sent to error listeners when the native layer hands over an unparseable tag
pub const INVALID_TAG_EVENT: &str = "INVALID_TAG_EVENT";

/// Everything the native layer can emit
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum NativeEvent {
    TagRead(RawTagEvent),
    WriteSuccess,
    Error(NativeBridgeError),
}

/// One tag read, decodable into any representation as many times as needed
///
/// Every read listener of a dispatch receives the same instance. Decoding never
/// touches the wrapped event and nothing is cached between calls.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
pub struct TransformableEvent {
    raw: RawTagEvent,
    strings: StringDecoding,
}

impl TransformableEvent {
    pub fn with_string_decoding(raw: RawTagEvent, strings: StringDecoding) -> Self {
        Self { raw, strings }
    }
}

#[uniffi::export]
impl TransformableEvent {
    #[uniffi::constructor]
    pub fn new(raw: RawTagEvent) -> Self {
        Self::with_string_decoding(raw, StringDecoding::default())
    }

    pub fn raw(&self) -> RawTagEvent {
        self.raw.clone()
    }

    pub fn record_count(&self) -> u32 {
        saturating_u32(self.raw.record_count())
    }

    pub fn decode(&self, representation: Representation) -> Result<DecodedEvent> {
        decode_with(representation, &self.raw, self.strings)
    }

    /// Payloads exactly as received
    pub fn base64(&self) -> DecodedEvent {
        tagbridge_ndef::decode::passthrough(&self.raw)
    }

    /// Text for `string*` records, base64 for the rest (unless configured to decode every record)
    pub fn string(&self) -> Result<DecodedEvent> {
        self.decode(Representation::Utf8String)
    }

    pub fn bytes(&self) -> Result<DecodedEvent> {
        self.decode(Representation::ByteSequence)
    }

    pub fn numbers(&self) -> Result<DecodedEvent> {
        self.decode(Representation::NumericSequence)
    }
}

/// Receives every native event for one facade and fans it out to that facade's listeners
#[derive(Debug, uniffi::Object)]
pub struct EventBridge {
    config: NfcConfig,
    read_listeners: ListenerRegistry<dyn TagReadListener>,
    write_listeners: ListenerRegistry<dyn WriteSuccessListener>,
    error_listeners: ListenerRegistry<dyn ErrorListener>,
}

impl EventBridge {
    pub fn new(config: NfcConfig) -> Self {
        Self {
            config,
            read_listeners: ListenerRegistry::new(),
            write_listeners: ListenerRegistry::new(),
            error_listeners: ListenerRegistry::new(),
        }
    }

    pub fn read_listeners(&self) -> &ListenerRegistry<dyn TagReadListener> {
        &self.read_listeners
    }

    pub fn write_listeners(&self) -> &ListenerRegistry<dyn WriteSuccessListener> {
        &self.write_listeners
    }

    pub fn error_listeners(&self) -> &ListenerRegistry<dyn ErrorListener> {
        &self.error_listeners
    }

    fn dispatch_tag(&self, raw: RawTagEvent) -> Result<(), ListenerError> {
        let event = Arc::new(TransformableEvent::with_string_decoding(
            raw,
            self.config.string_decoding,
        ));

        let listeners = self.read_listeners.snapshot();
        debug!(
            "tag with {} records, dispatching to {} listeners",
            event.record_count(),
            listeners.len()
        );

        for (index, listener) in listeners.iter().enumerate() {
            let Err(error) = listener.on_read(event.clone()) else {
                continue;
            };

            match self.config.listener_failure {
                ListenerFailurePolicy::Propagate => {
                    let skipped = listeners.len() - index - 1;
                    warn!("read listener {index} failed, skipping {skipped} more: {error}");
                    return Err(error);
                }

                ListenerFailurePolicy::ReportAndContinue => {
                    warn!("read listener {index} failed: {error}");
                    self.dispatch_error(NfcErrorEvent::Listener(error));
                }
            }
        }

        Ok(())
    }

    fn dispatch_write_success(&self) {
        let listeners = self.write_listeners.snapshot();
        debug!("write succeeded, notifying {} listeners", listeners.len());

        for listener in listeners {
            listener.on_write();
        }
    }

    fn dispatch_error(&self, error: NfcErrorEvent) {
        let listeners = self.error_listeners.snapshot();
        if listeners.is_empty() {
            warn!("nfc error with no error listeners: {error:?}");
            return;
        }

        for listener in listeners {
            listener.on_error(error.clone());
        }
    }
}

#[uniffi::export]
impl EventBridge {
    /// Deliver one native event, listeners run synchronously before this returns
    ///
    /// With the default config a failing read listener's error is returned here
    pub fn dispatch(&self, event: NativeEvent) -> Result<(), ListenerError> {
        match event {
            NativeEvent::TagRead(raw) => self.dispatch_tag(raw)?,
            NativeEvent::WriteSuccess => self.dispatch_write_success(),
            NativeEvent::Error(error) => self.dispatch_error(NfcErrorEvent::Native(error)),
        }

        Ok(())
    }

    /// Deliver a tag read in its JSON form, an unparseable payload is sent to the error listeners
    pub fn dispatch_tag_json(&self, json: String) -> Result<(), ListenerError> {
        match RawTagEvent::from_json(&json) {
            Ok(raw) => self.dispatch_tag(raw),
            Err(error) => {
                warn!("native layer sent an invalid tag event: {error}");
                let error = NativeBridgeError::new(error.to_string(), Some(INVALID_TAG_EVENT));
                self.dispatch_error(NfcErrorEvent::Native(error));
                Ok(())
            }
        }
    }
}
