use std::sync::Arc;

use tagbridge_ndef::{NormalizedWriteRequest, WriteRequest, normalize, normalize_json};
use tagbridge_tokio::unblock::run_blocking;
use tagbridge_util::ResultExt as _;
use tracing::{debug, trace};

use crate::{
    bridge::EventBridge,
    config::NfcConfig,
    error::{NativeBridgeError, WriteError},
    listener::{ErrorListener, TagReadListener, WriteSuccessListener},
    native::{NativeNfc, NfcEventKind},
};

type Result<T, E = NativeBridgeError> = std::result::Result<T, E>;

/// The NFC facade handed to application code
///
/// Owns its listeners, so several facades over different native handles never see
/// each other's listeners.
#[derive(Debug, uniffi::Object)]
pub struct Nfc {
    native: Arc<Box<dyn NativeNfc>>,
    bridge: Arc<EventBridge>,
}

#[uniffi::export(async_runtime = "tokio")]
impl Nfc {
    #[uniffi::constructor]
    pub fn new(native: Box<dyn NativeNfc>) -> Arc<Self> {
        Self::with_config(native, NfcConfig::default())
    }

    #[uniffi::constructor]
    pub fn with_config(native: Box<dyn NativeNfc>, config: NfcConfig) -> Arc<Self> {
        tagbridge_tokio::init();

        let bridge = Arc::new(EventBridge::new(config));
        native.subscribe(bridge.clone());
        debug!("nfc facade created with {config:?}");

        Arc::new(Self {
            native: Arc::new(native),
            bridge,
        })
    }

    /// The bridge the native layer was subscribed with
    pub fn bridge(&self) -> Arc<EventBridge> {
        self.bridge.clone()
    }

    pub fn is_supported(&self) -> bool {
        self.native.is_supported()
    }

    pub async fn start_scan(&self) -> Result<()> {
        self.call_native("start scan", |native| native.start_scan())
            .await
    }

    /// Normalize `request` and hand it to the native layer, `None` writes an empty message
    #[uniffi::method(default(request = None))]
    pub async fn write(&self, request: Option<WriteRequest>) -> Result<(), WriteError> {
        let request = normalize(request);
        self.write_normalized(request).await
    }

    /// Like [`Nfc::write`] for an untyped `{ "records": [...] }` request
    ///
    /// An unsupported payload anywhere in the request fails before the native layer is called
    pub async fn write_json(&self, json: String) -> Result<(), WriteError> {
        let request = normalize_json(&json)?;
        self.write_normalized(request).await
    }

    /// Sends the cancel command, a write already in flight still completes or fails on its own
    pub async fn cancel_write_android(&self) -> Result<()> {
        self.call_native("cancel write", |native| native.cancel_write_android())
            .await
    }

    pub fn on_read(&self, listener: Arc<dyn TagReadListener>) {
        self.bridge.read_listeners().add(listener);
    }

    pub fn on_write(&self, listener: Arc<dyn WriteSuccessListener>) {
        self.bridge.write_listeners().add(listener);
    }

    pub fn on_error(&self, listener: Arc<dyn ErrorListener>) {
        self.bridge.error_listeners().add(listener);
    }

    /// Read listeners are always removed, along with the listeners for `kind`,
    /// then the native layer is told to drop its own subscriptions for `kind`
    pub fn remove_all_listeners(&self, kind: NfcEventKind) {
        let mut removed = self.bridge.read_listeners().clear();

        removed += match kind {
            NfcEventKind::TagRead => 0,
            NfcEventKind::WriteSuccess => self.bridge.write_listeners().clear(),
            NfcEventKind::Error => self.bridge.error_listeners().clear(),
        };

        debug!("removed {removed} listeners for {kind}");
        self.native.remove_all_listeners(kind);
    }
}

impl Nfc {
    async fn write_normalized(&self, request: NormalizedWriteRequest) -> Result<(), WriteError> {
        trace!("writing {} records", request.records.len());

        self.call_native("write", move |native| native.write_ndef(request))
            .await?;

        Ok(())
    }

    async fn call_native<F>(&self, operation: &'static str, call: F) -> Result<()>
    where
        F: FnOnce(&dyn NativeNfc) -> Result<()> + Send + 'static,
    {
        let native = self.native.clone();

        run_blocking(move || call(&**native))
            .await
            .map_err_str(NativeBridgeError::Unexpected)?
            .warn_err(operation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::{Engine as _, prelude::BASE64_STANDARD};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tagbridge_ndef::{
        NormalizedWriteRecord, RawMessage, RawRecord, RawTagEvent, UnsupportedPayloadError,
        WriteRecord,
    };

    use super::*;
    use crate::{
        bridge::NativeEvent,
        error::NfcErrorEvent,
        listener::{error_listener, read_listener, write_listener},
    };

    #[derive(Debug, Default)]
    struct NativeState {
        bridge: Mutex<Option<Arc<EventBridge>>>,
        subscriptions: AtomicUsize,
        calls: Mutex<Vec<String>>,
        writes: Mutex<Vec<NormalizedWriteRequest>>,
        fail_with: Mutex<Option<NativeBridgeError>>,
    }

    #[derive(Debug, Clone, Default)]
    struct MockNative(Arc<NativeState>);

    impl MockNative {
        fn emit(&self, event: NativeEvent) -> Result<(), crate::error::ListenerError> {
            let bridge = self.0.bridge.lock().clone().expect("subscribed");
            bridge.dispatch(event)
        }

        fn calls(&self) -> Vec<String> {
            self.0.calls.lock().clone()
        }

        fn outcome(&self, call: &str) -> Result<()> {
            self.0.calls.lock().push(call.to_string());
            match self.0.fail_with.lock().clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    impl NativeNfc for MockNative {
        fn subscribe(&self, bridge: Arc<EventBridge>) {
            self.0.subscriptions.fetch_add(1, Ordering::SeqCst);
            *self.0.bridge.lock() = Some(bridge);
        }

        fn is_supported(&self) -> bool {
            true
        }

        fn start_scan(&self) -> Result<()> {
            self.outcome("start_scan")
        }

        fn write_ndef(&self, request: NormalizedWriteRequest) -> Result<()> {
            self.0.writes.lock().push(request);
            self.outcome("write_ndef")
        }

        fn cancel_write_android(&self) -> Result<()> {
            self.outcome("cancel_write_android")
        }

        fn remove_all_listeners(&self, kind: NfcEventKind) {
            self.0.calls.lock().push(format!("remove_all_listeners({kind})"));
        }
    }

    fn facade() -> (Arc<Nfc>, MockNative) {
        let native = MockNative::default();
        let nfc = Nfc::new(Box::new(native.clone()));
        (nfc, native)
    }

    fn hello_tag() -> NativeEvent {
        NativeEvent::TagRead(RawTagEvent::new(vec![RawMessage::new(vec![
            RawRecord::new("string/plain", BASE64_STANDARD.encode("hello")),
        ])]))
    }

    #[test]
    fn subscribes_once_and_shares_the_bridge() {
        let (nfc, native) = facade();

        assert_eq!(native.0.subscriptions.load(Ordering::SeqCst), 1);
        let subscribed = native.0.bridge.lock().clone().unwrap();
        assert!(Arc::ptr_eq(&subscribed, &nfc.bridge()));
        assert!(nfc.is_supported());
    }

    #[test]
    fn read_listeners_receive_native_tags() {
        let (nfc, native) = facade();
        let texts = Arc::new(Mutex::new(Vec::new()));

        let texts_ = texts.clone();
        nfc.on_read(read_listener(move |event| {
            let decoded = event.string()?;
            let text = decoded.payloads().find_map(|p| p.as_text().map(str::to_string));
            texts_.lock().extend(text);
            Ok(())
        }));

        native.emit(hello_tag()).unwrap();
        native.emit(hello_tag()).unwrap();

        assert_eq!(*texts.lock(), ["hello", "hello"]);
    }

    #[test]
    fn remove_all_listeners_clears_reads_and_named_kind() {
        let (nfc, native) = facade();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = count.clone();
            nfc.on_read(read_listener(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));
        }

        let errors = Arc::new(AtomicUsize::new(0));
        let errors_ = errors.clone();
        nfc.on_error(error_listener(move |_| {
            errors_.fetch_add(1, Ordering::SeqCst);
        }));

        nfc.remove_all_listeners(NfcEventKind::TagRead);
        native.emit(hello_tag()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // error listeners survive removing tag listeners
        native
            .emit(NativeEvent::Error(NativeBridgeError::new("boom", None)))
            .unwrap();
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        nfc.remove_all_listeners(NfcEventKind::Error);
        native
            .emit(NativeEvent::Error(NativeBridgeError::new("boom", None)))
            .unwrap();
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        assert_eq!(
            native.calls(),
            ["remove_all_listeners(nfcTag)", "remove_all_listeners(nfcError)"]
        );
    }

    #[test]
    fn facades_do_not_share_listeners() {
        let (first, first_native) = facade();
        let (_second, second_native) = facade();
        let count = Arc::new(AtomicUsize::new(0));

        let count_ = count.clone();
        first.on_read(read_listener(move |_| {
            count_.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        second_native.emit(hello_tag()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        first_native.emit(hello_tag()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn write_sends_normalized_payloads() {
        let (nfc, native) = facade();

        let request = WriteRequest::new(vec![
            WriteRecord::new("text/plain", "AB"),
            WriteRecord::new("application/octet-stream", vec![1_u8, 2]),
        ]);

        nfc.write(Some(request)).await.unwrap();

        assert_eq!(
            *native.0.writes.lock(),
            [NormalizedWriteRequest {
                records: vec![
                    NormalizedWriteRecord {
                        type_: "text/plain".to_string(),
                        payload: vec![65, 66],
                    },
                    NormalizedWriteRecord {
                        type_: "application/octet-stream".to_string(),
                        payload: vec![1, 2],
                    },
                ],
            }]
        );
    }

    #[tokio::test]
    async fn write_without_request_sends_empty_records() {
        let (nfc, native) = facade();

        nfc.write(None).await.unwrap();

        assert_eq!(*native.0.writes.lock(), [NormalizedWriteRequest::default()]);
    }

    #[tokio::test]
    async fn unsupported_payload_never_reaches_native() {
        let (nfc, native) = facade();

        let json = r#"{ "records": [ { "type": "text/plain", "payload": {} } ] }"#;
        let error = nfc.write_json(json.to_string()).await.unwrap_err();

        assert!(matches!(
            error,
            WriteError::UnsupportedPayload(UnsupportedPayloadError::Payload { index: 0, .. })
        ));
        assert!(native.calls().is_empty());
        assert!(native.0.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn json_write_is_forwarded() {
        let (nfc, native) = facade();

        let json = r#"{ "records": [ { "type": "T", "payload": [104, 105] } ] }"#;
        nfc.write_json(json.to_string()).await.unwrap();

        assert_eq!(native.calls(), ["write_ndef"]);
        assert_eq!(native.0.writes.lock()[0].records[0].payload, vec![104, 105]);
    }

    #[tokio::test]
    async fn native_failures_are_returned_not_thrown() {
        let (nfc, native) = facade();
        let error = NativeBridgeError::new("nfc disabled", Some("NFC_DISABLED"));
        *native.0.fail_with.lock() = Some(error.clone());

        assert_eq!(nfc.start_scan().await, Err(error.clone()));
        assert_eq!(nfc.cancel_write_android().await, Err(error.clone()));
        assert_eq!(nfc.write(None).await, Err(WriteError::Native(error)));

        assert_eq!(
            native.calls(),
            ["start_scan", "cancel_write_android", "write_ndef"]
        );
    }

    #[tokio::test]
    async fn write_success_and_native_errors_reach_listeners() {
        let (nfc, native) = facade();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_ = log.clone();
        nfc.on_write(write_listener(move || log_.lock().push("written".to_string())));

        let log_ = log.clone();
        nfc.on_error(error_listener(move |error| {
            if let NfcErrorEvent::Native(error) = error {
                log_.lock().push(error.to_string());
            }
        }));

        nfc.start_scan().await.unwrap();
        native.emit(NativeEvent::WriteSuccess).unwrap();
        native
            .emit(NativeEvent::Error(NativeBridgeError::new("tag lost", None)))
            .unwrap();

        assert_eq!(*log.lock(), ["written", "tag lost"]);
    }

    #[tokio::test]
    async fn panicking_native_call_is_unexpected_error() {
        #[derive(Debug)]
        struct Panicking;

        impl NativeNfc for Panicking {
            fn subscribe(&self, _bridge: Arc<EventBridge>) {}

            fn is_supported(&self) -> bool {
                false
            }

            fn start_scan(&self) -> Result<()> {
                panic!("native crashed")
            }

            fn write_ndef(&self, _request: NormalizedWriteRequest) -> Result<()> {
                Ok(())
            }

            fn cancel_write_android(&self) -> Result<()> {
                Ok(())
            }

            fn remove_all_listeners(&self, _kind: NfcEventKind) {}
        }

        let nfc = Nfc::new(Box::new(Panicking));
        assert!(matches!(
            nfc.start_scan().await,
            Err(NativeBridgeError::Unexpected(_))
        ));
    }
}
