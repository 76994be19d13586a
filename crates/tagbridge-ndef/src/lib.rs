//! NDEF payload transcoding
//!
//! Native NFC layers hand record payloads across the bridge as base64 strings,
//! and expect written payloads as plain number arrays. This crate holds the
//! wire types for both directions and the pure conversions between them.

pub mod decode;
pub mod record;
pub mod write;

pub use decode::{
    DecodeError, DecodedEvent, DecodedMessage, DecodedPayload, DecodedRecord, Representation,
    StringDecoding, decode, decode_with, passthrough,
};
pub use record::{RawMessage, RawRecord, RawTagEvent};
pub use write::{
    NormalizedWriteRecord, NormalizedWriteRequest, UnsupportedPayloadError, WritePayload,
    WriteRecord, WriteRequest, normalize, normalize_json,
};

uniffi::setup_scaffolding!();

mod ffi {
    use super::*;

    #[uniffi::export]
    fn decode_tag_event(
        representation: Representation,
        event: RawTagEvent,
    ) -> Result<DecodedEvent, DecodeError> {
        decode(representation, &event)
    }

    #[uniffi::export]
    fn normalize_write_request(request: Option<WriteRequest>) -> NormalizedWriteRequest {
        normalize(request)
    }

    #[uniffi::export]
    fn normalize_write_request_json(json: String) -> Result<NormalizedWriteRequest, UnsupportedPayloadError> {
        normalize_json(&json)
    }

    #[uniffi::export]
    fn representation_from_tag(tag: String) -> Option<Representation> {
        tag.parse().ok()
    }
}
