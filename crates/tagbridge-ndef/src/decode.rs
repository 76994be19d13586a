use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Serialize};
use tagbridge_util::num::saturating_u32;
use tracing::trace;

use crate::record::{RawRecord, RawTagEvent};

/// Record types starting with this prefix are decoded as text by [`Representation::Utf8String`]
pub const STRING_TYPE_PREFIX: &str = "string";

/// Leading UTF-8 byte order mark, dropped before text decoding like a `TextDecoder` does
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Standard alphabet, padding optional and stray trailing bits tolerated, the same leniency
/// a browser `atob` gives the payloads the native layer produces
const FORGIVING_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum DecodeError {
    #[error(
        "payload of record {record_index} in message {message_index} (type {record_type:?}) is not valid base64: {reason}"
    )]
    InvalidBase64 {
        record_type: String,
        message_index: u32,
        record_index: u32,
        reason: String,
    },
}

pub type Error = DecodeError;
type Result<T, E = Error> = std::result::Result<T, E>;

/// The four shapes a record payload can be decoded into
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    uniffi::Enum,
)]
pub enum Representation {
    /// Payload left exactly as the native layer sent it
    #[strum(to_string = "base64", serialize = "b64")]
    RawBase64,

    /// UTF-8 text, only for records whose type starts with [`STRING_TYPE_PREFIX`]
    #[strum(to_string = "string")]
    Utf8String,

    #[strum(to_string = "uint8Array")]
    ByteSequence,

    #[strum(to_string = "numberArray")]
    NumericSequence,
}

/// Which records [`Representation::Utf8String`] turns into text
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "snake_case")]
pub enum StringDecoding {
    /// Only records whose type starts with `"string"`, everything else stays base64
    #[default]
    TypePrefix,

    /// Every record, regardless of its declared type
    Always,
}

impl StringDecoding {
    pub fn applies_to(self, record_type: &str) -> bool {
        match self {
            Self::TypePrefix => record_type.starts_with(STRING_TYPE_PREFIX),
            Self::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, uniffi::Enum)]
#[serde(untagged)]
pub enum DecodedPayload {
    Base64(String),
    Text(String),
    Bytes(Vec<u8>),
    Numbers(Vec<u32>),
}

impl DecodedPayload {
    pub fn as_base64(&self) -> Option<&str> {
        match self {
            Self::Base64(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[u32]> {
        match self {
            Self::Numbers(numbers) => Some(numbers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, uniffi::Record)]
pub struct DecodedRecord {
    #[serde(rename = "type")]
    pub type_: String,
    pub payload: DecodedPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, uniffi::Record)]
pub struct DecodedMessage {
    pub records: Vec<DecodedRecord>,
}

/// Same layout as [`RawTagEvent`], with every payload converted
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, uniffi::Record)]
pub struct DecodedEvent {
    pub messages: Vec<DecodedMessage>,
}

impl DecodedEvent {
    pub fn payloads(&self) -> impl Iterator<Item = &DecodedPayload> {
        self.messages
            .iter()
            .flat_map(|message| message.records.iter())
            .map(|record| &record.payload)
    }
}

/// The [`Representation::RawBase64`] view, which cannot fail
pub fn passthrough(event: &RawTagEvent) -> DecodedEvent {
    let messages = event
        .messages
        .iter()
        .map(|message| DecodedMessage {
            records: message
                .records
                .iter()
                .map(|record| DecodedRecord {
                    type_: record.type_.clone(),
                    payload: DecodedPayload::Base64(record.payload.clone()),
                })
                .collect(),
        })
        .collect();

    DecodedEvent { messages }
}

/// Decode every record of `event` into `representation`, gating text decoding on the record type
pub fn decode(representation: Representation, event: &RawTagEvent) -> Result<DecodedEvent> {
    decode_with(representation, event, StringDecoding::default())
}

/// Like [`decode`], with an explicit rule for which records become text
///
/// Fails on the first record whose payload is not base64, nothing is returned partially
pub fn decode_with(
    representation: Representation,
    event: &RawTagEvent,
    strings: StringDecoding,
) -> Result<DecodedEvent> {
    trace!(
        "decoding {} records as {representation}",
        event.record_count()
    );

    let messages = event
        .messages
        .iter()
        .enumerate()
        .map(|(message_index, message)| {
            let records = message
                .records
                .iter()
                .enumerate()
                .map(|(record_index, record)| {
                    let payload = decode_record(representation, record, strings).map_err(
                        |error| DecodeError::InvalidBase64 {
                            record_type: record.type_.clone(),
                            message_index: saturating_u32(message_index),
                            record_index: saturating_u32(record_index),
                            reason: error.to_string(),
                        },
                    )?;

                    Ok(DecodedRecord {
                        type_: record.type_.clone(),
                        payload,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(DecodedMessage { records })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedEvent { messages })
}

fn decode_record(
    representation: Representation,
    record: &RawRecord,
    strings: StringDecoding,
) -> Result<DecodedPayload, base64::DecodeError> {
    use Representation as R;

    let payload = match representation {
        R::RawBase64 => DecodedPayload::Base64(record.payload.clone()),
        R::Utf8String if strings.applies_to(&record.type_) => {
            let bytes = decode_base64(&record.payload)?;
            let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
            DecodedPayload::Text(String::from_utf8_lossy(text).into_owned())
        }
        R::Utf8String => DecodedPayload::Base64(record.payload.clone()),
        R::ByteSequence => DecodedPayload::Bytes(decode_base64(&record.payload)?),
        R::NumericSequence => {
            let bytes = decode_base64(&record.payload)?;
            DecodedPayload::Numbers(bytes.into_iter().map(u32::from).collect())
        }
    };

    Ok(payload)
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if !payload.bytes().any(|byte| byte.is_ascii_whitespace()) {
        return FORGIVING_BASE64.decode(payload);
    }

    let compact = payload
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect::<Vec<u8>>();

    FORGIVING_BASE64.decode(compact)
}
