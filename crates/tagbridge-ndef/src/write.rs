use serde::{Deserialize, Serialize};
use serde_json::Value;
use tagbridge_util::{ResultExt as _, num::saturating_u32};
use tracing::debug;

/// A payload the caller wants written, in any of the accepted shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::From, uniffi::Enum)]
pub enum WritePayload {
    Text(String),
    Bytes(Vec<u8>),
    Numbers(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct WriteRecord {
    pub type_: String,
    pub payload: WritePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, uniffi::Record)]
pub struct WriteRequest {
    pub records: Vec<WriteRecord>,
}

/// The only shape the native layer is ever asked to write
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct NormalizedWriteRecord {
    #[serde(rename = "type")]
    pub type_: String,
    pub payload: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct NormalizedWriteRequest {
    pub records: Vec<NormalizedWriteRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum UnsupportedPayloadError {
    #[error(
        "unsupported payload for record {index} (type {record_type:?}): expected a string, byte array or number array, found {found}"
    )]
    Payload {
        record_type: String,
        index: u32,
        found: String,
    },

    #[error("record {index} has no string `type`")]
    MissingType { index: u32 },

    #[error("write request is not an object with a `records` array, found {found}")]
    InvalidShape { found: String },

    #[error("write request is not valid json: {0}")]
    InvalidJson(String),
}

pub type Error = UnsupportedPayloadError;
type Result<T, E = Error> = std::result::Result<T, E>;

impl From<&str> for WritePayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl WritePayload {
    /// Canonical wire form: text becomes its UTF-8 bytes, bytes are widened, numbers pass through
    pub fn into_numbers(self) -> Vec<u32> {
        match self {
            Self::Text(text) => text.into_bytes().into_iter().map(u32::from).collect(),
            Self::Bytes(bytes) => bytes.into_iter().map(u32::from).collect(),
            Self::Numbers(numbers) => numbers,
        }
    }

    fn from_json_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u32::try_from(n).ok()))
                .collect::<Option<Vec<u32>>>()
                .map(Self::Numbers)
                .ok_or("an array with non-integer or out of range values"),
            other => Err(json_kind(&other)),
        }
    }
}

impl WriteRecord {
    pub fn new(type_: impl Into<String>, payload: impl Into<WritePayload>) -> Self {
        Self {
            type_: type_.into(),
            payload: payload.into(),
        }
    }

    pub fn normalize(self) -> NormalizedWriteRecord {
        NormalizedWriteRecord {
            type_: self.type_,
            payload: self.payload.into_numbers(),
        }
    }

    fn from_json_value(index: usize, value: Value) -> Result<Self> {
        let index = saturating_u32(index);

        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(Error::InvalidShape {
                    found: format!("record {index} as {}", json_kind(&other)),
                });
            }
        };

        let Some(Value::String(type_)) = fields.remove("type") else {
            return Err(Error::MissingType { index });
        };

        let payload = fields.remove("payload").unwrap_or(Value::Null);
        let payload = WritePayload::from_json_value(payload).map_err(|found| {
            debug!("rejecting write record {index} ({type_}), payload is {found}");
            Error::Payload {
                record_type: type_.clone(),
                index,
                found: found.to_string(),
            }
        })?;

        Ok(Self { type_, payload })
    }
}

impl WriteRequest {
    pub fn new(records: Vec<WriteRecord>) -> Self {
        Self { records }
    }

    /// Parse an untyped `{ "records": [ { "type", "payload" } ] }` request
    ///
    /// A missing or null `records` is an empty request. Payloads must be a string or an array
    /// of integers that fit in a `u32`, any other shape rejects the whole request.
    pub fn from_json(json: &str) -> Result<Self> {
        let value = serde_json::from_str::<Value>(json).map_err_str(Error::InvalidJson)?;
        Self::try_from(value)
    }
}

impl TryFrom<Value> for WriteRequest {
    type Error = UnsupportedPayloadError;

    fn try_from(value: Value) -> Result<Self> {
        let records = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(mut fields) => match fields.remove("records") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(records)) => records,
                Some(other) => {
                    return Err(Error::InvalidShape {
                        found: format!("`records` as {}", json_kind(&other)),
                    });
                }
            },
            other => {
                return Err(Error::InvalidShape {
                    found: json_kind(&other).to_string(),
                });
            }
        };

        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| WriteRecord::from_json_value(index, record))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }
}

/// Reduce every record payload to its numeric wire form, `None` is an empty request
pub fn normalize(request: Option<WriteRequest>) -> NormalizedWriteRequest {
    let records = request
        .map(|request| request.records)
        .unwrap_or_default()
        .into_iter()
        .map(WriteRecord::normalize)
        .collect();

    NormalizedWriteRequest { records }
}

/// [`WriteRequest::from_json`] followed by [`normalize`]
pub fn normalize_json(json: &str) -> Result<NormalizedWriteRequest> {
    let request = WriteRequest::from_json(json)?;
    Ok(normalize(Some(request)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
