use serde::{Deserialize, Serialize};

/// One NDEF record exactly as the native layer reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct RawRecord {
    #[serde(rename = "type")]
    pub type_: String,

    /// Standard base64 of the record payload bytes
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct RawMessage {
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// A single tag read: every NDEF message found on the tag, in tag order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct RawTagEvent {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

impl RawRecord {
    pub fn new(type_: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            payload: payload.into(),
        }
    }
}

impl RawMessage {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl From<Vec<RawRecord>> for RawMessage {
    fn from(records: Vec<RawRecord>) -> Self {
        Self::new(records)
    }
}

impl RawTagEvent {
    pub fn new(messages: Vec<RawMessage>) -> Self {
        Self { messages }
    }

    /// Parse the `{ "messages": [ { "records": [ { "type", "payload" } ] } ] }` shape
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn record_count(&self) -> usize {
        self.messages.iter().map(|message| message.records.len()).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.messages.iter().flat_map(|message| message.records.iter())
    }
}
