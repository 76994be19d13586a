use serde::{Deserialize, Serialize};
use tagbridge_ndef::StringDecoding;
use tagbridge_util::ResultExt as _;

/// What happens when a read listener returns an error mid-dispatch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "snake_case")]
pub enum ListenerFailurePolicy {
    /// Stop the dispatch and return the error to the native caller, later listeners never see the tag
    #[default]
    Propagate,

    /// Log it, send it to the error listeners, and keep going
    ReportAndContinue,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record,
)]
#[serde(default)]
pub struct NfcConfig {
    pub listener_failure: ListenerFailurePolicy,
    pub string_decoding: StringDecoding,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum ConfigError {
    #[error("invalid nfc config: {0}")]
    InvalidJson(String),
}

impl NfcConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err_str(ConfigError::InvalidJson)
    }
}

#[uniffi::export]
fn nfc_config_from_json(json: String) -> Result<NfcConfig, ConfigError> {
    NfcConfig::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_gate_strings_and_propagate_failures() {
        let config = NfcConfig::default();
        assert_eq!(config.listener_failure, ListenerFailurePolicy::Propagate);
        assert_eq!(config.string_decoding, StringDecoding::TypePrefix);
        assert_eq!(NfcConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn parses_partial_config() {
        let config = NfcConfig::from_json(r#"{ "listener_failure": "report_and_continue" }"#)
            .unwrap();

        assert_eq!(config.listener_failure, ListenerFailurePolicy::ReportAndContinue);
        assert_eq!(config.string_decoding, StringDecoding::TypePrefix);

        let config = NfcConfig::from_json(r#"{ "string_decoding": "always" }"#).unwrap();
        assert_eq!(config.string_decoding, StringDecoding::Always);
    }

    #[test]
    fn rejects_unknown_values() {
        let error = NfcConfig::from_json(r#"{ "listener_failure": "ignore" }"#).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidJson(_)));
    }
}
