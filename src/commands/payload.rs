//! JSON identifiers carried by buttons and select menus
//!
//! The platform round-trips a component's custom id untouched, so the bot stores
//! a small JSON object there. `command` picks the owning command; the rest is
//! command-specific.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::PayloadError;

/// Discord's custom_id length limit
pub const CUSTOM_ID_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPayload {
    /// Command that owns the component
    pub command: String,

    /// Button action, e.g. `enable` / `disable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,

    /// Component sub-kind, e.g. `selecter` for the plugin picker
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    /// Any other command-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentPayload {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            button: None,
            kind: None,
            plugin: None,
            extra: Map::new(),
        }
    }

    pub fn with_button(mut self, button: impl Into<String>) -> Self {
        self.button = Some(button.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Decode a component custom id
    pub fn decode(custom_id: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(custom_id)?;
        match value.get("command") {
            Some(Value::String(_)) => Ok(serde_json::from_value(value)?),
            _ => Err(PayloadError::MissingCommand),
        }
    }

    /// Encode as a compact JSON custom id
    pub fn encode(&self) -> String {
        // A struct of strings and a JSON map always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_toggle_button() {
        let payload =
            ComponentPayload::decode(r#"{"command":"plugins","plugin":"weather","button":"enable"}"#)
                .unwrap();
        assert_eq!(payload.command, "plugins");
        assert_eq!(payload.plugin.as_deref(), Some("weather"));
        assert_eq!(payload.button.as_deref(), Some("enable"));
        assert!(payload.kind.is_none());
    }

    #[test]
    fn test_decode_menu_type() {
        let payload = ComponentPayload::decode(r#"{"command":"plugins","type":"selecter"}"#).unwrap();
        assert_eq!(payload.kind.as_deref(), Some("selecter"));
    }

    #[test]
    fn test_decode_keeps_extra_fields() {
        let payload = ComponentPayload::decode(r#"{"command":"roll","sides":20,"count":2}"#).unwrap();
        assert_eq!(payload.field("sides"), Some(&Value::from(20)));
        assert_eq!(payload.field("count"), Some(&Value::from(2)));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(
            ComponentPayload::decode("persona_muppet"),
            Err(PayloadError::NotJson(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_or_non_string_command() {
        assert!(matches!(
            ComponentPayload::decode(r#"{"button":"enable"}"#),
            Err(PayloadError::MissingCommand)
        ));
        assert!(matches!(
            ComponentPayload::decode(r#"{"command":5}"#),
            Err(PayloadError::MissingCommand)
        ));
        assert!(matches!(
            ComponentPayload::decode("[1,2]"),
            Err(PayloadError::MissingCommand)
        ));
    }

    #[test]
    fn test_encode_then_decode_toggle() {
        let payload = ComponentPayload::new("plugins")
            .with_plugin("weather")
            .with_button("disable");
        let encoded = payload.encode();
        assert!(encoded.len() <= CUSTOM_ID_LIMIT);
        assert_eq!(ComponentPayload::decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_encode_omits_unset_fields() {
        let encoded = ComponentPayload::new("plugins").with_kind("selecter").encode();
        assert_eq!(encoded, r#"{"command":"plugins","type":"selecter"}"#);
    }
}
