//! The wire message: a named payload carried as a two-element JSON array.
//!
//! ```text
//! ["greet", {"who": "world"}]
//!   ^name   ^content (any JSON value)
//! ```
//!
//! Outbound messages are always produced in this shape.  Inbound values are
//! checked with [`WireMessage::from_value`] before anything is dispatched;
//! a value that is not exactly `[string, any]` is rejected as
//! [`MalformedMessage`] and never reaches a message listener.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A decoded inbound value that does not have the `[name, content]` shape.
///
/// `rendered` holds the JSON text of the offending value so the diagnostic can
/// be logged or surfaced to the host without keeping the value alive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed message: '{rendered}'")]
pub struct MalformedMessage {
    pub rendered: String,
}

impl MalformedMessage {
    fn of(value: &Value) -> Self {
        Self {
            rendered: value.to_string(),
        }
    }
}

/// A logical message: a string name plus an arbitrary JSON payload.
///
/// Serializes as the tuple `(name, content)`, which `serde_json` renders as a
/// two-element array, so the derive gives exactly the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage(pub String, pub Value);

impl WireMessage {
    /// Creates a message from a name and an already-converted payload.
    pub fn new(name: impl Into<String>, content: Value) -> Self {
        Self(name.into(), content)
    }

    /// The message name (element 0 on the wire).
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The message payload (element 1 on the wire).
    pub fn content(&self) -> &Value {
        &self.1
    }

    /// Splits the message into its name and payload.
    pub fn into_parts(self) -> (String, Value) {
        (self.0, self.1)
    }

    /// Validates the shape of a decoded inbound value.
    ///
    /// Accepts only a JSON array of length exactly 2 whose first element is a
    /// string.  Everything else, including `null`, bare strings, objects and
    /// arrays of the wrong length, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedMessage`] carrying the JSON rendering of `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use msgbridge_core::WireMessage;
    /// use serde_json::json;
    ///
    /// let msg = WireMessage::from_value(json!(["greet", {"who": "world"}])).unwrap();
    /// assert_eq!(msg.name(), "greet");
    ///
    /// assert!(WireMessage::from_value(json!([42, "x"])).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self, MalformedMessage> {
        match value {
            Value::Array(items) => match <[Value; 2]>::try_from(items) {
                Ok([Value::String(name), content]) => Ok(Self(name, content)),
                Ok(pair) => Err(MalformedMessage::of(&Value::Array(Vec::from(pair)))),
                Err(items) => Err(MalformedMessage::of(&Value::Array(items))),
            },
            other => Err(MalformedMessage::of(&other)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_accepts_name_and_object() {
        // Arrange
        let value = json!(["greet", {"who": "world"}]);

        // Act
        let msg = WireMessage::from_value(value).unwrap();

        // Assert
        assert_eq!(msg.name(), "greet");
        assert_eq!(msg.content(), &json!({"who": "world"}));
    }

    #[test]
    fn test_from_value_accepts_null_content() {
        let msg = WireMessage::from_value(json!(["ping", null])).unwrap();
        assert_eq!(msg.content(), &Value::Null);
    }

    #[test]
    fn test_from_value_rejects_bare_string() {
        let err = WireMessage::from_value(json!("hello")).unwrap_err();
        assert_eq!(err.rendered, "\"hello\"");
    }

    #[test]
    fn test_from_value_rejects_single_element_array() {
        let err = WireMessage::from_value(json!(["ok"])).unwrap_err();
        assert_eq!(err.rendered, "[\"ok\"]");
    }

    #[test]
    fn test_from_value_rejects_three_element_array() {
        assert!(WireMessage::from_value(json!(["a", 1, 2])).is_err());
    }

    #[test]
    fn test_from_value_rejects_numeric_name() {
        let err = WireMessage::from_value(json!([42, "x"])).unwrap_err();
        assert_eq!(err.rendered, "[42,\"x\"]");
    }

    #[test]
    fn test_from_value_rejects_object() {
        assert!(WireMessage::from_value(json!({"name": "greet"})).is_err());
    }

    #[test]
    fn test_malformed_display_quotes_rendering() {
        let err = WireMessage::from_value(json!(["ok"])).unwrap_err();
        assert_eq!(err.to_string(), "Malformed message: '[\"ok\"]'");
    }

    #[test]
    fn test_serializes_as_two_element_array() {
        let msg = WireMessage::new("greet", json!({"who": "world"}));
        let text = serde_json::to_string(&msg).unwrap();
        assert_eq!(text, r#"["greet",{"who":"world"}]"#);
    }

    #[test]
    fn test_into_parts_returns_name_and_content() {
        let (name, content) = WireMessage::new("n", json!(7)).into_parts();
        assert_eq!(name, "n");
        assert_eq!(content, json!(7));
    }
}
