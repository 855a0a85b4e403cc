//! # Event
//!
//! The [`Event`] is the unit of communication at the bus boundary: an
//! immutable named message carrying a `type` string and an optional payload.
//! Events have no identity beyond `event_type` + `payload` and are never
//! mutated after creation.
//!
//! The correlation protocol trusts nothing but the event type string: a
//! request event and the lifecycle events that conclude it share a base name
//! and differ only in their suffix (see [`crate::suffix`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named message flowing through the event bus.
///
/// ## Example
///
/// ```rust
/// use reqrelay::{Event, Value};
///
/// let request = Event::with_payload("GET_USER_REQUESTED", Value::from("1"));
/// let fire_and_forget = Event::new("CACHE_FLUSHED");
/// # let _ = (request, fire_and_forget);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// The event type string; determines routing and correlation.
    pub event_type: String,
    /// Optional payload data.
    pub payload: Option<Value>,
}

impl Event {
    /// Creates an event with no payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: None,
        }
    }

    /// Creates an event carrying a payload.
    pub fn with_payload(event_type: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Some(payload.into()),
        }
    }
}

/// Payload value type.
///
/// A small self-describing value so callers are not forced onto a concrete
/// serialization format. The [`Value::Error`] variant lets a failure event
/// carry a proper error value as its payload; when it does, the correlation
/// engine surfaces that message verbatim instead of a generic one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// An error value, e.g. the payload of a `*_FAILED` event.
    Error(String),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<HashMap<String, Value>>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_constructors() {
        let plain = Event::new("TICK");
        assert_eq!(plain.event_type, "TICK");
        assert_eq!(plain.payload, None);

        let with_payload = Event::with_payload("GET_USER_REQUESTED", "1");
        assert_eq!(
            with_payload.payload,
            Some(Value::String("1".to_string()))
        );
    }

    #[test]
    fn test_value_from_json() {
        let json = serde_json::json!({
            "id": "1",
            "count": 3,
            "tags": ["a", "b"],
        });
        let value = Value::from(json);
        match value {
            Value::Map(fields) => {
                assert_eq!(fields["id"], Value::String("1".to_string()));
                assert_eq!(fields["count"], Value::Integer(3));
                assert_eq!(
                    fields["tags"],
                    Value::List(vec![
                        Value::String("a".to_string()),
                        Value::String("b".to_string())
                    ])
                );
            }
            other => panic!("expected map, got {:?}", other),
        }
    }
}
