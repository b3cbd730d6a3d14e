//! Canonical user record.
//!
//! The identity service owns the shape of a user, so the record is kept as
//! an opaque JSON object. A few accessors cover the fields the rest of the
//! application actually reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the field an envelope response wraps its payload in.
const ENVELOPE_FIELD: &str = "data";

/// Keys tried, in order, when picking something to show as the user's name.
const DISPLAY_NAME_KEYS: [&str; 4] = ["name", "displayName", "fullName", "email"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Normalize a `/api/auth/me` response body.
    ///
    /// `{ "data": { .. } }` and a bare `{ .. }` both yield the inner object.
    /// Returns `None` when there is no object to take.
    pub fn from_response(value: Value) -> Option<Self> {
        match value {
            Value::Object(mut outer) => match outer.remove(ENVELOPE_FIELD) {
                Some(Value::Object(inner)) => Some(Self(inner)),
                Some(other) => {
                    // `data` was a plain field of the user, not an envelope
                    outer.insert(ENVELOPE_FIELD.to_string(), other);
                    Some(Self(outer))
                }
                None => Some(Self(outer)),
            },
            _ => None,
        }
    }

    /// Shallow merge: top-level keys in `partial` overwrite ours, everything
    /// else is kept.
    pub fn merge(&mut self, partial: UserRecord) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    pub fn display_name(&self) -> Option<&str> {
        DISPLAY_NAME_KEYS
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
    }

    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }
}
