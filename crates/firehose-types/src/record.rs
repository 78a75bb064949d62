use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One decoded firehose record.
///
/// Equality is structural over `id` and `text`. Every other field of the
/// wire payload is ignored during decode.
///
/// # Wire shape
///
/// ```text
/// ┌──────────┬──────────────────────────────────────────────────────┐
/// │ Field    │ Handling                                             │
/// ├──────────┼──────────────────────────────────────────────────────┤
/// │ id_str   │ Preferred identifier (string)                        │
/// │ id       │ Fallback identifier, string or number                │
/// │ text     │ Payload; absent or null decodes as ""                │
/// │ (others) │ Ignored                                              │
/// └──────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// Only a JSON object decodes; arrays and scalars are rejected even when
/// their elements would line up with the fields.
///
/// A record whose text is blank is a heartbeat or control message and
/// is never delivered to consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub id: String,
    pub text: String,
}

impl Record {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// `true` when the payload field carries non-whitespace text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.text)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ObjectVisitor)
    }
}

struct ObjectVisitor;

impl<'de> Visitor<'de> for ObjectVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, map: A) -> Result<Record, A::Error>
    where
        A: MapAccess<'de>,
    {
        WireRecord::deserialize(MapAccessDeserializer::new(map)).map(Record::from)
    }
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(default)]
    id_str: Option<String>,
    #[serde(default, deserialize_with = "id_value")]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Self {
            id: wire.id_str.or(wire.id).unwrap_or_default(),
            text: wire.text.unwrap_or_default(),
        }
    }
}

/// Numeric ids exceed what JavaScript clients can hold, which is why the
/// string form exists; accept either and keep the digits verbatim.
fn id_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
