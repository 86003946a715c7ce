//! Serialization for Record.
//!
//! Keys containing `@` are OData annotations (`@odata.etag`,
//! `Emails@odata.type`, ...) and are stored separately from data fields.
//! Serialization writes both back into a single flat object.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.annotations.len()))?;
        for (key, value) in &self.annotations {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object representing a record")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut fields = HashMap::new();
        let mut annotations = HashMap::new();

        while let Some((key, raw)) = access.next_entry::<String, serde_json::Value>()? {
            if key.contains('@') {
                annotations.insert(key, raw);
            } else {
                fields.insert(key, Value::from(raw));
            }
        }

        Ok(Record {
            fields,
            annotations,
        })
    }
}
