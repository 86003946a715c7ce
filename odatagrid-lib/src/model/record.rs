//! Dynamic record

use std::collections::HashMap;

use super::Value;

/// A record returned by the upstream service.
///
/// Records are opaque: the grid only looks up the keys its columns declare.
/// OData annotations (`@odata.etag`, `Field@odata.type`, ...) are kept apart
/// from regular fields so they never show up as data.
///
/// # Example
///
/// ```
/// use odatagrid_lib::model::Record;
///
/// let record = Record::new()
///     .set("UserName", "russellwhyte")
///     .set("Age", 30i64);
///
/// assert_eq!(record.get_string("UserName"), Some("russellwhyte"));
/// assert_eq!(record.display("Missing"), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// The field values.
    pub(crate) fields: HashMap<String, Value>,

    /// OData annotations attached to the record.
    pub(crate) annotations: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, returning the record (builder style).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the field as a string slice, if it is a string.
    pub fn get_string(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns the display text for a field; missing or null fields yield `""`.
    pub fn display(&self, field: &str) -> String {
        self.get(field).map(Value::to_display).unwrap_or_default()
    }

    /// Returns the number of data fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no data fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
