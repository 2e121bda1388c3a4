use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stored values for one field of a document: the normalized occurrences
/// used for comparison plus the not-normalized original column text kept for
/// reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredField {
    pub values: Vec<String>,
    pub original: String,
}

/// One indexed record, addressable by field name.
///
/// Multi-valued fields store one normalized value per occurrence; the
/// original keeps the whole raw column including occurrence separators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: HashMap<String, StoredField>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field. Replaces any previous content under the same name.
    pub fn push_field(
        &mut self,
        name: impl Into<String>,
        values: Vec<String>,
        original: impl Into<String>,
    ) {
        self.fields.insert(
            name.into(),
            StoredField {
                values,
                original: original.into(),
            },
        );
    }

    /// First normalized value of a field, if any.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|f| f.values.first())
            .map(String::as_str)
    }

    /// All normalized values of a field. Empty when the field is absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.fields
            .get(name)
            .map(|f| f.values.as_slice())
            .unwrap_or(&[])
    }

    /// Not-normalized original column text of a field.
    pub fn original(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .map(|f| f.original.as_str())
            .unwrap_or("")
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
