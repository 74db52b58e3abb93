use serde_json::Value;

use crate::FieldType;

/// A raw field value paired with the type its content type declares for it.
///
/// `data_type` is `None` when no matching descriptor was found. That is an
/// ordinary outcome of resolution, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryField {
    value: Option<Value>,
    data_type: Option<FieldType>,
}

impl EntryField {
    pub fn new(value: Option<Value>) -> Self {
        Self { value, data_type: None }
    }

    pub fn with_data_type(mut self, data_type: Option<FieldType>) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn data_type(&self) -> Option<FieldType> {
        self.data_type
    }
}
