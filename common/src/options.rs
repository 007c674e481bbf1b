//! Named option tables (activity lists, subject lists, ...)
//!
//! Tables are imported and exported as plain JSON arrays. Rows are kept as
//! raw JSON: the only check on import is that the document is an array.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTable {
    pub name: String,
    pub rows: Vec<Value>,
}

impl OptionTable {
    /// Parse an imported document. Anything but an array is rejected and
    /// nothing is returned.
    pub fn import(name: &str, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Array(rows) => Ok(Self {
                name: name.to_string(),
                rows,
            }),
            other => Err(Error::Import(format!(
                "الجدول \"{}\" يجب أن يكون قائمة، وجدنا {}",
                name,
                json_kind(&other)
            ))),
        }
    }

    /// Pretty-printed array, the format accepted by [`OptionTable::import`]
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
