use crate::errors::{BulkError, Result};
use crate::models::row::{trim_cell, Row};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// Jira custom field types a column can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    MultiSelect,
    MultiUserPicker,
    NumberField,
    SelectList,
    UserPicker,
}

impl FromStr for ConversionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "MultiSelect" | "multi-select" => Ok(ConversionKind::MultiSelect),
            "MultiUserPicker" | "multi-user-picker" => Ok(ConversionKind::MultiUserPicker),
            "NumberField" | "number" => Ok(ConversionKind::NumberField),
            "SelectList" | "single-select" => Ok(ConversionKind::SelectList),
            "UserPicker" | "user-picker" => Ok(ConversionKind::UserPicker),
            other => Err(other.to_string()),
        }
    }
}

impl ConversionKind {
    pub fn convert(self, field: &str, value: &str) -> Result<Value> {
        let converted = match self {
            ConversionKind::MultiSelect => split_selection(value, "value"),
            ConversionKind::MultiUserPicker => split_selection(value, "name"),
            ConversionKind::NumberField => {
                let number = value.parse::<i64>().map_err(|_| BulkError::InvalidNumber {
                    field: field.to_string(),
                    value: value.to_string(),
                })?;
                Value::from(number)
            }
            ConversionKind::SelectList => json!({ "value": value }),
            ConversionKind::UserPicker => json!({ "name": value }),
        };

        Ok(converted)
    }
}

/// Shape used for fields without a declared conversion.
fn default_shape(field: &str, value: &str) -> Value {
    match field {
        "assignee" | "issuetype" => json!({ "name": value }),
        "components" => json!([{ "name": value }]),
        "project" => json!({ "key": value }),
        _ => Value::String(value.to_string()),
    }
}

fn split_selection(value: &str, key: &str) -> Value {
    value
        .split(',')
        .map(|token| {
            let mut selection = Map::new();
            selection.insert(key.to_string(), Value::from(trim_cell(token)));
            Value::Object(selection)
        })
        .collect()
}

/// Turns a normalized row into the `fields` object of an issue-creation request.
pub fn convert_row(
    row: &Row,
    conversions: &HashMap<String, ConversionKind>,
) -> Result<Map<String, Value>> {
    let mut fields = Map::new();

    for (field, value) in row {
        let converted = match conversions.get(field) {
            Some(kind) => kind.convert(field, value)?,
            None => default_shape(field, value),
        };
        fields.insert(field.clone(), converted);
    }

    Ok(fields)
}
