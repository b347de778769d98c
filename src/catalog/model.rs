//! Template descriptor and field schema types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Value type of a single template field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldType {
    /// Free text. Optionally constrained by a regex `pattern`.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    /// One of a declared set of allowed values (case-sensitive exact match).
    Choice { options: Vec<String> },
    /// Calendar date in `DD.MM.YYYY`.
    Date,
    /// Whole number, optionally bounded by an inclusive range.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
}

impl FieldType {
    /// Short label used in prompts and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Choice { .. } => "choice",
            Self::Date => "date",
            Self::Number { .. } => "number",
        }
    }
}

/// Declared schema for one field of a template.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldSpec {
    /// Unique within one template; matches a `{{ key }}` placeholder in the asset.
    pub key: String,
    /// Question shown to the user when this field is collected.
    pub prompt: String,
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Raw default applied when the user never supplies a value. An empty
    /// string means "left blank" and is only meaningful for text fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Schema file (`<id>.json`) as stored in the template directory.
#[derive(Debug, Deserialize)]
pub struct TemplateSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/// One loadable document template: its identity, field schema (in prompt
/// order), and the text asset with `{{ key }}` placeholders.
///
/// Immutable after catalog load.
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub asset: String,
}

impl TemplateDescriptor {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_deserialization() {
        let json = r#"{
            "name": "Leave request",
            "fields": [
                { "key": "employee_name", "prompt": "Employee full name:", "type": "text" },
                { "key": "start_date", "prompt": "First day of leave:", "type": "date" },
                { "key": "days", "prompt": "Number of days:", "type": "number", "min": 1, "max": 30 }
            ]
        }"#;

        let schema: TemplateSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.name, "Leave request");
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(
            schema.fields[2].field_type,
            FieldType::Number {
                min: Some(1),
                max: Some(30)
            }
        );
        assert!(!schema.fields[0].has_default());
    }

    #[test]
    fn test_choice_deserialization() {
        let json = r#"{ "key": "stages", "prompt": "Payment stages?", "type": "choice", "options": ["1", "2"], "default": "1" }"#;
        let spec: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(
            spec.field_type,
            FieldType::Choice {
                options: vec!["1".to_string(), "2".to_string()]
            }
        );
        assert_eq!(spec.default.as_deref(), Some("1"));
    }
}
