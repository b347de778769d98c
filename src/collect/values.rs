//! Typed field values collected for one in-progress request.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::catalog::{FieldSpec, TemplateDescriptor};

use super::validate::{validate_raw, ValidationError, DATE_FORMAT};

/// A validated value, stored typed so display formatting can be applied at
/// substitution time rather than at input time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(String),
    Date(NaiveDate),
    Number(i64),
}

impl FieldValue {
    /// Render the value the way it should appear in the document.
    pub fn display(&self) -> String {
        match self {
            Self::Text(v) | Self::Choice(v) => v.clone(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// User-supplied values for one template, scoped to a single request.
///
/// Fields with declared defaults count as filled; the default is resolved
/// when the value is read, so a later submission still overwrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValueSet {
    template_id: String,
    values: HashMap<String, FieldValue>,
}

impl FieldValueSet {
    /// Empty set keyed to a template's schema.
    pub fn start(descriptor: &TemplateDescriptor) -> Self {
        Self {
            template_id: descriptor.id.clone(),
            values: HashMap::new(),
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Validate and store one raw input. On error the set is left unchanged.
    /// Re-submitting an already-filled key overwrites it (last write wins).
    pub fn submit(
        &mut self,
        descriptor: &TemplateDescriptor,
        key: &str,
        raw: &str,
    ) -> Result<(), ValidationError> {
        let spec = descriptor
            .field(key)
            .ok_or_else(|| ValidationError::unknown_field(key))?;
        let value = validate_raw(spec, raw)?;
        self.values.insert(spec.key.clone(), value);
        Ok(())
    }

    /// True iff every field has a user value or a declared default.
    pub fn is_complete(&self, descriptor: &TemplateDescriptor) -> bool {
        descriptor
            .fields
            .iter()
            .all(|spec| self.values.contains_key(&spec.key) || spec.has_default())
    }

    /// Next field still needing an answer, in the template's declared order.
    /// `None` exactly when the set is complete.
    pub fn next_missing<'a>(&self, descriptor: &'a TemplateDescriptor) -> Option<&'a FieldSpec> {
        descriptor
            .fields
            .iter()
            .find(|spec| !self.values.contains_key(&spec.key) && !spec.has_default())
    }

    /// Resolved value for a field: the user's answer, or the default.
    pub fn resolved(&self, spec: &FieldSpec) -> Option<FieldValue> {
        if let Some(value) = self.values.get(&spec.key) {
            return Some(value.clone());
        }
        let default = spec.default.as_deref()?;
        if default.is_empty() {
            // Blank default: the field is deliberately left empty.
            return Some(FieldValue::Text(String::new()));
        }
        // Defaults are checked at catalog load, so this only fails for
        // descriptors built outside the loader.
        validate_raw(spec, default).ok()
    }

    /// (key, prompt, display value) triples for the review summary, in
    /// declared order. Unanswered fields show as a dash.
    pub fn summary(&self, descriptor: &TemplateDescriptor) -> Vec<(String, String, String)> {
        descriptor
            .fields
            .iter()
            .map(|spec| {
                let shown = self
                    .resolved(spec)
                    .map(|v| v.display())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "-".to_string());
                (spec.key.clone(), spec.prompt.clone(), shown)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldType;

    fn descriptor() -> TemplateDescriptor {
        TemplateDescriptor {
            id: "leave_request".to_string(),
            name: "Leave request".to_string(),
            fields: vec![
                FieldSpec {
                    key: "employee_name".to_string(),
                    prompt: "Employee full name:".to_string(),
                    field_type: FieldType::Text { pattern: None },
                    default: None,
                },
                FieldSpec {
                    key: "start_date".to_string(),
                    prompt: "First day of leave:".to_string(),
                    field_type: FieldType::Date,
                    default: None,
                },
                FieldSpec {
                    key: "days".to_string(),
                    prompt: "Number of days:".to_string(),
                    field_type: FieldType::Number {
                        min: Some(1),
                        max: Some(30),
                    },
                    default: None,
                },
                FieldSpec {
                    key: "comment".to_string(),
                    prompt: "Comment:".to_string(),
                    field_type: FieldType::Text { pattern: None },
                    default: Some(String::new()),
                },
            ],
            asset: String::new(),
        }
    }

    #[test]
    fn test_ordered_prompting() {
        let d = descriptor();
        let mut set = FieldValueSet::start(&d);
        assert_eq!(set.next_missing(&d).unwrap().key, "employee_name");

        set.submit(&d, "employee_name", "Ana").unwrap();
        assert_eq!(set.next_missing(&d).unwrap().key, "start_date");

        set.submit(&d, "start_date", "01.03.2024").unwrap();
        set.submit(&d, "days", "5").unwrap();
        assert!(set.is_complete(&d));
        assert!(set.next_missing(&d).is_none());
    }

    #[test]
    fn test_failed_submit_leaves_set_unchanged() {
        let d = descriptor();
        let mut set = FieldValueSet::start(&d);
        set.submit(&d, "employee_name", "Ana").unwrap();
        let before = set.clone();

        let err = set.submit(&d, "days", "40").unwrap_err();
        assert_eq!(err.field, "days");
        assert_eq!(set, before);
    }

    #[test]
    fn test_submit_is_idempotent() {
        let d = descriptor();
        let mut once = FieldValueSet::start(&d);
        once.submit(&d, "days", "5").unwrap();

        let mut twice = FieldValueSet::start(&d);
        twice.submit(&d, "days", "5").unwrap();
        twice.submit(&d, "days", "5").unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_resubmit_overwrites() {
        let d = descriptor();
        let mut set = FieldValueSet::start(&d);
        set.submit(&d, "employee_name", "Ana").unwrap();
        set.submit(&d, "employee_name", "Maria").unwrap();
        let spec = d.field("employee_name").unwrap();
        assert_eq!(set.resolved(spec).unwrap().display(), "Maria");
    }

    #[test]
    fn test_unknown_key() {
        let d = descriptor();
        let mut set = FieldValueSet::start(&d);
        assert!(set.submit(&d, "salary", "1000").is_err());
    }

    #[test]
    fn test_default_resolution_and_override() {
        let d = descriptor();
        let mut set = FieldValueSet::start(&d);
        let comment = d.field("comment").unwrap();
        assert_eq!(set.resolved(comment).unwrap(), FieldValue::Text(String::new()));

        set.submit(&d, "comment", "urgent").unwrap();
        assert_eq!(set.resolved(comment).unwrap().display(), "urgent");
    }
}
