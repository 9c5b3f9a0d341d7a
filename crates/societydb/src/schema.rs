//! # Section Schemas
//!
//! A schema is nothing more than a JSON object of defaults, one per section, stored at
//! `<base>/schemas/<section>.json`:
//!
//! ```json
//! { "title": "", "category": "general", "body": "", "attachment": null }
//! ```
//!
//! It does two jobs:
//!
//! - **Defaults**: [`Schema::merge`] starts from the defaults and overlays submitted
//!   data, so a create only needs to send what differs.
//! - **Presence validation**: every key whose default is non-null is required. After
//!   merging, a required key must hold something other than `null` or a blank string.
//!   In the example above `title` and `body` must be supplied, `category` is satisfied
//!   by its default, and `attachment` is optional.
//!
//! There is no type checking. A missing schema file means "no defaults, nothing
//! required".

use crate::error::{Result, SocietyError};
use crate::model::Section;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    defaults: Map<String, Value>,
}

impl Schema {
    pub fn new(defaults: Map<String, Value>) -> Self {
        Self { defaults }
    }

    /// Builds a schema from a parsed schema file. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(defaults) => Some(Self::new(defaults)),
            _ => None,
        }
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }

    /// Keys whose default is non-null, in schema order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.defaults
            .iter()
            .filter(|(_, default)| !default.is_null())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Defaults overlaid with `data`. Submitted values win, including explicit nulls.
    pub fn merge(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = self.defaults.clone();
        for (key, value) in data {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn validate(&self, section: Section, merged: &Map<String, Value>) -> Result<()> {
        let missing: Vec<String> = self
            .required_fields()
            .into_iter()
            .filter(|key| !is_present(merged.get(*key)))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SocietyError::Validation { section, missing })
        }
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notice_schema() -> Schema {
        Schema::from_value(json!({
            "title": "",
            "category": "general",
            "body": "",
            "attachment": null
        }))
        .unwrap()
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_fields_are_non_null_defaults() {
        assert_eq!(
            notice_schema().required_fields(),
            vec!["title", "category", "body"]
        );
    }

    #[test]
    fn test_merge_prefers_submitted_values() {
        let merged = notice_schema().merge(&obj(json!({"title": "Lift repair", "extra": 1})));
        assert_eq!(merged["title"], "Lift repair");
        assert_eq!(merged["category"], "general");
        assert_eq!(merged["attachment"], Value::Null);
        assert_eq!(merged["extra"], 1);
    }

    #[test]
    fn test_merge_keeps_explicit_null() {
        let merged = notice_schema().merge(&obj(json!({"category": null})));
        assert_eq!(merged["category"], Value::Null);
    }

    #[test]
    fn test_validate_lists_every_missing_field() {
        let schema = notice_schema();
        let merged = schema.merge(&obj(json!({"title": "  ", "category": null})));
        match schema.validate(Section::Notices, &merged) {
            Err(SocietyError::Validation { section, missing }) => {
                assert_eq!(section, Section::Notices);
                assert_eq!(missing, vec!["title", "category", "body"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_passes_when_complete() {
        let schema = notice_schema();
        let merged = schema.merge(&obj(json!({"title": "Lift repair", "body": "Thursday"})));
        assert!(schema.validate(Section::Notices, &merged).is_ok());
    }

    #[test]
    fn test_non_string_values_count_as_present() {
        let schema = Schema::from_value(json!({"capacity": 0, "public": false})).unwrap();
        let merged = schema.merge(&Map::new());
        assert!(schema.validate(Section::Events, &merged).is_ok());
    }

    #[test]
    fn test_empty_schema_requires_nothing() {
        let schema = Schema::default();
        assert!(schema.is_empty());
        assert!(schema.validate(Section::Gallery, &Map::new()).is_ok());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Schema::from_value(json!([1, 2])).is_none());
        assert!(Schema::from_value(json!("title")).is_none());
    }
}
