//! Structural validation of untrusted résumé JSON (model output, uploads).
//!
//! Produces a tagged result naming the first offending field path instead of
//! failing with a bare parse error.

use serde_json::Value;

use crate::resume::models::ResumeData;

pub const REQUIRED_SECTIONS: &[&str] = &["header", "about", "education", "skills", "intern", "projects"];

const REQUIRED_OBJECTS: &[&str] = &["/header/contact", "/header/jobInfo"];

const REQUIRED_ARRAYS: &[&str] = &["/skills/items", "/projects/items", "/intern/items"];

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaCheck {
    Valid(ResumeData),
    Invalid { path: String, reason: String },
}

impl SchemaCheck {
    fn invalid(path: &str, reason: impl Into<String>) -> Self {
        SchemaCheck::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn into_result(self) -> Result<ResumeData, String> {
        match self {
            SchemaCheck::Valid(data) => Ok(data),
            SchemaCheck::Invalid { path, reason } => Err(format!("{path}: {reason}")),
        }
    }
}

pub fn validate_resume(value: &Value) -> SchemaCheck {
    let Some(root) = value.as_object() else {
        return SchemaCheck::invalid("/", "résumé must be a JSON object");
    };

    for section in REQUIRED_SECTIONS {
        match root.get(*section) {
            Some(v) if v.is_object() => {}
            Some(_) => return SchemaCheck::invalid(&format!("/{section}"), "must be an object"),
            None => {
                return SchemaCheck::invalid(&format!("/{section}"), "required section is missing")
            }
        }
    }

    for path in REQUIRED_OBJECTS {
        if !value.pointer(path).is_some_and(Value::is_object) {
            return SchemaCheck::invalid(path, "must be an object");
        }
    }

    for path in REQUIRED_ARRAYS {
        if !value.pointer(path).is_some_and(Value::is_array) {
            return SchemaCheck::invalid(path, "must be an array");
        }
    }

    match serde_json::from_value::<ResumeData>(value.clone()) {
        Ok(data) => SchemaCheck::Valid(data),
        Err(e) => SchemaCheck::invalid("/", e.to_string()),
    }
}
