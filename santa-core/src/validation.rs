//! Record Validation - Rules Produce Violations
//!
//! Rules inspect one record and report what is wrong with it.
//! The validator turns the violations into a single error.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SantaError};
use crate::records::ChildRecord;
use crate::templates::Slot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: String,
    pub message: String,
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, record: &ChildRecord) -> Vec<ValidationViolation>;
}

/// Every text slot must have a value.
pub struct RequiredFieldsRule;

impl ValidationRule for RequiredFieldsRule {
    fn name(&self) -> &'static str { "required_fields" }

    fn validate(&self, record: &ChildRecord) -> Vec<ValidationViolation> {
        Slot::TEXT
            .into_iter()
            .filter(|slot| record.field(*slot).is_none())
            .map(|slot| ValidationViolation {
                rule: self.name().to_string(),
                field: slot.key().to_string(),
                message: format!("'{}' is required", slot.key()),
            })
            .collect()
    }
}

/// Output names must stay inside the output directory.
pub struct FilenameRule;

impl ValidationRule for FilenameRule {
    fn name(&self) -> &'static str { "filename" }

    fn validate(&self, record: &ChildRecord) -> Vec<ValidationViolation> {
        let name = record.filename.as_str();
        let bad = name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\');

        if bad {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                field: "filename".to_string(),
                message: format!("{name:?} is not a plain file name"),
            }]
        } else {
            vec![]
        }
    }
}

/// Validator runs every rule against a record.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(RequiredFieldsRule), Box::new(FilenameRule)],
        }
    }

    pub fn violations(&self, record: &ChildRecord) -> Vec<ValidationViolation> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(record))
            .collect()
    }

    /// Missing fields win over filename problems so the operator sees
    /// every absent field at once.
    pub fn validate(&self, record: &ChildRecord) -> Result<()> {
        let violations = self.violations(record);

        let missing: Vec<String> = violations
            .iter()
            .filter(|v| v.rule == RequiredFieldsRule.name())
            .map(|v| v.field.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SantaError::MissingFields {
                record: record.label().to_string(),
                fields: missing,
            });
        }

        if violations.iter().any(|v| v.rule == FilenameRule.name()) {
            return Err(SantaError::InvalidFilename {
                record: record.label().to_string(),
                filename: record.filename.clone(),
            });
        }

        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
