//! Clearance form types.
//!
//! The string forms must match the `form_type` TEXT values stored in the
//! `workflow_rules` and `clearance_requests` tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::types::DbId;

/// The category of clearance being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormType {
    /// Student leaving the university (graduation, withdrawal).
    Termination,
    /// Student requesting a replacement identity card.
    IdReplacement,
    /// Teacher/staff clearance; program-agnostic.
    StaffClearance,
}

/// All form types, in display order.
pub const ALL_FORM_TYPES: &[FormType] = &[
    FormType::Termination,
    FormType::IdReplacement,
    FormType::StaffClearance,
];

impl FormType {
    pub fn as_str(self) -> &'static str {
        match self {
            FormType::Termination => "TERMINATION",
            FormType::IdReplacement => "ID_REPLACEMENT",
            FormType::StaffClearance => "STAFF_CLEARANCE",
        }
    }

    /// Whether requests of this type are routed per academic program.
    pub fn requires_program(self) -> bool {
        !matches!(self, FormType::StaffClearance)
    }

    /// Check that `program_id` is present exactly when the form type needs one.
    pub fn validate_program(self, program_id: Option<DbId>) -> Result<(), WorkflowError> {
        match (self.requires_program(), program_id) {
            (true, None) => Err(WorkflowError::Validation(format!(
                "Form type {self} requires a program_id"
            ))),
            (false, Some(_)) => Err(WorkflowError::Validation(format!(
                "Form type {self} is program-agnostic and must not carry a program_id"
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_FORM_TYPES
            .iter()
            .copied()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "Invalid form type '{s}'. Must be one of: {}",
                    ALL_FORM_TYPES
                        .iter()
                        .map(|ft| ft.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_form_type() {
        for ft in ALL_FORM_TYPES {
            assert_eq!(ft.as_str().parse::<FormType>().unwrap(), *ft);
        }
    }

    #[test]
    fn unknown_form_type_lists_valid_values() {
        let err = "GRADUATION".parse::<FormType>().unwrap_err();
        assert!(err.to_string().contains("TERMINATION"));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&FormType::IdReplacement).unwrap();
        assert_eq!(json, "\"ID_REPLACEMENT\"");
    }

    #[test]
    fn student_forms_require_program() {
        assert!(FormType::Termination.validate_program(Some(1)).is_ok());
        assert!(FormType::Termination.validate_program(None).is_err());
    }

    #[test]
    fn staff_clearance_rejects_program() {
        assert!(FormType::StaffClearance.validate_program(None).is_ok());
        assert!(FormType::StaffClearance.validate_program(Some(3)).is_err());
    }
}
