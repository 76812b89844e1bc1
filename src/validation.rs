//! Input validation for cover-planning problems.
//!
//! Checks structural integrity of classes and the teacher roster before
//! the session space is built. Detects:
//! - Duplicate IDs
//! - Eligibility entries naming unknown classes
//! - Period numbers that are not 1-based
//! - Repeated timetable entries
//!
//! Every problem is reported, not just the first one.

use crate::models::CoverInputs;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A teacher is eligible for a class that doesn't exist.
    InvalidClassReference,
    /// A period number is 0.
    InvalidPeriod,
    /// The same weekday/period appears twice in a timetable.
    DuplicateSlot,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input datasets of a run.
///
/// Checks:
/// 1. No duplicate class IDs
/// 2. No duplicate teacher IDs
/// 3. Timetable periods are 1-based and not repeated
/// 4. Availability periods are 1-based
/// 5. Every eligible class of a teacher exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_inputs(inputs: &CoverInputs) -> ValidationResult {
    let mut errors = Vec::new();

    let mut class_ids = HashSet::new();
    for class in &inputs.classes {
        if !class_ids.insert(class.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {}", class.id),
            ));
        }

        let mut seen_slots = HashSet::new();
        for slot in &class.timetable {
            if slot.period == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPeriod,
                    format!("Class '{}' has period 0 on {}", class.id, slot.weekday),
                ));
            }
            if !seen_slots.insert((slot.weekday, slot.period)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateSlot,
                    format!(
                        "Class '{}' lists {} period {} twice",
                        class.id, slot.weekday, slot.period
                    ),
                ));
            }
        }
    }

    let mut teacher_ids = HashSet::new();
    for teacher in &inputs.teachers {
        if !teacher_ids.insert(teacher.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", teacher.id),
            ));
        }

        for class_id in &teacher.eligible_classes {
            if !class_ids.contains(class_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidClassReference,
                    format!(
                        "Teacher '{}' is eligible for unknown class '{}'",
                        teacher.id, class_id
                    ),
                ));
            }
        }

        let weekly_zero = teacher.availability.weekly.iter().any(|w| w.period == 0);
        let dated_zero = teacher
            .availability
            .dated
            .iter()
            .any(|d| d.period == Some(0));
        if weekly_zero || dated_zero {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeriod,
                format!("Teacher '{}' has availability for period 0", teacher.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
