//! Domain Services
//!
//! Pure logic: the progress projection and per-field validation of the
//! submission payload.

use crate::domain::value_objects::{
    ApplicationStatus, ProgressStep, StepKind, StepState,
};
use crate::error::{AccreditationError, FieldViolation};

pub const CENTER_NAME_MAX: usize = 200;
pub const MANAGER_NAME_MAX: usize = 120;
pub const CITY_MAX: usize = 80;

/// Derive the five-step visual progress projection from the status.
///
/// Computed per call from the authoritative status field; nothing is
/// persisted. A rejected application does not record which stage the
/// rejection happened at, so the projection applies one policy
/// uniformly: steps 1-3 completed, evaluation and decision rejected.
pub fn progress_steps(status: ApplicationStatus) -> [ProgressStep; 5] {
    use StepState::*;

    let states = match status {
        ApplicationStatus::Submitted => [Current, Pending, Pending, Pending, Pending],
        ApplicationStatus::UnderReview => [Completed, Current, Pending, Pending, Pending],
        ApplicationStatus::FieldVisit => [Completed, Completed, Current, Pending, Pending],
        ApplicationStatus::UnderEvaluation => [Completed, Completed, Completed, Current, Pending],
        ApplicationStatus::Accepted => [Completed, Completed, Completed, Completed, Completed],
        ApplicationStatus::Rejected => [Completed, Completed, Completed, Rejected, Rejected],
    };

    let mut steps = [ProgressStep {
        id: 0,
        kind: StepKind::Submission,
        state: Pending,
    }; 5];

    for (index, (kind, state)) in StepKind::ALL.into_iter().zip(states).enumerate() {
        steps[index] = ProgressStep {
            id: index as u8 + 1,
            kind,
            state,
        };
    }

    steps
}

/// Validate the editable application fields, collecting every violation.
pub fn validate_fields(
    center_name: &str,
    manager_name: &str,
    city: &str,
) -> Result<(), AccreditationError> {
    let mut violations = Vec::new();

    check_field(&mut violations, "centerName", center_name, CENTER_NAME_MAX);
    check_field(&mut violations, "managerName", manager_name, MANAGER_NAME_MAX);
    check_field(&mut violations, "city", city, CITY_MAX);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AccreditationError::Validation(violations))
    }
}

fn check_field(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(FieldViolation {
            field,
            message: "must not be empty".to_string(),
        });
    } else if trimmed.chars().count() > max_chars {
        violations.push(FieldViolation {
            field,
            message: format!("must be at most {max_chars} characters"),
        });
    }
}
