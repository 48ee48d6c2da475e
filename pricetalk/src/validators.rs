use crate::{
    config::TextLimits,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::is_entity_id,
    types::EntityKind,
};

pub const CODE_REQUIRED: &str = "validation.required";
pub const CODE_LENGTH: &str = "validation.length";
pub const CODE_ID: &str = "validation.id";

/// Pushes an issue when `value` is blank or longer than `max` characters.
pub fn check_text(field: &str, value: &str, max: usize, issues: &mut Vec<ValidationIssue>) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, CODE_REQUIRED, format!("{field} is required")));
    } else if value.chars().count() > max {
        issues.push(ValidationIssue::new(
            field,
            CODE_LENGTH,
            format!("{field} must be at most {max} characters"),
        ));
    }
}

fn finish(issues: Vec<ValidationIssue>) -> ValidationResult<()> {
    if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
}

/// Rejects path identifiers the id generator could never have produced.
pub fn check_entity_id(kind: EntityKind, id: &str) -> ValidationResult<()> {
    if is_entity_id(id) {
        Ok(())
    } else {
        Err(ValidationError::single(
            format!("{kind}_id"),
            CODE_ID,
            format!("invalid {kind} id"),
        ))
    }
}

pub fn validate_new_post(title: &str, description: &str, limits: &TextLimits) -> ValidationResult<()> {
    let mut issues = Vec::new();
    check_text("title", title, limits.title_max, &mut issues);
    check_text("description", description, limits.text_max, &mut issues);
    finish(issues)
}

/// Every supplied field must be non-blank, and at least one must be supplied.
pub fn validate_post_edit(
    title: Option<&str>,
    description: Option<&str>,
    limits: &TextLimits,
) -> ValidationResult<()> {
    let mut issues = Vec::new();
    if title.is_none() && description.is_none() {
        issues.push(ValidationIssue::new(
            "title|description",
            CODE_REQUIRED,
            "title or description is required",
        ));
    }
    if let Some(title) = title {
        check_text("title", title, limits.title_max, &mut issues);
    }
    if let Some(description) = description {
        check_text("description", description, limits.text_max, &mut issues);
    }
    finish(issues)
}

/// Comment bodies and reply texts.
pub fn validate_body(field: &str, value: &str, limits: &TextLimits) -> ValidationResult<()> {
    let mut issues = Vec::new();
    check_text(field, value, limits.text_max, &mut issues);
    finish(issues)
}

/// Display names need a first name; the last name may be blank.
pub fn validate_profile(first_name: &str, last_name: &str, limits: &TextLimits) -> ValidationResult<()> {
    let mut issues = Vec::new();
    check_text("first_name", first_name, limits.title_max, &mut issues);
    if last_name.chars().count() > limits.title_max {
        check_text("last_name", last_name, limits.title_max, &mut issues);
    }
    finish(issues)
}
