//! Field-level validation helpers.
//!
//! Request DTOs derive [`validator::Validate`]; this module flattens the
//! resulting [`ValidationErrors`] into the `[{field, message}]` list the API
//! returns, and hosts the small custom validators shared across DTOs.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// A single rejected field, reported to clients as `{field, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::InvalidFields(field_errors(&errors))
    }
}

/// Flatten validator output into one [`FieldError`] per failed rule.
///
/// Field names are reported in camelCase to match the wire format. Nested
/// struct and list errors are prefixed with their parent field. Output is
/// sorted by field name so responses are deterministic.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, None, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(p) => format!("{p}.{}", to_camel_case(field)),
            None => to_camel_case(field),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    out.push(FieldError::new(name.clone(), message_for(err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&name), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, Some(&format!("{name}[{idx}]")), out);
                }
            }
        }
    }
}

fn message_for(err: &ValidationError) -> String {
    match &err.message {
        Some(msg) => msg.to_string(),
        None => format!("Invalid value ({})", err.code),
    }
}

/// Convert a `snake_case` identifier to `camelCase`. Already-camel input is
/// returned unchanged.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Build a [`ValidationError`] carrying a human-readable message.
pub fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validate that a string is one of a fixed set of values.
///
/// An empty value is reported as missing rather than as an unknown choice.
pub fn validate_choice(value: &str, valid: &[&str], label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", format!("{label} is required")));
    }
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_choice",
            format!("Invalid {label} '{value}'. Must be one of: {}", valid.join(", ")),
        ))
    }
}

/// Monetary amounts must be strictly positive.
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(invalid("range", "Amount must be greater than zero"))
    }
}

/// Monetary amounts that may be zero but never negative.
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(invalid("range", "Amount must not be negative"))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
