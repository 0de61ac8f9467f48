use crate::config::LimitsConfig;
use cachette_types::Secret;
use thiserror::Error;

/// Payload constraint violations.
///
/// Raised before any backing-store call; a payload that fails here never
/// leaves the process. Offending fields are reported by position, not
/// content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("secret must have at least {min} field(s), got {actual}")]
    TooFewFields { min: usize, actual: usize },

    #[error("secret name is too long (max {max} characters)")]
    NameTooLong { max: usize },

    #[error("name of field {index} is too long (max {max} characters)")]
    FieldNameTooLong { index: usize, max: usize },

    #[error("value of field {index} is too long (max {max} characters)")]
    FieldValueTooLong { index: usize, max: usize },
}

/// Check a payload against the configured limits.
pub fn validate_secret(secret: &Secret, limits: &LimitsConfig) -> Result<(), ValidationError> {
    let max = limits.max_string_len;

    if secret.name.chars().count() > max {
        return Err(ValidationError::NameTooLong { max });
    }

    if secret.fields.len() < limits.min_fields {
        return Err(ValidationError::TooFewFields {
            min: limits.min_fields,
            actual: secret.fields.len(),
        });
    }

    for (index, field) in secret.fields.iter().enumerate() {
        if field.name.chars().count() > max {
            return Err(ValidationError::FieldNameTooLong { index, max });
        }
        if field.value.chars().count() > max {
            return Err(ValidationError::FieldValueTooLong { index, max });
        }
    }

    Ok(())
}
