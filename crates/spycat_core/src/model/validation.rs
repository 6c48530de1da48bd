//! Field-level validation errors shared by model input types.

use crate::model::mission::TargetId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length for short text fields (names, breed, country).
pub const MAX_TEXT_CHARS: usize = 100;
/// Total decimal digits allowed in a salary.
pub const SALARY_MAX_DIGITS: u32 = 10;
/// Decimal places allowed in a salary.
pub const SALARY_DECIMAL_PLACES: u32 = 2;

/// Field-level validation failure for model inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text field is empty after trim.
    Blank { field: &'static str },
    /// Text field exceeds `max_chars` characters.
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Required field was not supplied.
    Missing { field: &'static str },
    /// Salary has more than two decimal places.
    SalaryPrecision,
    /// Salary does not fit ten digits.
    SalaryTooLarge,
    /// Same target id listed more than once in one payload.
    DuplicateTargetId(TargetId),
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::TooLong { field, .. } | Self::Missing { field } => field,
            Self::SalaryPrecision | Self::SalaryTooLarge => "salary",
            Self::DuplicateTargetId(_) => "targets",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "`{field}` must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "`{field}` must be at most {max_chars} characters")
            }
            Self::Missing { field } => write!(f, "`{field}` is required"),
            Self::SalaryPrecision => write!(
                f,
                "salary must have at most {SALARY_DECIMAL_PLACES} decimal places"
            ),
            Self::SalaryTooLarge => {
                write!(f, "salary must have at most {SALARY_MAX_DIGITS} digits")
            }
            Self::DuplicateTargetId(id) => write!(f, "target {id} is listed more than once"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and enforces the non-blank/length contract.
pub(crate) fn normalize_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max_chars: MAX_TEXT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
