//! Cat domain model.
//!
//! # Responsibility
//! - Define the persisted cat record and its create/replace/patch inputs.
//! - Normalize names, breed and salary before they reach storage.
//!
//! # Invariants
//! - `salary` always carries exactly two decimal places once normalized.
//! - A patch remembers every field the caller supplied, not only the ones core
//!   knows how to apply.

use crate::model::validation::{
    normalize_text, ValidationError, SALARY_DECIMAL_PLACES, SALARY_MAX_DIGITS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable cat identifier.
pub type CatId = Uuid;

/// Persisted spy cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: CatId,
    pub name: String,
    pub years_of_experience: u32,
    pub breed: String,
    /// Serialized as a decimal string, e.g. `"4500.00"`.
    pub salary: Decimal,
}

/// Full cat payload used by create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatDraft {
    pub name: String,
    pub years_of_experience: u32,
    pub breed: String,
    pub salary: Decimal,
}

impl CatDraft {
    /// Returns a trimmed, rescaled copy or the first field violation.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_text("name", &self.name)?,
            years_of_experience: self.years_of_experience,
            breed: normalize_text("breed", &self.breed)?,
            salary: normalize_salary(self.salary)?,
        })
    }
}

impl Cat {
    /// Creates a cat with a generated id from an already normalized draft.
    pub fn from_draft(draft: CatDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Builds a cat record for an existing id.
    pub fn with_id(id: CatId, draft: CatDraft) -> Self {
        Self {
            id,
            name: draft.name,
            years_of_experience: draft.years_of_experience,
            breed: draft.breed,
            salary: draft.salary,
        }
    }
}

/// Partial cat update.
///
/// `fields` lists every key present in the caller's payload, including keys
/// core does not recognize, so the salary-only guard can see them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatPatch {
    pub fields: Vec<String>,
    pub salary: Option<Decimal>,
}

impl CatPatch {
    /// Patch that only sets `salary`.
    pub fn salary(salary: Decimal) -> Self {
        Self {
            fields: vec!["salary".to_string()],
            salary: Some(salary),
        }
    }
}

/// Checks salary precision and rescales it to two decimal places.
pub fn normalize_salary(salary: Decimal) -> Result<Decimal, ValidationError> {
    let mut normalized = salary.normalize();
    if normalized.scale() > SALARY_DECIMAL_PLACES {
        return Err(ValidationError::SalaryPrecision);
    }

    let integer_digits = SALARY_MAX_DIGITS - SALARY_DECIMAL_PLACES;
    if normalized.abs() >= Decimal::from(10_i64.pow(integer_digits)) {
        return Err(ValidationError::SalaryTooLarge);
    }

    normalized.rescale(SALARY_DECIMAL_PLACES);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{normalize_salary, CatDraft};
    use crate::model::validation::ValidationError;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn salary_is_rescaled_to_two_places() {
        assert_eq!(normalize_salary(dec("4500")).unwrap().to_string(), "4500.00");
        assert_eq!(normalize_salary(dec("12.5")).unwrap().to_string(), "12.50");
        assert_eq!(normalize_salary(dec("7.100")).unwrap().to_string(), "7.10");
    }

    #[test]
    fn salary_rejects_extra_precision_and_overflow() {
        assert_eq!(
            normalize_salary(dec("1.005")).unwrap_err(),
            ValidationError::SalaryPrecision
        );
        assert!(normalize_salary(dec("99999999.99")).is_ok());
        assert_eq!(
            normalize_salary(dec("100000000")).unwrap_err(),
            ValidationError::SalaryTooLarge
        );
    }

    #[test]
    fn draft_normalization_trims_text_fields() {
        let draft = CatDraft {
            name: "  Agent Meow ".to_string(),
            years_of_experience: 3,
            breed: " Siberian".to_string(),
            salary: dec("4500"),
        };
        let normalized = draft.normalized().unwrap();
        assert_eq!(normalized.name, "Agent Meow");
        assert_eq!(normalized.breed, "Siberian");
        assert_eq!(normalized.salary.to_string(), "4500.00");
    }
}
