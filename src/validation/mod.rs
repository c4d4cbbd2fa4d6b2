//! Validation Module
//!
//! Pluggable field validation consumed by both stores.
//!
//! ## Responsibilities
//! - Reject caller-supplied fields before any mutation happens
//! - Compose independent rule objects into one validator
//! - Provide the `default` and `custom` rule sets

mod rules;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::ValidationRules;
use crate::error::{CabinetError, Result};
use crate::record::RecordFields;

pub use rules::{
    AnnualIncomeValidator, DateOfBirthValidator, FirstNameValidator, LastNameValidator,
    LicenseCategoryValidator, WorkingHoursValidator,
};

/// Validates record fields; `Err(CabinetError::Validation)` on a violation
pub trait RecordValidator: Send {
    fn validate(&self, fields: &RecordFields) -> Result<()>;
}

/// Runs a list of rules in order, stopping at the first violation
#[derive(Default)]
pub struct CompositeValidator {
    rules: Vec<Box<dyn RecordValidator>>,
}

impl CompositeValidator {
    pub fn new(rules: Vec<Box<dyn RecordValidator>>) -> Self {
        Self { rules }
    }

    /// Number of rules in the chain
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RecordValidator for CompositeValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        for rule in &self.rules {
            rule.validate(fields)?;
        }
        Ok(())
    }
}

/// Builder chaining rule objects into a `CompositeValidator`
#[derive(Default)]
pub struct ValidatorBuilder {
    rules: Vec<Box<dyn RecordValidator>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(self, min: usize, max: usize) -> Self {
        self.rule(FirstNameValidator::new(min, max))
    }

    pub fn last_name(self, min: usize, max: usize) -> Self {
        self.rule(LastNameValidator::new(min, max))
    }

    pub fn date_of_birth(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.rule(DateOfBirthValidator::new(from, to))
    }

    pub fn working_hours(self, min: i16, max: i16) -> Self {
        self.rule(WorkingHoursValidator::new(min, max))
    }

    pub fn annual_income(self, min: Decimal, max: Decimal) -> Self {
        self.rule(AnnualIncomeValidator::new(min, max))
    }

    pub fn license_categories(self, allowed: &[char]) -> Self {
        self.rule(LicenseCategoryValidator::new(allowed))
    }

    /// Append an arbitrary rule
    pub fn rule(mut self, rule: impl RecordValidator + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn build(self) -> CompositeValidator {
        CompositeValidator::new(self.rules)
    }

    /// The `default` rule set
    pub fn create_default() -> CompositeValidator {
        Self::new()
            .first_name(2, 60)
            .last_name(2, 60)
            .date_of_birth(ymd(1950, 1, 1), today())
            .working_hours(1, 168)
            .annual_income(Decimal::ZERO, Decimal::from(10_000_000))
            .license_categories(&['A', 'B', 'C', 'D'])
            .build()
    }

    /// The `custom` rule set
    pub fn create_custom() -> CompositeValidator {
        Self::new()
            .first_name(2, 30)
            .last_name(2, 30)
            .date_of_birth(ymd(1930, 1, 1), today())
            .working_hours(10, 60)
            .annual_income(Decimal::from(500), Decimal::from(1_000_000))
            .license_categories(&['A', 'B', 'C', 'D', 'E'])
            .build()
    }
}

/// Build the validator for a configured rule set
pub fn validator_for(rules: ValidationRules) -> Box<dyn RecordValidator> {
    match rules {
        ValidationRules::Default => Box::new(ValidatorBuilder::create_default()),
        ValidationRules::Custom => Box::new(ValidatorBuilder::create_custom()),
    }
}

/// Limits of the binary slot layout, enforced by both stores regardless of
/// the configured rule set
pub(crate) fn check_storable(fields: &RecordFields) -> Result<()> {
    rules::check_name_fits("first name", &fields.first_name)?;
    rules::check_name_fits("last name", &fields.last_name)?;
    if fields.driver_license_category.len_utf16() != 1 {
        return Err(CabinetError::Validation(format!(
            "driver license category {:?} is not a single UTF-16 unit",
            fields.driver_license_category
        )));
    }
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Constant calendar dates, always valid
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
