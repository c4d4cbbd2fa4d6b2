//! Individual validation rules

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::codec::NAME_SIZE;
use crate::error::{CabinetError, Result};
use crate::record::RecordFields;

use super::RecordValidator;

/// Shared check for both name fields
fn check_name(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CabinetError::Validation(format!("{} is blank", field)));
    }
    let chars = value.chars().count();
    if chars < min || chars > max {
        return Err(CabinetError::Validation(format!(
            "{} must be {}..={} characters, got {}",
            field, min, max, chars
        )));
    }
    check_name_fits(field, value)
}

/// A name must fit its fixed-width region and survive NUL padding
pub(crate) fn check_name_fits(field: &str, value: &str) -> Result<()> {
    if value.len() > NAME_SIZE {
        return Err(CabinetError::Validation(format!(
            "{} takes {} bytes (max {})",
            field,
            value.len(),
            NAME_SIZE
        )));
    }
    if value.contains('\0') {
        return Err(CabinetError::Validation(format!("{} contains NUL", field)));
    }
    Ok(())
}

pub struct FirstNameValidator {
    min: usize,
    max: usize,
}

impl FirstNameValidator {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for FirstNameValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        check_name("first name", &fields.first_name, self.min, self.max)
    }
}

pub struct LastNameValidator {
    min: usize,
    max: usize,
}

impl LastNameValidator {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for LastNameValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        check_name("last name", &fields.last_name, self.min, self.max)
    }
}

pub struct DateOfBirthValidator {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateOfBirthValidator {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

impl RecordValidator for DateOfBirthValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        let date = fields.date_of_birth;
        if date < self.from || date > self.to {
            return Err(CabinetError::Validation(format!(
                "date of birth {} is outside {}..={}",
                date, self.from, self.to
            )));
        }
        Ok(())
    }
}

pub struct WorkingHoursValidator {
    min: i16,
    max: i16,
}

impl WorkingHoursValidator {
    pub fn new(min: i16, max: i16) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for WorkingHoursValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        let hours = fields.working_hours_per_week;
        if !(self.min..=self.max).contains(&hours) {
            return Err(CabinetError::Validation(format!(
                "working hours per week must be {}..={}, got {}",
                self.min, self.max, hours
            )));
        }
        Ok(())
    }
}

pub struct AnnualIncomeValidator {
    min: Decimal,
    max: Decimal,
}

impl AnnualIncomeValidator {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for AnnualIncomeValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        let income = fields.annual_income;
        if income < self.min || income > self.max {
            return Err(CabinetError::Validation(format!(
                "annual income must be {}..={}, got {}",
                self.min, self.max, income
            )));
        }
        Ok(())
    }
}

pub struct LicenseCategoryValidator {
    allowed: Vec<char>,
}

impl LicenseCategoryValidator {
    pub fn new(allowed: &[char]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }
}

impl RecordValidator for LicenseCategoryValidator {
    fn validate(&self, fields: &RecordFields) -> Result<()> {
        let category = fields.driver_license_category.to_ascii_uppercase();
        if !self.allowed.contains(&category) {
            return Err(CabinetError::Validation(format!(
                "driver license category {:?} is not one of {:?}",
                fields.driver_license_category, self.allowed
            )));
        }
        Ok(())
    }
}
