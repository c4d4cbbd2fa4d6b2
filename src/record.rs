//! Person records
//!
//! `RecordFields` is what callers hand to `create`/`edit`; a `Record` is the
//! stored form carrying the identifier assigned at creation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-supplied field values for a record (everything except the id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub working_hours_per_week: i16,
    pub annual_income: Decimal,
    pub driver_license_category: char,
}

/// A stored person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned once at creation, stable across edits, deletes and purges
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub working_hours_per_week: i16,
    pub annual_income: Decimal,
    pub driver_license_category: char,
}

impl Record {
    /// Build a record from its id and field values
    pub fn new(id: i32, fields: RecordFields) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            date_of_birth: fields.date_of_birth,
            working_hours_per_week: fields.working_hours_per_week,
            annual_income: fields.annual_income,
            driver_license_category: fields.driver_license_category,
        }
    }

    /// Copy the editable fields back out
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            working_hours_per_week: self.working_hours_per_week,
            annual_income: self.annual_income,
            driver_license_category: self.driver_license_category,
        }
    }

    /// Overwrite every editable field, keeping the id
    pub fn apply(&mut self, fields: RecordFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.date_of_birth = fields.date_of_birth;
        self.working_hours_per_week = fields.working_hours_per_week;
        self.annual_income = fields.annual_income;
        self.driver_license_category = fields.driver_license_category;
    }
}

/// Case-folded key used by both stores for name lookups
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}
