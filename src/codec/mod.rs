//! Binary Record Codec
//!
//! Encodes one record to a fixed-size slot and back.
//!
//! ## Slot Layout (278 bytes, little-endian)
//! ```text
//! ┌──────────┬────────┬────────────────┬────────────────┐
//! │Status (2)│ Id (4) │ FirstName (120)│ LastName (120) │
//! ├──────────┴┬───────┴──┬─────────┬───┴────────┬───────┴───────┬─────────────┐
//! │ Year (4)  │ Month (4)│ Day (4) │ Hours (2)  │ Income (16)   │ Category (2)│
//! └───────────┴──────────┴─────────┴────────────┴───────────────┴─────────────┘
//! ```
//!
//! - Status: 0 = live, 1 = tombstoned
//! - Names: UTF-8, NUL-padded; longer than 120 bytes is an encoding error
//! - Income: lo · mid · hi · flags words (96-bit mantissa, scale, sign)
//! - Category: one UTF-16 code unit

mod field;
mod slot;

pub use field::{decode_decimal, encode_decimal, DECIMAL_SIZE, NAME_SIZE};
pub use slot::{decode_record, decode_slot, encode_record, encode_slot, slot_id, slot_status};

/// Size of the status marker
pub const STATUS_SIZE: usize = 2;

/// Offset of the record id inside a slot
pub const ID_OFFSET: usize = STATUS_SIZE;

/// Offset of the first name region
pub const FIRST_NAME_OFFSET: usize = ID_OFFSET + 4;

/// Offset of the last name region
pub const LAST_NAME_OFFSET: usize = FIRST_NAME_OFFSET + NAME_SIZE;

/// Offset of the year/month/day triple
pub const DATE_OFFSET: usize = LAST_NAME_OFFSET + NAME_SIZE;

/// Offset of working hours per week
pub const HOURS_OFFSET: usize = DATE_OFFSET + 12;

/// Offset of the annual income decimal
pub const INCOME_OFFSET: usize = HOURS_OFFSET + 2;

/// Offset of the driver license category
pub const CATEGORY_OFFSET: usize = INCOME_OFFSET + DECIMAL_SIZE;

/// Total fixed slot size; constant for the lifetime of a data file
pub const SLOT_SIZE: usize = CATEGORY_OFFSET + 2;

/// Liveness marker stored in the first two bytes of every slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum SlotStatus {
    Live = 0,
    Tombstoned = 1,
}

impl SlotStatus {
    /// Raw on-disk value
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Parse the on-disk value
    pub fn from_i16(raw: i16) -> Option<Self> {
        match raw {
            0 => Some(SlotStatus::Live),
            1 => Some(SlotStatus::Tombstoned),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(FIRST_NAME_OFFSET, 6);
        assert_eq!(LAST_NAME_OFFSET, 126);
        assert_eq!(DATE_OFFSET, 246);
        assert_eq!(HOURS_OFFSET, 258);
        assert_eq!(INCOME_OFFSET, 260);
        assert_eq!(CATEGORY_OFFSET, 276);
        assert_eq!(SLOT_SIZE, 278);
    }

    #[test]
    fn test_status_values() {
        assert_eq!(SlotStatus::from_i16(0), Some(SlotStatus::Live));
        assert_eq!(SlotStatus::from_i16(1), Some(SlotStatus::Tombstoned));
        assert_eq!(SlotStatus::from_i16(7), None);
        assert_eq!(SlotStatus::Tombstoned.as_i16(), 1);
    }
}
