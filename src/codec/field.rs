//! Field-level encoders
//!
//! Each helper writes or reads exactly one fixed-width region of a slot.

use bytes::{Buf, BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{CabinetError, Result};

/// Byte budget of each name region
pub const NAME_SIZE: usize = 120;

/// Size of the encoded decimal
pub const DECIMAL_SIZE: usize = 16;

const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;
const MAX_SCALE: u32 = 28;

// =============================================================================
// Names
// =============================================================================

/// Write a name as UTF-8 padded with NUL bytes to `NAME_SIZE`
pub(crate) fn put_name(buf: &mut BytesMut, field: &str, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_SIZE {
        return Err(CabinetError::Encoding(format!(
            "{} takes {} bytes (max {})",
            field,
            bytes.len(),
            NAME_SIZE
        )));
    }
    if bytes.contains(&0) {
        return Err(CabinetError::Encoding(format!(
            "{} contains a NUL byte",
            field
        )));
    }

    buf.put_slice(bytes);
    buf.put_bytes(0, NAME_SIZE - bytes.len());
    Ok(())
}

/// Read a name region, dropping the NUL padding
pub(crate) fn get_name(region: &[u8], field: &str) -> Result<String> {
    let end = region.iter().position(|&b| b == 0).unwrap_or(region.len());
    String::from_utf8(region[..end].to_vec())
        .map_err(|e| CabinetError::CorruptRecord(format!("{} is not UTF-8: {}", field, e)))
}

// =============================================================================
// Dates
// =============================================================================

/// Write a date as year, month, day
pub(crate) fn put_date(buf: &mut BytesMut, date: NaiveDate) {
    buf.put_i32_le(date.year());
    buf.put_i32_le(date.month() as i32);
    buf.put_i32_le(date.day() as i32);
}

/// Read a year, month, day triple into a calendar date
pub(crate) fn get_date(buf: &mut &[u8]) -> Result<NaiveDate> {
    let year = buf.get_i32_le();
    let month = buf.get_i32_le();
    let day = buf.get_i32_le();

    let invalid = || CabinetError::CorruptRecord(format!("invalid date {}-{}-{}", year, month, day));
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let day = u32::try_from(day).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

// =============================================================================
// Decimals
// =============================================================================

/// Encode a decimal as lo, mid, hi mantissa words followed by a flags word
///
/// Flags carry the scale in bits 16..24 and the sign in bit 31.
pub fn encode_decimal(value: &Decimal) -> [u8; DECIMAL_SIZE] {
    let mantissa = value.mantissa().unsigned_abs();
    let mut flags = value.scale() << 16;
    if value.is_sign_negative() {
        flags |= SIGN_MASK;
    }

    let mut out = [0u8; DECIMAL_SIZE];
    let mut buf = &mut out[..];
    buf.put_u32_le(mantissa as u32);
    buf.put_u32_le((mantissa >> 32) as u32);
    buf.put_u32_le((mantissa >> 64) as u32);
    buf.put_u32_le(flags);
    out
}

/// Decode a 16-byte decimal
pub fn decode_decimal(bytes: &[u8]) -> Result<Decimal> {
    if bytes.len() != DECIMAL_SIZE {
        return Err(CabinetError::CorruptRecord(format!(
            "decimal must be {} bytes, got {}",
            DECIMAL_SIZE,
            bytes.len()
        )));
    }

    let mut buf = bytes;
    let lo = buf.get_u32_le();
    let mid = buf.get_u32_le();
    let hi = buf.get_u32_le();
    let flags = buf.get_u32_le();

    if flags & !(SCALE_MASK | SIGN_MASK) != 0 {
        return Err(CabinetError::CorruptRecord(format!(
            "decimal flags 0x{:08x} have reserved bits set",
            flags
        )));
    }
    let scale = (flags & SCALE_MASK) >> 16;
    if scale > MAX_SCALE {
        return Err(CabinetError::CorruptRecord(format!(
            "decimal scale {} exceeds {}",
            scale, MAX_SCALE
        )));
    }

    Ok(Decimal::from_parts(lo, mid, hi, flags & SIGN_MASK != 0, scale))
}

// =============================================================================
// License Category
// =============================================================================

/// A category is stored as a single UTF-16 code unit
pub(crate) fn encode_category(category: char) -> Result<u16> {
    let mut units = [0u16; 2];
    match category.encode_utf16(&mut units) {
        [unit] => Ok(*unit),
        _ => Err(CabinetError::Encoding(format!(
            "driver license category {:?} needs more than one UTF-16 unit",
            category
        ))),
    }
}

pub(crate) fn decode_category(unit: u16) -> Result<char> {
    char::from_u32(u32::from(unit)).ok_or_else(|| {
        CabinetError::CorruptRecord(format!(
            "driver license category 0x{:04x} is not a character",
            unit
        ))
    })
}
