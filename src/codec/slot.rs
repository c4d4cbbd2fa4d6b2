//! Slot encoding/decoding
//!
//! A slot is the full fixed-width block: status marker followed by the record.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CabinetError, Result};
use crate::record::Record;

use super::field::{
    decode_category, decode_decimal, encode_category, encode_decimal, get_date, get_name,
    put_date, put_name, DECIMAL_SIZE, NAME_SIZE,
};
use super::{SlotStatus, ID_OFFSET, SLOT_SIZE};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a record into a live slot
pub fn encode_record(record: &Record) -> Result<BytesMut> {
    encode_slot(record, SlotStatus::Live)
}

/// Encode a record into a slot with the given status
///
/// Fails with `Encoding` before producing any bytes if a field does not fit.
pub fn encode_slot(record: &Record, status: SlotStatus) -> Result<BytesMut> {
    let category = encode_category(record.driver_license_category)?;

    let mut buf = BytesMut::with_capacity(SLOT_SIZE);
    buf.put_i16_le(status.as_i16());
    buf.put_i32_le(record.id);
    put_name(&mut buf, "first name", &record.first_name)?;
    put_name(&mut buf, "last name", &record.last_name)?;
    put_date(&mut buf, record.date_of_birth);
    buf.put_i16_le(record.working_hours_per_week);
    buf.put_slice(&encode_decimal(&record.annual_income));
    buf.put_u16_le(category);

    debug_assert_eq!(buf.len(), SLOT_SIZE);
    Ok(buf)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a slot into its status and record
pub fn decode_slot(block: &[u8]) -> Result<(SlotStatus, Record)> {
    let status = slot_status(block)?;

    let mut buf = &block[ID_OFFSET..];
    let id = buf.get_i32_le();
    let first_name = get_name(&buf[..NAME_SIZE], "first name")?;
    buf.advance(NAME_SIZE);
    let last_name = get_name(&buf[..NAME_SIZE], "last name")?;
    buf.advance(NAME_SIZE);
    let date_of_birth = get_date(&mut buf)?;
    let working_hours_per_week = buf.get_i16_le();
    let annual_income = decode_decimal(&buf[..DECIMAL_SIZE])?;
    buf.advance(DECIMAL_SIZE);
    let driver_license_category = decode_category(buf.get_u16_le())?;

    Ok((
        status,
        Record {
            id,
            first_name,
            last_name,
            date_of_birth,
            working_hours_per_week,
            annual_income,
            driver_license_category,
        },
    ))
}

/// Decode a slot's record, ignoring its status
pub fn decode_record(block: &[u8]) -> Result<Record> {
    decode_slot(block).map(|(_, record)| record)
}

/// Read only the status marker of a slot
pub fn slot_status(block: &[u8]) -> Result<SlotStatus> {
    check_len(block)?;
    let raw = (&block[..2]).get_i16_le();
    SlotStatus::from_i16(raw)
        .ok_or_else(|| CabinetError::CorruptRecord(format!("unknown slot status {}", raw)))
}

/// Read only the id of a slot
pub fn slot_id(block: &[u8]) -> Result<i32> {
    check_len(block)?;
    Ok((&block[ID_OFFSET..ID_OFFSET + 4]).get_i32_le())
}

fn check_len(block: &[u8]) -> Result<()> {
    if block.len() != SLOT_SIZE {
        return Err(CabinetError::CorruptRecord(format!(
            "slot must be {} bytes, got {}",
            SLOT_SIZE,
            block.len()
        )));
    }
    Ok(())
}
