//! Snapshot file format
//!
//! ```text
//! ┌──────────┬───────────┬────────────┬─────────────┬─────────┬──────────────┐
//! │Magic (4) │Version (2)│ Count (8)  │PayloadLen(4)│ CRC (4) │   Payload    │
//! └──────────┴───────────┴────────────┴─────────────┴─────────┴──────────────┘
//! ```
//!
//! Payload is the bincode-encoded record vector; CRC32 covers the payload.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CabinetError, Result};
use crate::record::Record;

use super::Snapshot;

/// Magic bytes at the start of every snapshot file
pub const MAGIC: &[u8; 4] = b"FCSN";

/// Current snapshot file version
pub const VERSION: u16 = 1;

/// Header size: magic + version + count + payload length + crc
pub const HEADER_SIZE: usize = 4 + 2 + 8 + 4 + 4;

/// Maximum payload size (256 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 256 * 1024 * 1024;

impl Snapshot {
    /// Write the snapshot in the binary snapshot format
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = bincode::serialize(&self.records)?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(CabinetError::Snapshot(format!(
                "payload too large: {} bytes (max {})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let mut header = BytesMut::with_capacity(HEADER_SIZE);
        header.put_slice(MAGIC);
        header.put_u16_le(VERSION);
        header.put_u64_le(self.records.len() as u64);
        header.put_u32_le(payload.len() as u32);
        header.put_u32_le(crc32fast::hash(&payload));

        writer.write_all(&header)?;
        writer.write_all(&payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a snapshot written by `write_to`
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(|e| {
            CabinetError::Snapshot(format!("incomplete header: {}", e))
        })?;

        let mut buf = &header[..];
        if &buf[..4] != MAGIC {
            return Err(CabinetError::Snapshot(format!(
                "invalid magic: expected FCSN, got {:?}",
                &buf[..4]
            )));
        }
        buf.advance(4);

        let version = buf.get_u16_le();
        if version != VERSION {
            return Err(CabinetError::Snapshot(format!(
                "unsupported version: {}",
                version
            )));
        }

        let count = buf.get_u64_le();
        let payload_len = buf.get_u32_le();
        let expected_crc = buf.get_u32_le();

        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(CabinetError::Snapshot(format!(
                "payload too large: {} bytes (max {})",
                payload_len, MAX_PAYLOAD_SIZE
            )));
        }

        let mut payload = vec![0u8; payload_len as usize];
        reader.read_exact(&mut payload).map_err(|e| {
            CabinetError::Snapshot(format!("incomplete payload: {}", e))
        })?;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            return Err(CabinetError::Snapshot(format!(
                "checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
                expected_crc, actual_crc
            )));
        }

        let records: Vec<Record> = bincode::deserialize(&payload)?;
        if records.len() as u64 != count {
            return Err(CabinetError::Snapshot(format!(
                "record count mismatch: header says {}, payload has {}",
                count,
                records.len()
            )));
        }

        Ok(Snapshot::new(records))
    }

    /// Write the snapshot to a file, replacing it
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.get_ref().sync_all()?;

        tracing::info!("Saved snapshot of {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let snapshot = Self::read_from(&mut reader)?;

        tracing::info!("Loaded snapshot of {} records from {}", snapshot.len(), path.display());
        Ok(snapshot)
    }
}
