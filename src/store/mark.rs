//! Id high-water mark kept beside the data file
//!
//! Purge and restore can drop the slot holding the largest id ever issued.
//! The mark is written before either rewrite, so at open
//! `max(mark, largest slot id)` is never below an id already handed out.
//!
//! ```text
//! ┌──────────┬─────────────┬─────────┐
//! │Magic (4) │ Last id (4) │ CRC (4) │
//! └──────────┴─────────────┴─────────┘
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};
use tempfile::NamedTempFile;

use crate::error::{CabinetError, Result};

/// Magic bytes at the start of a mark file
pub(crate) const MARK_MAGIC: &[u8; 4] = b"FCHW";

/// Mark file size: magic + last id + crc
pub(crate) const MARK_SIZE: usize = 4 + 4 + 4;

/// `<data file>.meta`
pub(crate) fn mark_path(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_owned();
    name.push(".meta");
    PathBuf::from(name)
}

/// Directory temp files are created in, so a rename never crosses devices
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read the mark; a missing file means no id was ever dropped
pub(crate) fn read_mark(path: &Path) -> Result<i32> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    if bytes.len() != MARK_SIZE || &bytes[..4] != MARK_MAGIC {
        return Err(CabinetError::CorruptRecord(format!(
            "id mark {} is malformed",
            path.display()
        )));
    }

    let mut buf = &bytes[4..];
    let last_id = buf.get_i32_le();
    let expected_crc = buf.get_u32_le();
    let actual_crc = crc32fast::hash(&bytes[..8]);
    if actual_crc != expected_crc {
        return Err(CabinetError::CorruptRecord(format!(
            "id mark {} checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
            path.display(),
            expected_crc,
            actual_crc
        )));
    }

    Ok(last_id)
}

/// Replace the mark atomically
pub(crate) fn write_mark(path: &Path, last_id: i32) -> Result<()> {
    let mut buf = BytesMut::with_capacity(MARK_SIZE);
    buf.put_slice(MARK_MAGIC);
    buf.put_i32_le(last_id);
    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);

    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(&buf)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| CabinetError::StorageIo(e.error))?;

    tracing::debug!("Wrote id mark {} to {}", last_id, path.display());
    Ok(())
}
