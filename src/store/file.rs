//! File-backed store
//!
//! Records are fixed-size slots appended to one flat file. Delete flips the
//! slot's status to tombstoned; purge rewrites the file with only live slots.
//!
//! ## Offset resolution
//! Every edit/delete goes through the `OffsetIndex`. A slot's offset is not a
//! function of its id once anything has been deleted or purged.
//!
//! ## Failure handling
//! The index is patched only after the matching write succeeded. A failed
//! write marks the index stale, and the next operation rescans the file.
//! Purge and restore build the new contents in a temporary file beside the
//! data file and swap it in with a rename, so a failure leaves the original
//! file untouched.
//!
//! ## Id allocation
//! Ids are never reused, across reopens included. Before purge or restore
//! rewrites the file, the highest id issued so far is saved to the id mark
//! beside it; open seeds the counter from the mark and the slot scan.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::codec::{decode_record, encode_record, slot_id, slot_status, SlotStatus, SLOT_SIZE};
use crate::error::{CabinetError, Result};
use crate::record::{name_key, Record, RecordFields};
use crate::snapshot::Snapshot;
use crate::validation::{check_storable, RecordValidator};

use super::mark::{mark_path, parent_dir, read_mark, write_mark};
use super::{check_delete, check_unique_ids, next_id, OffsetIndex, RecordStore};

const SLOT: u64 = SLOT_SIZE as u64;

/// Slots read per buffered fill during scans
const SCAN_BATCH: usize = 64;

/// Binary flat-file record store
pub struct FileStore {
    /// Data file location (purge/restore swap a new file in here)
    path: PathBuf,

    /// Id high-water mark file beside the data file
    mark_path: PathBuf,

    /// Open read/write handle, held for the store's lifetime
    file: File,

    validator: Box<dyn RecordValidator>,

    /// id → offset of every live slot
    index: OffsetIndex,

    /// Whole slots in the file, live and tombstoned
    slot_count: u64,

    /// Highest id seen in the file or handed out since opening
    last_id: i32,

    /// fsync after each mutating write
    sync_on_write: bool,

    /// Set when a write's outcome is uncertain; forces a rescan
    stale: bool,
}

impl FileStore {
    /// Open or create the data file and build the offset index
    pub fn open(
        path: &Path,
        validator: Box<dyn RecordValidator>,
        sync_on_write: bool,
    ) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let mark_path = mark_path(path);
        let last_id = read_mark(&mark_path)?;

        let mut store = Self {
            path: path.to_path_buf(),
            mark_path,
            file,
            validator,
            index: OffsetIndex::new(),
            slot_count: 0,
            last_id,
            sync_on_write,
            stale: false,
        };
        store.rebuild_index()?;

        tracing::info!(
            "Opened data file {}: {} slots, {} live, last id {}",
            store.path.display(),
            store.slot_count,
            store.index.len(),
            store.last_id
        );
        Ok(store)
    }

    /// Read one live record through the offset index
    pub fn get(&mut self, id: i32) -> Result<Option<Record>> {
        self.ensure_fresh()?;
        match self.index.get(id) {
            Some(offset) => Ok(Some(decode_record(&self.read_slot(offset)?)?)),
            None => Ok(None),
        }
    }

    /// Flush and sync the data file
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        tracing::debug!("Closed data file {}", self.path.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id high-water mark file
    pub fn mark_path(&self) -> &Path {
        &self.mark_path
    }

    /// Whether the next operation rescans the file first
    pub fn needs_rescan(&self) -> bool {
        self.stale
    }

    /// Physical slots, including tombstones awaiting purge
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    pub fn tombstone_count(&self) -> u64 {
        self.slot_count - self.index.len() as u64
    }

    /// Current byte length of the data file
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn offset_of(&self, id: i32) -> Option<u64> {
        self.index.get(id)
    }

    // =========================================================================
    // Index Maintenance
    // =========================================================================

    /// Single forward scan rebuilding the offset index, slot count and last id
    fn rebuild_index(&mut self) -> Result<()> {
        let len = self.file.metadata()?.len();
        let whole = len / SLOT;
        if len % SLOT != 0 {
            tracing::warn!(
                "Data file {} ends with a partial slot ({} stray bytes), truncating",
                self.path.display(),
                len % SLOT
            );
            self.file.set_len(whole * SLOT)?;
        }
        self.slot_count = whole;

        let mut index = OffsetIndex::with_capacity(whole as usize);
        let mut last_id = self.last_id;
        self.for_each_slot(|offset, slot| {
            let id = slot_id(slot)?;
            last_id = last_id.max(id);
            if slot_status(slot)? == SlotStatus::Live {
                if let Some(previous) = index.insert(id, offset) {
                    return Err(CabinetError::CorruptRecord(format!(
                        "record #{} is live at offsets {} and {}",
                        id, previous, offset
                    )));
                }
            }
            Ok(())
        })?;

        self.index = index;
        self.last_id = last_id;
        self.stale = false;
        Ok(())
    }

    fn ensure_fresh(&mut self) -> Result<()> {
        if self.stale {
            tracing::warn!(
                "Rescanning {} to rebuild the offset index",
                self.path.display()
            );
            self.rebuild_index()?;
        }
        Ok(())
    }

    // =========================================================================
    // Slot I/O
    // =========================================================================

    /// Visit every whole slot in file order
    fn for_each_slot<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(u64, &[u8]) -> Result<()>,
    {
        let mut reader = BufReader::with_capacity(SLOT_SIZE * SCAN_BATCH, &self.file);
        reader.seek(SeekFrom::Start(0))?;

        let mut slot = [0u8; SLOT_SIZE];
        for i in 0..self.slot_count {
            reader.read_exact(&mut slot)?;
            visit(i * SLOT, &slot)?;
        }
        Ok(())
    }

    /// Decode live slots accepted by `keep`, in file order
    fn scan_live<P>(&self, mut keep: P) -> Result<Vec<Record>>
    where
        P: FnMut(&Record) -> bool,
    {
        let mut records = Vec::with_capacity(self.index.len());
        self.for_each_slot(|_, slot| {
            if slot_status(slot)? == SlotStatus::Tombstoned {
                return Ok(());
            }
            let record = decode_record(slot)?;
            if keep(&record) {
                records.push(record);
            }
            Ok(())
        })?;
        Ok(records)
    }

    fn read_slot(&self, offset: u64) -> Result<[u8; SLOT_SIZE]> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        let mut slot = [0u8; SLOT_SIZE];
        file.read_exact(&mut slot)?;
        Ok(slot)
    }

    /// Write bytes at `offset`; on failure the index is marked stale
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        if let Err(e) = write_all_at(&mut self.file, offset, bytes, self.sync_on_write) {
            self.stale = true;
            tracing::warn!(
                "Write of {} bytes at offset {} failed: {}",
                bytes.len(),
                offset,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    /// Build new file contents in a temporary file, then rename it over the
    /// data file and rescan
    fn replace_contents<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&Self, &mut BufWriter<&mut File>) -> Result<()>,
    {
        // The rewrite may drop the slot holding the highest id
        write_mark(&self.mark_path, self.last_id)?;

        let mut tmp = NamedTempFile::new_in(parent_dir(&self.path))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            fill(&*self, &mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        let file = tmp
            .persist(&self.path)
            .map_err(|e| CabinetError::StorageIo(e.error))?;
        self.file = file;

        self.rebuild_index()
    }
}

fn write_all_at(file: &mut File, offset: u64, bytes: &[u8], sync: bool) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(bytes)?;
    if sync {
        file.sync_data()?;
    }
    Ok(())
}

impl RecordStore for FileStore {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        self.ensure_fresh()?;
        self.validator.validate(&fields)?;
        check_storable(&fields)?;

        let id = next_id(self.last_id)?;
        let slot = encode_record(&Record::new(id, fields))?;

        let offset = self.slot_count * SLOT;
        self.write_at(offset, &slot)?;

        self.index.insert(id, offset);
        self.slot_count += 1;
        self.last_id = id;

        tracing::debug!("Created record #{} at offset {}", id, offset);
        Ok(id)
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        self.ensure_fresh()?;
        let offset = self.index.get(id).ok_or(CabinetError::NotFound(id))?;
        self.validator.validate(&fields)?;
        check_storable(&fields)?;

        let slot = encode_record(&Record::new(id, fields))?;
        self.write_at(offset, &slot)?;

        tracing::debug!("Edited record #{} at offset {}", id, offset);
        Ok(())
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        self.ensure_fresh()?;
        check_delete(id, self.index.len())?;
        let offset = self.index.get(id).ok_or(CabinetError::NotFound(id))?;

        self.write_at(offset, &SlotStatus::Tombstoned.as_i16().to_le_bytes())?;
        self.index.remove(id);

        tracing::debug!("Tombstoned record #{} at offset {}", id, offset);
        Ok(())
    }

    fn purge(&mut self) -> Result<usize> {
        self.ensure_fresh()?;
        if self.tombstone_count() == 0 {
            tracing::debug!("Nothing to purge in {}", self.path.display());
            return Ok(0);
        }

        let before = self.slot_count;
        self.replace_contents(|store, out| {
            store.for_each_slot(|_, slot| {
                if slot_status(slot)? == SlotStatus::Live {
                    out.write_all(slot)?;
                }
                Ok(())
            })
        })?;
        let reclaimed = (before - self.slot_count) as usize;

        tracing::info!(
            "Purged {} of {} slots from {}",
            reclaimed,
            before,
            self.path.display()
        );
        Ok(reclaimed)
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        self.ensure_fresh()?;
        let key = name_key(name);
        self.scan_live(|record| name_key(&record.first_name) == key)
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        self.ensure_fresh()?;
        let key = name_key(name);
        self.scan_live(|record| name_key(&record.last_name) == key)
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        self.ensure_fresh()?;
        self.scan_live(|record| record.date_of_birth == date)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        self.ensure_fresh()?;
        self.scan_live(|_| true)
    }

    fn stat(&self) -> usize {
        self.index.len()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        check_unique_ids(snapshot)?;

        // Encode everything up front so a bad record fails before any I/O
        let mut slots = Vec::with_capacity(snapshot.len() * SLOT_SIZE);
        for record in snapshot {
            slots.extend_from_slice(&encode_record(record)?);
        }

        self.replace_contents(|_, out| {
            out.write_all(&slots)?;
            Ok(())
        })?;

        tracing::info!(
            "Restored {} records into {}",
            self.index.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if let Err(e) = self.file.sync_all() {
            tracing::warn!("Failed to sync {} on drop: {}", self.path.display(), e);
        }
    }
}
