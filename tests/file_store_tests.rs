//! Tests for FileStore
//!
//! These tests verify:
//! - Slot append/overwrite/tombstone on disk
//! - Offset index resolution after deletes and purges
//! - Purge compaction and idempotence
//! - Reopen, torn-write repair and corrupt-slot reporting
//! - Errors leave the file and index untouched

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use filecabinet::codec::{decode_record, SLOT_SIZE};
use filecabinet::validation::{RecordValidator, ValidatorBuilder};
use filecabinet::{CabinetError, FileStore, RecordFields, RecordStore, Snapshot};

// =============================================================================
// Helper Functions
// =============================================================================

const SLOT: u64 = SLOT_SIZE as u64;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fields(first: &str, last: &str, dob: NaiveDate) -> RecordFields {
    RecordFields {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: dob,
        working_hours_per_week: 40,
        annual_income: Decimal::new(4_500_050, 2),
        driver_license_category: 'B',
    }
}

fn default_validator() -> Box<dyn RecordValidator> {
    Box::new(ValidatorBuilder::create_default())
}

fn setup_temp_store() -> (TempDir, PathBuf, FileStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cabinet-records.db");
    let store = FileStore::open(&path, default_validator(), false).unwrap();
    (temp_dir, path, store)
}

fn reopen(path: &PathBuf) -> FileStore {
    FileStore::open(path, default_validator(), false).unwrap()
}

fn ids(records: &[filecabinet::Record]) -> Vec<i32> {
    records.iter().map(|r| r.id).collect()
}

fn dir_entries(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path, store) = setup_temp_store();

    assert!(path.exists());
    assert_eq!(store.stat(), 0);
    assert_eq!(store.slot_count(), 0);
    assert_eq!(store.file_len().unwrap(), 0);
}

#[test]
fn test_create_appends_slots() {
    let (_temp, _path, mut store) = setup_temp_store();

    let a = store.create(fields("Ann", "Lee", date(1990, 1, 1))).unwrap();
    let b = store.create(fields("Bob", "Lee", date(1991, 2, 2))).unwrap();

    assert_eq!((a, b), (1, 2));
    assert_eq!(store.stat(), 2);
    assert_eq!(store.file_len().unwrap(), 2 * SLOT);
    assert_eq!(store.offset_of(1), Some(0));
    assert_eq!(store.offset_of(2), Some(SLOT));
}

#[test]
fn test_create_is_findable_by_every_field() {
    let (_temp, _path, mut store) = setup_temp_store();
    let dob = date(1984, 7, 9);

    let id = store.create(fields("Ann", "Smith", dob)).unwrap();

    assert_eq!(ids(&store.find_by_first_name("Ann").unwrap()), vec![id]);
    assert_eq!(ids(&store.find_by_last_name("SMITH").unwrap()), vec![id]);
    assert_eq!(ids(&store.find_by_date_of_birth(dob).unwrap()), vec![id]);
}

#[test]
fn test_find_without_match_is_empty() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();

    assert!(store.find_by_first_name("Zed").unwrap().is_empty());
    assert!(store.find_by_date_of_birth(date(2000, 1, 1)).unwrap().is_empty());
}

#[test]
fn test_get_reads_through_index() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();

    let record = store.get(1).unwrap().unwrap();
    assert_eq!(record.first_name, "Ann");
    assert!(store.get(2).unwrap().is_none());
}

// =============================================================================
// Edit Tests
// =============================================================================

#[test]
fn test_edit_overwrites_in_place() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Jones", date(1980, 3, 3))).unwrap();

    store.edit(1, fields("Anna", "Smith", date(1984, 7, 9))).unwrap();

    assert_eq!(store.offset_of(1), Some(0));
    assert_eq!(store.file_len().unwrap(), 2 * SLOT);
    assert!(store.find_by_first_name("ann").unwrap().is_empty());
    assert_eq!(ids(&store.find_by_first_name("anna").unwrap()), vec![1]);
    assert_eq!(ids(&store.find_by_last_name("smith").unwrap()), vec![1]);
}

#[test]
fn test_edit_nonexistent_changes_nothing() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    let before = fs::read(&path).unwrap();

    let result = store.edit(999, fields("Zed", "Zed", date(1984, 7, 9)));

    assert!(matches!(result, Err(CabinetError::NotFound(999))));
    assert_eq!(store.stat(), 1);
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(ids(&store.find_by_first_name("ann").unwrap()), vec![1]);
}

#[test]
fn test_edit_invalid_fields_changes_nothing() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    let before = fs::read(&path).unwrap();

    let result = store.edit(1, fields("A", "Smith", date(1984, 7, 9)));

    assert!(matches!(result, Err(CabinetError::Validation(_))));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_tombstones_without_touching_record_bytes() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    let before = fs::read(&path).unwrap();

    store.delete(1).unwrap();

    let after = fs::read(&path).unwrap();
    assert_eq!(&after[0..2], &1i16.to_le_bytes());
    assert_eq!(&after[2..], &before[2..]);
    assert_eq!(store.stat(), 0);
    assert_eq!(store.slot_count(), 1);
    assert_eq!(store.tombstone_count(), 1);
}

#[test]
fn test_delete_hides_record_from_queries() {
    let (_temp, _path, mut store) = setup_temp_store();
    let dob = date(1984, 7, 9);
    store.create(fields("Ann", "Smith", dob)).unwrap();
    store.create(fields("Bob", "Smith", dob)).unwrap();

    store.delete(1).unwrap();

    assert_eq!(ids(&store.find_by_last_name("smith").unwrap()), vec![2]);
    assert_eq!(ids(&store.find_by_date_of_birth(dob).unwrap()), vec![2]);
    assert_eq!(ids(&store.all_records().unwrap()), vec![2]);
    assert_eq!(store.stat(), 1);
}

#[test]
fn test_delete_preconditions() {
    let (_temp, _path, mut store) = setup_temp_store();

    assert!(matches!(store.delete(0), Err(CabinetError::Validation(_))));
    assert!(matches!(store.delete(1), Err(CabinetError::InvalidOperation(_))));

    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    assert!(matches!(store.delete(5), Err(CabinetError::NotFound(5))));

    store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();
    store.delete(1).unwrap();
    assert!(matches!(store.delete(1), Err(CabinetError::NotFound(1))));
}

#[test]
fn test_ids_are_never_reused() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();

    store.delete(2).unwrap();
    store.purge().unwrap();

    let id = store.create(fields("Cid", "Smith", date(1984, 7, 9))).unwrap();
    assert_eq!(id, 3);
}

// =============================================================================
// Purge Tests
// =============================================================================

#[test]
fn test_ann_scenario() {
    let (_temp, path, mut store) = setup_temp_store();

    let a = store.create(fields("Ann", "Adams", date(1980, 1, 1))).unwrap();
    let b = store.create(fields("Ann", "Brown", date(1981, 1, 1))).unwrap();
    assert_eq!((a, b), (1, 2));

    assert_eq!(ids(&store.find_by_first_name("aNN").unwrap()), vec![1, 2]);

    store.delete(1).unwrap();
    assert_eq!(ids(&store.find_by_first_name("ann").unwrap()), vec![2]);

    assert_eq!(store.purge().unwrap(), 1);

    let raw = fs::read(&path).unwrap();
    assert_eq!(raw.len(), SLOT_SIZE);
    let survivor = decode_record(&raw).unwrap();
    assert_eq!(survivor.id, 2);
    assert_eq!(survivor.last_name, "Brown");
}

#[test]
fn test_purge_is_idempotent() {
    let (_temp, _path, mut store) = setup_temp_store();
    for name in ["Ann", "Bob", "Cid", "Dan"] {
        store.create(fields(name, "Smith", date(1984, 7, 9))).unwrap();
    }
    store.delete(2).unwrap();
    store.delete(4).unwrap();
    let before = store.all_records().unwrap();

    assert_eq!(store.purge().unwrap(), 2);
    assert_eq!(store.all_records().unwrap(), before);

    assert_eq!(store.purge().unwrap(), 0);
    assert_eq!(store.all_records().unwrap(), before);
    assert_eq!(store.slot_count(), 2);
}

#[test]
fn test_edit_and_delete_after_purge_use_new_offsets() {
    let (_temp, _path, mut store) = setup_temp_store();
    for name in ["Ann", "Bob", "Cid"] {
        store.create(fields(name, "Smith", date(1984, 7, 9))).unwrap();
    }
    store.delete(1).unwrap();
    store.purge().unwrap();

    // Record 3 now lives in the second slot, not the third
    assert_eq!(store.offset_of(3), Some(SLOT));

    store.edit(3, fields("Cyd", "Smith", date(1984, 7, 9))).unwrap();
    let records = store.all_records().unwrap();
    assert_eq!(records[0].first_name, "Bob");
    assert_eq!(records[1].first_name, "Cyd");

    store.delete(2).unwrap();
    assert_eq!(ids(&store.all_records().unwrap()), vec![3]);
}

#[test]
fn test_purge_leaves_no_temp_files() {
    let (temp, _path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();
    store.delete(1).unwrap();
    store.purge().unwrap();

    let expected: BTreeSet<String> = ["cabinet-records.db", "cabinet-records.db.meta"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(dir_entries(temp.path()), expected);
    assert!(store.mark_path().ends_with("cabinet-records.db.meta"));
}

#[cfg(unix)]
#[test]
fn test_failed_purge_leaves_original_untouched() {
    let (temp, path, mut store) = setup_temp_store();
    for name in ["Ann", "Bob", "Cid"] {
        store.create(fields(name, "Smith", date(1984, 7, 9))).unwrap();
    }
    store.delete(2).unwrap();
    let records_before = store.all_records().unwrap();

    // Move the data file aside (the store keeps its handle) and put a
    // non-empty directory in its place so the final rename fails
    let moved = temp.path().join("moved.db");
    fs::rename(&path, &moved).unwrap();
    fs::create_dir(&path).unwrap();
    fs::write(path.join("occupied"), b"x").unwrap();
    let bytes_before = fs::read(&moved).unwrap();

    let result = store.purge();

    assert!(matches!(result, Err(CabinetError::StorageIo(_))));
    assert_eq!(fs::read(&moved).unwrap(), bytes_before);
    assert_eq!(store.stat(), 2);
    assert_eq!(store.tombstone_count(), 1);
    assert_eq!(store.all_records().unwrap(), records_before);

    // The compacted copy was discarded
    let expected: BTreeSet<String> = ["cabinet-records.db", "cabinet-records.db.meta", "moved.db"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(dir_entries(temp.path()), expected);
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_write_forces_rescan() {
    // Every write to /dev/full fails with ENOSPC
    let device = Path::new("/dev/full");
    if !device.exists() {
        return;
    }
    let mut store = FileStore::open(device, default_validator(), false).unwrap();

    let result = store.create(fields("Ann", "Smith", date(1984, 7, 9)));

    assert!(matches!(result, Err(CabinetError::StorageIo(_))));
    assert!(store.needs_rescan());
    assert_eq!(store.stat(), 0);

    assert!(store.all_records().unwrap().is_empty());
    assert!(!store.needs_rescan());
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_ids_not_reused_after_purge_and_reopen() {
    let (_temp, path, mut store) = setup_temp_store();
    for name in ["Ann", "Bob", "Cid"] {
        store.create(fields(name, "Smith", date(1984, 7, 9))).unwrap();
    }
    store.delete(3).unwrap();
    store.purge().unwrap();
    drop(store);

    // No slot carries id 3 any more
    let mut store = reopen(&path);
    assert_eq!(store.slot_count(), 2);
    assert_eq!(store.create(fields("Dan", "Smith", date(1984, 7, 9))).unwrap(), 4);
}

#[test]
fn test_ids_not_reused_after_empty_restore_and_reopen() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();
    store.restore(&Snapshot::default()).unwrap();
    store.close().unwrap();

    let mut store = reopen(&path);
    assert_eq!(store.file_len().unwrap(), 0);
    assert_eq!(store.create(fields("Cid", "Smith", date(1984, 7, 9))).unwrap(), 3);
}

#[test]
fn test_damaged_id_mark_fails_open() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.delete(1).unwrap();
    store.purge().unwrap();
    let mark = store.mark_path().to_path_buf();
    drop(store);

    fs::write(&mark, b"garbage").unwrap();

    let result = FileStore::open(&path, default_validator(), false);
    assert!(matches!(result, Err(CabinetError::CorruptRecord(_))));
}

#[test]
fn test_reopen_rebuilds_index() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Jones", date(1980, 3, 3))).unwrap();
    store.create(fields("Cid", "Smith", date(1970, 5, 5))).unwrap();
    store.delete(3).unwrap();
    store.close().unwrap();

    let mut store = reopen(&path);
    assert_eq!(store.stat(), 2);
    assert_eq!(store.tombstone_count(), 1);
    assert_eq!(ids(&store.find_by_last_name("smith").unwrap()), vec![1]);

    // Tombstoned #3 still counts toward the id sequence
    let id = store.create(fields("Dan", "Smith", date(1975, 6, 6))).unwrap();
    assert_eq!(id, 4);
}

#[test]
fn test_reopen_truncates_partial_slot() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    drop(store);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0xAB; 10]).unwrap();
    drop(file);

    let mut store = reopen(&path);
    assert_eq!(store.file_len().unwrap(), SLOT);
    assert_eq!(store.stat(), 1);

    let id = store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();
    assert_eq!(store.offset_of(id), Some(SLOT));
}

#[test]
fn test_corrupt_slot_is_reported_not_skipped() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    store.create(fields("Bob", "Smith", date(1984, 7, 9))).unwrap();

    // Month 13 in the second slot
    let mut file = OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(SLOT + 250)).unwrap();
    file.write_all(&13i32.to_le_bytes()).unwrap();
    drop(file);

    assert!(matches!(store.all_records(), Err(CabinetError::CorruptRecord(_))));
    assert!(matches!(
        store.find_by_first_name("ann"),
        Err(CabinetError::CorruptRecord(_))
    ));
    assert_eq!(store.stat(), 2);
}

#[test]
fn test_unknown_status_fails_open() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    drop(store);

    let mut file = OpenOptions::new().write(true).open(&path).unwrap();
    file.write_all(&9i16.to_le_bytes()).unwrap();
    drop(file);

    let result = FileStore::open(&path, default_validator(), false);
    assert!(matches!(result, Err(CabinetError::CorruptRecord(_))));
}

// =============================================================================
// Slot Limit Tests
// =============================================================================

#[test]
fn test_oversized_name_is_rejected_before_write() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.db");
    // No configured rules: the slot limits still apply
    let mut store = FileStore::open(&path, Box::new(ValidatorBuilder::new().build()), true).unwrap();

    let long = "ж".repeat(61);
    let result = store.create(fields(&long, "Smith", date(1984, 7, 9)));

    assert!(matches!(result, Err(CabinetError::Validation(_))));
    assert_eq!(store.file_len().unwrap(), 0);
    assert_eq!(store.stat(), 0);

    // The failed create did not consume an id
    assert_eq!(store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap(), 1);
}

// =============================================================================
// Restore Tests
// =============================================================================

#[test]
fn test_restore_rewrites_file_keeping_ids() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Old", "Data", date(1984, 7, 9))).unwrap();

    let mut source = reopen(&path.with_file_name("source.db"));
    for name in ["Ann", "Bob", "Cid"] {
        source.create(fields(name, "Smith", date(1984, 7, 9))).unwrap();
    }
    source.delete(2).unwrap();
    let snapshot = source.snapshot().unwrap();

    store.restore(&snapshot).unwrap();

    assert_eq!(store.file_len().unwrap(), 2 * SLOT);
    assert_eq!(ids(&store.all_records().unwrap()), vec![1, 3]);
    assert_eq!(store.offset_of(3), Some(SLOT));
    assert_eq!(store.create(fields("Dan", "Smith", date(1984, 7, 9))).unwrap(), 4);
}

#[test]
fn test_restore_rejects_duplicate_ids() {
    let (_temp, path, mut store) = setup_temp_store();
    store.create(fields("Ann", "Smith", date(1984, 7, 9))).unwrap();
    let record = store.all_records().unwrap().remove(0);
    let before = fs::read(&path).unwrap();

    let result = store.restore(&Snapshot::new(vec![record.clone(), record]));

    assert!(matches!(result, Err(CabinetError::InvalidOperation(_))));
    assert_eq!(fs::read(&path).unwrap(), before);
}
