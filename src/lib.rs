//! # FileCabinet
//!
//! A person record cabinet with two interchangeable storage backends:
//! - An in-memory store with first name, last name and date of birth indexes
//! - A flat binary file of fixed-size slots with tombstones and compaction
//! - Checksummed binary snapshots for bulk export/import
//! - Logging and timing decorators over the same store contract
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CLI / command collaborators                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RecordStore
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │          LoggingStore → MeteredStore (optional)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryStore │          │  FileStore  │
//!   │  (indexes)  │          │(OffsetIndex)│
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │    Codec    │
//!                           │ (278 B slot)│
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod record;

pub mod codec;
pub mod validation;
pub mod store;
pub mod snapshot;
pub mod instrument;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{CabinetError, Result};
pub use record::{Record, RecordFields};
pub use snapshot::Snapshot;
pub use store::{open_store, FileStore, MemoryStore, RecordStore, SharedStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FileCabinet
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
