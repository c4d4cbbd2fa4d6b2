//! Instrumentation Module
//!
//! Decorators that implement `RecordStore` by owning and forwarding to
//! another store.
//!
//! - `LoggingStore`: logs every call, its arguments and its outcome
//! - `MeteredStore`: measures how long every call takes

mod logger;
mod meter;

pub use logger::{LoggingStore, AUDIT_TARGET};
pub use meter::{MeteredStore, METER_TARGET};
