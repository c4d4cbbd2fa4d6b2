//! Configuration for FileCabinet
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CabinetError;

/// Main configuration for a cabinet instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Which backend to open
    pub storage: StorageKind,

    /// Data file used by the file backend
    pub data_file: PathBuf,

    /// fsync after every mutating write (file backend only)
    pub sync_on_write: bool,

    // -------------------------------------------------------------------------
    // Validation Configuration
    // -------------------------------------------------------------------------
    /// Rule set applied on create/edit
    pub validation_rules: ValidationRules,

    // -------------------------------------------------------------------------
    // Instrumentation
    // -------------------------------------------------------------------------
    /// Wrap the store in a `MeteredStore`
    pub use_stopwatch: bool,

    /// Wrap the store in a `LoggingStore`
    pub use_logger: bool,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Indexed in-process store, lost on exit
    Memory,

    /// Fixed-slot binary file store
    File,
}

/// Validation rule set selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRules {
    Default,
    Custom,
}

impl FromStr for StorageKind {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            other => Err(CabinetError::Config(format!(
                "unknown storage '{}', expected memory or file",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::File => write!(f, "file"),
        }
    }
}

impl FromStr for ValidationRules {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ValidationRules::Default),
            "custom" => Ok(ValidationRules::Custom),
            other => Err(CabinetError::Config(format!(
                "unknown validation rules '{}', expected default or custom",
                other
            ))),
        }
    }
}

impl fmt::Display for ValidationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRules::Default => write!(f, "default"),
            ValidationRules::Custom => write!(f, "custom"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKind::Memory,
            data_file: PathBuf::from("cabinet-records.db"),
            sync_on_write: false,
            validation_rules: ValidationRules::Default,
            use_stopwatch: false,
            use_logger: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage backend
    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.config.storage = kind;
        self
    }

    /// Set the data file path (file backend)
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Enable fsync after each mutating write
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.config.sync_on_write = enabled;
        self
    }

    /// Set the validation rule set
    pub fn validation_rules(mut self, rules: ValidationRules) -> Self {
        self.config.validation_rules = rules;
        self
    }

    /// Measure every store call
    pub fn use_stopwatch(mut self, enabled: bool) -> Self {
        self.config.use_stopwatch = enabled;
        self
    }

    /// Log every store call
    pub fn use_logger(mut self, enabled: bool) -> Self {
        self.config.use_logger = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
