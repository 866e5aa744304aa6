//! sketch_core - Local state for the diagram sketcher
//!
//! This crate owns everything the sketcher keeps on the local device:
//! - `storage` - string-valued key-value slots (file backed or in memory)
//! - `credential` - the single API key slot
//! - `history` - the bounded list of recent diagrams
//! - `config` - runtime configuration and data paths

pub mod config;
pub mod credential;
pub mod error;
pub mod history;
pub mod paths;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use credential::{CredentialStore, CREDENTIAL_KEY, CREDENTIAL_PREFIX};
pub use error::{CoreError, Result};
pub use history::{
    display_name, export_file_name, HistoryCache, HistoryEntry, HISTORY_KEY, MAX_RECENT_DIAGRAMS,
    UNTITLED_DIAGRAM,
};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
