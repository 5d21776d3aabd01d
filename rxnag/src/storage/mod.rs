//! Storage module
//!
//! Key-value persistence for the reminder state. The rest of the crate
//! only sees the [`Storage`] trait; the file-backed store is what the
//! binary uses, the in-memory store backs tests and embedders.

pub mod config_file;
pub mod memory;

pub use config_file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// Raw byte persistence for the serialized config
pub trait Storage {
    /// Read the stored bytes.
    ///
    /// Fails with an `Io` error of kind `NotFound` when nothing has been
    /// stored yet.
    fn read(&self) -> Result<Vec<u8>>;

    /// Replace the stored bytes
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}
