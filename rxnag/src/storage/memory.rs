//! In-memory config storage

use super::Storage;
use crate::error::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps the serialized config in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// service and inspect writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing content, as if a previous run had saved it
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Rc::new(RefCell::new(Some(data.into()))),
        }
    }

    /// Current content as text, if any was written
    pub fn contents(&self) -> Option<String> {
        self.data
            .borrow()
            .as_ref()
            .map(|d| String::from_utf8_lossy(d).into_owned())
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Vec<u8>> {
        self.data
            .borrow()
            .clone()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound).into())
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        *self.data.borrow_mut() = Some(data.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
