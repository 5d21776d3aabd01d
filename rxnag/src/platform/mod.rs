//! Platform-specific process handling

pub mod single_instance;

pub use single_instance::PidFile;
