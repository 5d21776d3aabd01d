//! RxNag library
//!
//! This library exposes the core functionality of RxNag for testing
//! and for hosts that want to drive the reminder loop themselves.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod services;
pub mod storage;
pub mod view;
