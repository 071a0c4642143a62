//! uptime-sync - reconcile declared HTTP monitors with an Uptime Kuma instance
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod error;
pub mod integrations;
pub mod reconcile;
pub mod util;

pub use error::SyncError;
