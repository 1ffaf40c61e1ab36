pub mod config;
pub mod db;
pub mod error;

// Pantry matching
pub mod pantry;

// HTTP API
pub mod api;

// Command line
pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
