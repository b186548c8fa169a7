//! Live Graph Core: error taxonomy and configuration.

pub mod config;
pub mod error;

pub use config::{LiveGraphConfig, RetentionPolicy};
pub use error::{Error, Result};
