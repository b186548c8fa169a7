//! Live Graph Store: canonical graph model, bounded in-memory history, running stats.

pub mod memory;
pub mod stats;
pub mod types;

pub use memory::GraphStore;
pub use stats::{format_uptime, StatsAggregator, StatsSnapshot};
pub use types::*;
