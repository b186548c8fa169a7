//! Shared application state.

use livegraph_core::LiveGraphConfig;
use livegraph_store::{GraphStore, StatsAggregator};
use tracing::{info, warn};

use crate::activity::ActivityLog;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: LiveGraphConfig,
    pub store: GraphStore,
    pub stats: StatsAggregator,
    pub activity: Option<ActivityLog>,
}

impl AppState {
    /// Build empty state. An activity log that cannot be opened is disabled
    /// with a warning rather than preventing startup.
    pub fn new(config: LiveGraphConfig) -> Self {
        let activity = config
            .activity_log
            .as_deref()
            .and_then(|path| match ActivityLog::open(path) {
                Ok(log) => {
                    info!("Activity log: {}", log.path().display());
                    Some(log)
                }
                Err(e) => {
                    warn!("Activity log disabled, cannot open {}: {}", path.display(), e);
                    None
                }
            });

        Self {
            store: GraphStore::new(config.retention),
            stats: StatsAggregator::new(),
            activity,
            config,
        }
    }
}
