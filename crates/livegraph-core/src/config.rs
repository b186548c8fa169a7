//! Configuration loaded from the process environment.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How many graph records the store keeps before evicting the oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep every record for the lifetime of the process.
    #[default]
    Unbounded,
    /// Keep at most this many records, oldest evicted first.
    MaxRecords(NonZeroUsize),
}

impl RetentionPolicy {
    /// Maximum retained count, if bounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::MaxRecords(n) => Some(n.get()),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveGraphConfig {
    /// Bind address.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Store retention policy.
    pub retention: RetentionPolicy,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Append-only activity log; `None` disables it.
    pub activity_log: Option<PathBuf>,
}

impl Default for LiveGraphConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            retention: RetentionPolicy::Unbounded,
            max_body_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            activity_log: Some(PathBuf::from("graph_data.log")),
        }
    }
}

impl LiveGraphConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        let retention = match parse_var::<usize, _>(&lookup, "LIVEGRAPH_MAX_RETAINED")? {
            Some(n) => NonZeroUsize::new(n)
                .map(RetentionPolicy::MaxRecords)
                .unwrap_or(RetentionPolicy::Unbounded),
            None => defaults.retention,
        };

        let max_body_bytes =
            parse_var(&lookup, "LIVEGRAPH_MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes);
        if max_body_bytes == 0 {
            return Err(Error::Config(
                "LIVEGRAPH_MAX_BODY_BYTES must be greater than zero".into(),
            ));
        }

        let request_timeout = parse_var(&lookup, "LIVEGRAPH_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let activity_log = match lookup("LIVEGRAPH_ACTIVITY_LOG") {
            Some(v) if v.trim().is_empty() || v.trim().eq_ignore_ascii_case("off") => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => defaults.activity_log,
        };

        Ok(Self {
            host,
            port,
            retention,
            max_body_bytes,
            request_timeout,
            activity_log,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has invalid value {:?}", key, raw))),
        _ => Ok(None),
    }
}
