use crate::limits::MAX_RESOURCES;
use crate::notify::DEFAULT_CHANNEL_CAPACITY;

/// Runtime settings, read from `DATEBOOKER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prometheus exporter port; disabled when unset.
    pub metrics_port: Option<u16>,
    /// Buffered events per notification channel before slow subscribers lag.
    pub notify_capacity: usize,
    pub max_resources: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_port: None,
            notify_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_resources: MAX_RESOURCES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            metrics_port: lookup("DATEBOOKER_METRICS_PORT").and_then(|s| s.parse().ok()),
            notify_capacity: lookup("DATEBOOKER_NOTIFY_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.notify_capacity),
            max_resources: lookup("DATEBOOKER_MAX_RESOURCES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_resources),
        }
    }
}
