//! Configuration loading and management

use crate::core::error::{ConfigError, DashboardError};
use crate::core::generator::{
    BatchOrdering, MAX_DECIMALS, MAX_WINDOW_DAYS, OrderGenerator, RegionDistribution, StatusPolicy,
};
use crate::core::query::DEFAULT_PAGE_SIZE;
use crate::core::source::MockOrderSource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Bounds for synthetic order generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Orders per region
    pub distribution: RegionDistribution,

    /// How statuses are drawn
    pub status_policy: StatusPolicy,

    /// Timestamps fall within this many days before generation
    pub window_days: u32,

    pub amount_min: f64,

    pub amount_max: f64,

    /// Decimal places kept on amounts
    pub decimals: u32,

    /// Ordering of each generated batch
    pub ordering: BatchOrdering,

    /// Fixed RNG seed for reproducible batches
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            distribution: RegionDistribution::default(),
            status_policy: StatusPolicy::default(),
            window_days: 30,
            amount_min: 10.0,
            amount_max: 5000.0,
            decimals: 2,
            ordering: BatchOrdering::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Build the generator described by this configuration
    pub fn generator(&self) -> OrderGenerator {
        OrderGenerator::new()
            .with_distribution(self.distribution.clone())
            .with_status_policy(self.status_policy.clone())
            .with_window(chrono::Duration::days(i64::from(self.window_days)))
            .with_amount_range(self.amount_min, self.amount_max)
            .with_decimals(self.decimals)
            .with_ordering(self.ordering)
    }

    /// Build a mock source, seeded when `seed` is set
    pub fn source(&self) -> MockOrderSource {
        match self.seed {
            Some(seed) => MockOrderSource::seeded(self.generator(), seed),
            None => MockOrderSource::new(self.generator()),
        }
    }
}

/// Orders table settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page
    pub page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Live feed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between regenerations
    pub refresh_interval_secs: u64,

    /// Simulated fetch latency in milliseconds
    pub latency_ms: u64,

    /// Buffer size of the event bus
    pub event_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            latency_ms: 0,
            event_capacity: 1024,
        }
    }
}

impl FeedConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Complete dashboard configuration
///
/// Every section and field is optional in YAML; missing values take their
/// defaults.
///
/// # Example
/// ```yaml
/// generator:
///   distribution:
///     policy: bucketed
///     min: 0
///     max: 50
///   window_days: 14
/// table:
///   page_size: 25
/// feed:
///   refresh_interval_secs: 10
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub generator: GeneratorConfig,
    pub table: TableConfig,
    pub feed: FeedConfig,
}

impl DashboardConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load and validate configuration from a YAML string
    ///
    /// An empty document yields the default configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DashboardError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is within its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generator = &self.generator;

        for (field, value) in [
            ("generator.amount_min", generator.amount_min),
            ("generator.amount_max", generator.amount_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, "must be a non-negative number"));
            }
        }

        if generator.amount_min > generator.amount_max {
            return Err(ConfigError::invalid(
                "generator.amount_min",
                "must not exceed generator.amount_max",
            ));
        }

        if generator.decimals > MAX_DECIMALS {
            return Err(ConfigError::invalid(
                "generator.decimals",
                format!("must be at most {}", MAX_DECIMALS),
            ));
        }

        if generator.window_days > MAX_WINDOW_DAYS {
            return Err(ConfigError::invalid(
                "generator.window_days",
                format!("must be at most {}", MAX_WINDOW_DAYS),
            ));
        }

        if let StatusPolicy::Weighted { weights } = &generator.status_policy {
            if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ConfigError::invalid(
                    "generator.status_policy.weights",
                    "weights must be non-negative numbers",
                ));
            }
            if weights.values().sum::<f64>() <= 0.0 {
                return Err(ConfigError::invalid(
                    "generator.status_policy.weights",
                    "at least one weight must be positive",
                ));
            }
        }

        if self.table.page_size == 0 {
            return Err(ConfigError::invalid("table.page_size", "must be at least 1"));
        }

        if self.feed.refresh_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "feed.refresh_interval_secs",
                "must be at least 1",
            ));
        }

        if self.feed.event_capacity == 0 {
            return Err(ConfigError::invalid("feed.event_capacity", "must be at least 1"));
        }

        Ok(())
    }

    /// Mock source built from the generator and feed sections
    pub fn source(&self) -> MockOrderSource {
        self.generator.source().with_latency(self.feed.latency())
    }
}
