//! Typed error handling for the dashboard core
//!
//! The pipeline itself never fails: out-of-range UI parameters are clamped and
//! ratios over empty sets are zero. Errors only come from the edges:
//!
//! - [`ConfigError`]: configuration loading and validation
//! - [`ParseError`]: unknown region, status or sort strings
//! - [`DashboardError::OwnerDropped`]: a view used after its state was dropped
//! - [`DashboardError::Source`]: an order source failed to produce a batch
//!
//! # Example
//!
//! ```rust,ignore
//! match view.snapshot() {
//!     Ok(snapshot) => render(snapshot),
//!     Err(DashboardError::OwnerDropped) => unreachable!("view outlived its dashboard"),
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use thiserror::Error;

/// The main error type for the dashboard core
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A string did not name a known region, status or sort field
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A read-only view was used after the owning state was dropped
    #[error("dashboard state accessed after its owner was dropped")]
    OwnerDropped,

    /// The order source failed to produce a batch
    #[error(transparent)]
    Source(#[from] anyhow::Error),

    /// Internal errors (poisoned locks)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Config(_) => "CONFIG_ERROR",
            DashboardError::Parse(e) => e.error_code(),
            DashboardError::OwnerDropped => "OWNER_DROPPED",
            DashboardError::Source(_) => "SOURCE_ERROR",
            DashboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field holds a value outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors raised when parsing closed enumerations from strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown region '{0}' (expected APAC, UK or US)")]
    UnknownRegion(String),

    #[error("Unknown order status '{0}'")]
    UnknownStatus(String),

    #[error("Unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("Unknown sort direction '{0}' (expected asc or desc)")]
    UnknownSortDirection(String),
}

impl ParseError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ParseError::UnknownRegion(_) => "UNKNOWN_REGION",
            ParseError::UnknownStatus(_) => "UNKNOWN_STATUS",
            ParseError::UnknownSortField(_) => "UNKNOWN_SORT_FIELD",
            ParseError::UnknownSortDirection(_) => "UNKNOWN_SORT_DIRECTION",
        }
    }
}
