//! # Orderboard
//!
//! The data layer of a live orders dashboard: a synthetic order feed, a
//! filter/aggregate/sort/paginate pipeline, and a single-owner state that
//! recomputes everything on change and notifies its views.
//!
//! ## Features
//!
//! - **Order Generator**: Seeded synthetic batches with configurable region and status distributions
//! - **Filtering**: Case-insensitive search combined with exact region and status filters
//! - **Statistics**: Zero-filled per-status, per-region and per-weekday tables
//! - **Sorting & Pagination**: Stable multi-field sort with clamped pages
//! - **Live Feed**: Periodic regeneration with immediate first fetch and clean shutdown
//! - **Configuration-Based**: Generator, table and feed settings via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orderboard::prelude::*;
//!
//! let config = DashboardConfig::from_yaml_file("config/dashboard.yaml")?;
//! let state = DashboardState::from_config(&config);
//! let feed = state.start_live_feed(Arc::new(config.source()), config.feed.refresh_interval());
//!
//! state.set_region(Region::Apac)?;
//! state.select_sort(SortField::Amount)?;
//!
//! let snapshot = state.snapshot()?;
//! println!("{} orders, {:.1}% delivered", snapshot.stats.total_orders, snapshot.stats.delivered_share());
//!
//! feed.stop().await;
//! ```

pub mod config;
pub mod core;
pub mod state;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Model ===
    pub use crate::core::order::{Order, OrderStatus, Region};

    // === Pipeline ===
    pub use crate::core::filter::{FilterCriteria, Selection, filter};
    pub use crate::core::query::{
        Page, PageRequest, PaginationMeta, SortDirection, SortField, SortState, paginate, sort,
        sort_and_paginate,
    };
    pub use crate::core::stats::{
        DailyActivity, OrderStats, RegionTable, StatusTable, WeekdayTable, aggregate,
    };

    // === Generation ===
    pub use crate::core::generator::{
        BatchOrdering, OrderGenerator, RegionDistribution, StatusPolicy,
    };
    pub use crate::core::source::{MockOrderSource, OrderSource};

    // === Events & Errors ===
    pub use crate::core::error::{ConfigError, DashboardError, ParseError};
    pub use crate::core::events::{DashboardEvent, EventBus, EventEnvelope};

    // === State ===
    pub use crate::state::{DashboardSnapshot, DashboardState, DashboardView, LiveFeed};

    // === Config ===
    pub use crate::config::{DashboardConfig, FeedConfig, GeneratorConfig, TableConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use std::sync::Arc;
}
