//! Core module containing the order model and the pure data pipeline
//!
//! Everything here is synchronous and side-effect free except
//! [`source`], which is the async seam to wherever orders come from.

pub mod error;
pub mod events;
pub mod filter;
pub mod generator;
pub mod order;
pub mod query;
pub mod source;
pub mod stats;
pub mod table;

pub use error::{ConfigError, DashboardError, ParseError};
pub use events::{DashboardEvent, EventBus, EventEnvelope};
pub use filter::{FilterCriteria, Selection, filter};
pub use generator::{BatchOrdering, OrderGenerator, RegionDistribution, StatusPolicy};
pub use order::{Order, OrderStatus, Region};
pub use query::{
    Page, PageRequest, PaginationMeta, SortDirection, SortField, SortState, paginate,
    sort_and_paginate,
};
pub use source::{MockOrderSource, OrderSource};
pub use stats::{DailyActivity, OrderStats, aggregate};
pub use table::TableKey;
