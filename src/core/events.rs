//! Change notifications for dashboard subscribers
//!
//! The EventBus decouples the state owner (and the live feed writing through
//! it) from the views that re-render on change. It uses
//! `tokio::sync::broadcast` so any number of views can listen.
//!
//! # Architecture
//!
//! ```text
//! LiveFeed tick ───┐
//!                  ├──▶ DashboardState ──▶ EventBus::publish() ──▶ broadcast ──▶ chart view
//! Filter/sort UI ──┘                                                         ──▶ table view
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut rx = state.subscribe();
//!
//! while let Ok(envelope) = rx.recv().await {
//!     if envelope.event.kind() == "orders_replaced" {
//!         redraw(view.snapshot()?);
//!     }
//! }
//! ```

use super::filter::FilterCriteria;
use super::query::SortState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A change to the dashboard state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// The whole order collection was replaced
    OrdersReplaced {
        generation: u64,
        order_count: usize,
        matching: usize,
    },
    /// Filter criteria changed
    FiltersChanged {
        criteria: FilterCriteria,
        matching: usize,
    },
    /// Table sort changed
    SortChanged { sort: SortState },
    /// Current table page changed
    PageChanged { page: usize, total_pages: usize },
}

impl DashboardEvent {
    /// Short name of the event, matching its serialized `kind`
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardEvent::OrdersReplaced { .. } => "orders_replaced",
            DashboardEvent::FiltersChanged { .. } => "filters_changed",
            DashboardEvent::SortChanged { .. } => "sort_changed",
            DashboardEvent::PageChanged { .. } => "page_changed",
        }
    }

    /// Whether derived statistics changed with this event
    pub fn affects_stats(&self) -> bool {
        matches!(
            self,
            DashboardEvent::OrdersReplaced { .. } | DashboardEvent::FiltersChanged { .. }
        )
    }
}

/// Envelope wrapping a dashboard event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: DashboardEvent,
}

impl EventEnvelope {
    /// Create a new event envelope
    pub fn new(event: DashboardEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// The bus is cheap to clone (Arc internally) and can be shared across threads.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails: with no subscribers the event is dropped. Returns the
    /// number of receivers that will receive the event.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
