//! Dashboard application state
//!
//! [`DashboardState`] is the single owner of the order collection, the active
//! filters and the table sort/page. Every mutation replaces whole values and
//! synchronously recomputes the derived data (filtered set, statistics,
//! sorted rows), then publishes a [`DashboardEvent`].
//!
//! Child views receive a [`DashboardView`]: a read-only handle plus the
//! region setter. A view does not keep the state alive; using it after the
//! owner is dropped returns [`DashboardError::OwnerDropped`].
//!
//! ```text
//!                      ┌──────────────── DashboardState (owner) ────────────────┐
//! LiveFeed ──replace──▶│ orders ─▶ filter ─▶ aggregate ─▶ sort ─▶ page          │
//!                      └──────────────┬──────────────────────────────┬──────────┘
//!                                     │ Weak                          │ EventBus
//!                               DashboardView ◀──── events ───────────┘
//! ```

pub mod feed;

pub use feed::LiveFeed;

use crate::config::DashboardConfig;
use crate::core::error::DashboardError;
use crate::core::events::{DashboardEvent, EventBus, EventEnvelope};
use crate::core::filter::{FilterCriteria, Selection, filter};
use crate::core::order::{Order, OrderStatus, Region};
use crate::core::query::{
    DEFAULT_PAGE_SIZE, Page, PaginationMeta, SortField, SortState, clamp_page, page_count,
    sort_in_place,
};
use crate::core::source::OrderSource;
use crate::core::stats::{OrderStats, aggregate};
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast;

/// Everything a view needs to render one frame
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Number of order batches received so far
    pub generation: u64,

    /// Size of the unfiltered collection
    pub total_orders: usize,

    pub criteria: FilterCriteria,

    pub sort: SortState,

    /// Statistics over the filtered set
    pub stats: OrderStats,

    /// Current page of the filtered, sorted set
    pub page: Page<Order>,
}

struct StateInner {
    orders: Arc<[Order]>,
    generation: u64,
    criteria: FilterCriteria,
    sort: SortState,
    page: usize,
    page_size: usize,
    /// Filtered and sorted
    rows: Arc<[Order]>,
    stats: OrderStats,
}

impl StateInner {
    fn new(page_size: usize) -> Self {
        Self {
            orders: Arc::from(Vec::new()),
            generation: 0,
            criteria: FilterCriteria::default(),
            sort: SortState::default(),
            page: 1,
            page_size: page_size.max(1),
            rows: Arc::from(Vec::new()),
            stats: OrderStats::default(),
        }
    }

    /// Filter, aggregate and sort from scratch
    fn recompute(&mut self) {
        let mut rows = filter(&self.orders, &self.criteria);
        self.stats = aggregate(&rows);
        sort_in_place(&mut rows, self.sort);
        self.rows = Arc::from(rows);

        tracing::debug!(
            generation = self.generation,
            total = self.orders.len(),
            matching = self.rows.len(),
            "Recomputed dashboard"
        );
    }

    fn resort(&mut self) {
        let mut rows = self.rows.to_vec();
        sort_in_place(&mut rows, self.sort);
        self.rows = Arc::from(rows);
    }

    fn total_pages(&self) -> usize {
        page_count(self.rows.len(), self.page_size)
    }

    fn clamp_page(&mut self) {
        self.page = clamp_page(self.page, self.total_pages());
    }

    fn current_page(&self) -> Page<Order> {
        let pagination = PaginationMeta::new(self.page, self.page_size, self.rows.len());
        Page {
            data: self.rows[pagination.range()].to_vec(),
            pagination,
        }
    }

    fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            generation: self.generation,
            total_orders: self.orders.len(),
            criteria: self.criteria.clone(),
            sort: self.sort,
            stats: self.stats.clone(),
            page: self.current_page(),
        }
    }

    fn apply_criteria(&mut self, criteria: FilterCriteria) -> Option<DashboardEvent> {
        if self.criteria == criteria {
            return None;
        }
        self.criteria = criteria;
        self.recompute();
        self.page = 1;

        Some(DashboardEvent::FiltersChanged {
            criteria: self.criteria.clone(),
            matching: self.rows.len(),
        })
    }

    /// Clamp `page` into range and move there
    fn move_to_page(&mut self, page: usize) -> Option<DashboardEvent> {
        let previous = self.page;
        self.page = clamp_page(page, self.total_pages());

        (self.page != previous).then(|| DashboardEvent::PageChanged {
            page: self.page,
            total_pages: self.total_pages(),
        })
    }
}

/// State cell shared between the owner, its views and the live feed
pub(crate) struct Shared {
    inner: RwLock<StateInner>,
    bus: EventBus,
}

impl Shared {
    fn read(&self) -> Result<RwLockReadGuard<'_, StateInner>, DashboardError> {
        self.inner
            .read()
            .map_err(|e| DashboardError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StateInner>, DashboardError> {
        self.inner
            .write()
            .map_err(|e| DashboardError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    /// Apply `mutate` under the write lock and publish what it returns
    fn update<F>(&self, mutate: F) -> Result<(), DashboardError>
    where
        F: FnOnce(&mut StateInner) -> Option<DashboardEvent>,
    {
        let event = {
            let mut inner = self.write()?;
            mutate(&mut inner)
        };

        if let Some(event) = event {
            self.bus.publish(event);
        }
        Ok(())
    }

    pub(crate) fn replace_orders(&self, orders: Vec<Order>) -> Result<u64, DashboardError> {
        let mut generation = 0;
        self.update(|inner| {
            inner.orders = Arc::from(orders);
            inner.generation += 1;
            inner.recompute();
            inner.clamp_page();
            generation = inner.generation;

            Some(DashboardEvent::OrdersReplaced {
                generation: inner.generation,
                order_count: inner.orders.len(),
                matching: inner.rows.len(),
            })
        })?;
        Ok(generation)
    }

    fn set_criteria(&self, criteria: FilterCriteria) -> Result<(), DashboardError> {
        self.update(|inner| inner.apply_criteria(criteria))
    }

    /// Edit the current criteria under a single write lock
    fn modify_criteria<F>(&self, modify: F) -> Result<(), DashboardError>
    where
        F: FnOnce(&mut FilterCriteria),
    {
        self.update(|inner| {
            let mut criteria = inner.criteria.clone();
            modify(&mut criteria);
            inner.apply_criteria(criteria)
        })
    }

    fn set_sort(&self, sort: SortState) -> Result<(), DashboardError> {
        self.update(|inner| {
            if inner.sort == sort {
                return None;
            }
            inner.sort = sort;
            inner.resort();
            inner.page = 1;

            Some(DashboardEvent::SortChanged { sort })
        })
    }

    fn apply_sort_input(&self, input: &str) -> Result<SortState, DashboardError> {
        let mut applied = SortState::default();
        self.update(|inner| {
            let sort = SortState::parse_or(input, inner.sort);
            applied = sort;
            if inner.sort == sort {
                return None;
            }
            inner.sort = sort;
            inner.resort();
            inner.page = 1;

            Some(DashboardEvent::SortChanged { sort })
        })?;
        Ok(applied)
    }

    fn select_sort(&self, field: SortField) -> Result<SortState, DashboardError> {
        let mut selected = SortState::default();
        self.update(|inner| {
            inner.sort = inner.sort.select(field);
            inner.resort();
            inner.page = 1;
            selected = inner.sort;

            Some(DashboardEvent::SortChanged { sort: inner.sort })
        })?;
        Ok(selected)
    }

    /// Move to `page`, clamped to the valid range; returns the page shown
    fn set_page(&self, page: usize) -> Result<usize, DashboardError> {
        let mut shown = 1;
        self.update(|inner| {
            let event = inner.move_to_page(page);
            shown = inner.page;
            event
        })?;
        Ok(shown)
    }

    fn step_page(&self, forward: bool) -> Result<usize, DashboardError> {
        let mut shown = 1;
        self.update(|inner| {
            let target = if forward {
                inner.page.saturating_add(1)
            } else {
                inner.page.saturating_sub(1)
            };
            let event = inner.move_to_page(target);
            shown = inner.page;
            event
        })?;
        Ok(shown)
    }

    fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        Ok(self.read()?.snapshot())
    }

    fn stats(&self) -> Result<OrderStats, DashboardError> {
        Ok(self.read()?.stats.clone())
    }

    fn orders(&self) -> Result<Arc<[Order]>, DashboardError> {
        Ok(Arc::clone(&self.read()?.rows))
    }

    fn criteria(&self) -> Result<FilterCriteria, DashboardError> {
        Ok(self.read()?.criteria.clone())
    }
}

/// Owner of the dashboard state
///
/// There is exactly one owner; it is deliberately not `Clone`. Hand out
/// [`DashboardView`]s to anything that only reads.
///
/// # Example
///
/// ```rust,ignore
/// let state = DashboardState::new(50);
/// let feed = state.start_live_feed(Arc::new(MockOrderSource::default()), Duration::from_secs(30));
///
/// state.set_region(Region::Apac)?;
/// let snapshot = state.snapshot()?;
///
/// feed.stop().await;
/// ```
pub struct DashboardState {
    shared: Arc<Shared>,
}

impl DashboardState {
    /// Create an empty state with the given page size
    pub fn new(page_size: usize) -> Self {
        Self::with_event_bus(page_size, EventBus::default())
    }

    /// Create an empty state publishing on `bus`
    pub fn with_event_bus(page_size: usize, bus: EventBus) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: RwLock::new(StateInner::new(page_size)),
                bus,
            }),
        }
    }

    /// Create an empty state from the table and feed sections of `config`
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::with_event_bus(
            config.table.page_size,
            EventBus::new(config.feed.event_capacity),
        )
    }

    /// Replace the whole order collection; returns the new generation
    ///
    /// The current page is kept when still valid and clamped otherwise.
    pub fn replace_orders(&self, orders: Vec<Order>) -> Result<u64, DashboardError> {
        self.shared.replace_orders(orders)
    }

    /// Fetch a batch from `source` and install it
    pub async fn refresh(&self, source: &dyn OrderSource) -> Result<u64, DashboardError> {
        let orders = source.fetch().await?;
        self.replace_orders(orders)
    }

    /// Replace all filter criteria; resets to page 1 when they change
    pub fn set_criteria(&self, criteria: FilterCriteria) -> Result<(), DashboardError> {
        self.shared.set_criteria(criteria)
    }

    pub fn set_region(&self, region: impl Into<Selection<Region>>) -> Result<(), DashboardError> {
        let region = region.into();
        self.shared.modify_criteria(|c| c.region = region)
    }

    pub fn set_status(
        &self,
        status: impl Into<Selection<OrderStatus>>,
    ) -> Result<(), DashboardError> {
        let status = status.into();
        self.shared.modify_criteria(|c| c.status = status)
    }

    pub fn set_search(&self, search: impl Into<String>) -> Result<(), DashboardError> {
        let search = search.into();
        self.shared.modify_criteria(|c| c.search = search)
    }

    /// Clear search, region and status
    pub fn reset_filters(&self) -> Result<(), DashboardError> {
        self.shared.modify_criteria(FilterCriteria::reset)
    }

    /// Header click: flip the active field or sort a new one ascending
    pub fn select_sort(&self, field: SortField) -> Result<SortState, DashboardError> {
        self.shared.select_sort(field)
    }

    pub fn set_sort(&self, sort: SortState) -> Result<(), DashboardError> {
        self.shared.set_sort(sort)
    }

    /// Apply a `field[:asc|desc]` sort request from the UI
    ///
    /// Invalid input keeps the current sort instead of failing. Returns the
    /// sort in effect afterwards.
    pub fn set_sort_input(&self, input: &str) -> Result<SortState, DashboardError> {
        self.shared.apply_sort_input(input)
    }

    /// Go to `page`, clamped to `[1, total_pages]`; returns the page shown
    pub fn set_page(&self, page: usize) -> Result<usize, DashboardError> {
        self.shared.set_page(page)
    }

    pub fn next_page(&self) -> Result<usize, DashboardError> {
        self.shared.step_page(true)
    }

    pub fn previous_page(&self) -> Result<usize, DashboardError> {
        self.shared.step_page(false)
    }

    pub fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.shared.snapshot()
    }

    pub fn stats(&self) -> Result<OrderStats, DashboardError> {
        self.shared.stats()
    }

    /// The full filtered and sorted set
    pub fn orders(&self) -> Result<Arc<[Order]>, DashboardError> {
        self.shared.orders()
    }

    pub fn criteria(&self) -> Result<FilterCriteria, DashboardError> {
        self.shared.criteria()
    }

    /// Read-only handle for child views
    pub fn view(&self) -> DashboardView {
        DashboardView {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.shared.bus.subscribe()
    }

    /// Start regenerating orders from `source` every `period`
    ///
    /// The first fetch happens immediately. The returned [`LiveFeed`] must be
    /// kept alive; dropping it cancels the task.
    pub fn start_live_feed(&self, source: Arc<dyn OrderSource>, period: Duration) -> LiveFeed {
        LiveFeed::spawn(Arc::downgrade(&self.shared), source, period)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Read-only handle to a [`DashboardState`] plus the region setter
///
/// Views are cheap to clone and never extend the lifetime of the state.
#[derive(Clone)]
pub struct DashboardView {
    shared: Weak<Shared>,
}

impl DashboardView {
    fn upgrade(&self) -> Result<Arc<Shared>, DashboardError> {
        self.shared.upgrade().ok_or_else(|| {
            tracing::error!("Dashboard view used after its owning state was dropped");
            DashboardError::OwnerDropped
        })
    }

    /// Whether the owning state still exists
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    pub fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.upgrade()?.snapshot()
    }

    pub fn stats(&self) -> Result<OrderStats, DashboardError> {
        self.upgrade()?.stats()
    }

    /// The full filtered and sorted set
    pub fn orders(&self) -> Result<Arc<[Order]>, DashboardError> {
        self.upgrade()?.orders()
    }

    pub fn criteria(&self) -> Result<FilterCriteria, DashboardError> {
        self.upgrade()?.criteria()
    }

    /// Region filter setter exposed to child views
    pub fn set_region(&self, region: impl Into<Selection<Region>>) -> Result<(), DashboardError> {
        let region = region.into();
        self.upgrade()?.modify_criteria(|c| c.region = region)
    }

    pub fn subscribe(&self) -> Result<broadcast::Receiver<EventEnvelope>, DashboardError> {
        Ok(self.upgrade()?.bus.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn orders(count: usize) -> Vec<Order> {
        let now = Utc::now();
        (0..count)
            .map(|i| {
                let region = Region::ALL[i % 3];
                let status = if i % 2 == 0 {
                    OrderStatus::Delivered
                } else {
                    OrderStatus::Shipped
                };
                Order::new(
                    region,
                    format!("Customer {}", i),
                    (i + 1) as f64,
                    status,
                    now - ChronoDuration::minutes(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_state_snapshot() {
        let state = DashboardState::default();
        let snapshot = state.snapshot().unwrap();

        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.total_orders, 0);
        assert_eq!(snapshot.page.pagination.page, 1);
        assert_eq!(snapshot.page.pagination.total_pages, 1);
        assert_eq!(snapshot.stats.total_orders, 0);
    }

    #[test]
    fn test_replace_orders_recomputes() {
        let state = DashboardState::new(10);
        let generation = state.replace_orders(orders(25)).unwrap();
        assert_eq!(generation, 1);

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.total_orders, 25);
        assert_eq!(snapshot.stats.total_orders, 25);
        assert_eq!(snapshot.page.data.len(), 10);
        assert_eq!(snapshot.page.pagination.total_pages, 3);
        // default sort is newest first
        assert_eq!(snapshot.page.data[0].customer, "Customer 0");
    }

    #[test]
    fn test_filter_change_resets_page_and_stats() {
        let state = DashboardState::new(5);
        state.replace_orders(orders(30)).unwrap();
        state.set_page(4).unwrap();

        state.set_region(Region::Apac).unwrap();
        let snapshot = state.snapshot().unwrap();

        assert_eq!(snapshot.page.pagination.page, 1);
        assert_eq!(snapshot.stats.total_orders, 10);
        assert_eq!(snapshot.stats.region_counts[Region::Uk], 0);
        assert!(snapshot.page.data.iter().all(|o| o.region == Region::Apac));
    }

    #[test]
    fn test_sort_change_resets_page() {
        let state = DashboardState::new(5);
        state.replace_orders(orders(30)).unwrap();
        state.set_page(3).unwrap();

        let sort = state.select_sort(SortField::Amount).unwrap();
        assert_eq!(sort, SortState::ascending(SortField::Amount));

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.page.pagination.page, 1);
        assert_eq!(snapshot.page.data[0].amount, 1.0);

        let sort = state.select_sort(SortField::Amount).unwrap();
        assert_eq!(sort, SortState::descending(SortField::Amount));
        assert_eq!(state.snapshot().unwrap().page.data[0].amount, 30.0);
    }

    #[test]
    fn test_page_is_clamped() {
        let state = DashboardState::new(10);
        state.replace_orders(orders(25)).unwrap();

        assert_eq!(state.set_page(99).unwrap(), 3);
        assert_eq!(state.next_page().unwrap(), 3);
        assert_eq!(state.set_page(0).unwrap(), 1);
        assert_eq!(state.previous_page().unwrap(), 1);
        assert_eq!(state.next_page().unwrap(), 2);
    }

    #[test]
    fn test_regeneration_clamps_page() {
        let state = DashboardState::new(10);
        state.replace_orders(orders(25)).unwrap();
        state.set_page(3).unwrap();

        state.replace_orders(orders(12)).unwrap();
        assert_eq!(state.snapshot().unwrap().page.pagination.page, 2);
    }

    #[test]
    fn test_reset_filters() {
        let state = DashboardState::new(10);
        state.replace_orders(orders(9)).unwrap();
        state.set_status(OrderStatus::Shipped).unwrap();
        state.set_search("customer 1").unwrap();
        assert_eq!(state.orders().unwrap().len(), 1);

        state.reset_filters().unwrap();
        assert_eq!(state.orders().unwrap().len(), 9);
        assert!(state.criteria().unwrap().is_unfiltered());
    }

    #[test]
    fn test_view_reads_and_sets_region() {
        let state = DashboardState::new(10);
        state.replace_orders(orders(9)).unwrap();
        let view = state.view();

        view.set_region(Region::Us).unwrap();
        assert_eq!(view.stats().unwrap().total_orders, 3);
        assert_eq!(state.criteria().unwrap().region, Selection::Only(Region::Us));
        assert_eq!(view.orders().unwrap().len(), 3);
    }

    #[test]
    fn test_view_fails_after_owner_dropped() {
        let state = DashboardState::default();
        let view = state.view();
        assert!(view.is_attached());

        drop(state);

        assert!(!view.is_attached());
        assert!(matches!(view.snapshot(), Err(DashboardError::OwnerDropped)));
        assert!(matches!(
            view.set_region(Region::Uk),
            Err(DashboardError::OwnerDropped)
        ));
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let state = DashboardState::new(10);
        let mut rx = state.subscribe();

        state.replace_orders(orders(12)).unwrap();
        state.set_region(Region::Uk).unwrap();
        state.select_sort(SortField::Customer).unwrap();
        state.set_page(2).unwrap();

        let kinds: Vec<_> = [
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.event.kind())
        .collect();
        assert_eq!(kinds, ["orders_replaced", "filters_changed", "sort_changed"]);

        // UK has 4 orders: page 2 does not exist, the page stays at 1
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unchanged_criteria_do_not_publish() {
        let state = DashboardState::default();
        let mut rx = state.subscribe();

        state.set_criteria(FilterCriteria::default()).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
