//! Summary metrics over an order set

use super::order::{Order, OrderStatus, Region};
use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::collections::HashSet;

crate::keyed_table!(
    /// Per-status values, one slot per [`OrderStatus`]
    StatusTable,
    OrderStatus
);

crate::keyed_table!(
    /// Per-region values, one slot per [`Region`]
    RegionTable,
    Region
);

crate::keyed_table!(
    /// Per-weekday values, Sunday first
    WeekdayTable,
    Weekday
);

/// Orders and revenue that fell on one weekday
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyActivity {
    pub orders: u64,
    pub revenue: f64,
}

/// Aggregated metrics for the current (possibly filtered) order set
///
/// Every table is zero-filled: a status or region without orders reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub status_counts: StatusTable<u64>,
    pub region_counts: RegionTable<u64>,
    pub region_revenue: RegionTable<f64>,
    pub unique_customers: u64,
    /// Order count and revenue grouped by day of week
    pub weekday: WeekdayTable<DailyActivity>,
}

impl OrderStats {
    /// Share of orders with `status`, in percent
    pub fn status_share(&self, status: OrderStatus) -> f64 {
        percent(self.status_counts[status], self.total_orders)
    }

    /// Share of delivered orders, in percent
    pub fn delivered_share(&self) -> f64 {
        self.status_share(OrderStatus::Delivered)
    }

    /// Share of orders placed in `region`, in percent
    pub fn region_share(&self, region: Region) -> f64 {
        percent(self.region_counts[region], self.total_orders)
    }

    /// The most frequent status and its count
    ///
    /// Ties go to the status listed first in [`OrderStatus::ALL`]. Returns
    /// `None` for an empty set.
    pub fn top_status(&self) -> Option<(OrderStatus, u64)> {
        self.status_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .fold(None, |best: Option<(OrderStatus, u64)>, (status, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((status, *count)),
            })
    }

    /// Mean order amount, 0 for an empty set
    pub fn average_order_value(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.total_revenue / self.total_orders as f64
        }
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Reduce an order set to its summary metrics in a single pass
pub fn aggregate(orders: &[Order]) -> OrderStats {
    let mut stats = OrderStats::default();
    let mut customers: HashSet<&str> = HashSet::new();

    for order in orders {
        stats.total_orders += 1;
        stats.total_revenue += order.amount;
        stats.status_counts[order.status] += 1;
        stats.region_counts[order.region] += 1;
        stats.region_revenue[order.region] += order.amount;

        let day = &mut stats.weekday[order.created_at.weekday()];
        day.orders += 1;
        day.revenue += order.amount;

        customers.insert(order.customer.as_str());
    }

    stats.unique_customers = customers.len() as u64;
    stats
}
