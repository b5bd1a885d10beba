//! Order entity and its closed enumerations

use super::error::ParseError;
use super::table::TableKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Geographic market an order belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Apac,
    Uk,
    Us,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Apac, Region::Uk, Region::Us];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Apac => "APAC",
            Region::Uk => "UK",
            Region::Us => "US",
        }
    }
}

impl TableKey for Region {
    const COUNT: usize = 3;
    const KEYS: &'static [Self] = &Region::ALL;

    fn index(&self) -> usize {
        *self as usize
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownRegion(s.to_string()))
    }
}

/// Lifecycle state of an order
///
/// This is the canonical vocabulary. The older four-state vocabulary
/// (`Pending | Shipped | Delivered | Cancelled`) is a subset once `Pending`
/// is read as [`OrderStatus::PendingPayment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    #[serde(rename = "Pending Payment", alias = "Pending")]
    PendingPayment,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
        OrderStatus::PendingPayment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
            OrderStatus::PendingPayment => "Pending Payment",
        }
    }

    /// Map a status from the legacy four-state vocabulary
    pub fn from_legacy(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::PendingPayment),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl TableKey for OrderStatus {
    const COUNT: usize = 6;
    const KEYS: &'static [Self] = &OrderStatus::ALL;

    fn index(&self) -> usize {
        *self as usize
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseError;

    /// Accepts display labels (`Pending Payment`), snake case
    /// (`pending_payment`) and legacy names (`Pending`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', " ");

        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
            .or_else(|| OrderStatus::from_legacy(&normalized))
            .ok_or_else(|| ParseError::UnknownStatus(s.to_string()))
    }
}

/// A single customer order
///
/// Orders are immutable once created: the feed replaces the whole collection
/// instead of editing individual records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Opaque unique identifier
    pub id: String,

    pub region: Region,

    /// Customer display name
    pub customer: String,

    /// Human facing order number, e.g. `#K3F9Q2ZD`
    pub order_number: String,

    pub created_at: DateTime<Utc>,

    /// Raw monetary amount; always finite and non-negative
    pub amount: f64,

    pub status: OrderStatus,
}

impl Order {
    /// Create an order with a fresh identifier
    ///
    /// The order number is derived from the identifier. Negative or
    /// non-finite amounts are clamped to zero.
    pub fn new(
        region: Region,
        customer: impl Into<String>,
        amount: f64,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = Uuid::new_v4();
        let order_number = format!("#{}", &id.simple().to_string()[..8].to_ascii_uppercase());

        Self {
            id: id.to_string(),
            region,
            customer: customer.into(),
            order_number,
            created_at,
            amount: sanitize_amount(amount),
            status,
        }
    }

    /// Replace the order number
    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = order_number.into();
        self
    }

    /// Case-insensitive substring match on id, order number and customer
    ///
    /// `needle` must already be lower-cased.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.id.to_lowercase().contains(needle)
            || self.order_number.to_lowercase().contains(needle)
            || self.customer.to_lowercase().contains(needle)
    }
}

/// Clamp an amount to a finite, non-negative value
pub(crate) fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() { amount.max(0.0) } else { 0.0 }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals.min(i32::MAX as u32) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}
