//! Conjunctive order filtering by region, status and free text

use super::error::ParseError;
use super::order::{Order, OrderStatus, Region};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Either every value or exactly one
///
/// Serializes as `null` for [`Selection::All`] and as the bare value otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<T>", into = "Option<T>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` passes this selection
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

impl<T> From<Selection<T>> for Option<T> {
    fn from(value: Selection<T>) -> Self {
        match value {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl<T: FromStr<Err = ParseError>> FromStr for Selection<T> {
    type Err = ParseError;

    /// `all` (any case) or an empty string selects everything
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Selection::All);
        }
        trimmed.parse().map(Selection::Only)
    }
}

/// Active filter state of the orders view
///
/// All predicates are combined with logical AND, so the order in which they
/// are applied does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of order id, order number or customer name
    pub search: String,

    pub region: Selection<Region>,

    pub status: Selection<OrderStatus>,
}

impl FilterCriteria {
    /// Criteria that keep every order
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<Selection<Region>>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<Selection<OrderStatus>>) -> Self {
        self.status = status.into();
        self
    }

    /// Clear search, region and status
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether these criteria keep every order
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.region.is_all() && self.status.is_all()
    }

    /// Whether a single order passes every predicate
    pub fn matches(&self, order: &Order) -> bool {
        self.matcher().matches(order)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            criteria: self,
            needle: self.search.to_lowercase(),
        }
    }
}

impl From<Region> for Selection<Region> {
    fn from(region: Region) -> Self {
        Selection::Only(region)
    }
}

impl From<OrderStatus> for Selection<OrderStatus> {
    fn from(status: OrderStatus) -> Self {
        Selection::Only(status)
    }
}

/// Criteria with the search needle lower-cased once
struct Matcher<'a> {
    criteria: &'a FilterCriteria,
    needle: String,
}

impl Matcher<'_> {
    fn matches(&self, order: &Order) -> bool {
        self.criteria.region.matches(&order.region)
            && self.criteria.status.matches(&order.status)
            && order.matches_search(&self.needle)
    }
}

/// Keep the orders that pass `criteria`, preserving their relative order
pub fn filter(orders: &[Order], criteria: &FilterCriteria) -> Vec<Order> {
    if criteria.is_unfiltered() {
        return orders.to_vec();
    }

    let matcher = criteria.matcher();
    orders
        .iter()
        .filter(|order| matcher.matches(order))
        .cloned()
        .collect()
}
