//! Sorting and pagination utilities

use super::error::ParseError;
use super::order::Order;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Default number of rows per table page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Order attributes the table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Customer,
    Region,
    CreatedAt,
    Amount,
    Status,
    OrderNumber,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Customer,
        SortField::Region,
        SortField::CreatedAt,
        SortField::Amount,
        SortField::Status,
        SortField::OrderNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Customer => "customer",
            SortField::Region => "region",
            SortField::CreatedAt => "created_at",
            SortField::Amount => "amount",
            SortField::Status => "status",
            SortField::OrderNumber => "order_number",
        }
    }

    /// Compare two orders by this field, ascending
    ///
    /// Timestamps compare as instants and amounts numerically; every other
    /// field compares as case-insensitive text.
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self {
            SortField::Customer => cmp_text(&a.customer, &b.customer),
            SortField::Region => cmp_text(a.region.as_str(), b.region.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Amount => a.amount.total_cmp(&b.amount),
            SortField::Status => cmp_text(a.status.as_str(), b.status.as_str()),
            SortField::OrderNumber => cmp_text(&a.order_number, &b.order_number),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "customer_name" => Ok(SortField::Customer),
            "region" => Ok(SortField::Region),
            "created_at" | "time" | "timestamp" => Ok(SortField::CreatedAt),
            "amount" => Ok(SortField::Amount),
            "status" => Ok(SortField::Status),
            "order_number" | "order" => Ok(SortField::OrderNumber),
            _ => Err(ParseError::UnknownSortField(s.to_string())),
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ParseError::UnknownSortDirection(s.to_string())),
        }
    }
}

/// Active sort of the orders table
///
/// Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Header-click semantics
    ///
    /// Selecting the active field flips the direction; selecting another field
    /// sorts it ascending.
    pub fn select(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flip())
        } else {
            Self::ascending(field)
        }
    }

    /// Lenient parse of UI input in the `field[:asc|desc]` form
    ///
    /// An unknown field keeps `fallback` unchanged. An unknown direction keeps
    /// the fallback direction when the field is unchanged and ascending
    /// otherwise. Neither case is an error.
    pub fn parse_or(input: &str, fallback: SortState) -> Self {
        let (field, direction) = match input.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (input, None),
        };

        let field = match field.parse::<SortField>() {
            Ok(field) => field,
            Err(e) => {
                tracing::warn!(error = %e, fallback = %fallback, "Ignoring invalid sort field");
                return fallback;
            }
        };

        let direction = match direction.map(str::parse::<SortDirection>) {
            None => SortDirection::Asc,
            Some(Ok(direction)) => direction,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring invalid sort direction");
                if field == fallback.field {
                    fallback.direction
                } else {
                    SortDirection::Asc
                }
            }
        };

        Self::new(field, direction)
    }

    /// [`SortState::parse_or`] falling back to the default sort
    pub fn parse_or_default(input: &str) -> Self {
        Self::parse_or(input, Self::default())
    }

    /// Compare two orders according to field and direction
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(b, a),
        }
    }
}

impl FromStr for SortState {
    type Err = ParseError;

    /// Parse `field` (ascending) or `field:asc|desc`
    ///
    /// # Example
    /// ```
    /// # use orderboard::core::query::{SortDirection, SortField, SortState};
    /// let sort: SortState = "amount:desc".parse().unwrap();
    /// assert_eq!(sort, SortState::new(SortField::Amount, SortDirection::Desc));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((field, direction)) => Ok(Self::new(field.parse()?, direction.parse()?)),
            None => Ok(Self::ascending(s.parse()?)),
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field, direction)
    }
}

/// Sort orders in place
///
/// The sort is stable in both directions: descending compares with the
/// operands swapped instead of reversing, so equal keys keep input order.
pub fn sort_in_place(orders: &mut [Order], sort: SortState) {
    orders.sort_by(|a, b| sort.compare(a, b));
}

/// Return a sorted copy of `orders`
pub fn sort(orders: &[Order], sort: SortState) -> Vec<Order> {
    let mut sorted = orders.to_vec();
    sort_in_place(&mut sorted, sort);
    sorted
}

/// Requested page of a table
///
/// All parameters have sensible defaults and out-of-range values are clamped
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get page size, ensuring minimum of 1
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

/// A page of items with its pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The items on this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages, never less than 1
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata, clamping page size and page number
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = page_count(total, page_size);
        let page = clamp_page(page, total_pages);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Index range of this page within the full collection
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }
}

/// Number of pages needed for `total` items
///
/// An empty collection still has one (empty) page, so "page 1 of 1" stays
/// well defined.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a page number into `[1, total_pages]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice one page out of an already ordered collection
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Page<T> {
    let pagination = PaginationMeta::new(page, page_size, items.len());

    Page {
        data: items[pagination.range()].to_vec(),
        pagination,
    }
}

/// Sort then paginate
pub fn sort_and_paginate(
    orders: &[Order],
    sort_state: SortState,
    request: PageRequest,
) -> Page<Order> {
    let sorted = sort(orders, sort_state);
    paginate(&sorted, request.page_size(), request.page())
}
