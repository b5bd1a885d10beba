//! Synthetic order generation
//!
//! The generator stands in for a real order backend. Every call returns a
//! brand-new collection; nothing is kept between calls.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use orderboard::core::generator::{OrderGenerator, RegionDistribution};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let generator = OrderGenerator::new().with_distribution(RegionDistribution::Uniform { count: 150 });
//! let orders = generator.generate(&mut StdRng::seed_from_u64(7), Utc::now());
//! assert_eq!(orders.len(), 150);
//! ```

use super::order::{Order, OrderStatus, Region, round_to};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Amelia", "Chen", "Charlotte", "Diego", "Emily", "Farah", "George", "Hana", "Isla",
    "Jack", "Kenji", "Liam", "Mei", "Noah", "Olivia", "Priya", "Quinn", "Ravi", "Sofia",
    "Thomas", "Uma", "Wei", "Yuki", "Zara",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Brown", "Chua", "Davies", "Evans", "Fernandez", "Garcia", "Hughes", "Ito",
    "Johnson", "Khan", "Lee", "Miller", "Nguyen", "O'Brien", "Patel", "Roberts", "Singh",
    "Tanaka", "Walker", "Wang", "Williams", "Wilson", "Wright", "Zhang",
];

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_NUMBER_LEN: usize = 8;

/// Longest accepted timestamp window, in days
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Most decimal places kept on generated amounts
pub const MAX_DECIMALS: u32 = 6;

/// How many orders each region receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RegionDistribution {
    /// `count` orders, each assigned a region uniformly at random
    Uniform { count: usize },

    /// An independent count per region, drawn uniformly from `[min, max]`
    Bucketed { min: usize, max: usize },

    /// Exact count per region
    Fixed { apac: usize, uk: usize, us: usize },
}

impl Default for RegionDistribution {
    fn default() -> Self {
        RegionDistribution::Fixed {
            apac: 50,
            uk: 50,
            us: 50,
        }
    }
}

impl RegionDistribution {
    /// Draw the region of every order to generate
    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Region> {
        match *self {
            RegionDistribution::Uniform { count } => (0..count)
                .map(|_| Region::ALL[rng.gen_range(0..Region::ALL.len())])
                .collect(),
            RegionDistribution::Bucketed { min, max } => {
                let (lo, hi) = (min.min(max), min.max(max));
                Region::ALL
                    .into_iter()
                    .flat_map(|region| {
                        let count = rng.gen_range(lo..=hi);
                        std::iter::repeat_n(region, count)
                    })
                    .collect()
            }
            RegionDistribution::Fixed { apac, uk, us } => [
                (Region::Apac, apac),
                (Region::Uk, uk),
                (Region::Us, us),
            ]
            .into_iter()
            .flat_map(|(region, count)| std::iter::repeat_n(region, count))
            .collect(),
        }
    }
}

/// How statuses are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Every canonical status is equally likely
    Uniform,

    /// Draw from a weight table; missing statuses have weight 0
    Weighted { weights: BTreeMap<OrderStatus, f64> },
}

impl Default for StatusPolicy {
    fn default() -> Self {
        StatusPolicy::weighted([
            (OrderStatus::Delivered, 0.55),
            (OrderStatus::Shipped, 0.20),
            (OrderStatus::Processing, 0.10),
            (OrderStatus::PendingPayment, 0.07),
            (OrderStatus::Cancelled, 0.05),
            (OrderStatus::Returned, 0.03),
        ])
    }
}

impl StatusPolicy {
    pub fn weighted(weights: impl IntoIterator<Item = (OrderStatus, f64)>) -> Self {
        StatusPolicy::Weighted {
            weights: weights.into_iter().collect(),
        }
    }

    /// The four-state table used before the wider status vocabulary
    pub fn legacy_weights() -> Self {
        StatusPolicy::weighted([
            (OrderStatus::Delivered, 0.60),
            (OrderStatus::Shipped, 0.20),
            (OrderStatus::PendingPayment, 0.15),
            (OrderStatus::Cancelled, 0.05),
        ])
    }

    /// Build the sampler, falling back to uniform for unusable weights
    fn sampler(&self) -> StatusSampler {
        match self {
            StatusPolicy::Uniform => StatusSampler::Uniform,
            StatusPolicy::Weighted { weights } => {
                let table = OrderStatus::ALL.map(|status| {
                    weights
                        .get(&status)
                        .copied()
                        .filter(|w| w.is_finite() && *w > 0.0)
                        .unwrap_or(0.0)
                });

                match WeightedIndex::new(table) {
                    Ok(index) => StatusSampler::Weighted(index),
                    Err(e) => {
                        tracing::warn!(error = %e, "Unusable status weights, drawing uniformly");
                        StatusSampler::Uniform
                    }
                }
            }
        }
    }
}

enum StatusSampler {
    Uniform,
    Weighted(WeightedIndex<f64>),
}

impl StatusSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> OrderStatus {
        match self {
            StatusSampler::Uniform => OrderStatus::ALL[rng.gen_range(0..OrderStatus::ALL.len())],
            StatusSampler::Weighted(index) => OrderStatus::ALL[index.sample(rng)],
        }
    }
}

/// Final ordering of a generated batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOrdering {
    /// Newest order first
    #[default]
    NewestFirst,

    /// Random order
    Shuffled,

    /// Grouped by region in generation order
    AsGenerated,
}

/// Produces batches of synthetic orders within configured bounds
#[derive(Debug, Clone, PartialEq)]
pub struct OrderGenerator {
    distribution: RegionDistribution,
    status_policy: StatusPolicy,
    window: Duration,
    amount_min: f64,
    amount_max: f64,
    decimals: u32,
    ordering: BatchOrdering,
}

impl Default for OrderGenerator {
    fn default() -> Self {
        Self {
            distribution: RegionDistribution::default(),
            status_policy: StatusPolicy::default(),
            window: Duration::days(30),
            amount_min: 10.0,
            amount_max: 5000.0,
            decimals: 2,
            ordering: BatchOrdering::default(),
        }
    }
}

impl OrderGenerator {
    /// Generator with default bounds: 50 orders per region over the last
    /// 30 days, amounts between 10 and 5000
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distribution(mut self, distribution: RegionDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Timestamps fall within `window` before the generation instant
    ///
    /// Negative windows are treated as empty; windows longer than
    /// [`MAX_WINDOW_DAYS`] are clamped.
    pub fn with_window(mut self, window: Duration) -> Self {
        let max = Duration::days(i64::from(MAX_WINDOW_DAYS));
        self.window = window.clamp(Duration::zero(), max);
        self
    }

    /// Amount bounds; swapped if reversed and floored at zero
    pub fn with_amount_range(mut self, min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
        let max = if max.is_finite() { max.max(0.0) } else { min };
        (self.amount_min, self.amount_max) = if min <= max { (min, max) } else { (max, min) };
        self
    }

    /// Decimal places kept on amounts, at most [`MAX_DECIMALS`]
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals.min(MAX_DECIMALS);
        self
    }

    pub fn with_ordering(mut self, ordering: BatchOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn distribution(&self) -> &RegionDistribution {
        &self.distribution
    }

    /// Generate a new batch
    ///
    /// `now` is the upper bound of the timestamp window.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Order> {
        let sampler = self.status_policy.sampler();
        let regions = self.distribution.plan(rng);

        let mut orders: Vec<Order> = regions
            .into_iter()
            .map(|region| self.generate_one(rng, &sampler, region, now))
            .collect();

        match self.ordering {
            BatchOrdering::NewestFirst => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            BatchOrdering::Shuffled => orders.shuffle(rng),
            BatchOrdering::AsGenerated => {}
        }

        tracing::debug!(count = orders.len(), "Generated order batch");

        orders
    }

    fn generate_one<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        sampler: &StatusSampler,
        region: Region,
        now: DateTime<Utc>,
    ) -> Order {
        let mut id_bytes = [0u8; 16];
        rng.fill(&mut id_bytes);
        let id = uuid::Builder::from_random_bytes(id_bytes).into_uuid();

        Order {
            id: id.to_string(),
            region,
            customer: random_customer(rng),
            order_number: random_order_number(rng),
            created_at: self.random_timestamp(rng, now),
            amount: self.random_amount(rng),
            status: sampler.sample(rng),
        }
    }

    fn random_timestamp<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
        let window_ms = self.window.num_milliseconds();
        if window_ms <= 0 {
            return now;
        }
        let offset = Duration::milliseconds(rng.gen_range(0..=window_ms));
        now.checked_sub_signed(offset).unwrap_or(now)
    }

    fn random_amount<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let raw = if self.amount_min < self.amount_max {
            rng.gen_range(self.amount_min..=self.amount_max)
        } else {
            self.amount_min
        };
        round_to(raw, self.decimals).clamp(self.amount_min.max(0.0), self.amount_max.max(0.0))
    }
}

fn random_customer<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    format!("{} {}", first, last)
}

fn random_order_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let code: String = (0..ORDER_NUMBER_LEN)
        .map(|_| ORDER_NUMBER_ALPHABET[rng.gen_range(0..ORDER_NUMBER_ALPHABET.len())] as char)
        .collect();
    format!("#{}", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_default_fixed_distribution() {
        let orders = OrderGenerator::new().generate(&mut rng(), Utc::now());
        assert_eq!(orders.len(), 150);
        for region in Region::ALL {
            assert_eq!(orders.iter().filter(|o| o.region == region).count(), 50);
        }
    }

    #[test]
    fn test_uniform_count() {
        let generator =
            OrderGenerator::new().with_distribution(RegionDistribution::Uniform { count: 37 });
        assert_eq!(generator.generate(&mut rng(), Utc::now()).len(), 37);

        let generator =
            OrderGenerator::new().with_distribution(RegionDistribution::Uniform { count: 0 });
        assert!(generator.generate(&mut rng(), Utc::now()).is_empty());
    }

    #[test]
    fn test_bucketed_counts_stay_in_range() {
        let generator = OrderGenerator::new()
            .with_distribution(RegionDistribution::Bucketed { min: 50, max: 0 })
            .with_ordering(BatchOrdering::AsGenerated);

        for seed in 0..20 {
            let orders = generator.generate(&mut StdRng::seed_from_u64(seed), Utc::now());
            for region in Region::ALL {
                let count = orders.iter().filter(|o| o.region == region).count();
                assert!(count <= 50);
            }
        }
    }

    #[test]
    fn test_attributes_within_bounds() {
        let now = Utc::now();
        let generator = OrderGenerator::new()
            .with_window(Duration::days(14))
            .with_amount_range(10.0, 50_000.0);
        let orders = generator.generate(&mut rng(), now);

        for order in &orders {
            assert!(order.created_at <= now);
            assert!(order.created_at >= now - Duration::days(14));
            assert!((10.0..=50_000.0).contains(&order.amount));
            assert_eq!(round_to(order.amount, 2), order.amount);
            assert!(order.order_number.starts_with('#'));
            assert_eq!(order.order_number.len(), 1 + ORDER_NUMBER_LEN);
            assert!(order.customer.contains(' '));
        }
    }

    #[test]
    fn test_newest_first() {
        let orders = OrderGenerator::new().generate(&mut rng(), Utc::now());
        assert!(orders.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_same_seed_same_batch() {
        let now = Utc::now();
        let generator = OrderGenerator::new();
        let a = generator.generate(&mut rng(), now);
        let b = generator.generate(&mut rng(), now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_are_unique() {
        let orders = OrderGenerator::new().generate(&mut rng(), Utc::now());
        let ids: std::collections::HashSet<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), orders.len());
    }

    #[test]
    fn test_weighted_policy_only_draws_weighted_statuses() {
        let generator = OrderGenerator::new()
            .with_distribution(RegionDistribution::Uniform { count: 500 })
            .with_status_policy(StatusPolicy::legacy_weights());
        let orders = generator.generate(&mut rng(), Utc::now());

        assert!(orders.iter().all(|o| !matches!(
            o.status,
            OrderStatus::Processing | OrderStatus::Returned
        )));
        let delivered = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count();
        assert!(delivered > 200, "expected a delivered majority, got {}", delivered);
    }

    #[test]
    fn test_invalid_weights_fall_back_to_uniform() {
        let generator = OrderGenerator::new()
            .with_distribution(RegionDistribution::Uniform { count: 50 })
            .with_status_policy(StatusPolicy::weighted([(OrderStatus::Shipped, -1.0)]));
        assert_eq!(generator.generate(&mut rng(), Utc::now()).len(), 50);
    }

    #[test]
    fn test_reversed_amount_range_is_swapped() {
        let generator = OrderGenerator::new().with_amount_range(100.0, 20.0);
        let orders = generator.generate(&mut rng(), Utc::now());
        assert!(orders.iter().all(|o| (20.0..=100.0).contains(&o.amount)));
    }

    #[test]
    fn test_status_policy_yaml() {
        let policy: StatusPolicy =
            serde_yaml::from_str("policy: weighted\nweights:\n  Delivered: 0.9\n  Pending: 0.1\n")
                .unwrap();
        assert_eq!(
            policy,
            StatusPolicy::weighted([
                (OrderStatus::Delivered, 0.9),
                (OrderStatus::PendingPayment, 0.1)
            ])
        );
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let now = Utc::now();
        let generator = OrderGenerator::new()
            .with_distribution(RegionDistribution::Uniform { count: 20 })
            .with_window(Duration::days(200_000_000));

        let orders = generator.generate(&mut rng(), now);

        let earliest = now - Duration::days(i64::from(MAX_WINDOW_DAYS));
        assert_eq!(orders.len(), 20);
        assert!(orders.iter().all(|o| o.created_at >= earliest && o.created_at <= now));
    }

    #[test]
    fn test_decimals_are_capped() {
        let generator = OrderGenerator::new()
            .with_distribution(RegionDistribution::Uniform { count: 30 })
            .with_decimals(u32::MAX);

        let orders = generator.generate(&mut rng(), Utc::now());

        assert!(orders.iter().all(|o| o.amount.is_finite() && o.amount >= 10.0));
        assert!(orders.iter().all(|o| o.amount <= 5000.0));
    }
}
