//! Order source trait and the generator-backed mock implementation

use super::generator::OrderGenerator;
use super::order::Order;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Mutex;
use std::time::Duration;

/// Service trait producing a fresh batch of orders
///
/// Each call returns a complete collection that replaces the previous one.
/// The dashboard is agnostic to where the orders come from.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch the current batch of orders
    async fn fetch(&self) -> Result<Vec<Order>>;
}

/// Mock source that regenerates orders on every fetch
///
/// An optional latency simulates a network round trip.
pub struct MockOrderSource {
    generator: OrderGenerator,
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl MockOrderSource {
    /// Create a source seeded from system entropy
    pub fn new(generator: OrderGenerator) -> Self {
        Self::with_rng(generator, StdRng::from_entropy())
    }

    /// Create a deterministic source
    pub fn seeded(generator: OrderGenerator, seed: u64) -> Self {
        Self::with_rng(generator, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: OrderGenerator, rng: StdRng) -> Self {
        Self {
            generator,
            rng: Mutex::new(rng),
            latency: Duration::ZERO,
        }
    }

    /// Delay every fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for MockOrderSource {
    fn default() -> Self {
        Self::new(OrderGenerator::default())
    }
}

#[async_trait]
impl OrderSource for MockOrderSource {
    async fn fetch(&self) -> Result<Vec<Order>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|e| anyhow!("Failed to acquire generator lock: {}", e))?;

        Ok(self.generator.generate(&mut *rng, Utc::now()))
    }
}
