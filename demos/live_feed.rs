//! Live dashboard demo
//!
//! Starts the feed, applies a few filters and prints a summary on every
//! state change until Ctrl+C or a fixed number of refreshes.
//!
//! ```text
//! cargo run --example live_feed -- config/dashboard.yaml
//! RUST_LOG=orderboard=debug cargo run --example live_feed
//! ```

use orderboard::prelude::*;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

const MAX_REFRESHES: u64 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orderboard=info")),
        )
        .init();

    println!("📊 Orderboard Live Feed Demo\n");

    let config = match std::env::args().nth(1) {
        Some(path) => DashboardConfig::from_yaml_file(&path)?,
        None => DashboardConfig::default(),
    };

    let state = DashboardState::from_config(&config);
    let view = state.view();
    let mut events = state.subscribe();

    let feed = state.start_live_feed(Arc::new(config.source()), config.feed.refresh_interval());

    let watch = async {
        loop {
            match events.recv().await {
                Ok(envelope) => {
                    println!("▶ {}", envelope.event.kind());
                    if envelope.event.affects_stats() {
                        print_summary(&view.snapshot()?);
                    }
                    if let DashboardEvent::OrdersReplaced { generation, .. } = envelope.event {
                        match generation {
                            1 => {
                                state.set_region(Region::Apac)?;
                                state.select_sort(SortField::Amount)?;
                                state.select_sort(SortField::Amount)?;
                            }
                            2 => state.set_status(OrderStatus::Delivered)?,
                            g if g >= MAX_REFRESHES => break,
                            _ => {}
                        }
                    }
                }
                Err(RecvError::Lagged(count)) => {
                    tracing::warn!(count = count, "Demo lagged, {} events skipped", count);
                }
                Err(RecvError::Closed) => break,
            }
        }
        Ok::<_, DashboardError>(())
    };

    tokio::select! {
        result = watch => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, stopping");
        }
    }

    feed.stop().await;
    println!("\n✅ Feed stopped");
    Ok(())
}

fn print_summary(snapshot: &DashboardSnapshot) {
    let stats = &snapshot.stats;

    println!(
        "   generation {} | {} of {} orders | revenue ${:.2} | {} customers",
        snapshot.generation,
        stats.total_orders,
        snapshot.total_orders,
        stats.total_revenue,
        stats.unique_customers,
    );

    for (status, count) in stats.status_counts.iter() {
        println!(
            "   {:<16} {:>4}  {:>5.1}%",
            status.as_str(),
            count,
            stats.status_share(status)
        );
    }

    let pagination = &snapshot.page.pagination;
    println!(
        "   sorted by {} | page {}/{}",
        snapshot.sort, pagination.page, pagination.total_pages
    );
    for order in snapshot.page.data.iter().take(3) {
        println!(
            "   {} {:<20} {:<4} {:>10.2} {}",
            order.order_number,
            order.customer,
            order.region.as_str(),
            order.amount,
            order.status.as_str()
        );
    }
}
