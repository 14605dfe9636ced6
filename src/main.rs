use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod registry;
mod sim;
mod utils;

use config::SimulationConfig;
use sim::Simulation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering; override with
    // RUST_LOG, e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,delivery_sim=debug")),
        )
        .init();

    tracing::info!("🚚 Starting delivery order simulation");

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(Path::new(&path))?,
        None => SimulationConfig::default(),
    };

    tracing::info!(
        order_count = config.order_count,
        spawn_period_ms = config.spawn_period_ms,
        catalog_size = config.catalog.len(),
        "configuration loaded"
    );

    let cancel_demo_after = Duration::from_millis(config.spawn_period_ms * 3 / 2);
    let simulation = Simulation::new(config);

    // Display adapter: render every order snapshot as a log line.
    let mut events = simulation.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(
                    order_id = event.order.id,
                    content = %event.order.content,
                    address = %event.order.address,
                    status = %event.order.status,
                    "📦 order update"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "display adapter lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Stand-in for the display's cancel affordance: cancel the first
    // generated order while its first transition is still pending.
    let controller = simulation.controller();
    tokio::spawn(async move {
        tokio::time::sleep(cancel_demo_after).await;
        controller.request_cancel(1).await;
    });

    simulation.run().await?;

    let stats = simulation.statistics().snapshot().await?;
    tracing::info!(
        total_orders = stats.total_orders,
        delivered_orders = stats.delivered_orders,
        "✅ simulation complete"
    );
    match stats.average_delivery_time {
        Some(average) => {
            tracing::info!(average_secs = average.as_secs_f64(), "average delivery time");
        }
        None => tracing::info!("average delivery time undefined; no orders delivered"),
    }
    if let Some(product) = stats.most_common_product {
        tracing::info!(product = %product, "most common product");
    }

    Ok(())
}
