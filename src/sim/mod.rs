use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::config::SimulationConfig;
use crate::domain::{Order, OrderFactory, OrderStatusChanged};
use crate::registry::RegistryClient;

// ============================================================================
// Simulation Engine
// ============================================================================
//
// Task topology:
//   Simulation
//   ├── statistics aggregator task (serialized fan-in of all events)
//   ├── order emitter (paced generation, one scheduler task per order)
//   └── scheduler tasks (one per live order, tracked in a JoinSet)
//
// Cancellation requests and display subscriptions come in from outside
// through the controller and the broadcast stream; neither ever mutates an
// order directly.
//
// ============================================================================

pub mod cancellation;
pub mod statistics;

mod emitter;
mod scheduler;

pub use cancellation::CancellationController;
pub use statistics::{StatisticsAggregator, StatisticsHandle, StatsSnapshot};

pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) factory: Arc<OrderFactory>,
    stats: StatisticsHandle,
    controller: Arc<CancellationController>,
}

impl Simulation {
    /// Wire up the aggregator task, factory and cancellation controller for
    /// a validated configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let factory = Arc::new(OrderFactory::new(config.catalog.clone()));
        Self {
            config,
            factory,
            stats: StatisticsAggregator::spawn(),
            controller: Arc::new(CancellationController::new()),
        }
    }

    pub fn statistics(&self) -> &StatisticsHandle {
        &self.stats
    }

    pub fn controller(&self) -> Arc<CancellationController> {
        self.controller.clone()
    }

    /// Subscribe to the stream of order snapshots (the display boundary).
    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusChanged> {
        self.stats.subscribe()
    }

    /// Run the simulation to completion: seed any remotely fetched orders,
    /// emit the configured number of generated orders, then wait for every
    /// order task to reach a terminal state.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut tasks = JoinSet::new();

        if let Some(base_url) = self.config.registry_url.clone() {
            let client = RegistryClient::new(base_url);
            let name = self.config.registry_name.clone().unwrap_or_default();
            let seeded = client.fetch(&name).await;
            tracing::info!(count = seeded.len(), "seeding orders from remote registry");
            for order in seeded {
                self.launch(&mut tasks, order).await;
            }
        }

        emitter::run(self, &mut tasks).await;

        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                tracing::error!(error = %err, "order task failed");
            }
        }

        Ok(())
    }

    /// Observe a freshly created order and hand it to its own scheduler
    /// task. The creation event always precedes the order's transition
    /// events on the fan-in channel.
    pub(crate) async fn launch(&self, tasks: &mut JoinSet<()>, order: Order) {
        self.stats
            .observe(OrderStatusChanged::new(order.clone()))
            .await;
        let cancel_rx = self.controller.register(order.id).await;
        tasks.spawn(scheduler::drive_order(
            order,
            cancel_rx,
            self.stats.clone(),
            self.controller.clone(),
            self.config.delay_range(),
        ));
    }
}
