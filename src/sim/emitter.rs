use std::time::Duration;
use tokio::task::JoinSet;

use super::Simulation;

// ============================================================================
// Order Emitter - Time-Paced Order Generation
// ============================================================================
//
// Produces a bounded sequence of new orders, one per configured period,
// and hands each to a fresh scheduler task. The emitter finishing its
// sequence never affects schedulers that are still running.
//
// ============================================================================

pub(crate) async fn run(sim: &Simulation, tasks: &mut JoinSet<()>) {
    let period = Duration::from_millis(sim.config.spawn_period_ms);
    let mut interval = tokio::time::interval(period);
    // The first tick of a tokio interval completes immediately; consume it
    // so each order lands one full period after the previous one.
    interval.tick().await;

    for _ in 0..sim.config.order_count {
        interval.tick().await;
        let order = sim.factory.create();
        tracing::info!(
            order_id = order.id,
            content = %order.content,
            address = %order.address,
            "order created"
        );
        sim.launch(tasks, order).await;
    }

    tracing::info!(count = sim.config.order_count, "order emitter completed");
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::sim::Simulation;
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::Instant;

    fn fast_config(order_count: u32) -> SimulationConfig {
        SimulationConfig {
            order_count,
            spawn_period_ms: 10,
            transition_delay_min_ms: 5,
            transition_delay_max_ms: 5,
            ..SimulationConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_emitter_produces_exactly_count_orders() {
        let sim = Simulation::new(fast_config(4));
        let mut tasks = JoinSet::new();

        super::run(&sim, &mut tasks).await;

        // Every emitted order was observed at creation time, before any of
        // its transitions may or may not have happened.
        let snapshot = sim.statistics().snapshot().await.unwrap();
        assert_eq!(snapshot.total_orders, 4);

        while tasks.join_next().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_emitter_paces_orders_by_period() {
        let sim = Simulation::new(fast_config(3));
        let mut tasks = JoinSet::new();

        let started = Instant::now();
        super::run(&sim, &mut tasks).await;

        // Three orders, one per 10ms period, the first after a full period.
        assert!(started.elapsed() >= Duration::from_millis(30));

        while tasks.join_next().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_emitter_completion_leaves_schedulers_running() {
        let config = SimulationConfig {
            order_count: 1,
            spawn_period_ms: 10,
            // Transitions far slower than the emitter.
            transition_delay_min_ms: 60_000,
            transition_delay_max_ms: 60_000,
            ..SimulationConfig::default()
        };
        let sim = Simulation::new(config);
        let mut tasks = JoinSet::new();

        super::run(&sim, &mut tasks).await;

        // Emitter is done but the single order task is still in flight.
        assert_eq!(sim.controller().active_orders().await, 1);

        while tasks.join_next().await.is_some() {}
        assert_eq!(sim.controller().active_orders().await, 0);
    }
}
