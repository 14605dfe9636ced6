use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::domain::{Order, OrderStatusChanged};

use super::cancellation::CancellationController;
use super::statistics::StatisticsHandle;

// ============================================================================
// Order Scheduler - One Task per Order Lifecycle
// ============================================================================
//
// Drives exactly one order from creation to a terminal state. Each loop
// iteration schedules a single randomized transition and waits out its
// delay while watching the cancellation signal, so there is never more
// than one in-flight timer per order. The task is the order's only writer;
// everyone else sees snapshots carried by emitted events.
//
// ============================================================================

enum TimerOutcome {
    Elapsed,
    Cancelled,
}

/// Run one order's lifecycle to completion.
///
/// Terminates when the order reaches a terminal status, either by walking
/// the transition table or through the cancellation override. An order that
/// is already terminal on entry yields no events.
pub(crate) async fn drive_order(
    mut order: Order,
    mut cancel_rx: watch::Receiver<bool>,
    stats: StatisticsHandle,
    controller: Arc<CancellationController>,
    delay_ms: RangeInclusive<u64>,
) {
    loop {
        let allowed = order.status.allowed_next();
        if allowed.is_empty() {
            // Terminal, or an unmapped status; either way a safe stop.
            break;
        }

        // Scope the rng so the task future stays Send across the wait.
        let (next, delay) = {
            let mut rng = rand::rng();
            let next = allowed[rng.random_range(0..allowed.len())];
            let delay = Duration::from_millis(rng.random_range(delay_ms.clone()));
            (next, delay)
        };

        tracing::debug!(
            order_id = order.id,
            from = %order.status,
            to = %next,
            delay_ms = delay.as_millis() as u64,
            "scheduling transition"
        );

        match wait_or_cancel(delay, &mut cancel_rx).await {
            TimerOutcome::Cancelled => {
                if order.cancel() {
                    tracing::info!(order_id = order.id, "order cancelled");
                    stats.observe(OrderStatusChanged::new(order.clone())).await;
                }
                break;
            }
            TimerOutcome::Elapsed => {
                if order.apply(next, delay) {
                    tracing::info!(
                        order_id = order.id,
                        status = %order.status,
                        "order transitioned"
                    );
                    stats.observe(OrderStatusChanged::new(order.clone())).await;
                }
            }
        }
    }

    // Release is a no-op after an explicit cancel (the controller already
    // removed the registration when it signalled).
    controller.release(order.id).await;
    tracing::debug!(order_id = order.id, status = %order.status, "order task finished");
}

/// Wait out one transition delay, preempted by the cancellation signal.
async fn wait_or_cancel(delay: Duration, cancel_rx: &mut watch::Receiver<bool>) -> TimerOutcome {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return TimerOutcome::Elapsed,
            changed = cancel_rx.changed() => {
                if *cancel_rx.borrow() {
                    return TimerOutcome::Cancelled;
                }
                if changed.is_err() {
                    // Registration dropped without a cancel; only the timer
                    // is left to wait on.
                    sleep.as_mut().await;
                    return TimerOutcome::Elapsed;
                }
            }
        }
    }
}
