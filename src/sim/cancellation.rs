use std::collections::HashMap;
use tokio::sync::{watch, Mutex};

use crate::domain::OrderId;

// ============================================================================
// Cancellation Controller - External Cancel Requests by Order Id
// ============================================================================
//
// Keeps one watch channel per live order task. A cancel request flips the
// channel and removes the registration; the scheduler task observes the
// signal at its next (or current) timer wait. Requests for unknown or
// already-finished orders are no-ops, never errors - that covers the race
// where an order finishes naturally the same instant a cancel arrives.
//
// ============================================================================

pub struct CancellationController {
    registrations: Mutex<HashMap<OrderId, watch::Sender<bool>>>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// Register a live order task and get its cancellation signal receiver.
    pub async fn register(&self, order_id: OrderId) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        if self
            .registrations
            .lock()
            .await
            .insert(order_id, tx)
            .is_some()
        {
            // Last-writer-wins; only reachable with externally supplied ids
            // since generated ids are unique by construction.
            tracing::warn!(order_id, "replacing existing cancellation registration");
        }
        rx
    }

    /// Signal the task owning `order_id` to cancel.
    ///
    /// Unknown id, or an order that already reached a terminal state, is a
    /// silent no-op.
    pub async fn request_cancel(&self, order_id: OrderId) {
        match self.registrations.lock().await.remove(&order_id) {
            Some(tx) => {
                // The receiver may already be gone if the order finished
                // this same instant; the signal is then simply unobserved.
                let _ = tx.send(true);
                tracing::info!(order_id, "cancellation requested");
            }
            None => {
                tracing::debug!(order_id, "ignoring cancel for unknown or finished order");
            }
        }
    }

    /// Drop the registration of an order that finished naturally.
    pub async fn release(&self, order_id: OrderId) {
        self.registrations.lock().await.remove(&order_id);
    }

    /// Number of live registrations (orders still in flight).
    pub async fn active_orders(&self) -> usize {
        self.registrations.lock().await.len()
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}
