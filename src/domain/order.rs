use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::status::OrderStatus;

// ============================================================================
// Order - Simulated Delivery Order
// ============================================================================
//
// The unit of simulated work. Each order is exclusively owned and mutated
// by its own scheduler task; everything outside that task only ever sees
// cloned snapshots. Invalid transition attempts are silent no-ops, never
// errors - the order simply stays in its current state.
//
// ============================================================================

/// Unique order identity within one simulation run.
///
/// The id space is a process-wide monotonic counter (see `OrderFactory`),
/// so collisions cannot occur for locally generated orders.
pub type OrderId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub address: String,
    pub content: String,
    pub status: OrderStatus,
    /// Accumulated delivery time; only meaningful once the order reaches
    /// `Delivered`, where it holds the final transit leg's duration.
    #[serde(default)]
    pub delivery_time: Duration,
}

impl Order {
    /// Apply a table-driven transition to `next`.
    ///
    /// Returns `true` when the order actually changed. Attempts from a
    /// terminal state, or to a status outside the allowed set, leave the
    /// order untouched and return `false`.
    pub fn apply(&mut self, next: OrderStatus, elapsed: Duration) -> bool {
        if self.status.is_terminal() {
            tracing::debug!(
                order_id = self.id,
                status = %self.status,
                "ignoring transition attempt on terminal order"
            );
            return false;
        }

        if !self.status.allowed_next().contains(&next) {
            tracing::debug!(
                order_id = self.id,
                from = %self.status,
                to = %next,
                "ignoring transition not in the allowed set"
            );
            return false;
        }

        self.status = next;
        if next == OrderStatus::Delivered {
            self.delivery_time += elapsed;
        }
        true
    }

    /// Emergency cancellation override.
    ///
    /// Permitted from any non-terminal state regardless of the transition
    /// table; a no-op (returning `false`) once the order is terminal.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            tracing::debug!(
                order_id = self.id,
                status = %self.status,
                "ignoring cancellation of terminal order"
            );
            return false;
        }

        self.status = OrderStatus::Cancelled;
        true
    }
}
