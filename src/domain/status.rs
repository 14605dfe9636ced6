use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Status - Lifecycle State Machine
// ============================================================================
//
// Closed enumeration of lifecycle states plus the static transition table.
// Serde names match the wire format used by the remote order registry.
//
// State machine:
//   InTransit ──> Shipped ──> Delivered   (terminal)
//                        └──> Cancelled   (terminal)
//
// Cancellation via CancellationController is an override on top of this
// table: it is allowed from any non-terminal state (see Order::cancel).
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "In transit")]
    InTransit,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses reachable from `self` in a single table-driven transition.
    ///
    /// Pure and total; terminal states map to the empty slice.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::InTransit => &[OrderStatus::Shipped],
            OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// A status is terminal exactly when it has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::InTransit => "In transit",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}
