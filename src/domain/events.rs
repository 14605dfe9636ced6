use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::Order;

// ============================================================================
// Domain Events - Status Change Notifications
// ============================================================================
//
// One event is emitted when an order is created and after every applied
// transition, carrying a full snapshot of the order at that moment. Per
// order, events arrive in transition order; across orders, no ordering is
// defined.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub event_id: Uuid,
    pub order: Order,
    pub occurred_at: DateTime<Utc>,
}

impl OrderStatusChanged {
    pub fn new(order: Order) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            order,
            occurred_at: Utc::now(),
        }
    }
}
