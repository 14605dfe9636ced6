use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::domain::{OrderId, OrderStatus, OrderStatusChanged};

// ============================================================================
// Statistics Aggregator - Serialized Fan-In of Status Events
// ============================================================================
//
// The aggregate is the only state touched by every order task, so all
// mutation is funneled through one mpsc channel into a task that owns the
// counters exclusively. No ambient globals, no shared locks.
//
// After updating the counters the aggregator re-broadcasts each event, which
// is the boundary display adapters subscribe on.
//
// ============================================================================

/// Capacity of the fan-in channel feeding the aggregator task.
const OBSERVE_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the re-broadcast channel consumed by display adapters.
const BROADCAST_CAPACITY: usize = 256;

enum StatsMessage {
    Observe(OrderStatusChanged),
    Snapshot(oneshot::Sender<StatsSnapshot>),
}

/// Point-in-time view of the running aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_orders: u64,
    pub delivered_orders: u64,
    pub cumulative_delivery_time: Duration,
    /// Mean delivery time over delivered orders; `None` until the first
    /// delivery rather than a division by zero.
    pub average_delivery_time: Option<Duration>,
    /// Highest occurrence count, ties broken by first-seen product.
    pub most_common_product: Option<String>,
    pub product_counts: HashMap<String, u64>,
}

struct ProductTally {
    count: u64,
    first_seen: u64,
}

pub struct StatisticsAggregator {
    total_orders: u64,
    delivered_orders: u64,
    cumulative_delivery_time: Duration,
    products: HashMap<String, ProductTally>,
    seen_orders: HashSet<OrderId>,
    delivered_order_ids: HashSet<OrderId>,
    seen_seq: u64,
    events_out: broadcast::Sender<OrderStatusChanged>,
}

impl StatisticsAggregator {
    fn new(events_out: broadcast::Sender<OrderStatusChanged>) -> Self {
        Self {
            total_orders: 0,
            delivered_orders: 0,
            cumulative_delivery_time: Duration::ZERO,
            products: HashMap::new(),
            seen_orders: HashSet::new(),
            delivered_order_ids: HashSet::new(),
            seen_seq: 0,
            events_out,
        }
    }

    /// Start the aggregator task and return the handle used to reach it.
    pub fn spawn() -> StatisticsHandle {
        let (tx, mut rx) = mpsc::channel(OBSERVE_CHANNEL_CAPACITY);
        let (events_out, _) = broadcast::channel(BROADCAST_CAPACITY);

        let handle = StatisticsHandle {
            tx,
            events: events_out.clone(),
        };

        tokio::spawn(async move {
            let mut aggregator = StatisticsAggregator::new(events_out);
            while let Some(message) = rx.recv().await {
                match message {
                    StatsMessage::Observe(event) => aggregator.observe(event),
                    StatsMessage::Snapshot(reply) => {
                        let _ = reply.send(aggregator.snapshot());
                    }
                }
            }
            tracing::debug!("statistics aggregator stopped");
        });

        handle
    }

    fn observe(&mut self, event: OrderStatusChanged) {
        let order = &event.order;

        // Total and per-product counts move once per order, on the first
        // observation, however many status changes follow.
        if self.seen_orders.insert(order.id) {
            self.total_orders += 1;
            let seq = self.seen_seq;
            self.seen_seq += 1;
            self.products
                .entry(order.content.clone())
                .or_insert(ProductTally {
                    count: 0,
                    first_seen: seq,
                })
                .count += 1;
        }

        // Delivery counters are idempotent per order: a duplicate Delivered
        // event (which the terminal invariant rules out anyway) cannot
        // double-count.
        if order.status == OrderStatus::Delivered && self.delivered_order_ids.insert(order.id) {
            self.delivered_orders += 1;
            self.cumulative_delivery_time += order.delivery_time;
        }

        // No subscribers is fine; the send error only means nobody is
        // displaying right now.
        let _ = self.events_out.send(event);
    }

    fn snapshot(&self) -> StatsSnapshot {
        let average_delivery_time = if self.delivered_orders > 0 {
            Some(self.cumulative_delivery_time / self.delivered_orders as u32)
        } else {
            None
        };

        let most_common_product = self
            .products
            .iter()
            .max_by(|a, b| {
                a.1.count
                    .cmp(&b.1.count)
                    .then_with(|| b.1.first_seen.cmp(&a.1.first_seen))
            })
            .map(|(product, _)| product.clone());

        StatsSnapshot {
            total_orders: self.total_orders,
            delivered_orders: self.delivered_orders,
            cumulative_delivery_time: self.cumulative_delivery_time,
            average_delivery_time,
            most_common_product,
            product_counts: self
                .products
                .iter()
                .map(|(product, tally)| (product.clone(), tally.count))
                .collect(),
        }
    }
}

// ============================================================================
// Statistics Handle - Observe / Snapshot Contract
// ============================================================================

#[derive(Clone)]
pub struct StatisticsHandle {
    tx: mpsc::Sender<StatsMessage>,
    events: broadcast::Sender<OrderStatusChanged>,
}

impl StatisticsHandle {
    /// Feed one status change event into the aggregator.
    pub async fn observe(&self, event: OrderStatusChanged) {
        if self.tx.send(StatsMessage::Observe(event)).await.is_err() {
            tracing::warn!("statistics aggregator is gone; dropping event");
        }
    }

    /// Request a consistent snapshot of the aggregates.
    pub async fn snapshot(&self) -> anyhow::Result<StatsSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StatsMessage::Snapshot(reply_tx))
            .await
            .map_err(|_| anyhow::anyhow!("statistics aggregator is gone"))?;
        Ok(reply_rx.await?)
    }

    /// Subscribe to the re-broadcast event stream (display boundary).
    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusChanged> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Order;

    fn aggregator() -> StatisticsAggregator {
        let (events_out, _) = broadcast::channel(16);
        StatisticsAggregator::new(events_out)
    }

    fn order(id: OrderId, content: &str, status: OrderStatus, delivery_time: Duration) -> Order {
        Order {
            id,
            address: format!("Address {}", id),
            content: content.to_string(),
            status,
            delivery_time,
        }
    }

    fn event(id: OrderId, content: &str, status: OrderStatus, delivery_time: Duration) -> OrderStatusChanged {
        OrderStatusChanged::new(order(id, content, status, delivery_time))
    }

    #[test]
    fn test_total_orders_counts_each_order_once() {
        let mut agg = aggregator();
        agg.observe(event(1, "A", OrderStatus::InTransit, Duration::ZERO));
        agg.observe(event(1, "A", OrderStatus::Shipped, Duration::ZERO));
        agg.observe(event(2, "A", OrderStatus::InTransit, Duration::ZERO));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.total_orders, 2);
    }

    #[test]
    fn test_product_counted_once_per_order_not_per_event() {
        let mut agg = aggregator();
        // One long-lived order producing three events.
        agg.observe(event(1, "Smartwatch", OrderStatus::InTransit, Duration::ZERO));
        agg.observe(event(1, "Smartwatch", OrderStatus::Shipped, Duration::ZERO));
        agg.observe(event(1, "Smartwatch", OrderStatus::Delivered, Duration::from_secs(2)));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.product_counts["Smartwatch"], 1);
    }

    #[test]
    fn test_delivered_counters_are_idempotent() {
        let mut agg = aggregator();
        let delivered = event(1, "A", OrderStatus::Delivered, Duration::from_secs(5));
        agg.observe(delivered.clone());
        agg.observe(delivered);

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.delivered_orders, 1);
        assert_eq!(snapshot.cumulative_delivery_time, Duration::from_secs(5));
    }

    #[test]
    fn test_average_is_mean_over_delivered_only() {
        let mut agg = aggregator();
        agg.observe(event(1, "A", OrderStatus::Delivered, Duration::from_secs(4)));
        agg.observe(event(2, "A", OrderStatus::Delivered, Duration::from_secs(8)));
        agg.observe(event(3, "A", OrderStatus::Cancelled, Duration::ZERO));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.average_delivery_time, Some(Duration::from_secs(6)));
    }

    #[test]
    fn test_average_with_zero_deliveries_is_defined() {
        let mut agg = aggregator();
        agg.observe(event(1, "A", OrderStatus::Cancelled, Duration::ZERO));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.average_delivery_time, None);
    }

    #[test]
    fn test_most_common_product_by_count() {
        let mut agg = aggregator();
        agg.observe(event(1, "A", OrderStatus::InTransit, Duration::ZERO));
        agg.observe(event(2, "A", OrderStatus::InTransit, Duration::ZERO));
        agg.observe(event(3, "B", OrderStatus::InTransit, Duration::ZERO));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.most_common_product.as_deref(), Some("A"));
    }

    #[test]
    fn test_most_common_product_tie_broken_by_first_seen() {
        let mut agg = aggregator();
        agg.observe(event(1, "B", OrderStatus::InTransit, Duration::ZERO));
        agg.observe(event(2, "A", OrderStatus::InTransit, Duration::ZERO));

        let snapshot = agg.snapshot();
        assert_eq!(snapshot.most_common_product.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_aggregate_snapshot() {
        let agg = aggregator();
        let snapshot = agg.snapshot();
        assert_eq!(snapshot.total_orders, 0);
        assert_eq!(snapshot.most_common_product, None);
        assert_eq!(snapshot.average_delivery_time, None);
    }

    #[tokio::test]
    async fn test_handle_round_trip_through_task() {
        let stats = StatisticsAggregator::spawn();
        let mut events = stats.subscribe();

        stats
            .observe(event(9, "Screen protector", OrderStatus::InTransit, Duration::ZERO))
            .await;

        let snapshot = stats.snapshot().await.unwrap();
        assert_eq!(snapshot.total_orders, 1);

        // The aggregator re-broadcast the event for display adapters.
        let forwarded = events.recv().await.unwrap();
        assert_eq!(forwarded.order.id, 9);
    }
}
