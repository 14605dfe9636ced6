use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::order::Order;
use super::status::OrderStatus;

// ============================================================================
// Order Factory - Randomized Order Generation
// ============================================================================

/// Default product catalog for generated orders.
pub const DEFAULT_CATALOG: [&str; 5] = [
    "Leather strap",
    "Smartwatch",
    "Wireless headphones",
    "Fitness tracker",
    "Screen protector",
];

/// Produces new orders with a uniformly random product and address suffix.
///
/// Ids come from a monotonic counter, so every order created by one factory
/// is unique for the lifetime of the simulation.
pub struct OrderFactory {
    catalog: Vec<String>,
    next_id: AtomicU64,
}

impl OrderFactory {
    /// Panics on an empty catalog; `SimulationConfig::validate` rejects that
    /// before a factory is ever built, so hitting this is a programming defect.
    pub fn new(catalog: Vec<String>) -> Self {
        assert!(!catalog.is_empty(), "product catalog must not be empty");
        Self {
            catalog,
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a fresh order: random product, random address, status
    /// `InTransit`, zero delivery time. Never blocks.
    pub fn create(&self) -> Order {
        let mut rng = rand::rng();
        let content = self.catalog[rng.random_range(0..self.catalog.len())].clone();
        let address = format!("Address {}", rng.random_range(0..100));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        Order {
            id,
            address,
            content,
            status: OrderStatus::InTransit,
            delivery_time: Duration::ZERO,
        }
    }
}

impl Default for OrderFactory {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_created_order_starts_in_transit_with_zero_delivery_time() {
        let factory = OrderFactory::default();
        let order = factory.create();

        assert_eq!(order.status, OrderStatus::InTransit);
        assert_eq!(order.delivery_time, Duration::ZERO);
        assert!(order.address.starts_with("Address "));
    }

    #[test]
    fn test_content_drawn_from_catalog() {
        let factory = OrderFactory::new(vec!["A".to_string(), "B".to_string()]);
        for _ in 0..50 {
            let order = factory.create();
            assert!(order.content == "A" || order.content == "B");
        }
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let factory = OrderFactory::default();
        let mut seen = HashSet::new();
        let mut last = 0;
        for _ in 0..100 {
            let order = factory.create();
            assert!(seen.insert(order.id));
            assert!(order.id > last);
            last = order.id;
        }
    }

    #[test]
    #[should_panic(expected = "product catalog must not be empty")]
    fn test_empty_catalog_rejected() {
        let _ = OrderFactory::new(Vec::new());
    }
}
