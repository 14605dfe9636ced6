// ============================================================================
// Domain Layer - Orders and Their Lifecycle
// ============================================================================
//
// Everything order-specific lives here:
// - Status enum + static transition table (status)
// - Order entity with transition/cancellation semantics (order)
// - Randomized order generation (factory)
// - Status change events (events)
//
// This layer has no knowledge of tasks, channels, or the simulation engine.
//
// ============================================================================

pub mod events;
pub mod factory;
pub mod order;
pub mod status;

// Re-export for convenience
pub use events::OrderStatusChanged;
pub use factory::{OrderFactory, DEFAULT_CATALOG};
pub use order::{Order, OrderId};
pub use status::OrderStatus;
