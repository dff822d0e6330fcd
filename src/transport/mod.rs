//! Publish/subscribe abstraction for map notifications.
//!
//! The server only needs one capability from its transport: "publish this
//! value to everyone interested, and keep it for late subscribers". That is
//! the [`Publisher`] trait. [`LatchedTopic`] is the in-process implementation
//! used by the binary and the tests; a networked transport would implement
//! the same trait.

mod latched;

pub use latched::{LatchedTopic, MapTopics};

use std::sync::Arc;

/// Topic carrying full occupancy grids.
pub const MAP_TOPIC: &str = "map";

/// Topic carrying map metadata only.
pub const MAP_METADATA_TOPIC: &str = "map_metadata";

/// Sink for published values.
///
/// Implementations must deliver values to each subscriber in publish order
/// and replay the most recent value to subscribers that attach later.
pub trait Publisher<T>: Send + Sync {
    /// Publish a value to all current and future subscribers.
    fn publish(&self, msg: Arc<T>);

    /// Topic name for logging/debugging
    fn topic(&self) -> &str;

    /// Number of currently attached subscribers
    fn subscriber_count(&self) -> usize;
}
