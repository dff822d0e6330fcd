//! In-process latched topic.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use super::{MAP_METADATA_TOPIC, MAP_TOPIC, Publisher};
use crate::core::{MapMetaData, OccupancyGrid};

struct TopicState<T> {
    last: Option<Arc<T>>,
    subscribers: Vec<Sender<Arc<T>>>,
}

/// Topic that replays its last value to every new subscriber.
///
/// Each subscriber gets its own unbounded channel, so one slow consumer never
/// blocks the publisher or the other subscribers. Subscribers whose receiver
/// was dropped are pruned on the next publish.
pub struct LatchedTopic<T> {
    name: String,
    state: Mutex<TopicState<T>>,
}

impl<T: Send + Sync + 'static> LatchedTopic<T> {
    /// Create an empty topic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(TopicState {
                last: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Attach a subscriber.
    ///
    /// If a value was published before, it is already waiting in the returned
    /// receiver.
    pub fn subscribe(&self) -> Receiver<Arc<T>> {
        let (tx, rx) = unbounded();
        // Replay and registration under one lock: no value is missed or duplicated
        let mut state = self.state.lock();
        if let Some(last) = &state.last {
            let _ = tx.send(Arc::clone(last));
        }
        state.subscribers.push(tx);
        rx
    }

    #[cfg(test)]
    fn latest(&self) -> Option<Arc<T>> {
        self.state.lock().last.clone()
    }
}

impl<T: Send + Sync + 'static> Publisher<T> for LatchedTopic<T> {
    fn publish(&self, msg: Arc<T>) {
        let mut state = self.state.lock();
        state.last = Some(Arc::clone(&msg));
        state
            .subscribers
            .retain(|tx| tx.send(Arc::clone(&msg)).is_ok());
        log::trace!(
            "Published on '{}' to {} subscriber(s)",
            self.name,
            state.subscribers.len()
        );
    }

    fn topic(&self) -> &str {
        &self.name
    }

    fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

/// The two latched map channels.
#[derive(Clone)]
pub struct MapTopics {
    /// Full grids.
    pub map: Arc<LatchedTopic<OccupancyGrid>>,
    /// Metadata only.
    pub metadata: Arc<LatchedTopic<MapMetaData>>,
}

impl MapTopics {
    /// Create both topics with their standard names.
    pub fn new() -> Self {
        Self {
            map: Arc::new(LatchedTopic::new(MAP_TOPIC)),
            metadata: Arc::new(LatchedTopic::new(MAP_METADATA_TOPIC)),
        }
    }
}

impl Default for MapTopics {
    fn default() -> Self {
        Self::new()
    }
}
