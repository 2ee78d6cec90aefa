// SPDX-License-Identifier: GPL-3.0-or-later
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chorrosion_domain::DomainEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// Receives domain events raised by write operations.
pub trait EventPublisher: Send + Sync {
    fn publish<T>(&self, event: &DomainEvent<T>)
    where
        T: Serialize + Send + Sync + 'static;
}

/// An event as captured by [`InMemoryEventBus`], with its payload serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedEvent {
    pub name: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

const DEFAULT_CAPACITY: usize = 1024;

/// Keeps the most recent events in memory. Clones share one buffer; once
/// `capacity` is reached the oldest event is dropped.
#[derive(Clone)]
pub struct InMemoryEventBus {
    events: Arc<Mutex<VecDeque<RecordedEvent>>>,
    capacity: usize,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("event bus lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<&'static str> {
        let events = self.events.lock().expect("event bus lock poisoned");
        events.iter().map(|event| event.name).collect()
    }

    /// Remove and return everything captured so far, oldest first.
    pub fn drain(&self) -> Vec<RecordedEvent> {
        let mut events = self.events.lock().expect("event bus lock poisoned");
        events.drain(..).collect()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish<T>(&self, event: &DomainEvent<T>)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let payload = match serde_json::to_value(&event.payload) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(target: "events", event = event.name, error = %err, "dropping event with unserializable payload");
                return;
            }
        };

        let mut events = self.events.lock().expect("event bus lock poisoned");
        if events.len() == self.capacity {
            if let Some(dropped) = events.pop_front() {
                debug!(target: "events", event = dropped.name, "event buffer full, dropped oldest");
            }
        }
        events.push_back(RecordedEvent {
            name: event.name,
            occurred_at: event.occurred_at,
            payload,
        });
    }
}
