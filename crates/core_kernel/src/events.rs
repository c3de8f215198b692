//! Notification port
//!
//! Registries emit domain events through an [`EventPublisher`] after each
//! successful mutation. Publishing is fire-and-forget: the core never reads
//! anything back and a publisher cannot fail an operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Common surface of every domain event
pub trait DomainEvent: Serialize + Send + Sync {
    /// Returns the event type name
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of this event
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Sink for domain events
pub trait EventPublisher<E>: Send + Sync {
    /// Hands the event to the sink
    fn publish(&self, event: E);
}

/// Publisher that writes each event to the tracing log as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl<E: DomainEvent> EventPublisher<E> for TracingPublisher {
    fn publish(&self, event: E) {
        let payload = serde_json::to_string(&event)
            .unwrap_or_else(|e| format!("<unserializable event: {}>", e));
        info!(
            event_type = event.event_type(),
            timestamp = %event.timestamp(),
            payload = %payload,
            "domain event"
        );
    }
}

/// Publisher that keeps every event in memory
///
/// Clones share the same buffer, so a test can hand one clone to a registry
/// and inspect the other.
#[derive(Debug)]
pub struct RecordingPublisher<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> RecordingPublisher<E> {
    /// Creates an empty recorder
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of events recorded so far
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if nothing has been published
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone> RecordingPublisher<E> {
    /// Returns a copy of every recorded event, oldest first
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<E> Clone for RecordingPublisher<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for RecordingPublisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send> EventPublisher<E> for RecordingPublisher<E> {
    fn publish(&self, event: E) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
