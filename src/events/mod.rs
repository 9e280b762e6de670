//! Change-event publishing after a movie is created.
//!
//! Delivery is best effort and at most once: publishers hand the payload to the broker
//! client and return without waiting for an acknowledgement.

#[cfg(feature = "kafka")]
mod kafka;

#[cfg(feature = "kafka")]
pub use kafka::KafkaMovieProducer;

use crate::error::EventError;
use crate::model::MovieEvent;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Sink for encoded [`MovieEvent`] payloads.
#[async_trait]
pub trait MovieEventPublisher: Send + Sync {
    /// Topic the payloads are published to.
    fn topic(&self) -> &str;

    async fn publish(&self, payload: Vec<u8>) -> Result<(), EventError>;
}

/// Used when no broker is configured: decodes the payload and logs it.
pub struct LogPublisher {
    topic: String,
}

impl LogPublisher {
    pub fn new(topic: impl Into<String>) -> Self {
        LogPublisher { topic: topic.into() }
    }
}

#[async_trait]
impl MovieEventPublisher for LogPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), EventError> {
        let event = MovieEvent::decode(&payload)?;
        tracing::info!(
            topic = %self.topic,
            id = event.id,
            isbn = %event.isbn,
            title = %event.title,
            bytes = payload.len(),
            "movie event (no broker configured)"
        );
        Ok(())
    }
}

/// Keeps every payload in memory. Can be told to fail to exercise the best-effort path.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<Vec<u8>>>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher whose every publish call returns an error.
    pub fn failing() -> Self {
        RecordingPublisher {
            published: Arc::default(),
            fail: true,
        }
    }

    /// Payloads published so far, decoded.
    pub fn events(&self) -> Vec<MovieEvent> {
        self.payloads()
            .iter()
            .filter_map(|p| MovieEvent::decode(p).ok())
            .collect()
    }

    pub fn payloads(&self) -> Vec<Vec<u8>> {
        match self.published.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl MovieEventPublisher for RecordingPublisher {
    fn topic(&self) -> &str {
        "recorded"
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), EventError> {
        if self.fail {
            return Err(EventError::Publish("broker unavailable".into()));
        }
        match self.published.lock() {
            Ok(mut guard) => guard.push(payload),
            Err(poisoned) => poisoned.into_inner().push(payload),
        }
        Ok(())
    }
}
