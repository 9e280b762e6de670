//! Kafka-compatible producer (Kafka, Redpanda) built on rdkafka.

use super::MovieEventPublisher;
use crate::error::EventError;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};

pub struct KafkaMovieProducer {
    producer: FutureProducer,
    topic: String,
}

impl KafkaMovieProducer {
    /// Producer for `brokers` (comma-separated bootstrap servers) publishing to `topic`.
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, EventError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| EventError::Producer(e.to_string()))?;
        let topic = topic.into();
        tracing::info!(brokers = %brokers, topic = %topic, "kafka producer created");
        Ok(KafkaMovieProducer { producer, topic })
    }
}

#[async_trait]
impl MovieEventPublisher for KafkaMovieProducer {
    fn topic(&self) -> &str {
        &self.topic
    }

    /// Enqueues the message on the producer's local queue. The delivery future is
    /// dropped, so broker acknowledgement is never awaited.
    async fn publish(&self, payload: Vec<u8>) -> Result<(), EventError> {
        let record: FutureRecord<'_, (), Vec<u8>> = FutureRecord::to(&self.topic).payload(&payload);
        match self.producer.send_result(record) {
            Ok(_delivery) => {
                tracing::debug!(topic = %self.topic, bytes = payload.len(), "movie event enqueued");
                Ok(())
            }
            Err((e, _)) => Err(EventError::Publish(e.to_string())),
        }
    }
}
