use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Failed to create Kafka producer: {0}")]
    ProducerCreation(String),

    #[error("Failed to publish event: {0}")]
    PublishFailed(String),
}

/// Fire-and-forget publish primitive. One attempt per call.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        body: Vec<u8>,
    ) -> Result<(), PublisherError>;
}

/// Kafka event publisher.
///
/// The routing key becomes the record key and is also carried in a
/// `routing_key` header so consumers can filter without parsing the body.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl KafkaEventPublisher {
    /// Create a new publisher
    ///
    /// # Arguments
    /// * `brokers` - Comma-separated list of Kafka brokers (e.g., "localhost:9092")
    ///
    /// # Example
    /// ```no_run
    /// use messaging::KafkaEventPublisher;
    ///
    /// let publisher = KafkaEventPublisher::new("localhost:9092")
    ///     .expect("Failed to create publisher");
    /// ```
    pub fn new(brokers: &str) -> Result<Self, PublisherError> {
        debug!("Creating Kafka producer for brokers: {}", brokers);

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "1")
            // at-most-once: a failed send is reported, never resent
            .set("retries", "0")
            .create()
            .map_err(|e| PublisherError::ProducerCreation(e.to_string()))?;

        Ok(Self {
            producer,
            send_timeout: Duration::from_secs(5),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        body: Vec<u8>,
    ) -> Result<(), PublisherError> {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "routing_key",
                value: Some(routing_key),
            })
            .insert(Header {
                key: "content-type",
                value: Some("application/json"),
            });

        let record = FutureRecord::to(topic)
            .key(routing_key)
            .payload(&body)
            .headers(headers);

        match self
            .producer
            .send(record, Timeout::After(self.send_timeout))
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    topic,
                    routing_key,
                    partition,
                    offset,
                    "Event published"
                );
                Ok(())
            }
            Err((err, _)) => {
                warn!(topic, routing_key, "Failed to publish event: {}", err);
                Err(PublisherError::PublishFailed(err.to_string()))
            }
        }
    }
}
