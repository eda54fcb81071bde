use domain::events::ORDER_CREATED;
use domain::OrderCreatedEvent;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Failed to create Kafka consumer: {0}")]
    ConsumerCreation(#[from] rdkafka::error::KafkaError),

    #[error("Failed to deserialize message: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Message has no payload")]
    NoPayload,
}

/// Subscribes to the order topic and writes every `order.created`
/// announcement to the log. Audit trail only; it never acts on the events.
pub struct OrderEventLogger {
    consumer: StreamConsumer,
}

impl OrderEventLogger {
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, ConsumerError> {
        info!(group_id, topic, "Creating order event logger");

        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", group_id)
            .set("bootstrap.servers", brokers)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .create()?;

        consumer.subscribe(&[topic])?;

        Ok(Self { consumer })
    }

    /// Consume until the task is dropped or aborted
    pub async fn run(self) {
        info!("Order event logger started");

        loop {
            match self.consumer.recv().await {
                Ok(msg) => {
                    let routing_key = routing_key_of(&msg);
                    match decode_order_created(routing_key.as_deref(), msg.payload()) {
                        Ok(Some(event)) => info!(
                            order_id = %event.order_id,
                            product_id = %event.product_id,
                            quantity_ordered = event.quantity_ordered,
                            timestamp = %event.timestamp,
                            "[EVENT LOGGER] Received 'order.created' event"
                        ),
                        Ok(None) => debug!(?routing_key, "Ignoring message"),
                        Err(e) => warn!(
                            partition = msg.partition(),
                            offset = msg.offset(),
                            "Undecodable order event: {}",
                            e
                        ),
                    }
                }
                Err(e) => {
                    error!(kafka_error = %e, "Kafka consumer error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Routing key from the header, falling back to the record key
fn routing_key_of<M: Message>(msg: &M) -> Option<String> {
    let from_header = msg.headers().and_then(|headers| {
        headers
            .iter()
            .find(|h| h.key == "routing_key")
            .and_then(|h| h.value)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    });

    from_header.or_else(|| msg.key().map(|k| String::from_utf8_lossy(k).into_owned()))
}

/// `Ok(None)` for messages published under another routing key
pub fn decode_order_created(
    routing_key: Option<&str>,
    payload: Option<&[u8]>,
) -> Result<Option<OrderCreatedEvent>, ConsumerError> {
    if routing_key.is_some_and(|k| k != ORDER_CREATED) {
        return Ok(None);
    }

    let payload = payload.ok_or(ConsumerError::NoPayload)?;
    Ok(Some(serde_json::from_slice(payload)?))
}
