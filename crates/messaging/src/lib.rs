pub mod consumer;
pub mod producer;

pub use consumer::{ConsumerError, OrderEventLogger};
pub use producer::{EventPublisher, KafkaEventPublisher, PublisherError};
