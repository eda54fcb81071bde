pub mod commands;
pub mod errors;
pub mod events;
pub mod models;

pub use commands::order_commands::CreateOrderRequest;
pub use errors::DomainError;
pub use events::order_events::OrderCreatedEvent;
pub use events::DomainEvent;
pub use models::order::{NewOrder, Order, OrderStatus};
pub use models::product::ProductInfo;
