//! HTTP handlers for the notification server.

pub mod extract;
pub mod health;
pub mod notifications;
pub mod products;

pub use extract::Payload;
pub use health::{health_check, index, metrics_endpoint, not_found};
pub use notifications::{
    send_home_notification, send_product_notification, send_topic_notification, test_notification,
};
pub use products::list_products;
