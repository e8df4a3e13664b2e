//! Builders that turn a notification intent into a [`PushMessage`].

use crate::models::{
    Product, PushMessage, PushTarget, CLICK_ACTION, DATA_CLICK_ACTION, DATA_PRODUCT_ID,
    DATA_PRODUCT_PRICE, DATA_PRODUCT_TITLE, DATA_TYPE, TYPE_HOME, TYPE_PRODUCT_DETAIL,
};
use std::collections::HashMap;

pub const HOME_DEFAULT_TITLE: &str = "Welcome Back!";
pub const HOME_DEFAULT_BODY: &str = "Check out our latest health supplements";
pub const TOPIC_DEFAULT_TITLE: &str = "Houzou Medical";
pub const TOPIC_DEFAULT_BODY: &str = "New update available!";
pub const TEST_HOME_TITLE: &str = "🏠 Test Home Notification";
pub const TEST_HOME_BODY: &str = "This will take you to the home screen!";
pub const TEST_PRODUCT_TITLE: &str = "🛍️ Test Product Notification";

fn base_data(message_type: &str) -> HashMap<String, String> {
    HashMap::from([
        (DATA_TYPE.to_string(), message_type.to_string()),
        (DATA_CLICK_ACTION.to_string(), CLICK_ACTION.to_string()),
    ])
}

fn attach_product(data: &mut HashMap<String, String>, product_id: &str, product: &Product) {
    data.insert(DATA_PRODUCT_ID.to_string(), product_id.to_string());
    data.insert(DATA_PRODUCT_TITLE.to_string(), product.title.clone());
    data.insert(DATA_PRODUCT_PRICE.to_string(), product.price.clone());
}

pub fn home(token: &str, title: Option<String>, body: Option<String>) -> PushMessage {
    PushMessage {
        target: PushTarget::Token(token.to_string()),
        title: title.unwrap_or_else(|| HOME_DEFAULT_TITLE.to_string()),
        body: body.unwrap_or_else(|| HOME_DEFAULT_BODY.to_string()),
        data: base_data(TYPE_HOME),
    }
}

/// `product_id` is the identifier as the caller sent it, not `product.id`.
pub fn product(
    token: &str,
    product_id: &str,
    product: &Product,
    title: Option<String>,
    body: Option<String>,
) -> PushMessage {
    let mut data = base_data(TYPE_PRODUCT_DETAIL);
    attach_product(&mut data, product_id, product);

    PushMessage {
        target: PushTarget::Token(token.to_string()),
        title: title.unwrap_or_else(|| format!("New Deal: {}", product.title)),
        body: body.unwrap_or_else(|| {
            format!(
                "Special offer on {} - {}. Tap to view details!",
                product.title, product.price
            )
        }),
        data,
    }
}

/// Product fields are attached only when `message_type` is `product_detail`
/// and a resolved product is given.
pub fn topic(
    topic: &str,
    message_type: Option<String>,
    product: Option<(&str, &Product)>,
    title: Option<String>,
    body: Option<String>,
) -> PushMessage {
    let message_type = message_type.unwrap_or_else(|| TYPE_HOME.to_string());
    let mut data = base_data(&message_type);
    if message_type == TYPE_PRODUCT_DETAIL {
        if let Some((product_id, product)) = product {
            attach_product(&mut data, product_id, product);
        }
    }

    PushMessage {
        target: PushTarget::Topic(topic.to_string()),
        title: title.unwrap_or_else(|| TOPIC_DEFAULT_TITLE.to_string()),
        body: body.unwrap_or_else(|| TOPIC_DEFAULT_BODY.to_string()),
        data,
    }
}

pub fn test_home(token: &str) -> PushMessage {
    home(
        token,
        Some(TEST_HOME_TITLE.to_string()),
        Some(TEST_HOME_BODY.to_string()),
    )
}

pub fn test_product(token: &str, product: &Product) -> PushMessage {
    let mut data = base_data(TYPE_PRODUCT_DETAIL);
    attach_product(&mut data, &product.id.to_string(), product);

    PushMessage {
        target: PushTarget::Token(token.to_string()),
        title: TEST_PRODUCT_TITLE.to_string(),
        body: format!("Check out {} - {}", product.title, product.price),
        data,
    }
}
