use std::collections::HashMap;
use std::fmt;

/// `data.type` for notifications that open the home view.
pub const TYPE_HOME: &str = "home";
/// `data.type` for notifications that open a product detail view.
pub const TYPE_PRODUCT_DETAIL: &str = "product_detail";

/// Marker the receiving app uses to route a tapped notification.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

pub const DATA_TYPE: &str = "type";
pub const DATA_CLICK_ACTION: &str = "click_action";
pub const DATA_PRODUCT_ID: &str = "product_id";
pub const DATA_PRODUCT_TITLE: &str = "product_title";
pub const DATA_PRODUCT_PRICE: &str = "product_price";

/// Where a push message is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Token(String),
    Topic(String),
}

impl fmt::Display for PushTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushTarget::Token(_) => write!(f, "token"),
            PushTarget::Topic(topic) => write!(f, "topic:{}", topic),
        }
    }
}

/// Which route produced a notification; used for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Home,
    Product,
    Topic,
    Test,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Home => "home",
            NotificationKind::Product => "product",
            NotificationKind::Topic => "topic",
            NotificationKind::Test => "test",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built push notification, ready to hand to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub target: PushTarget,
    pub title: String,
    pub body: String,
    /// String-only key/value pairs delivered alongside the notification.
    pub data: HashMap<String, String>,
}

impl PushMessage {
    /// `data.type`, if present.
    pub fn message_type(&self) -> Option<&str> {
        self.data.get(DATA_TYPE).map(String::as_str)
    }
}
