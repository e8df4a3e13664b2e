use serde::{Deserialize, Serialize};

/// A catalog entry as shown by the mobile app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub title: String,
    /// Display price, already formatted (e.g. `¥5,200`).
    pub price: String,
    pub category: String,
}

impl Product {
    pub fn new(id: i64, title: &str, price: &str, category: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            price: price.to_string(),
            category: category.to_string(),
        }
    }
}
