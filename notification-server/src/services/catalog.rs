//! The static product catalog.
//!
//! Seeded once at startup and never mutated afterwards, so it is shared
//! between handlers behind a plain `Arc` with no locking.

use super::text::truthy_text;
use crate::models::Product;
use rand::seq::SliceRandom;
use serde_json::Value;
use std::fmt;

/// A product identifier as supplied by a caller, normalised to text.
///
/// Catalog lookups compare text, so `2`, `2.0` and `"2"` all find product 2
/// while `"02"` finds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductKey(String);

impl ProductKey {
    /// Coerce a JSON value to a key.
    ///
    /// Returns `None` when the value counts as "not supplied": `null`,
    /// `false`, `0` or an empty string. Arrays render as their elements
    /// joined with `,`, so `[2]` finds product 2.
    pub fn from_json(value: &Value) -> Option<Self> {
        truthy_text(value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The catalog shipped with the mobile app.
    pub fn seeded() -> Self {
        Self::new(vec![
            Product::new(1, "NMN 10000mg Ultra", "¥8,800", "Anti-Aging"),
            Product::new(2, "Arginine & Citrulline", "¥5,200", "Sports Nutrition"),
            Product::new(3, "Broccoli Sprout Extract", "¥3,600", "Detox & Cleanse"),
            Product::new(4, "Sun Protection Plus", "¥4,200", "Skin Health"),
            Product::new(5, "Alpha-GPC Cognitive", "¥6,500", "Brain Health"),
            Product::new(6, "Multivitamin Complete", "¥2,800", "General Health"),
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// First product whose id, rendered as text, equals `key`.
    pub fn find(&self, key: &ProductKey) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id.to_string() == key.as_str())
    }

    /// A product chosen uniformly at random, or `None` if the catalog is empty.
    pub fn random(&self) -> Option<&Product> {
        self.products.choose(&mut rand::thread_rng())
    }

}
