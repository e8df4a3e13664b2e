use crate::models::Product;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

/// `GET /products`: the whole catalog, in seed order.
pub async fn list_products(State(state): State<AppState>) -> Json<ProductListResponse> {
    Json(ProductListResponse {
        success: true,
        products: state.catalog.products().to_vec(),
    })
}
