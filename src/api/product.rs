use crate::db::queries::product::{
    approve_product, bulk_import_products, create_product, delete_product, get_approved_products,
    get_product, get_products, get_seller_products, toggle_featured, update_product,
};

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;

/// Defines the product routes to be used in the main router
pub fn product_routes() -> Router<PgPool> {
    Router::new()
        .route("/products", post(create_product)) // Create a product (multipart)
        .route("/products", get(get_products)) // Get all products (with pagination & filters)
        .route("/products/approved", get(get_approved_products)) // Storefront-visible products only
        .route("/products/import", post(bulk_import_products)) // Bulk import from CSV
        .route("/products/{product_id}", get(get_product)) // Get a single product by ID
        .route("/products/{product_id}", patch(update_product)) // Update a product by ID
        .route("/products/{product_id}", delete(delete_product)) // Delete a product by ID
        .route("/products/{product_id}/approve", patch(approve_product))
        .route("/products/{product_id}/feature", patch(toggle_featured))
        .route("/sellers/{seller_id}/products", get(get_seller_products))
}
