use crate::db::queries::brand::{
    create_brand, delete_brand, export_brands, get_brand, get_brands, update_brand,
    update_brand_status,
};

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

pub fn brand_routes() -> Router<PgPool> {
    Router::new()
        .route("/brands", post(create_brand).get(get_brands))
        .route("/brands/export", get(export_brands))
        .route(
            "/brands/{brand_id}",
            get(get_brand).patch(update_brand).delete(delete_brand),
        )
        .route("/brands/{brand_id}/status", patch(update_brand_status))
}
