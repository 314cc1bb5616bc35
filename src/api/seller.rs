use crate::db::queries::seller::{
    delete_seller, get_seller, get_sellers, register_seller, update_seller, update_seller_status,
};

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

pub fn seller_routes() -> Router<PgPool> {
    Router::new()
        .route("/sellers/register", post(register_seller))
        .route("/sellers", get(get_sellers))
        .route(
            "/sellers/{seller_id}",
            get(get_seller).patch(update_seller).delete(delete_seller),
        )
        .route("/sellers/{seller_id}/status", patch(update_seller_status))
}
