use crate::db::queries::coupon::{
    add_coupon, delete_coupon, get_coupons, update_coupon, update_coupon_status,
};

use axum::{
    routing::{patch, post},
    Router,
};
use sqlx::PgPool;

pub fn coupon_routes() -> Router<PgPool> {
    Router::new()
        .route("/coupons", post(add_coupon).get(get_coupons))
        .route(
            "/coupons/{coupon_id}",
            patch(update_coupon).delete(delete_coupon),
        )
        .route("/coupons/{coupon_id}/status", patch(update_coupon_status))
}
