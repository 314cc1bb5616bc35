use crate::db::queries::refund::{create_refund, export_refunds, get_refunds};

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

pub fn refund_routes() -> Router<PgPool> {
    Router::new()
        .route("/refunds", post(create_refund).get(get_refunds))
        .route("/refunds/export", get(export_refunds))
}
