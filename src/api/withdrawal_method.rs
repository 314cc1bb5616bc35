use crate::db::queries::withdrawal_method::{
    add_withdrawal_method, delete_withdrawal_method, get_withdrawal_methods,
    update_withdrawal_method, update_withdrawal_method_status,
};

use axum::{
    routing::{patch, post},
    Router,
};
use sqlx::PgPool;

pub fn withdrawal_method_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/withdrawal-methods",
            post(add_withdrawal_method).get(get_withdrawal_methods),
        )
        .route(
            "/withdrawal-methods/{method_id}",
            patch(update_withdrawal_method).delete(delete_withdrawal_method),
        )
        .route(
            "/withdrawal-methods/{method_id}/status",
            patch(update_withdrawal_method_status),
        )
}
