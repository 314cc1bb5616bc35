use crate::db::queries::customer::{
    create_customer, delete_customer, get_customer, get_customers, get_customers_with_orders,
    toggle_block_status, update_customer,
};

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

pub fn customer_routes() -> Router<PgPool> {
    Router::new()
        .route("/customers", post(create_customer).get(get_customers))
        .route("/customers/with-orders", get(get_customers_with_orders))
        .route(
            "/customers/{customer_id}",
            get(get_customer).patch(update_customer).delete(delete_customer),
        )
        .route("/customers/{customer_id}/toggle-block", patch(toggle_block_status))
}
