use crate::db::queries::order::{
    create_order, export_orders, get_canceled_orders, get_confirmed_orders, get_delivered_orders,
    get_order, get_orders, get_orders_by_customer, get_packaging_orders, get_pending_orders,
    get_returned_orders, update_order_status, update_payment_status,
};

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

/// Defines the order routes to be used in the main router
pub fn order_routes() -> Router<PgPool> {
    Router::new()
        .route("/orders", post(create_order).get(get_orders))
        .route("/orders/export", get(export_orders))
        // Per-status listings used by the admin dashboard tabs
        .route("/orders/pending", get(get_pending_orders))
        .route("/orders/confirmed", get(get_confirmed_orders))
        .route("/orders/packaging", get(get_packaging_orders))
        .route("/orders/canceled", get(get_canceled_orders))
        .route("/orders/returned", get(get_returned_orders))
        .route("/orders/delivered", get(get_delivered_orders))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/status", patch(update_order_status))
        .route("/orders/{order_id}/payment-status", patch(update_payment_status))
        .route("/customers/{customer_id}/orders", get(get_orders_by_customer))
}
