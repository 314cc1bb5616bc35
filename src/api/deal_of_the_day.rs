use crate::db::queries::deal_of_the_day::{
    add_deal_of_the_day, delete_deal_of_the_day, get_deals_of_the_day, update_deal_of_the_day,
    update_deal_status,
};

use axum::{
    routing::{patch, post},
    Router,
};
use sqlx::PgPool;

pub fn deal_of_the_day_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/deal-of-the-day",
            post(add_deal_of_the_day).get(get_deals_of_the_day),
        )
        .route(
            "/deal-of-the-day/{deal_id}",
            patch(update_deal_of_the_day).delete(delete_deal_of_the_day),
        )
        .route("/deal-of-the-day/{deal_id}/status", patch(update_deal_status))
}
