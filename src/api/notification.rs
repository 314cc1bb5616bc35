use crate::db::queries::notification::{get_notifications, resend_notification, send_notification};

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

pub fn notification_routes() -> Router<PgPool> {
    Router::new()
        .route("/notifications", post(send_notification).get(get_notifications))
        .route("/notifications/{notification_id}/resend", post(resend_notification))
}
