use crate::db::queries::device_token::{get_device_tokens, save_device_token};

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

pub fn device_token_routes() -> Router<PgPool> {
    Router::new().route("/device-tokens", post(save_device_token).get(get_device_tokens))
}
