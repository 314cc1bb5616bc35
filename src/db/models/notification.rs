use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Persisted record of one push broadcast. `notification_count` holds the
/// provider-reported delivery count, not the recipient list length.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub recipient_tokens: Json<Vec<String>>,
    pub notification_count: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
