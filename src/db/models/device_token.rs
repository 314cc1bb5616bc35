use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct DeviceToken {
    pub id: i32,
    pub token: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewDeviceToken {
    pub token: Option<String>,
}
