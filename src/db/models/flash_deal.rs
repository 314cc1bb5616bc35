use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct FlashDeal {
    pub id: i32,
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub banner_image: String,
    pub status: String,
    pub is_published: bool,
    #[schema(value_type = Vec<i32>)]
    pub products: Json<Vec<i32>>,
    pub active_products: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PublishUpdate {
    pub is_published: bool,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FlashDealProducts {
    pub product_ids: Vec<i32>,
}
