use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct DealOfTheDay {
    pub id: i32,
    pub title: String,
    pub product_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing row with the promoted product's display fields joined in.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct DealOfTheDayView {
    pub id: i32,
    pub title: String,
    pub product_id: i32,
    pub status: String,
    pub product_title: Option<String>,
    pub product_thumbnail: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewDealOfTheDay {
    pub title: Option<String>,
    pub product_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateDealOfTheDay {
    pub title: Option<String>,
    pub product_id: Option<i32>,
    pub status: Option<String>,
}

impl UpdateDealOfTheDay {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.product_id.is_none() && self.status.is_none()
    }
}
