use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Seller account. The password hash never leaves the database layer.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Seller {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone_num: String,
    pub email: String,
    pub aadhaar: String,
    pub pan: String,
    pub image: String,
    pub other_documents: Value,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct RegisterSeller {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone_num: String,
    pub email: String,
    pub password: String,
    pub confirm_pass: String,
    pub aadhaar: String,
    pub pan: String,
    pub image: String,
    #[serde(default)]
    pub other_documents: Value,
    pub role: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateSeller {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_num: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub other_documents: Option<Value>,
}

impl UpdateSeller {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.address.is_none()
            && self.phone_num.is_none()
            && self.email.is_none()
            && self.image.is_none()
            && self.other_documents.is_none()
    }
}
