use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub customer_logo: Option<String>,
    pub joined_date: NaiveDateTime,
    pub is_block: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing row carrying the order count aggregated per customer.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct CustomerWithOrders {
    pub id: i32,
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub customer_logo: Option<String>,
    pub joined_date: NaiveDateTime,
    pub is_block: String,
    pub total_orders: i64,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewCustomer {
    pub phone_number: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub customer_logo: Option<String>,
}

impl UpdateCustomer {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.customer_logo.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BlockStatusUpdate {
    pub is_block: String,
}
