use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

pub const ORDER_STATUSES: [&str; 8] = [
    "Pending", "Confirmed", "Packaging", "Ongoing", "Delivered", "Canceled", "Returned", "Failed",
];

pub const PAYMENT_STATUSES: [&str; 4] = ["Paid", "Pending", "Failed", "Refunded"];

/// One purchased line. `total_price` is accepted as submitted and never
/// recomputed from the other fields.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct OrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub item_discount: f64,
    pub total_price: f64,
}

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Order {
    pub id: i32,
    pub order_id: String,
    pub total: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub verification_code: String,
    pub customer_id: i32,
    pub seller_id: i32,
    pub customer_address_id: i32,
    #[schema(value_type = Vec<OrderItem>)]
    pub order_items: Json<Vec<OrderItem>>,
    #[schema(value_type = Option<Object>)]
    pub delivery: Option<Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing/detail row with customer, seller and address fields joined in
/// so clients need no follow-up calls.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct OrderView {
    pub id: i32,
    pub order_id: String,
    pub total: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub verification_code: String,
    pub customer_id: i32,
    pub seller_id: i32,
    pub customer_address_id: i32,
    #[schema(value_type = Vec<OrderItem>)]
    pub order_items: Json<Vec<OrderItem>>,
    #[schema(value_type = Option<Object>)]
    pub delivery: Option<Value>,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_phone: Option<String>,
    pub seller_first_name: Option<String>,
    pub seller_last_name: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewOrder {
    pub customer_id: Option<i32>,
    pub seller_id: Option<i32>,
    pub address_id: Option<i32>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct OrderFilterParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub store_name: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Relative window from server now: week, month or year.
    pub date_window: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct OrderStatusUpdate {
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PaymentStatusUpdate {
    pub payment_status: String,
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct OrderExportParams {
    pub status: Option<String>,
}
