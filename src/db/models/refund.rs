use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

pub const REFUND_STATUSES: [&str; 3] = ["Pending", "Approved", "Rejected"];

/// Snapshot of one order line taken at refund time. Unlike the order line
/// it copies, `total_price` is recomputed here as
/// quantity * unit_price + tax - item_discount.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct RefundItem {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    pub tax: f64,
    pub item_discount: f64,
    pub total_price: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct RefundReason {
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct RefundLogEntry {
    pub changed_by: i32,
    pub date: NaiveDateTime,
    pub status: String,
    pub note: Option<String>,
}

/// Contact stamp copied from the customer record when the refund is filed,
/// so the refund stays readable after the customer edits their profile.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct RefundCustomerDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
}

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Refund {
    pub id: i32,
    pub refund_id: String,
    pub refund_status: String,
    pub payment_method: String,
    pub order_ref: i32,
    #[schema(value_type = Vec<RefundItem>)]
    pub products: Json<Vec<RefundItem>>,
    pub refundable_amount: f64,
    #[schema(value_type = RefundReason)]
    pub refund_reason: Json<RefundReason>,
    #[schema(value_type = RefundCustomerDetails)]
    pub customer_details: Json<RefundCustomerDetails>,
    #[schema(value_type = Vec<RefundLogEntry>)]
    pub refund_logs: Json<Vec<RefundLogEntry>>,
    pub seller_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing row joined with the order and seller so clients render the
/// refund queue without follow-up calls.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct RefundView {
    pub id: i32,
    pub refund_id: String,
    pub refund_status: String,
    pub payment_method: String,
    pub order_ref: i32,
    #[schema(value_type = Vec<RefundItem>)]
    pub products: Json<Vec<RefundItem>>,
    pub refundable_amount: f64,
    #[schema(value_type = RefundReason)]
    pub refund_reason: Json<RefundReason>,
    #[schema(value_type = RefundCustomerDetails)]
    pub customer_details: Json<RefundCustomerDetails>,
    #[schema(value_type = Vec<RefundLogEntry>)]
    pub refund_logs: Json<Vec<RefundLogEntry>>,
    pub seller_id: i32,
    pub order_code: Option<String>,
    pub order_total: Option<f64>,
    pub seller_first_name: Option<String>,
    pub seller_last_name: Option<String>,
    pub seller_email: Option<String>,
    pub seller_phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct RefundFilterParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub refund_status: Option<String>,
    /// Matches refund id and customer name; an integer term also matches
    /// the order primary key exactly.
    pub search: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct RefundExportParams {
    pub refund_status: Option<String>,
}
