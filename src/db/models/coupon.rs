use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

pub const COUPON_TYPES: [&str; 3] = ["discountOnPurchase", "freeDelivery", "firstOrder"];
pub const CREATOR_TYPES: [&str; 2] = ["admin", "seller"];
pub const CUSTOMER_TARGETS: [&str; 2] = ["all", "specific"];
pub const DISCOUNT_TYPES: [&str; 2] = ["amount", "percentage"];

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Coupon {
    pub id: i32,
    pub coupon_type: String,
    pub title: String,
    pub code: String,
    pub creator_type: String,
    pub creator_id: i32,
    pub apply_to_all_products: bool,
    #[schema(value_type = Vec<i32>)]
    pub applicable_products: Json<Vec<i32>>,
    pub customer: String,
    #[schema(value_type = Vec<i32>)]
    pub specific_customers: Json<Vec<i32>>,
    pub limit_per_user: i32,
    pub discount_type: String,
    pub discount_amount: f64,
    pub min_purchase: f64,
    pub start_date: NaiveDateTime,
    pub expire_date: NaiveDateTime,
    pub apply_to_all_categories: bool,
    pub category_id: Option<i32>,
    pub status: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewCoupon {
    pub coupon_type: String,
    pub title: String,
    pub code: String,
    pub creator_type: String,
    pub creator_id: Option<i32>,
    #[serde(default)]
    pub apply_to_all_products: bool,
    #[serde(default)]
    pub applicable_products: Vec<i32>,
    pub customer: String,
    #[serde(default)]
    pub specific_customers: Vec<i32>,
    pub limit_per_user: Option<i32>,
    pub discount_type: String,
    pub discount_amount: f64,
    #[serde(default)]
    pub min_purchase: f64,
    pub start_date: NaiveDateTime,
    pub expire_date: NaiveDateTime,
    #[serde(default = "default_true")]
    pub apply_to_all_categories: bool,
    pub category_id: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateCoupon {
    pub coupon_type: Option<String>,
    pub title: Option<String>,
    pub code: Option<String>,
    pub limit_per_user: Option<i32>,
    pub discount_type: Option<String>,
    pub discount_amount: Option<f64>,
    pub min_purchase: Option<f64>,
    pub start_date: Option<NaiveDateTime>,
    pub expire_date: Option<NaiveDateTime>,
    pub category_id: Option<i32>,
}

impl UpdateCoupon {
    pub fn is_empty(&self) -> bool {
        self.coupon_type.is_none()
            && self.title.is_none()
            && self.code.is_none()
            && self.limit_per_user.is_none()
            && self.discount_type.is_none()
            && self.discount_amount.is_none()
            && self.min_purchase.is_none()
            && self.start_date.is_none()
            && self.expire_date.is_none()
            && self.category_id.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct CouponFilterParams {
    pub creator_type: Option<String>,
    pub apply_to_all_products: Option<bool>,
    pub category_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CouponStatusUpdate {
    pub status: bool,
}
