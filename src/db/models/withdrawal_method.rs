use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const INPUT_TYPES: [&str; 6] = ["String", "Number", "Date", "Password", "Email", "Phone"];

/// One form field a seller fills in when registering a payout account.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct WithdrawalField {
    pub field_name: String,
    pub input_type: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub is_required: bool,
}

/// At most one method row carries `is_default = true` at any time.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct WithdrawalMethod {
    pub id: i32,
    pub method_name: String,
    #[schema(value_type = Vec<WithdrawalField>)]
    pub fields: Json<Vec<WithdrawalField>>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewWithdrawalMethod {
    pub method_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<WithdrawalField>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateWithdrawalMethod {
    pub method_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<WithdrawalField>,
}

/// Which boolean column a status toggle targets.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FieldToggle {
    pub field: Option<String>,
}
