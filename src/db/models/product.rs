use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Catalog product. The nested documents keep the shapes clients submit;
/// the SKU is mirrored into its own unique column.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Product {
    pub id: i32,
    pub product_title: String,
    pub product_description: String,
    pub product_sku: String,
    pub general_info: Value,
    pub settings: Value,
    pub pricing: Value,
    pub images: Value,
    pub seo: Value,
    pub seller_id: i32,
    pub is_featured: bool,
    pub total_sold: i64,
    pub total_sold_amount: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewProduct {
    pub product_title: Option<String>,
    pub product_description: Option<String>,
    #[serde(default)]
    pub general_info: Value,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub pricing: Value,
    #[serde(default)]
    pub images: Value,
    #[serde(default)]
    pub seo: Value,
    pub seller_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateProduct {
    pub seller_id: i32,
    pub product_title: Option<String>,
    pub product_description: Option<String>,
    pub general_info: Option<Value>,
    pub settings: Option<Value>,
    pub pricing: Option<Value>,
    pub images: Option<Value>,
    pub seo: Option<Value>,
}

impl UpdateProduct {
    /// True when nothing besides the owning seller id was supplied.
    pub fn is_empty(&self) -> bool {
        self.product_title.is_none()
            && self.product_description.is_none()
            && self.general_info.is_none()
            && self.settings.is_none()
            && self.pricing.is_none()
            && self.images.is_none()
            && self.seo.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct ProductFilterParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub seller_id: Option<i32>,
    pub product_status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct SellerScopeParams {
    pub seller_id: Option<i32>,
}

/// Outcome of one bulk-import run. Rows fail independently; a failed row
/// never blocks the rest of the file.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkImportReport {
    pub saved_products: Vec<Product>,
    pub failed_products: Vec<FailedImportRow>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FailedImportRow {
    pub row_number: usize,
    pub product_sku: Option<String>,
    pub error: String,
}
