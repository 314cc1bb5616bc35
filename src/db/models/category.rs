use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub priority: i32,
    pub logo: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
}

impl UpdateCategory {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.priority.is_none() && self.status.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct CategoryFilterParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StatusUpdate {
    pub status: String,
}

/// Row skipped during a bulk import, with the reason it was skipped.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FailedCategoryRow {
    pub row_number: usize,
    pub name: Option<String>,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CategoryImportReport {
    pub saved_categories: Vec<Category>,
    pub failed_rows: Vec<FailedCategoryRow>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct SubCategory {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub priority: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing row joined with the parent category's name.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct SubCategoryView {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub priority: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewSubCategory {
    pub name: String,
    pub category_id: i32,
    pub priority: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateSubCategory {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub priority: Option<i32>,
    pub status: Option<String>,
}

impl UpdateSubCategory {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, IntoParams)]
pub struct ByCategoryParams {
    pub category_id: Option<i32>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct SubSubCategory {
    pub id: i32,
    pub name: String,
    pub sub_category_id: i32,
    pub category_id: i32,
    pub priority: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing row joined with both parent names.
#[derive(Serialize, Deserialize, FromRow, Debug, ToSchema)]
pub struct SubSubCategoryView {
    pub id: i32,
    pub name: String,
    pub sub_category_id: i32,
    pub sub_category_name: Option<String>,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub priority: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NewSubSubCategory {
    pub name: String,
    pub sub_category_id: i32,
    pub category_id: i32,
    pub priority: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateSubSubCategory {
    pub name: Option<String>,
    pub sub_category_id: Option<i32>,
    pub category_id: Option<i32>,
    pub priority: Option<i32>,
    pub status: Option<String>,
}

impl UpdateSubSubCategory {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sub_category_id.is_none()
            && self.category_id.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}
