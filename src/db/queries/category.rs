use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::{PgPool, QueryBuilder, Row};
use std::collections::HashSet;

use crate::db::models::category::{
    ByCategoryParams, Category, CategoryFilterParams, CategoryImportReport, FailedCategoryRow,
    NewSubCategory, NewSubSubCategory, StatusUpdate, SubCategory, SubCategoryView,
    SubSubCategory, SubSubCategoryView, UpdateCategory, UpdateSubCategory, UpdateSubSubCategory,
};
use crate::utils::api_response::ApiResponse;
use crate::utils::export::{csv_attachment, csv_bytes};
use crate::utils::image_store;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

// Category Handlers

#[utoipa::path(
    post,
    path = "/categories",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Category created successfully", body = Category),
        (status = 400, description = "Missing name or logo, or duplicate name"),
        (status = 500, description = "Failed to create category")
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Category>, ApiResponse<()>> {
    let mut name: Option<String> = None;
    let mut priority: i32 = 0;
    let mut logo_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Malformed multipart body", Some(json!({ "message": e.to_string() })))
    })? {
        match field.name().unwrap_or_default() {
            "name" => {
                name = Some(field.text().await.map_err(|e| internal_error("Failed to read name field", e))?);
            }
            "priority" => {
                let text = field.text().await.map_err(|e| internal_error("Failed to read priority field", e))?;
                priority = text.parse().unwrap_or(0);
            }
            "logo" => {
                let file_name = field.file_name().unwrap_or("logo").to_string();
                let data = field.bytes().await.map_err(|e| internal_error("Failed to read logo upload", e))?;
                let url = image_store::save_image(&file_name, data)
                    .await
                    .map_err(|e| internal_error("Failed to store logo", e))?;
                logo_url = Some(url);
            }
            _ => {}
        }
    }

    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        // A logo may already be on disk; the record will never reference it.
        if let Some(url) = &logo_url {
            image_store::destroy_image_best_effort(url).await;
        }
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Category name is required", None));
    };
    let Some(logo_url) = logo_url else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Category logo is required", None));
    };

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, priority, logo)
        VALUES ($1, $2, $3)
        RETURNING id, name, priority, logo, status, created_at, updated_at
        "#,
    )
    .bind(&name)
    .bind(priority)
    .bind(&logo_url)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Category name already exists", None)
        }
        _ => internal_error("Failed to create category", e),
    });

    let category = match category {
        Ok(c) => c,
        Err(resp) => {
            image_store::destroy_image_best_effort(&logo_url).await;
            return Err(resp);
        }
    };

    Ok(ApiResponse::success(StatusCode::CREATED, "Category created successfully", category))
}

/// Retrieves categories with optional name search and pagination metadata
#[utoipa::path(
    get,
    path = "/categories",
    params(CategoryFilterParams),
    responses(
        (status = 200, description = "Categories retrieved successfully"),
        (status = 500, description = "Failed to retrieve categories")
    ),
    tag = "Categories"
)]
pub async fn get_categories(
    State(db_pool): State<PgPool>,
    Query(params): Query<CategoryFilterParams>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut query_builder = QueryBuilder::new(
        "SELECT id, name, priority, logo, status, created_at, updated_at FROM categories",
    );
    let mut count_query_builder = QueryBuilder::new("SELECT COUNT(id) FROM categories");

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query_builder.push(" WHERE name ILIKE ").push_bind(pattern.clone());
        count_query_builder.push(" WHERE name ILIKE ").push_bind(pattern);
    }

    query_builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);

    let total: i64 = count_query_builder
        .build_query_scalar::<i64>()
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to count categories", e))?;

    let categories: Vec<Category> = query_builder
        .build_query_as::<Category>()
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to retrieve categories", e))?;

    let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Categories retrieved successfully",
        json!({
            "categories": categories,
            "pagination": {
                "current_page": page,
                "total_pages": total_pages,
                "total_categories": total,
                "has_next_page": page < total_pages,
                "has_prev_page": page > 1,
            }
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "ID of the category")),
    responses(
        (status = 200, description = "Category retrieved successfully", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(db_pool): State<PgPool>,
    Path(category_id): Path<i32>,
) -> Result<ApiResponse<Category>, ApiResponse<()>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, priority, logo, status, created_at, updated_at FROM categories WHERE id = $1",
    )
    .bind(category_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve category", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Category retrieved successfully", category))
}

/// Partial update; unspecified fields keep their stored values
#[utoipa::path(
    patch,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "ID of the category to update")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated successfully"),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(db_pool): State<PgPool>,
    Path(category_id): Path<i32>,
    Json(payload): Json<UpdateCategory>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE categories SET ");
    let mut first = true;

    macro_rules! push_if_some {
        ($field:ident) => {
            if let Some(value) = &payload.$field {
                if !first { query_builder.push(", "); }
                query_builder.push(concat!(stringify!($field), " = ")).push_bind(value);
                first = false;
            }
        };
    }

    push_if_some!(name);
    push_if_some!(priority);
    push_if_some!(status);

    query_builder.push(", updated_at = NOW() WHERE id = ").push_bind(category_id);

    let result = query_builder
        .build()
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update category", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Category updated successfully", ()))
}

#[utoipa::path(
    patch,
    path = "/categories/{category_id}/status",
    params(("category_id" = i32, Path, description = "ID of the category")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Category status updated"),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn update_category_status(
    State(db_pool): State<PgPool>,
    Path(category_id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.status != "Active" && payload.status != "Inactive" {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Status must be 'Active' or 'Inactive'",
            None,
        ));
    }

    let result = sqlx::query("UPDATE categories SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.status)
        .bind(category_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update category status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Category status updated", ()))
}

/// Deletes a category; the stored logo is removed from the external image
/// store best-effort before the row goes away
#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "ID of the category to delete")),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(db_pool): State<PgPool>,
    Path(category_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let row = sqlx::query("SELECT logo FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to look up category", e))?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None))?;

    let logo: String = row.get("logo");
    if logo.contains("/upload/") {
        image_store::destroy_image_best_effort(&logo).await;
    } else {
        tracing::warn!(logo, "category logo URL does not match the image store pattern, skipping external delete");
    }

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete category", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Category deleted successfully", ()))
}

#[utoipa::path(
    get,
    path = "/categories/export",
    responses(
        (status = 200, description = "CSV download of all categories", content_type = "text/csv"),
        (status = 500, description = "Failed to export categories")
    ),
    tag = "Categories"
)]
pub async fn export_categories(
    State(db_pool): State<PgPool>,
) -> Result<axum::response::Response, ApiResponse<()>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, priority, logo, status, created_at, updated_at FROM categories ORDER BY created_at DESC",
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve categories", e))?;

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.priority.to_string(),
                c.logo.clone(),
                c.status.clone(),
                c.created_at.to_string(),
                c.updated_at.to_string(),
            ]
        })
        .collect();

    let bytes = csv_bytes(
        &["id", "name", "priority", "logo", "status", "created_at", "updated_at"],
        &rows,
    )
    .map_err(|e| internal_error("Failed to build export", e))?;

    Ok(csv_attachment("categories.csv", bytes))
}

#[derive(Debug)]
pub struct CategoryImportRow {
    pub name: String,
    pub priority: i32,
    pub logo: String,
    pub status: String,
}

fn csv_value(record: &csv::StringRecord, headers: &csv::StringRecord, name: &str) -> Option<String> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Splits an import file into insertable rows and skipped rows. A name
/// already in `existing` or repeated earlier in the file skips that row;
/// the remaining rows still import.
pub fn parse_category_rows(
    data: &[u8],
    existing: &HashSet<String>,
) -> Result<(Vec<CategoryImportRow>, Vec<FailedCategoryRow>), csv::Error> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();

    let mut valid = Vec::new();
    let mut failed = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row_idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let row_number = row_idx + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                failed.push(FailedCategoryRow {
                    row_number,
                    name: None,
                    error: format!("unreadable row: {e}"),
                });
                continue;
            }
        };

        let name = csv_value(&record, &headers, "name");
        let logo = csv_value(&record, &headers, "logo");

        let (Some(name), Some(logo)) = (name.clone(), logo) else {
            failed.push(FailedCategoryRow {
                row_number,
                name,
                error: "name and logo are required".to_string(),
            });
            continue;
        };

        if existing.contains(&name) || !seen.insert(name.clone()) {
            failed.push(FailedCategoryRow {
                row_number,
                name: Some(name),
                error: "Category name already exists".to_string(),
            });
            continue;
        }

        let priority = csv_value(&record, &headers, "priority")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let status = match csv_value(&record, &headers, "status").as_deref() {
            Some("Active") => "Active".to_string(),
            _ => "Inactive".to_string(),
        };

        valid.push(CategoryImportRow { name, priority, logo, status });
    }

    Ok((valid, failed))
}

/// Validates the whole file first, then inserts the surviving rows in one
/// statement. The import is not transactional across rows; skipped rows are
/// reported alongside the saved ones.
#[utoipa::path(
    post,
    path = "/categories/import",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Categories imported successfully", body = CategoryImportReport),
        (status = 400, description = "No file uploaded or unreadable file")
    ),
    tag = "Categories"
)]
pub async fn bulk_import_categories(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<CategoryImportReport>, ApiResponse<()>> {
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Malformed multipart body", Some(json!({ "message": e.to_string() })))
    })? {
        match field.name().unwrap_or_default() {
            "category-file" | "file" => {
                let data = field.bytes().await.map_err(|e| internal_error("Failed to read uploaded file", e))?;
                file_bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let Some(file_bytes) = file_bytes else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No file uploaded", None));
    };

    let existing: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT name FROM categories")
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to load existing categories", e))?
        .into_iter()
        .collect();

    let (valid, failed_rows) = parse_category_rows(&file_bytes, &existing).map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Unreadable import file", Some(json!({ "message": e.to_string() })))
    })?;

    let saved_categories = if valid.is_empty() {
        Vec::new()
    } else {
        let mut insert_builder =
            QueryBuilder::new("INSERT INTO categories (name, priority, logo, status) ");
        insert_builder.push_values(&valid, |mut b, row| {
            b.push_bind(&row.name)
                .push_bind(row.priority)
                .push_bind(&row.logo)
                .push_bind(&row.status);
        });
        insert_builder.push(" RETURNING id, name, priority, logo, status, created_at, updated_at");

        insert_builder
            .build_query_as::<Category>()
            .fetch_all(&db_pool)
            .await
            .map_err(|e| internal_error("Failed to import categories", e))?
    };

    tracing::info!(
        saved = saved_categories.len(),
        failed = failed_rows.len(),
        "category import finished"
    );

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Categories imported successfully",
        CategoryImportReport { saved_categories, failed_rows },
    ))
}

// SubCategory Handlers

#[utoipa::path(
    post,
    path = "/sub-categories",
    request_body = NewSubCategory,
    responses(
        (status = 201, description = "SubCategory created successfully", body = SubCategory),
        (status = 404, description = "Category not found")
    ),
    tag = "SubCategories"
)]
pub async fn create_sub_category(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewSubCategory>,
) -> Result<ApiResponse<SubCategory>, ApiResponse<()>> {
    if payload.name.trim().is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "SubCategory name is required", None));
    }

    let parent_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(payload.category_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check parent category", e))?;

    if !parent_exists {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None));
    }

    let sub_category = sqlx::query_as::<_, SubCategory>(
        r#"
        INSERT INTO sub_categories (name, category_id, priority)
        VALUES ($1, $2, $3)
        RETURNING id, name, category_id, priority, status, created_at, updated_at
        "#,
    )
    .bind(&payload.name)
    .bind(payload.category_id)
    .bind(payload.priority.unwrap_or(0))
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to create sub-category", e))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "SubCategory created successfully", sub_category))
}

/// Lists sub-categories with the parent category name populated
#[utoipa::path(
    get,
    path = "/sub-categories",
    responses(
        (status = 200, description = "SubCategories retrieved successfully", body = Vec<SubCategoryView>),
        (status = 500, description = "Failed to retrieve sub-categories")
    ),
    tag = "SubCategories"
)]
pub async fn get_sub_categories(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<SubCategoryView>>, ApiResponse<()>> {
    let sub_categories = sqlx::query_as::<_, SubCategoryView>(
        r#"
        SELECT sc.id, sc.name, sc.category_id, c.name AS category_name,
               sc.priority, sc.status, sc.created_at, sc.updated_at
        FROM sub_categories sc
        LEFT JOIN categories c ON c.id = sc.category_id
        ORDER BY sc.created_at DESC
        "#,
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve sub-categories", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "SubCategories retrieved successfully", sub_categories))
}

#[utoipa::path(
    get,
    path = "/sub-categories/by-category",
    params(ByCategoryParams),
    responses(
        (status = 200, description = "SubCategories for the category", body = Vec<SubCategory>),
        (status = 400, description = "Missing or invalid category_id")
    ),
    tag = "SubCategories"
)]
pub async fn get_sub_categories_by_category(
    State(db_pool): State<PgPool>,
    Query(params): Query<ByCategoryParams>,
) -> Result<ApiResponse<Vec<SubCategory>>, ApiResponse<()>> {
    let Some(category_id) = params.category_id else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "category_id query parameter is required", None));
    };

    let sub_categories = sqlx::query_as::<_, SubCategory>(
        r#"
        SELECT id, name, category_id, priority, status, created_at, updated_at
        FROM sub_categories
        WHERE category_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(category_id)
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve sub-categories", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "SubCategories retrieved successfully", sub_categories))
}

#[utoipa::path(
    patch,
    path = "/sub-categories/{sub_category_id}",
    params(("sub_category_id" = i32, Path, description = "ID of the sub-category")),
    request_body = UpdateSubCategory,
    responses(
        (status = 200, description = "SubCategory updated successfully"),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "SubCategory not found")
    ),
    tag = "SubCategories"
)]
pub async fn update_sub_category(
    State(db_pool): State<PgPool>,
    Path(sub_category_id): Path<i32>,
    Json(payload): Json<UpdateSubCategory>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE sub_categories SET ");
    let mut first = true;

    macro_rules! push_if_some {
        ($field:ident) => {
            if let Some(value) = &payload.$field {
                if !first { query_builder.push(", "); }
                query_builder.push(concat!(stringify!($field), " = ")).push_bind(value);
                first = false;
            }
        };
    }

    push_if_some!(name);
    push_if_some!(category_id);
    push_if_some!(priority);
    push_if_some!(status);

    query_builder.push(", updated_at = NOW() WHERE id = ").push_bind(sub_category_id);

    let result = query_builder
        .build()
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update sub-category", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubCategory updated successfully", ()))
}

#[utoipa::path(
    patch,
    path = "/sub-categories/{sub_category_id}/status",
    params(("sub_category_id" = i32, Path, description = "ID of the sub-category")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "SubCategory status updated"),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "SubCategory not found")
    ),
    tag = "SubCategories"
)]
pub async fn update_sub_category_status(
    State(db_pool): State<PgPool>,
    Path(sub_category_id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.status != "Active" && payload.status != "Inactive" {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Status must be 'Active' or 'Inactive'",
            None,
        ));
    }

    let result = sqlx::query("UPDATE sub_categories SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.status)
        .bind(sub_category_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update sub-category status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubCategory status updated", ()))
}

#[utoipa::path(
    delete,
    path = "/sub-categories/{sub_category_id}",
    params(("sub_category_id" = i32, Path, description = "ID of the sub-category to delete")),
    responses(
        (status = 200, description = "SubCategory deleted successfully"),
        (status = 404, description = "SubCategory not found")
    ),
    tag = "SubCategories"
)]
pub async fn delete_sub_category(
    State(db_pool): State<PgPool>,
    Path(sub_category_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM sub_categories WHERE id = $1")
        .bind(sub_category_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete sub-category", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubCategory deleted successfully", ()))
}

#[utoipa::path(
    get,
    path = "/sub-categories/export",
    responses(
        (status = 200, description = "CSV download of all sub-categories", content_type = "text/csv"),
        (status = 500, description = "Failed to export sub-categories")
    ),
    tag = "SubCategories"
)]
pub async fn export_sub_categories(
    State(db_pool): State<PgPool>,
) -> Result<axum::response::Response, ApiResponse<()>> {
    let views = sqlx::query_as::<_, SubCategoryView>(
        r#"
        SELECT sc.id, sc.name, sc.category_id, c.name AS category_name,
               sc.priority, sc.status, sc.created_at, sc.updated_at
        FROM sub_categories sc
        LEFT JOIN categories c ON c.id = sc.category_id
        ORDER BY sc.created_at DESC
        "#,
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve sub-categories", e))?;

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            let parent = match v.category_name.as_deref() {
                Some("") => "N/A".to_string(),
                Some(name) => name.to_string(),
                None => "Unknown".to_string(),
            };
            vec![
                v.id.to_string(),
                v.name.clone(),
                parent,
                v.priority.to_string(),
                v.status.clone(),
                v.created_at.to_string(),
            ]
        })
        .collect();

    let bytes = csv_bytes(&["id", "name", "main_category", "priority", "status", "created_at"], &rows)
        .map_err(|e| internal_error("Failed to build export", e))?;

    Ok(csv_attachment("sub-categories.csv", bytes))
}

// SubSubCategory Handlers

#[utoipa::path(
    post,
    path = "/sub-sub-categories",
    request_body = NewSubSubCategory,
    responses(
        (status = 201, description = "SubSubCategory created successfully", body = SubSubCategory),
        (status = 404, description = "Parent category or sub-category not found")
    ),
    tag = "SubSubCategories"
)]
pub async fn create_sub_sub_category(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewSubSubCategory>,
) -> Result<ApiResponse<SubSubCategory>, ApiResponse<()>> {
    if payload.name.trim().is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "SubSubCategory name is required", None));
    }

    let category_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(payload.category_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check parent category", e))?;
    if !category_exists {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Category not found", None));
    }

    let sub_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sub_categories WHERE id = $1)")
        .bind(payload.sub_category_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check parent sub-category", e))?;
    if !sub_exists {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubCategory not found", None));
    }

    let record = sqlx::query_as::<_, SubSubCategory>(
        r#"
        INSERT INTO sub_sub_categories (name, sub_category_id, category_id, priority)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, sub_category_id, category_id, priority, status, created_at, updated_at
        "#,
    )
    .bind(&payload.name)
    .bind(payload.sub_category_id)
    .bind(payload.category_id)
    .bind(payload.priority.unwrap_or(0))
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to create sub-sub-category", e))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "SubSubCategory created successfully", record))
}

#[utoipa::path(
    get,
    path = "/sub-sub-categories",
    responses(
        (status = 200, description = "SubSubCategories retrieved successfully", body = Vec<SubSubCategoryView>),
        (status = 500, description = "Failed to retrieve sub-sub-categories")
    ),
    tag = "SubSubCategories"
)]
pub async fn get_sub_sub_categories(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<SubSubCategoryView>>, ApiResponse<()>> {
    let records = sqlx::query_as::<_, SubSubCategoryView>(
        r#"
        SELECT ssc.id, ssc.name,
               ssc.sub_category_id, sc.name AS sub_category_name,
               ssc.category_id, c.name AS category_name,
               ssc.priority, ssc.status, ssc.created_at, ssc.updated_at
        FROM sub_sub_categories ssc
        LEFT JOIN sub_categories sc ON sc.id = ssc.sub_category_id
        LEFT JOIN categories c ON c.id = ssc.category_id
        ORDER BY ssc.created_at DESC
        "#,
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve sub-sub-categories", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "SubSubCategories retrieved successfully", records))
}

#[utoipa::path(
    patch,
    path = "/sub-sub-categories/{sub_sub_category_id}",
    params(("sub_sub_category_id" = i32, Path, description = "ID of the sub-sub-category")),
    request_body = UpdateSubSubCategory,
    responses(
        (status = 200, description = "SubSubCategory updated successfully"),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "SubSubCategory not found")
    ),
    tag = "SubSubCategories"
)]
pub async fn update_sub_sub_category(
    State(db_pool): State<PgPool>,
    Path(sub_sub_category_id): Path<i32>,
    Json(payload): Json<UpdateSubSubCategory>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE sub_sub_categories SET ");
    let mut first = true;

    macro_rules! push_if_some {
        ($field:ident) => {
            if let Some(value) = &payload.$field {
                if !first { query_builder.push(", "); }
                query_builder.push(concat!(stringify!($field), " = ")).push_bind(value);
                first = false;
            }
        };
    }

    push_if_some!(name);
    push_if_some!(sub_category_id);
    push_if_some!(category_id);
    push_if_some!(priority);
    push_if_some!(status);

    query_builder.push(", updated_at = NOW() WHERE id = ").push_bind(sub_sub_category_id);

    let result = query_builder
        .build()
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update sub-sub-category", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubSubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubSubCategory updated successfully", ()))
}

#[utoipa::path(
    patch,
    path = "/sub-sub-categories/{sub_sub_category_id}/status",
    params(("sub_sub_category_id" = i32, Path, description = "ID of the sub-sub-category")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "SubSubCategory status updated"),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "SubSubCategory not found")
    ),
    tag = "SubSubCategories"
)]
pub async fn update_sub_sub_category_status(
    State(db_pool): State<PgPool>,
    Path(sub_sub_category_id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.status != "Active" && payload.status != "Inactive" {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Status must be 'Active' or 'Inactive'",
            None,
        ));
    }

    let result =
        sqlx::query("UPDATE sub_sub_categories SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(&payload.status)
            .bind(sub_sub_category_id)
            .execute(&db_pool)
            .await
            .map_err(|e| internal_error("Failed to update sub-sub-category status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubSubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubSubCategory status updated", ()))
}

#[utoipa::path(
    delete,
    path = "/sub-sub-categories/{sub_sub_category_id}",
    params(("sub_sub_category_id" = i32, Path, description = "ID of the sub-sub-category to delete")),
    responses(
        (status = 200, description = "SubSubCategory deleted successfully"),
        (status = 404, description = "SubSubCategory not found")
    ),
    tag = "SubSubCategories"
)]
pub async fn delete_sub_sub_category(
    State(db_pool): State<PgPool>,
    Path(sub_sub_category_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM sub_sub_categories WHERE id = $1")
        .bind(sub_sub_category_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete sub-sub-category", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "SubSubCategory not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "SubSubCategory deleted successfully", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_category,
        get_categories,
        get_category,
        update_category,
        update_category_status,
        delete_category,
        export_categories,
        bulk_import_categories,
        create_sub_category,
        get_sub_categories,
        get_sub_categories_by_category,
        update_sub_category,
        update_sub_category_status,
        delete_sub_category,
        export_sub_categories,
        create_sub_sub_category,
        get_sub_sub_categories,
        update_sub_sub_category,
        update_sub_sub_category_status,
        delete_sub_sub_category,
    ),
    components(
        schemas(
            Category, UpdateCategory, StatusUpdate, CategoryImportReport, FailedCategoryRow,
            SubCategory, SubCategoryView, NewSubCategory, UpdateSubCategory,
            SubSubCategory, SubSubCategoryView, NewSubSubCategory, UpdateSubSubCategory
        )
    ),
    tags(
        (name = "Categories", description = "Category taxonomy endpoints"),
        (name = "SubCategories", description = "Second-level category endpoints"),
        (name = "SubSubCategories", description = "Third-level category endpoints")
    )
)]
pub struct CategoryDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rows: &[CategoryImportRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn import_skips_duplicates_but_keeps_the_rest() {
        let data = "name,priority,logo,status\n\
                   Shoes,2,https://cdn.example.com/shoes.png,Active\n\
                   Shoes,3,https://cdn.example.com/shoes2.png,Active\n\
                   Bags,1,https://cdn.example.com/bags.png,Inactive\n";
        let existing: HashSet<String> = ["Bags".to_string()].into();

        let (valid, failed) = parse_category_rows(data.as_bytes(), &existing).unwrap();

        assert_eq!(names(&valid), vec!["Shoes"]);
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].row_number, 3);
        assert_eq!(failed[0].error, "Category name already exists");
        assert_eq!(failed[1].name.as_deref(), Some("Bags"));
    }

    #[test]
    fn import_requires_name_and_logo_per_row() {
        let data = "name,priority,logo\n\
                   ,1,https://cdn.example.com/a.png\n\
                   Toys,1,\n\
                   Games,4,https://cdn.example.com/games.png\n";

        let (valid, failed) = parse_category_rows(data.as_bytes(), &HashSet::new()).unwrap();

        assert_eq!(names(&valid), vec!["Games"]);
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|f| f.error == "name and logo are required"));
        assert_eq!(failed[1].name.as_deref(), Some("Toys"));
    }

    #[test]
    fn import_defaults_priority_and_status() {
        let data = "name,logo,status\n\
                   Audio,https://cdn.example.com/audio.png,published\n";

        let (valid, failed) = parse_category_rows(data.as_bytes(), &HashSet::new()).unwrap();

        assert!(failed.is_empty());
        assert_eq!(valid[0].priority, 0);
        assert_eq!(valid[0].status, "Inactive");
    }
}
