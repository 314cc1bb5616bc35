use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use axum::response::Response;
use serde_json::json;
use sqlx::{PgPool, Row};

use crate::db::models::brand::Brand;
use crate::db::models::category::StatusUpdate;
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

const BRAND_COLUMNS: &str =
    "id, name, logo, total_products, total_orders, status, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/brands",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Brand created successfully", body = Brand),
        (status = 400, description = "Missing logo or duplicate name"),
        (status = 500, description = "Failed to create brand")
    ),
    tag = "Brands"
)]
pub async fn create_brand(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Brand>, ApiResponse<()>> {
    let mut name: Option<String> = None;
    let mut logo_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Malformed multipart body", Some(json!({ "message": e.to_string() })))
    })? {
        match field.name().unwrap_or_default() {
            "name" => {
                name = Some(field.text().await.map_err(|e| internal_error("Failed to read name field", e))?);
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

    let Some(logo_url) = logo_url else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Brand logo is required", None));
    };
    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        // The upload is already on disk but no record will point at it.
        image_store::destroy_image_best_effort(&logo_url).await;
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Brand name is required", None));
    };

    let brand = sqlx::query_as::<_, Brand>(&format!(
        "INSERT INTO brands (name, logo) VALUES ($1, $2) RETURNING {BRAND_COLUMNS}"
    ))
    .bind(&name)
    .bind(&logo_url)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Brand name already exists", None)
        }
        _ => internal_error("Failed to create brand", e),
    });

    let brand = match brand {
        Ok(b) => b,
        Err(resp) => {
            image_store::destroy_image_best_effort(&logo_url).await;
            return Err(resp);
        }
    };

    Ok(ApiResponse::success(StatusCode::CREATED, "Brand created successfully", brand))
}

#[utoipa::path(
    get,
    path = "/brands",
    responses(
        (status = 200, description = "Brands retrieved successfully", body = Vec<Brand>),
        (status = 500, description = "Failed to retrieve brands")
    ),
    tag = "Brands"
)]
pub async fn get_brands(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Brand>>, ApiResponse<()>> {
    let brands = sqlx::query_as::<_, Brand>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve brands", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Brands retrieved successfully", brands))
}

#[utoipa::path(
    get,
    path = "/brands/{brand_id}",
    params(("brand_id" = i32, Path, description = "ID of the brand")),
    responses(
        (status = 200, description = "Brand retrieved successfully", body = Brand),
        (status = 404, description = "Brand not found")
    ),
    tag = "Brands"
)]
pub async fn get_brand(
    State(db_pool): State<PgPool>,
    Path(brand_id): Path<i32>,
) -> Result<ApiResponse<Brand>, ApiResponse<()>> {
    let brand = sqlx::query_as::<_, Brand>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
    ))
    .bind(brand_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve brand", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Brand not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Brand retrieved successfully", brand))
}

/// Multipart update; a replacement logo evicts the previous image from the
/// external store best-effort
#[utoipa::path(
    patch,
    path = "/brands/{brand_id}",
    params(("brand_id" = i32, Path, description = "ID of the brand to update")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Brand updated successfully", body = Brand),
        (status = 404, description = "Brand not found")
    ),
    tag = "Brands"
)]
pub async fn update_brand(
    State(db_pool): State<PgPool>,
    Path(brand_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Brand>, ApiResponse<()>> {
    let existing = sqlx::query_as::<_, Brand>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
    ))
    .bind(brand_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to look up brand", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Brand not found", None))?;

    let mut name: Option<String> = None;
    let mut logo_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Malformed multipart body", Some(json!({ "message": e.to_string() })))
    })? {
        match field.name().unwrap_or_default() {
            "name" => {
                name = Some(field.text().await.map_err(|e| internal_error("Failed to read name field", e))?);
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

    let new_name = name.filter(|n| !n.trim().is_empty()).unwrap_or(existing.name);
    let new_logo = logo_url.as_deref().unwrap_or(&existing.logo).to_string();

    let brand = sqlx::query_as::<_, Brand>(&format!(
        "UPDATE brands SET name = $1, logo = $2, updated_at = NOW() WHERE id = $3 RETURNING {BRAND_COLUMNS}"
    ))
    .bind(&new_name)
    .bind(&new_logo)
    .bind(brand_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Brand name already exists", None)
        }
        _ => internal_error("Failed to update brand", e),
    })?;

    if logo_url.is_some() && existing.logo.contains("/upload/") {
        image_store::destroy_image_best_effort(&existing.logo).await;
    }

    Ok(ApiResponse::success(StatusCode::OK, "Brand updated successfully", brand))
}

#[utoipa::path(
    patch,
    path = "/brands/{brand_id}/status",
    params(("brand_id" = i32, Path, description = "ID of the brand")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Brand status updated successfully"),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Brand not found")
    ),
    tag = "Brands"
)]
pub async fn update_brand_status(
    State(db_pool): State<PgPool>,
    Path(brand_id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.status != "Active" && payload.status != "Inactive" {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Status must be 'Active' or 'Inactive'",
            None,
        ));
    }

    let result = sqlx::query("UPDATE brands SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.status)
        .bind(brand_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update brand status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Brand not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Brand status updated successfully", ()))
}

#[utoipa::path(
    delete,
    path = "/brands/{brand_id}",
    params(("brand_id" = i32, Path, description = "ID of the brand to delete")),
    responses(
        (status = 200, description = "Brand deleted successfully"),
        (status = 404, description = "Brand not found")
    ),
    tag = "Brands"
)]
pub async fn delete_brand(
    State(db_pool): State<PgPool>,
    Path(brand_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let row = sqlx::query("SELECT logo FROM brands WHERE id = $1")
        .bind(brand_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to look up brand", e))?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Brand not found", None))?;

    let logo: String = row.get("logo");
    if logo.contains("/upload/") {
        image_store::destroy_image_best_effort(&logo).await;
    }

    sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(brand_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete brand", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Brand deleted successfully", ()))
}

/// Snapshot of the brand table as a CSV download, one serial-numbered row
/// per brand
#[utoipa::path(
    get,
    path = "/brands/export",
    responses(
        (status = 200, description = "CSV attachment with all brands", content_type = "text/csv"),
        (status = 404, description = "No brands found"),
        (status = 500, description = "Failed to export brands")
    ),
    tag = "Brands"
)]
pub async fn export_brands(
    State(db_pool): State<PgPool>,
) -> Result<Response, ApiResponse<()>> {
    let brands = sqlx::query_as::<_, Brand>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve brands", e))?;

    if brands.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "No brands found", None));
    }

    let header = ["SL", "Brand Logo", "Name", "Total Products", "Total Orders", "Status"];
    let rows: Vec<Vec<String>> = brands
        .iter()
        .enumerate()
        .map(|(idx, b)| {
            vec![
                (idx + 1).to_string(),
                b.logo.clone(),
                b.name.clone(),
                b.total_products.to_string(),
                b.total_orders.to_string(),
                b.status.clone(),
            ]
        })
        .collect();

    let bytes = csv_bytes(&header, &rows)
        .map_err(|e| internal_error("Failed to serialize brands", e))?;

    Ok(csv_attachment("brands.csv", bytes))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_brand,
        get_brands,
        get_brand,
        update_brand,
        update_brand_status,
        delete_brand,
        export_brands,
    ),
    components(schemas(Brand, StatusUpdate)),
    tags(
        (name = "Brands", description = "Brand management endpoints")
    )
)]
pub struct BrandDoc;
