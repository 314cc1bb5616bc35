use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::deal_of_the_day::{
    DealOfTheDay, DealOfTheDayView, NewDealOfTheDay, UpdateDealOfTheDay,
};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const DEAL_COLUMNS: &str = "id, title, product_id, status, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/deal-of-the-day",
    request_body = NewDealOfTheDay,
    responses(
        (status = 201, description = "Deal of the Day added successfully", body = DealOfTheDay),
        (status = 400, description = "Missing title/product or unknown product")
    ),
    tag = "Deal of the Day"
)]
pub async fn add_deal_of_the_day(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewDealOfTheDay>,
) -> Result<ApiResponse<DealOfTheDay>, ApiResponse<()>> {
    let (title, product_id) = match (
        payload.title.filter(|t| !t.trim().is_empty()),
        payload.product_id,
    ) {
        (Some(title), Some(product_id)) => (title, product_id),
        _ => {
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Title and products are required",
                None,
            ));
        }
    };

    let deal = sqlx::query_as::<_, DealOfTheDay>(&format!(
        r#"
        INSERT INTO deal_of_the_day (title, product_id, status)
        VALUES ($1, $2, $3)
        RETURNING {DEAL_COLUMNS}
        "#
    ))
    .bind(title.trim())
    .bind(product_id)
    .bind(payload.status.as_deref().unwrap_or("Active"))
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid product ID", None)
        }
        _ => internal_error("Failed to create deal", e),
    })?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Deal of the Day added successfully", deal))
}

/// Listing with the promoted product's title and thumbnail joined in
#[utoipa::path(
    get,
    path = "/deal-of-the-day",
    responses(
        (status = 200, description = "Deals retrieved successfully", body = Vec<DealOfTheDayView>),
        (status = 500, description = "Failed to fetch deals")
    ),
    tag = "Deal of the Day"
)]
pub async fn get_deals_of_the_day(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<DealOfTheDayView>>, ApiResponse<()>> {
    let deals = sqlx::query_as::<_, DealOfTheDayView>(
        r#"
        SELECT d.id, d.title, d.product_id, d.status,
               p.product_title, p.images->>'product_thumbnail' AS product_thumbnail,
               d.created_at, d.updated_at
        FROM deal_of_the_day d
        LEFT JOIN products p ON p.id = d.product_id
        ORDER BY d.created_at DESC
        "#,
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch deals", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Deals retrieved successfully", deals))
}

#[utoipa::path(
    patch,
    path = "/deal-of-the-day/{deal_id}/status",
    params(("deal_id" = i32, Path, description = "ID of the deal")),
    request_body = UpdateDealOfTheDay,
    responses(
        (status = 200, description = "Deal status updated", body = DealOfTheDay),
        (status = 400, description = "Status is required"),
        (status = 404, description = "Deal not found")
    ),
    tag = "Deal of the Day"
)]
pub async fn update_deal_status(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
    Json(payload): Json<UpdateDealOfTheDay>,
) -> Result<ApiResponse<DealOfTheDay>, ApiResponse<()>> {
    let Some(status) = payload.status.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Status is required", None));
    };

    let deal = sqlx::query_as::<_, DealOfTheDay>(&format!(
        "UPDATE deal_of_the_day SET status = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING {DEAL_COLUMNS}"
    ))
    .bind(&status)
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to update deal status", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Deal not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Deal status updated", deal))
}

/// Partial update; a new product id must reference an existing product
#[utoipa::path(
    patch,
    path = "/deal-of-the-day/{deal_id}",
    params(("deal_id" = i32, Path, description = "ID of the deal to update")),
    request_body = UpdateDealOfTheDay,
    responses(
        (status = 200, description = "Deal of the Day updated successfully", body = DealOfTheDay),
        (status = 400, description = "No fields provided or invalid product ID"),
        (status = 404, description = "Deal not found")
    ),
    tag = "Deal of the Day"
)]
pub async fn update_deal_of_the_day(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
    Json(payload): Json<UpdateDealOfTheDay>,
) -> Result<ApiResponse<DealOfTheDay>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    if let Some(product_id) = payload.product_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(product_id)
            .fetch_one(&db_pool)
            .await
            .map_err(|e| internal_error("Failed to check product", e))?;

        if !exists {
            return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid product ID", None));
        }
    }

    let mut query_builder = QueryBuilder::new("UPDATE deal_of_the_day SET ");
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

    push_if_some!(title);
    push_if_some!(product_id);
    push_if_some!(status);

    query_builder
        .push(", updated_at = NOW() WHERE id = ")
        .push_bind(deal_id)
        .push(&format!(" RETURNING {DEAL_COLUMNS}"));

    let deal = query_builder
        .build_query_as::<DealOfTheDay>()
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update deal", e))?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Deal not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Deal of the Day updated successfully", deal))
}

#[utoipa::path(
    delete,
    path = "/deal-of-the-day/{deal_id}",
    params(("deal_id" = i32, Path, description = "ID of the deal to delete")),
    responses(
        (status = 200, description = "Deal deleted successfully"),
        (status = 404, description = "Deal not found")
    ),
    tag = "Deal of the Day"
)]
pub async fn delete_deal_of_the_day(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM deal_of_the_day WHERE id = $1")
        .bind(deal_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete deal", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Deal not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Deal deleted successfully", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        add_deal_of_the_day,
        get_deals_of_the_day,
        update_deal_status,
        update_deal_of_the_day,
        delete_deal_of_the_day,
    ),
    components(schemas(DealOfTheDay, DealOfTheDayView, NewDealOfTheDay, UpdateDealOfTheDay)),
    tags(
        (name = "Deal of the Day", description = "Single-product daily promotion")
    )
)]
pub struct DealOfTheDayDoc;
