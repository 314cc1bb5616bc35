use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bcrypt::{hash, DEFAULT_COST};
use serde_json::json;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::category::StatusUpdate;
use crate::db::models::seller::{RegisterSeller, Seller, UpdateSeller};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const SELLER_COLUMNS: &str = "id, first_name, last_name, address, phone_num, email, \
     aadhaar, pan, image, other_documents, role, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/sellers/register",
    request_body = RegisterSeller,
    responses(
        (status = 201, description = "Seller registered successfully", body = Seller),
        (status = 400, description = "Password mismatch or duplicate identity field"),
        (status = 500, description = "Failed to register seller")
    ),
    tag = "Sellers"
)]
pub async fn register_seller(
    State(db_pool): State<PgPool>,
    Json(payload): Json<RegisterSeller>,
) -> Result<ApiResponse<Seller>, ApiResponse<()>> {
    if payload.password != payload.confirm_pass {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Passwords do not match", None));
    }
    if payload.email.trim().is_empty() || payload.phone_num.trim().is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Email and phone number are required", None));
    }

    let already_registered: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sellers WHERE email = $1 OR phone_num = $2)",
    )
    .bind(&payload.email)
    .bind(&payload.phone_num)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to check existing sellers", e))?;

    if already_registered {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Seller with this email or phone number already exists",
            None,
        ));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| internal_error("Password hashing failed", e))?;

    let seller = sqlx::query_as::<_, Seller>(&format!(
        r#"
        INSERT INTO sellers
            (first_name, last_name, address, phone_num, email, password,
             aadhaar, pan, image, other_documents, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {SELLER_COLUMNS}
        "#
    ))
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.address)
    .bind(&payload.phone_num)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.aadhaar)
    .bind(&payload.pan)
    .bind(&payload.image)
    .bind(&payload.other_documents)
    .bind(payload.role.as_deref().unwrap_or("Seller"))
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        // aadhaar and pan are unique as well; the pre-check only covers
        // email and phone.
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Seller with this identity information already exists",
            None,
        ),
        _ => internal_error("Failed to register seller", e),
    })?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Seller registered successfully", seller))
}

#[utoipa::path(
    get,
    path = "/sellers",
    responses(
        (status = 200, description = "Sellers retrieved successfully", body = Vec<Seller>),
        (status = 500, description = "Failed to retrieve sellers")
    ),
    tag = "Sellers"
)]
pub async fn get_sellers(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Seller>>, ApiResponse<()>> {
    let sellers = sqlx::query_as::<_, Seller>(&format!(
        "SELECT {SELLER_COLUMNS} FROM sellers ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve sellers", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Sellers retrieved successfully", sellers))
}

#[utoipa::path(
    get,
    path = "/sellers/{seller_id}",
    params(("seller_id" = i32, Path, description = "ID of the seller")),
    responses(
        (status = 200, description = "Seller retrieved successfully", body = Seller),
        (status = 404, description = "Seller not found")
    ),
    tag = "Sellers"
)]
pub async fn get_seller(
    State(db_pool): State<PgPool>,
    Path(seller_id): Path<i32>,
) -> Result<ApiResponse<Seller>, ApiResponse<()>> {
    let seller = sqlx::query_as::<_, Seller>(&format!(
        "SELECT {SELLER_COLUMNS} FROM sellers WHERE id = $1"
    ))
    .bind(seller_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve seller", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Seller retrieved successfully", seller))
}

#[utoipa::path(
    patch,
    path = "/sellers/{seller_id}",
    params(("seller_id" = i32, Path, description = "ID of the seller to update")),
    request_body = UpdateSeller,
    responses(
        (status = 200, description = "Seller updated successfully"),
        (status = 400, description = "No fields provided for update or duplicate contact"),
        (status = 404, description = "Seller not found")
    ),
    tag = "Sellers"
)]
pub async fn update_seller(
    State(db_pool): State<PgPool>,
    Path(seller_id): Path<i32>,
    Json(payload): Json<UpdateSeller>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE sellers SET ");
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

    push_if_some!(first_name);
    push_if_some!(last_name);
    push_if_some!(address);
    push_if_some!(phone_num);
    push_if_some!(email);
    push_if_some!(image);
    push_if_some!(other_documents);

    query_builder.push(", updated_at = NOW() WHERE id = ").push_bind(seller_id);

    let result = query_builder
        .build()
        .execute(&db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Another seller already uses this email or phone number",
                None,
            ),
            _ => internal_error("Failed to update seller", e),
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Seller updated successfully", ()))
}

/// The role column doubles as the seller's standing; staff flip it between
/// 'Seller' and 'Suspended' here
#[utoipa::path(
    patch,
    path = "/sellers/{seller_id}/status",
    params(("seller_id" = i32, Path, description = "ID of the seller")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Seller status updated successfully"),
        (status = 404, description = "Seller not found")
    ),
    tag = "Sellers"
)]
pub async fn update_seller_status(
    State(db_pool): State<PgPool>,
    Path(seller_id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    if payload.status.trim().is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Status is required", None));
    }

    let result = sqlx::query("UPDATE sellers SET role = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.status)
        .bind(seller_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update seller status", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Seller status updated successfully", ()))
}

#[utoipa::path(
    delete,
    path = "/sellers/{seller_id}",
    params(("seller_id" = i32, Path, description = "ID of the seller to delete")),
    responses(
        (status = 200, description = "Seller deleted successfully"),
        (status = 404, description = "Seller not found")
    ),
    tag = "Sellers"
)]
pub async fn delete_seller(
    State(db_pool): State<PgPool>,
    Path(seller_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM sellers WHERE id = $1")
        .bind(seller_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete seller", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Seller deleted successfully", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        register_seller,
        get_sellers,
        get_seller,
        update_seller,
        update_seller_status,
        delete_seller,
    ),
    components(schemas(Seller, RegisterSeller, UpdateSeller, StatusUpdate)),
    tags(
        (name = "Sellers", description = "Seller registry endpoints")
    )
)]
pub struct SellerDoc;
