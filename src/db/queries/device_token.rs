use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;

use crate::db::models::device_token::{DeviceToken, NewDeviceToken};
use crate::utils::api_response::ApiResponse;
use crate::utils::push::{self, DeviceTokenCache};

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

/// Registering a token that is already on file is a success, not an error;
/// mobile clients re-post their token on every launch.
#[utoipa::path(
    post,
    path = "/device-tokens",
    request_body = NewDeviceToken,
    responses(
        (status = 201, description = "Device token saved successfully", body = DeviceToken),
        (status = 200, description = "Device token already exists"),
        (status = 400, description = "Device token is required")
    ),
    tag = "Device Tokens"
)]
pub async fn save_device_token(
    State(db_pool): State<PgPool>,
    Extension(token_cache): Extension<DeviceTokenCache>,
    Json(payload): Json<NewDeviceToken>,
) -> Result<ApiResponse<Option<DeviceToken>>, ApiResponse<()>> {
    let Some(token) = payload.token.filter(|t| !t.trim().is_empty()) else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Device token is required.",
            None,
        ));
    };

    // ON CONFLICT keeps a concurrent duplicate registration from erroring.
    let inserted = sqlx::query_as::<_, DeviceToken>(
        r#"
        INSERT INTO device_tokens (token)
        VALUES ($1)
        ON CONFLICT (token) DO NOTHING
        RETURNING id, token, created_at
        "#,
    )
    .bind(token.trim())
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to save device token", e))?;

    match inserted {
        Some(saved) => {
            push::invalidate_tokens(&token_cache);
            Ok(ApiResponse::success(
                StatusCode::CREATED,
                "Device token saved successfully.",
                Some(saved),
            ))
        }
        None => Ok(ApiResponse::success(
            StatusCode::OK,
            "Device token already exists.",
            None,
        )),
    }
}

#[utoipa::path(
    get,
    path = "/device-tokens",
    responses(
        (status = 200, description = "Device tokens retrieved successfully", body = Vec<DeviceToken>),
        (status = 500, description = "Failed to fetch device tokens")
    ),
    tag = "Device Tokens"
)]
pub async fn get_device_tokens(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<DeviceToken>>, ApiResponse<()>> {
    let tokens = sqlx::query_as::<_, DeviceToken>(
        "SELECT id, token, created_at FROM device_tokens ORDER BY created_at DESC",
    )
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch device tokens", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Device tokens retrieved successfully",
        tokens,
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(save_device_token, get_device_tokens),
    components(schemas(DeviceToken, NewDeviceToken)),
    tags(
        (name = "Device Tokens", description = "Push-notification device registration")
    )
)]
pub struct DeviceTokenDoc;
