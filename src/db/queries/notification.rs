use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
};
use serde_json::json;
use sqlx::types::Json as SqlJson;
use sqlx::PgPool;

use crate::db::models::notification::Notification;
use crate::utils::api_response::ApiResponse;
use crate::utils::image_store;
use crate::utils::push::{self, DeviceTokenCache};

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const NOTIFICATION_COLUMNS: &str = "id, title, description, image_url, recipient_tokens, \
     notification_count, status, created_at, updated_at";

/// Parses the `recipient_tokens` multipart field, which must be a JSON array
/// of strings.
pub fn parse_recipient_tokens(raw: &str) -> Result<Vec<String>, &'static str> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| "Invalid recipient tokens format.")?;
    let items = value
        .as_array()
        .ok_or("Recipient tokens must be an array of strings.")?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or("Recipient tokens must be an array of strings.")
        })
        .collect()
}

/// Union of the registered tokens and any extra tokens named in the request,
/// first occurrence wins.
pub fn merge_tokens(stored: Vec<String>, requested: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(stored.len() + requested.len());
    for token in stored.into_iter().chain(requested) {
        let trimmed = token.trim();
        if !trimmed.is_empty() && !merged.iter().any(|t| t == trimmed) {
            merged.push(trimmed.to_string());
        }
    }
    merged
}

/// Broadcast a push message to every registered device plus any extra tokens
/// named in the request, then persist the dispatch record.
#[utoipa::path(
    post,
    path = "/notifications",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Notification sent successfully", body = Notification),
        (status = 400, description = "Missing title/description or bad recipient list"),
        (status = 500, description = "Failed to send notification")
    ),
    tag = "Notifications"
)]
pub async fn send_notification(
    State(db_pool): State<PgPool>,
    Extension(token_cache): Extension<DeviceTokenCache>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut extra_tokens: Vec<String> = Vec::new();
    let mut image_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Malformed multipart body",
            Some(json!({ "message": e.to_string() })),
        )
    })? {
        match field.name().unwrap_or_default() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| internal_error("Failed to read title field", e))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| internal_error("Failed to read description field", e))?,
                );
            }
            "recipient_tokens" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read recipient_tokens field", e))?;
                extra_tokens = parse_recipient_tokens(&raw).map_err(|message| {
                    ApiResponse::<()>::error(StatusCode::BAD_REQUEST, message, None)
                })?;
            }
            "image" => {
                let name = field.file_name().unwrap_or("notification").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| internal_error("Failed to read image upload", e))?;
                let url = image_store::save_image(&name, data)
                    .await
                    .map_err(|e| internal_error("Failed to store image", e))?;
                image_url = Some(url);
            }
            _ => {}
        }
    }

    let discard_upload = |response: ApiResponse<()>, url: Option<String>| async move {
        if let Some(url) = url {
            image_store::destroy_image_best_effort(&url).await;
        }
        response
    };

    let (title, description) = match (
        title.filter(|t| !t.trim().is_empty()),
        description.filter(|d| !d.trim().is_empty()),
    ) {
        (Some(title), Some(description)) => (title, description),
        _ => {
            return Err(discard_upload(
                ApiResponse::<()>::error(
                    StatusCode::BAD_REQUEST,
                    "Title and description are required.",
                    None,
                ),
                image_url,
            )
            .await);
        }
    };

    let stored = match push::stored_tokens(&db_pool, &token_cache).await {
        Ok(tokens) => tokens,
        Err(e) => {
            return Err(discard_upload(internal_error("Failed to load device tokens", e), image_url)
                .await);
        }
    };

    let recipients = merge_tokens(stored, extra_tokens);
    if recipients.is_empty() {
        return Err(discard_upload(
            ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "No valid recipient tokens found.",
                None,
            ),
            image_url,
        )
        .await);
    }

    let outcome =
        match push::send_to_tokens(&recipients, &title, &description, image_url.as_deref()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return Err(
                    discard_upload(internal_error("Failed to send notification", e), image_url)
                        .await,
                );
            }
        };

    let notification = sqlx::query_as::<_, Notification>(&format!(
        r#"
        INSERT INTO notifications (title, description, image_url, recipient_tokens, notification_count)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(title.trim())
    .bind(description.trim())
    .bind(&image_url)
    .bind(SqlJson(&recipients))
    .bind(outcome.success_count)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to save notification", e))?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Notification sent successfully",
        notification,
    ))
}

/// Re-dispatch to the recipient list captured at send time. The delivery
/// count accumulates across resends.
#[utoipa::path(
    post,
    path = "/notifications/{notification_id}/resend",
    params(("notification_id" = i32, Path, description = "ID of the notification to resend")),
    responses(
        (status = 200, description = "Notification resent successfully", body = Notification),
        (status = 404, description = "Notification not found"),
        (status = 500, description = "Failed to resend notification")
    ),
    tag = "Notifications"
)]
pub async fn resend_notification(
    State(db_pool): State<PgPool>,
    Path(notification_id): Path<i32>,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    let existing = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
    ))
    .bind(notification_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch notification", e))?
    .ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Notification not found.", None)
    })?;

    let outcome = push::send_to_tokens(
        &existing.recipient_tokens.0,
        &existing.title,
        &existing.description,
        existing.image_url.as_deref(),
    )
    .await
    .map_err(|e| internal_error("Failed to resend notification", e))?;

    let notification = sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications \
         SET notification_count = notification_count + $1, updated_at = NOW() \
         WHERE id = $2 RETURNING {NOTIFICATION_COLUMNS}"
    ))
    .bind(outcome.success_count)
    .bind(notification_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to update notification count", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Notification resent successfully",
        notification,
    ))
}

#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = Vec<Notification>),
        (status = 500, description = "Failed to fetch notifications")
    ),
    tag = "Notifications"
)]
pub async fn get_notifications(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Notification>>, ApiResponse<()>> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch notifications", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Notifications retrieved successfully",
        notifications,
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(send_notification, resend_notification, get_notifications),
    components(schemas(Notification)),
    tags(
        (name = "Notifications", description = "Push broadcasts to registered devices")
    )
)]
pub struct NotificationDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_deduplicates_and_keeps_first_occurrence() {
        let merged = merge_tokens(tokens(&["a", "b"]), tokens(&["b", "c", "a"]));
        assert_eq!(merged, tokens(&["a", "b", "c"]));
    }

    #[test]
    fn merge_drops_blank_tokens() {
        let merged = merge_tokens(tokens(&["a", "  "]), tokens(&["", "b"]));
        assert_eq!(merged, tokens(&["a", "b"]));
    }

    #[test]
    fn recipient_tokens_must_be_json() {
        assert_eq!(
            parse_recipient_tokens("not json").unwrap_err(),
            "Invalid recipient tokens format."
        );
    }

    #[test]
    fn recipient_tokens_must_be_string_array() {
        assert_eq!(
            parse_recipient_tokens(r#"{"token": "a"}"#).unwrap_err(),
            "Recipient tokens must be an array of strings."
        );
        assert_eq!(
            parse_recipient_tokens("[1, 2]").unwrap_err(),
            "Recipient tokens must be an array of strings."
        );
    }

    #[test]
    fn recipient_tokens_parse_round() {
        assert_eq!(
            parse_recipient_tokens(r#"["a", "b"]"#).unwrap(),
            tokens(&["a", "b"])
        );
    }
}
