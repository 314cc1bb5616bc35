use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::types::Json as SqlJson;
use sqlx::PgPool;

use crate::db::models::withdrawal_method::{
    FieldToggle, NewWithdrawalMethod, UpdateWithdrawalMethod, WithdrawalField, WithdrawalMethod,
    INPUT_TYPES,
};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const METHOD_COLUMNS: &str =
    "id, method_name, fields, is_active, is_default, created_at, updated_at";

/// First field whose `input_type` falls outside the accepted enum, rendered
/// as a client-facing message.
pub fn field_type_error(fields: &[WithdrawalField]) -> Option<String> {
    fields
        .iter()
        .find(|f| !INPUT_TYPES.contains(&f.input_type.as_str()))
        .map(|f| {
            format!(
                "Invalid input type '{}' for field '{}'",
                f.input_type, f.field_name
            )
        })
}

/// Resolves the status-toggle request body to a column name.
pub fn toggle_target(field: Option<&str>) -> Option<&'static str> {
    match field {
        Some("is_active") => Some("is_active"),
        Some("is_default") => Some("is_default"),
        _ => None,
    }
}

#[utoipa::path(
    post,
    path = "/withdrawal-methods",
    request_body = NewWithdrawalMethod,
    responses(
        (status = 201, description = "Withdrawal method created successfully", body = WithdrawalMethod),
        (status = 400, description = "Missing fields, invalid input type, or duplicate name")
    ),
    tag = "Withdrawal Methods"
)]
pub async fn add_withdrawal_method(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewWithdrawalMethod>,
) -> Result<ApiResponse<WithdrawalMethod>, ApiResponse<()>> {
    let method_name = match payload.method_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() && !payload.fields.is_empty() => name.to_string(),
        _ => {
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Method name and fields are required",
                None,
            ));
        }
    };

    if let Some(message) = field_type_error(&payload.fields) {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, message, None));
    }

    let is_default = payload.is_default.unwrap_or(false);

    let mut tx = db_pool
        .begin()
        .await
        .map_err(|e| internal_error("Failed to start transaction", e))?;

    // A new default demotes whichever method held the flag before.
    if is_default {
        sqlx::query("UPDATE withdrawal_methods SET is_default = FALSE WHERE is_default")
            .execute(&mut *tx)
            .await
            .map_err(|e| internal_error("Failed to clear default method", e))?;
    }

    let method = sqlx::query_as::<_, WithdrawalMethod>(&format!(
        r#"
        INSERT INTO withdrawal_methods (method_name, fields, is_active, is_default)
        VALUES ($1, $2, $3, $4)
        RETURNING {METHOD_COLUMNS}
        "#
    ))
    .bind(&method_name)
    .bind(SqlJson(&payload.fields))
    .bind(payload.is_active.unwrap_or(true))
    .bind(is_default)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Method name already exists.", None)
        }
        _ => internal_error("Failed to create withdrawal method", e),
    })?;

    tx.commit()
        .await
        .map_err(|e| internal_error("Failed to commit transaction", e))?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Withdrawal method created successfully",
        method,
    ))
}

#[utoipa::path(
    get,
    path = "/withdrawal-methods",
    responses(
        (status = 200, description = "Withdrawal methods retrieved successfully", body = Vec<WithdrawalMethod>),
        (status = 500, description = "Failed to fetch withdrawal methods")
    ),
    tag = "Withdrawal Methods"
)]
pub async fn get_withdrawal_methods(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<WithdrawalMethod>>, ApiResponse<()>> {
    let methods = sqlx::query_as::<_, WithdrawalMethod>(&format!(
        "SELECT {METHOD_COLUMNS} FROM withdrawal_methods ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch withdrawal methods", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Withdrawal methods retrieved successfully",
        methods,
    ))
}

/// Full replacement of the name and field list.
#[utoipa::path(
    patch,
    path = "/withdrawal-methods/{method_id}",
    params(("method_id" = i32, Path, description = "ID of the withdrawal method")),
    request_body = UpdateWithdrawalMethod,
    responses(
        (status = 200, description = "Withdrawal method updated successfully", body = WithdrawalMethod),
        (status = 400, description = "Method name and fields are required"),
        (status = 404, description = "Withdrawal method not found")
    ),
    tag = "Withdrawal Methods"
)]
pub async fn update_withdrawal_method(
    State(db_pool): State<PgPool>,
    Path(method_id): Path<i32>,
    Json(payload): Json<UpdateWithdrawalMethod>,
) -> Result<ApiResponse<WithdrawalMethod>, ApiResponse<()>> {
    let method_name = match payload.method_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() && !payload.fields.is_empty() => name.to_string(),
        _ => {
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Method name and fields are required",
                None,
            ));
        }
    };

    if let Some(message) = field_type_error(&payload.fields) {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, message, None));
    }

    let method = sqlx::query_as::<_, WithdrawalMethod>(&format!(
        r#"
        UPDATE withdrawal_methods
        SET method_name = $1, fields = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING {METHOD_COLUMNS}
        "#
    ))
    .bind(&method_name)
    .bind(SqlJson(&payload.fields))
    .bind(method_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Method name already exists.", None)
        }
        _ => internal_error("Failed to update withdrawal method", e),
    })?
    .ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Withdrawal method not found", None)
    })?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Withdrawal method updated successfully",
        method,
    ))
}

/// Toggles `is_active`, or promotes the method to the single default slot.
#[utoipa::path(
    patch,
    path = "/withdrawal-methods/{method_id}/status",
    params(("method_id" = i32, Path, description = "ID of the withdrawal method")),
    request_body = FieldToggle,
    responses(
        (status = 200, description = "Withdrawal method status updated", body = WithdrawalMethod),
        (status = 400, description = "Invalid field specified"),
        (status = 404, description = "Withdrawal method not found")
    ),
    tag = "Withdrawal Methods"
)]
pub async fn update_withdrawal_method_status(
    State(db_pool): State<PgPool>,
    Path(method_id): Path<i32>,
    Json(payload): Json<FieldToggle>,
) -> Result<ApiResponse<WithdrawalMethod>, ApiResponse<()>> {
    let Some(target) = toggle_target(payload.field.as_deref()) else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid field specified",
            None,
        ));
    };

    if target == "is_active" {
        let method = sqlx::query_as::<_, WithdrawalMethod>(&format!(
            "UPDATE withdrawal_methods SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 RETURNING {METHOD_COLUMNS}"
        ))
        .bind(method_id)
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to update withdrawal method status", e))?
        .ok_or_else(|| {
            ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Withdrawal method not found", None)
        })?;

        return Ok(ApiResponse::success(
            StatusCode::OK,
            "Withdrawal method status updated",
            method,
        ));
    }

    let mut tx = db_pool
        .begin()
        .await
        .map_err(|e| internal_error("Failed to start transaction", e))?;

    let current = sqlx::query_as::<_, WithdrawalMethod>(&format!(
        "SELECT {METHOD_COLUMNS} FROM withdrawal_methods WHERE id = $1"
    ))
    .bind(method_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| internal_error("Failed to fetch withdrawal method", e))?
    .ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Withdrawal method not found", None)
    })?;

    if current.is_default {
        return Ok(ApiResponse::success(
            StatusCode::OK,
            "Withdrawal method is already the default.",
            current,
        ));
    }

    sqlx::query("UPDATE withdrawal_methods SET is_default = FALSE WHERE is_default")
        .execute(&mut *tx)
        .await
        .map_err(|e| internal_error("Failed to clear default method", e))?;

    let method = sqlx::query_as::<_, WithdrawalMethod>(&format!(
        "UPDATE withdrawal_methods SET is_default = TRUE, updated_at = NOW() \
         WHERE id = $1 RETURNING {METHOD_COLUMNS}"
    ))
    .bind(method_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| internal_error("Failed to set default method", e))?;

    tx.commit()
        .await
        .map_err(|e| internal_error("Failed to commit transaction", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Withdrawal method status updated",
        method,
    ))
}

#[utoipa::path(
    delete,
    path = "/withdrawal-methods/{method_id}",
    params(("method_id" = i32, Path, description = "ID of the withdrawal method")),
    responses(
        (status = 200, description = "Withdrawal method deleted successfully"),
        (status = 404, description = "Withdrawal method not found")
    ),
    tag = "Withdrawal Methods"
)]
pub async fn delete_withdrawal_method(
    State(db_pool): State<PgPool>,
    Path(method_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM withdrawal_methods WHERE id = $1")
        .bind(method_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete withdrawal method", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(
            StatusCode::NOT_FOUND,
            "Withdrawal method not found",
            None,
        ));
    }

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Withdrawal method deleted successfully",
        (),
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        add_withdrawal_method,
        get_withdrawal_methods,
        update_withdrawal_method,
        update_withdrawal_method_status,
        delete_withdrawal_method,
    ),
    components(schemas(WithdrawalMethod, WithdrawalField, NewWithdrawalMethod, UpdateWithdrawalMethod, FieldToggle)),
    tags(
        (name = "Withdrawal Methods", description = "Seller payout method configuration")
    )
)]
pub struct WithdrawalMethodDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, input_type: &str) -> WithdrawalField {
        WithdrawalField {
            field_name: name.to_string(),
            input_type: input_type.to_string(),
            placeholder: String::new(),
            is_required: false,
        }
    }

    #[test]
    fn accepted_input_types_pass() {
        let fields = vec![
            field("Account holder", "String"),
            field("IBAN", "String"),
            field("Routing number", "Number"),
            field("Opened on", "Date"),
        ];
        assert_eq!(field_type_error(&fields), None);
    }

    #[test]
    fn unknown_input_type_is_reported_with_field_name() {
        let fields = vec![field("Account holder", "String"), field("Swift code", "Text")];
        assert_eq!(
            field_type_error(&fields).as_deref(),
            Some("Invalid input type 'Text' for field 'Swift code'")
        );
    }

    #[test]
    fn toggle_accepts_only_known_columns() {
        assert_eq!(toggle_target(Some("is_active")), Some("is_active"));
        assert_eq!(toggle_target(Some("is_default")), Some("is_default"));
        assert_eq!(toggle_target(Some("method_name")), None);
        assert_eq!(toggle_target(None), None);
    }
}
