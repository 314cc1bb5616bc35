use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::coupon::{
    Coupon, CouponFilterParams, CouponStatusUpdate, NewCoupon, UpdateCoupon, COUPON_TYPES,
    CREATOR_TYPES, CUSTOMER_TARGETS, DISCOUNT_TYPES,
};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const COUPON_COLUMNS: &str = "id, coupon_type, title, code, creator_type, creator_id, \
     apply_to_all_products, applicable_products, customer, specific_customers, \
     limit_per_user, discount_type, discount_amount, min_purchase, start_date, \
     expire_date, apply_to_all_categories, category_id, status, created_at, updated_at";

/// Every failed rule is collected so the client sees the full list at once.
/// A start date equal to `now` passes; an expiry equal to the start does not.
pub fn coupon_validation_errors(payload: &NewCoupon, now: NaiveDateTime) -> Vec<String> {
    let mut errors = Vec::new();

    if !COUPON_TYPES.contains(&payload.coupon_type.as_str()) {
        errors.push("Invalid couponType".to_string());
    }
    if payload.title.trim().len() < 3 {
        errors.push("Title must be at least 3 characters long".to_string());
    }
    if !CREATOR_TYPES.contains(&payload.creator_type.as_str()) {
        errors.push("Invalid creatorType".to_string());
    }
    if payload.creator_id.is_none() {
        errors.push("creatorId is required".to_string());
    }
    if !payload.apply_to_all_products && payload.applicable_products.is_empty() {
        errors.push("Specify products or select applyToAllProducts".to_string());
    }
    if !CUSTOMER_TARGETS.contains(&payload.customer.as_str()) {
        errors.push("Invalid customer value".to_string());
    }
    if payload.customer == "specific" && payload.specific_customers.is_empty() {
        errors.push("Specify customer IDs if selecting specific customers".to_string());
    }
    if !DISCOUNT_TYPES.contains(&payload.discount_type.as_str()) {
        errors.push("Invalid discountType".to_string());
    }
    if payload.discount_amount < 1.0 {
        errors.push("Discount must be at least 1".to_string());
    }
    if payload.min_purchase < 0.0 {
        errors.push("Minimum purchase must be at least 0".to_string());
    }
    if payload.start_date < now {
        errors.push("Start date cannot be in the past".to_string());
    }
    if payload.expire_date <= payload.start_date {
        errors.push("Expiration date must be after the start date".to_string());
    }
    if !payload.apply_to_all_categories && payload.category_id.is_none() {
        errors.push("Category is required when applyToAllCategories is false".to_string());
    }

    errors
}

#[utoipa::path(
    post,
    path = "/coupons",
    request_body = NewCoupon,
    responses(
        (status = 201, description = "Coupon added successfully", body = Coupon),
        (status = 400, description = "Duplicate code or validation errors"),
        (status = 500, description = "Failed to create coupon")
    ),
    tag = "Coupons"
)]
pub async fn add_coupon(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewCoupon>,
) -> Result<ApiResponse<Coupon>, ApiResponse<()>> {
    // The duplicate-code check fails fast; everything else is collected.
    let code_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM coupons WHERE code = $1)")
            .bind(&payload.code)
            .fetch_one(&db_pool)
            .await
            .map_err(|e| internal_error("Failed to check coupon code", e))?;

    if code_taken {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Coupon code already exists",
            None,
        ));
    }

    let errors = coupon_validation_errors(&payload, chrono::Utc::now().naive_utc());
    if !errors.is_empty() {
        return Err(ApiResponse::<()>::validation_errors(errors));
    }

    let creator_id = payload
        .creator_id
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "creatorId is required", None))?;

    // applyToAllProducts resolves to the creator's current catalog at
    // creation time, narrowed to the coupon's category when one is set.
    let applicable_products: Vec<i32> = if payload.apply_to_all_products {
        sqlx::query_scalar(
            r#"
            SELECT id FROM products
            WHERE seller_id = $1
              AND ($2 OR (general_info->>'category_id')::INT = $3)
            "#,
        )
        .bind(creator_id)
        .bind(payload.apply_to_all_categories)
        .bind(payload.category_id.unwrap_or(0))
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to resolve applicable products", e))?
    } else {
        payload.applicable_products.clone()
    };

    let specific_customers: Vec<i32> = if payload.customer == "all" {
        Vec::new()
    } else {
        payload.specific_customers.clone()
    };

    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        r#"
        INSERT INTO coupons
            (coupon_type, title, code, creator_type, creator_id, apply_to_all_products,
             applicable_products, customer, specific_customers, limit_per_user,
             discount_type, discount_amount, min_purchase, start_date, expire_date,
             apply_to_all_categories, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING {COUPON_COLUMNS}
        "#
    ))
    .bind(&payload.coupon_type)
    .bind(payload.title.trim())
    .bind(&payload.code)
    .bind(&payload.creator_type)
    .bind(creator_id)
    .bind(payload.apply_to_all_products)
    .bind(SqlJson(&applicable_products))
    .bind(&payload.customer)
    .bind(SqlJson(&specific_customers))
    .bind(payload.limit_per_user.unwrap_or(1))
    .bind(&payload.discount_type)
    .bind(payload.discount_amount)
    .bind(payload.min_purchase)
    .bind(payload.start_date)
    .bind(payload.expire_date)
    .bind(payload.apply_to_all_categories)
    .bind(payload.category_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Coupon code already exists", None)
        }
        _ => internal_error("Failed to create coupon", e),
    })?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Coupon added successfully", coupon))
}

#[utoipa::path(
    get,
    path = "/coupons",
    params(CouponFilterParams),
    responses(
        (status = 200, description = "Coupons fetched successfully", body = Vec<Coupon>),
        (status = 500, description = "Failed to fetch coupons")
    ),
    tag = "Coupons"
)]
pub async fn get_coupons(
    State(db_pool): State<PgPool>,
    Query(params): Query<CouponFilterParams>,
) -> Result<ApiResponse<Vec<Coupon>>, ApiResponse<()>> {
    let mut query_builder =
        QueryBuilder::new(format!("SELECT {COUPON_COLUMNS} FROM coupons"));
    let mut has_conditions = false;

    macro_rules! push_condition {
        ($sql:expr, $value:expr) => {
            if let Some(value) = $value {
                query_builder.push(if has_conditions { " AND " } else { " WHERE " });
                query_builder.push($sql).push_bind(value);
                has_conditions = true;
            }
        };
    }

    push_condition!("creator_type = ", params.creator_type);
    push_condition!("apply_to_all_products = ", params.apply_to_all_products);
    push_condition!("category_id = ", params.category_id);
    let _ = has_conditions;

    query_builder.push(" ORDER BY created_at DESC");

    let coupons = query_builder
        .build_query_as::<Coupon>()
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to fetch coupons", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Coupons fetched successfully", coupons))
}

#[utoipa::path(
    patch,
    path = "/coupons/{coupon_id}/status",
    params(("coupon_id" = i32, Path, description = "ID of the coupon")),
    request_body = CouponStatusUpdate,
    responses(
        (status = 200, description = "Coupon status updated", body = Coupon),
        (status = 404, description = "Coupon not found")
    ),
    tag = "Coupons"
)]
pub async fn update_coupon_status(
    State(db_pool): State<PgPool>,
    Path(coupon_id): Path<i32>,
    Json(payload): Json<CouponStatusUpdate>,
) -> Result<ApiResponse<Coupon>, ApiResponse<()>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        "UPDATE coupons SET status = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING {COUPON_COLUMNS}"
    ))
    .bind(payload.status)
    .bind(coupon_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to update coupon status", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Coupon not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Coupon status updated", coupon))
}

#[utoipa::path(
    patch,
    path = "/coupons/{coupon_id}",
    params(("coupon_id" = i32, Path, description = "ID of the coupon to update")),
    request_body = UpdateCoupon,
    responses(
        (status = 200, description = "Coupon updated successfully", body = Coupon),
        (status = 400, description = "No fields provided or duplicate code"),
        (status = 404, description = "Coupon not found")
    ),
    tag = "Coupons"
)]
pub async fn update_coupon(
    State(db_pool): State<PgPool>,
    Path(coupon_id): Path<i32>,
    Json(payload): Json<UpdateCoupon>,
) -> Result<ApiResponse<Coupon>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE coupons SET ");
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

    push_if_some!(coupon_type);
    push_if_some!(title);
    push_if_some!(code);
    push_if_some!(limit_per_user);
    push_if_some!(discount_type);
    push_if_some!(discount_amount);
    push_if_some!(min_purchase);
    push_if_some!(start_date);
    push_if_some!(expire_date);
    push_if_some!(category_id);

    query_builder
        .push(", updated_at = NOW() WHERE id = ")
        .push_bind(coupon_id)
        .push(&format!(" RETURNING {COUPON_COLUMNS}"));

    let coupon = query_builder
        .build_query_as::<Coupon>()
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Coupon code already exists", None)
            }
            _ => internal_error("Failed to update coupon", e),
        })?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Coupon not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Coupon updated successfully", coupon))
}

#[utoipa::path(
    delete,
    path = "/coupons/{coupon_id}",
    params(("coupon_id" = i32, Path, description = "ID of the coupon to delete")),
    responses(
        (status = 200, description = "Coupon deleted successfully"),
        (status = 404, description = "Coupon not found")
    ),
    tag = "Coupons"
)]
pub async fn delete_coupon(
    State(db_pool): State<PgPool>,
    Path(coupon_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
        .bind(coupon_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete coupon", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Coupon not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Coupon deleted successfully", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(add_coupon, get_coupons, update_coupon_status, update_coupon, delete_coupon),
    components(schemas(Coupon, NewCoupon, UpdateCoupon, CouponStatusUpdate)),
    tags(
        (name = "Coupons", description = "Discount coupon management")
    )
)]
pub struct CouponDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn valid_payload(now: NaiveDateTime) -> NewCoupon {
        NewCoupon {
            coupon_type: "discountOnPurchase".to_string(),
            title: "Festive week".to_string(),
            code: "FEST10".to_string(),
            creator_type: "admin".to_string(),
            creator_id: Some(1),
            apply_to_all_products: true,
            applicable_products: Vec::new(),
            customer: "all".to_string(),
            specific_customers: Vec::new(),
            limit_per_user: Some(1),
            discount_type: "percentage".to_string(),
            discount_amount: 10.0,
            min_purchase: 0.0,
            start_date: now,
            expire_date: now + Duration::days(7),
            apply_to_all_categories: true,
            category_id: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        let now = Utc::now().naive_utc();
        assert!(coupon_validation_errors(&valid_payload(now), now).is_empty());
    }

    #[test]
    fn start_date_equal_to_now_is_accepted() {
        let now = Utc::now().naive_utc();
        let payload = valid_payload(now);
        let errors = coupon_validation_errors(&payload, now);
        assert!(!errors.iter().any(|e| e.contains("Start date")));
    }

    #[test]
    fn past_start_date_is_rejected() {
        let now = Utc::now().naive_utc();
        let mut payload = valid_payload(now);
        payload.start_date = now - Duration::minutes(1);
        let errors = coupon_validation_errors(&payload, now);
        assert!(errors.contains(&"Start date cannot be in the past".to_string()));
    }

    #[test]
    fn expiry_equal_to_start_is_rejected() {
        let now = Utc::now().naive_utc();
        let mut payload = valid_payload(now);
        payload.expire_date = payload.start_date;
        let errors = coupon_validation_errors(&payload, now);
        assert!(errors.contains(&"Expiration date must be after the start date".to_string()));
    }

    #[test]
    fn all_failures_are_collected() {
        let now = Utc::now().naive_utc();
        let mut payload = valid_payload(now);
        payload.coupon_type = "bogus".to_string();
        payload.title = "ab".to_string();
        payload.creator_type = "guest".to_string();
        payload.creator_id = None;
        payload.discount_type = "points".to_string();
        payload.discount_amount = 0.0;
        payload.min_purchase = -1.0;
        let errors = coupon_validation_errors(&payload, now);
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn specific_customer_target_needs_ids() {
        let now = Utc::now().naive_utc();
        let mut payload = valid_payload(now);
        payload.customer = "specific".to_string();
        let errors = coupon_validation_errors(&payload, now);
        assert!(errors
            .contains(&"Specify customer IDs if selecting specific customers".to_string()));
    }

    #[test]
    fn category_required_without_apply_to_all() {
        let now = Utc::now().naive_utc();
        let mut payload = valid_payload(now);
        payload.apply_to_all_categories = false;
        payload.category_id = None;
        let errors = coupon_validation_errors(&payload, now);
        assert!(errors
            .contains(&"Category is required when applyToAllCategories is false".to_string()));
    }
}
