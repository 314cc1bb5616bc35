use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::order::{Order, OrderItem};
use crate::db::models::refund::{
    Refund, RefundCustomerDetails, RefundExportParams, RefundFilterParams, RefundItem,
    RefundLogEntry, RefundReason, RefundView, REFUND_STATUSES,
};
use crate::utils::api_response::ApiResponse;
use crate::utils::export::{csv_attachment, csv_bytes};
use crate::utils::ids;
use crate::utils::image_store;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const REFUND_COLUMNS: &str = "id, refund_id, refund_status, payment_method, order_ref, \
     products, refundable_amount, refund_reason, customer_details, refund_logs, \
     seller_id, created_at, updated_at";

const REFUND_VIEW_SELECT: &str = r#"
    SELECT r.id, r.refund_id, r.refund_status, r.payment_method, r.order_ref,
           r.products, r.refundable_amount, r.refund_reason, r.customer_details,
           r.refund_logs, r.seller_id,
           o.order_id AS order_code, o.total AS order_total,
           s.first_name AS seller_first_name, s.last_name AS seller_last_name,
           s.email AS seller_email, s.phone_num AS seller_phone,
           r.created_at, r.updated_at
    FROM refunds r
    JOIN orders o ON o.id = r.order_ref
    JOIN sellers s ON s.id = r.seller_id
"#;

/// Snapshot order lines into refund lines. The submitted line total is
/// discarded; each snapshot total is rebuilt from the parts.
pub fn snapshot_items(items: &[OrderItem]) -> Vec<RefundItem> {
    items
        .iter()
        .map(|item| RefundItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            tax: item.tax,
            item_discount: item.item_discount,
            total_price: item.quantity as f64 * item.unit_price + item.tax - item.item_discount,
        })
        .collect()
}

pub fn refundable_amount(items: &[RefundItem]) -> f64 {
    items.iter().map(|item| item.total_price).sum()
}

/// Payment standing is checked before delivery standing.
pub fn refund_eligibility(payment_status: &str, status: &str) -> Result<(), &'static str> {
    if payment_status != "Paid" {
        return Err("Refunds can only be requested for paid orders.");
    }
    if status != "Delivered" {
        return Err("Refunds can only be requested for delivered orders.");
    }
    Ok(())
}

/// "name (status); name (status)" display string for exports. Creation is
/// the only writer of refund_logs, so every entry is customer-authored.
fn flatten_logs(customer_name: &str, logs: &[RefundLogEntry]) -> String {
    logs.iter()
        .map(|log| format!("{} ({})", customer_name, log.status))
        .collect::<Vec<_>>()
        .join("; ")
}

async fn discard_uploads(urls: &[String]) {
    for url in urls {
        image_store::destroy_image_best_effort(url).await;
    }
}

#[utoipa::path(
    post,
    path = "/refunds",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Refund request created successfully", body = Refund),
        (status = 400, description = "Missing fields, ineligible order or duplicate request"),
        (status = 404, description = "Order not found")
    ),
    tag = "Refunds"
)]
pub async fn create_refund(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Refund>, ApiResponse<()>> {
    let mut order_ref: Option<i32> = None;
    let mut description: Option<String> = None;
    let mut image_urls: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Malformed multipart body",
            Some(json!({ "message": e.to_string() })),
        )
    })? {
        match field.name().unwrap_or_default() {
            "order_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read order_id field", e))?;
                order_ref = text.trim().parse().ok();
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| internal_error("Failed to read description field", e))?,
                );
            }
            "images" => {
                let file_name = field.file_name().unwrap_or("refund-image").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| internal_error("Failed to read image upload", e))?;
                let url = image_store::save_image(&file_name, data)
                    .await
                    .map_err(|e| internal_error("Failed to store image", e))?;
                image_urls.push(url);
            }
            _ => {}
        }
    }

    let (order_ref, description) = match (order_ref, description.filter(|d| !d.trim().is_empty())) {
        (Some(order_ref), Some(description)) => (order_ref, description),
        _ => {
            discard_uploads(&image_urls).await;
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Missing required fields",
                None,
            ));
        }
    };

    let order = match sqlx::query_as::<_, Order>(
        "SELECT id, order_id, total, status, payment_status, payment_method, \
         verification_code, customer_id, seller_id, customer_address_id, \
         order_items, delivery, created_at, updated_at \
         FROM orders WHERE id = $1",
    )
    .bind(order_ref)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve order", e))
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            discard_uploads(&image_urls).await;
            return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Order not found", None));
        }
        Err(resp) => {
            discard_uploads(&image_urls).await;
            return Err(resp);
        }
    };

    if let Err(message) = refund_eligibility(&order.payment_status, &order.status) {
        discard_uploads(&image_urls).await;
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, message, None));
    }

    // Check-then-act: two concurrent requests for the same order can both
    // pass this scan. The refund_status enum never contains 'Completed',
    // so any prior refund for the product blocks a new one.
    for item in order.order_items.iter() {
        let already_requested: bool = match sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM refunds
                WHERE order_ref = $1
                  AND refund_status <> 'Completed'
                  AND products @> jsonb_build_array(jsonb_build_object('product_id', $2::INT))
            )
            "#,
        )
        .bind(order_ref)
        .bind(item.product_id)
        .fetch_one(&db_pool)
        .await
        {
            Ok(exists) => exists,
            Err(e) => {
                discard_uploads(&image_urls).await;
                return Err(internal_error("Failed to check existing refunds", e));
            }
        };

        if already_requested {
            discard_uploads(&image_urls).await;
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                &format!("Refund already requested for product: {}", item.product_id),
                None,
            ));
        }
    }

    let customer: Option<(Option<String>, Option<String>, Option<String>, String)> =
        match sqlx::query_as(
            "SELECT first_name, last_name, email, phone_number FROM customers WHERE id = $1",
        )
        .bind(order.customer_id)
        .fetch_optional(&db_pool)
        .await
        {
            Ok(row) => row,
            Err(e) => {
                discard_uploads(&image_urls).await;
                return Err(internal_error("Failed to retrieve customer", e));
            }
        };

    let Some((first_name, last_name, email, phone_number)) = customer else {
        discard_uploads(&image_urls).await;
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Customer not found", None));
    };

    let name = format!(
        "{} {}",
        first_name.unwrap_or_default(),
        last_name.unwrap_or_default()
    )
    .trim()
    .to_string();

    let items = snapshot_items(&order.order_items);
    let amount = refundable_amount(&items);

    let reason = RefundReason { description, images: image_urls.clone() };
    let customer_details = RefundCustomerDetails { name, email, phone: phone_number };
    let logs = vec![RefundLogEntry {
        changed_by: order.customer_id,
        date: Utc::now().naive_utc(),
        status: "Pending".to_string(),
        note: Some("Refund initiated by customer".to_string()),
    }];

    let refund = sqlx::query_as::<_, Refund>(&format!(
        r#"
        INSERT INTO refunds
            (refund_id, payment_method, order_ref, products, refundable_amount,
             refund_reason, customer_details, refund_logs, seller_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {REFUND_COLUMNS}
        "#
    ))
    .bind(ids::generate_refund_id())
    .bind(&order.payment_method)
    .bind(order_ref)
    .bind(SqlJson(&items))
    .bind(amount)
    .bind(SqlJson(&reason))
    .bind(SqlJson(&customer_details))
    .bind(SqlJson(&logs))
    .bind(order.seller_id)
    .fetch_one(&db_pool)
    .await;

    let refund = match refund {
        Ok(refund) => refund,
        Err(e) => {
            discard_uploads(&image_urls).await;
            return Err(internal_error("Failed to create refund", e));
        }
    };

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Refund request created successfully",
        refund,
    ))
}

/// Refund queue listing. `refund_status` is mandatory; the optional search
/// term matches refund id and customer name case-insensitively, and an
/// integer term also matches the order primary key.
#[utoipa::path(
    get,
    path = "/refunds",
    params(RefundFilterParams),
    responses(
        (status = 200, description = "Refund requests fetched successfully"),
        (status = 400, description = "Refund status is required"),
        (status = 500, description = "Failed to fetch refund requests")
    ),
    tag = "Refunds"
)]
pub async fn get_refunds(
    State(db_pool): State<PgPool>,
    Query(params): Query<RefundFilterParams>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let Some(refund_status) = params.refund_status.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Refund status is required",
            None,
        ));
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut query_builder = QueryBuilder::new(REFUND_VIEW_SELECT);
    let mut count_query_builder = QueryBuilder::new(
        "SELECT COUNT(*) FROM refunds r JOIN orders o ON o.id = r.order_ref \
         JOIN sellers s ON s.id = r.seller_id",
    );

    for builder in [&mut query_builder, &mut count_query_builder] {
        builder.push(" WHERE r.refund_status = ").push_bind(refund_status.clone());

        if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            builder
                .push(" AND (r.refund_id ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR r.customer_details->>'name' ILIKE ")
                .push_bind(pattern);
            if let Ok(order_pk) = search.trim().parse::<i32>() {
                builder.push(" OR r.order_ref = ").push_bind(order_pk);
            }
            builder.push(")");
        }
    }

    query_builder
        .push(" ORDER BY r.created_at DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);

    let refunds = query_builder
        .build_query_as::<RefundView>()
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to fetch refund requests", e))?;

    if refunds.is_empty() {
        return Ok(ApiResponse::success(
            StatusCode::OK,
            "No refunds found for the given status and search criteria.",
            json!({
                "data": [],
                "pagination": {
                    "current_page": page,
                    "total_pages": 0,
                    "total_items": 0,
                    "page_size": limit,
                },
            }),
        ));
    }

    let total_items: i64 = count_query_builder
        .build_query_scalar()
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to count refund requests", e))?;

    let total_pages = (total_items as f64 / limit as f64).ceil() as i64;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Refund requests fetched successfully",
        json!({
            "data": refunds,
            "pagination": {
                "current_page": page,
                "total_pages": total_pages,
                "total_items": total_items,
                "page_size": limit,
            },
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/refunds/export",
    params(RefundExportParams),
    responses(
        (status = 200, description = "CSV export of refunds in the given status", content_type = "text/csv"),
        (status = 400, description = "Refund status missing or invalid"),
        (status = 404, description = "No refunds found for this status")
    ),
    tag = "Refunds"
)]
pub async fn export_refunds(
    State(db_pool): State<PgPool>,
    Query(params): Query<RefundExportParams>,
) -> Result<Response, ApiResponse<()>> {
    let Some(refund_status) = params.refund_status.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Refund status is required",
            None,
        ));
    };

    if !REFUND_STATUSES.contains(&refund_status.as_str()) {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            &format!("refund_status must be one of: {}", REFUND_STATUSES.join(", ")),
            None,
        ));
    }

    let refunds = sqlx::query_as::<_, RefundView>(&format!(
        "{REFUND_VIEW_SELECT} WHERE r.refund_status = $1 ORDER BY r.created_at DESC"
    ))
    .bind(&refund_status)
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to export refunds", e))?;

    if refunds.is_empty() {
        return Err(ApiResponse::<()>::error(
            StatusCode::NOT_FOUND,
            "No refunds found for this status",
            None,
        ));
    }

    let header = [
        "Refund ID",
        "Order ID",
        "Payment Method",
        "Refund Status",
        "Refundable Amount",
        "Refund Reason",
        "Images",
        "Customer Name",
        "Customer Email",
        "Customer Phone",
        "Refund Logs",
        "Created At",
        "Updated At",
    ];

    let rows: Vec<Vec<String>> = refunds
        .iter()
        .map(|refund| {
            let images = if refund.refund_reason.images.is_empty() {
                "N/A".to_string()
            } else {
                refund.refund_reason.images.join("; ")
            };
            vec![
                refund.refund_id.clone(),
                refund.order_code.clone().unwrap_or_else(|| "N/A".to_string()),
                refund.payment_method.clone(),
                refund.refund_status.clone(),
                refund.refundable_amount.to_string(),
                refund.refund_reason.description.clone(),
                images,
                refund.customer_details.name.clone(),
                refund
                    .customer_details
                    .email
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
                refund.customer_details.phone.clone(),
                flatten_logs(&refund.customer_details.name, &refund.refund_logs),
                refund.created_at.to_string(),
                refund.updated_at.to_string(),
            ]
        })
        .collect();

    let bytes =
        csv_bytes(&header, &rows).map_err(|e| internal_error("Failed to serialize CSV", e))?;
    let filename = format!("refunds-{}.csv", refund_status.to_lowercase());
    Ok(csv_attachment(&filename, bytes))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(create_refund, get_refunds, export_refunds),
    components(
        schemas(Refund, RefundView, RefundItem, RefundReason, RefundLogEntry, RefundCustomerDetails)
    ),
    tags(
        (name = "Refunds", description = "Refund request intake, queue and export")
    )
)]
pub struct RefundDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price: f64, tax: f64, item_discount: f64) -> OrderItem {
        OrderItem {
            product_id: 7,
            quantity,
            unit_price,
            tax,
            item_discount,
            total_price: 999.0,
        }
    }

    #[test]
    fn paid_and_delivered_order_is_eligible() {
        assert!(refund_eligibility("Paid", "Delivered").is_ok());
    }

    #[test]
    fn unpaid_order_fails_on_payment_before_delivery() {
        let err = refund_eligibility("Pending", "Ongoing").unwrap_err();
        assert_eq!(err, "Refunds can only be requested for paid orders.");
    }

    #[test]
    fn undelivered_paid_order_is_rejected() {
        let err = refund_eligibility("Paid", "Ongoing").unwrap_err();
        assert_eq!(err, "Refunds can only be requested for delivered orders.");
    }

    #[test]
    fn snapshot_rebuilds_line_totals_from_parts() {
        let items = snapshot_items(&[line(2, 10.0, 1.5, 0.5)]);
        assert_eq!(items[0].total_price, 21.0);
    }

    #[test]
    fn refundable_amount_sums_snapshot_totals() {
        let items = snapshot_items(&[line(1, 5.0, 0.0, 0.0), line(3, 2.0, 0.6, 1.0)]);
        assert_eq!(refundable_amount(&items), 10.6);
    }

    #[test]
    fn log_flattening_uses_name_and_status() {
        let logs = vec![
            RefundLogEntry {
                changed_by: 4,
                date: chrono::Utc::now().naive_utc(),
                status: "Pending".to_string(),
                note: None,
            },
            RefundLogEntry {
                changed_by: 4,
                date: chrono::Utc::now().naive_utc(),
                status: "Approved".to_string(),
                note: None,
            },
        ];
        assert_eq!(flatten_logs("Asha Rao", &logs), "Asha Rao (Pending); Asha Rao (Approved)");
    }
}
