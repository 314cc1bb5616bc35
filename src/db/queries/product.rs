use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::product::{
    BulkImportReport, FailedImportRow, NewProduct, Product, ProductFilterParams,
    SellerScopeParams, UpdateProduct,
};
use crate::utils::api_response::ApiResponse;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const PRODUCT_COLUMNS: &str = "id, product_title, product_description, product_sku, \
     general_info, settings, pricing, images, seo, seller_id, is_featured, \
     total_sold, total_sold_amount, created_at, updated_at";

/// Names every absent required field so clients can fix one submission
/// instead of replaying it per error.
pub fn missing_required_fields(payload: &NewProduct) -> Option<Value> {
    let mut missing = Map::new();

    if payload
        .general_info
        .pointer("/product_sku")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .is_none()
    {
        missing.insert("product_sku".into(), json!("product_sku is required"));
    }
    if payload
        .images
        .pointer("/product_thumbnail")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .is_none()
    {
        missing.insert(
            "product_thumbnail".into(),
            json!("product_thumbnail is required"),
        );
    }
    if payload
        .product_title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .is_none()
    {
        missing.insert("product_title".into(), json!("product_title is required"));
    }
    if payload.pricing.pointer("/unit_price").and_then(Value::as_f64).is_none() {
        missing.insert("unit_price".into(), json!("unit_price is required"));
    }

    if missing.is_empty() {
        None
    } else {
        Some(Value::Object(missing))
    }
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product added successfully", body = Product),
        (status = 400, description = "Missing required fields or duplicate SKU"),
        (status = 404, description = "Seller not found")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(db_pool): State<PgPool>,
    Json(payload): Json<NewProduct>,
) -> Result<ApiResponse<Product>, ApiResponse<()>> {
    if let Some(missing) = missing_required_fields(&payload) {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Missing required fields",
            Some(json!({ "missing_fields": missing })),
        ));
    }

    let Some(seller_id) = payload.seller_id else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "seller_id is required", None));
    };

    let seller_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sellers WHERE id = $1)")
        .bind(seller_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check seller", e))?;
    if !seller_exists {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None));
    }

    // Checked non-empty by missing_required_fields above.
    let sku = payload
        .general_info
        .pointer("/product_sku")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let title = payload.product_title.unwrap_or_default();
    let description = payload.product_description.unwrap_or_default();

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products
            (product_title, product_description, product_sku,
             general_info, settings, pricing, images, seo, seller_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&title)
    .bind(&description)
    .bind(&sku)
    .bind(&payload.general_info)
    .bind(&payload.settings)
    .bind(&payload.pricing)
    .bind(&payload.images)
    .bind(&payload.seo)
    .bind(seller_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Duplicate product SKU. Please use a unique SKU.",
            None,
        ),
        _ => internal_error("Failed to add product", e),
    })?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Product added successfully", product))
}

/// Back-office listing; every status is visible here
#[utoipa::path(
    get,
    path = "/products",
    params(ProductFilterParams),
    responses(
        (status = 200, description = "Products retrieved successfully"),
        (status = 500, description = "Failed to retrieve products")
    ),
    tag = "Products"
)]
pub async fn get_products(
    State(db_pool): State<PgPool>,
    Query(params): Query<ProductFilterParams>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut query_builder =
        QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    let mut count_query_builder = QueryBuilder::new("SELECT COUNT(id) FROM products");
    let mut has_conditions = false;

    macro_rules! push_condition {
        ($builder:ident, $sql:expr, $bind:expr) => {
            if has_conditions {
                $builder.push(" AND ");
            } else {
                $builder.push(" WHERE ");
            }
            $builder.push($sql).push_bind($bind);
        };
    }

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        push_condition!(query_builder, "product_title ILIKE ", pattern.clone());
        push_condition!(count_query_builder, "product_title ILIKE ", pattern);
        has_conditions = true;
    }
    if let Some(seller_id) = params.seller_id {
        push_condition!(query_builder, "seller_id = ", seller_id);
        push_condition!(count_query_builder, "seller_id = ", seller_id);
        has_conditions = true;
    }
    if let Some(status) = params.product_status.as_deref().filter(|s| !s.is_empty()) {
        push_condition!(query_builder, "settings->>'product_status' = ", status.to_string());
        push_condition!(count_query_builder, "settings->>'product_status' = ", status.to_string());
        has_conditions = true;
    }
    let _ = has_conditions;

    query_builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);

    let total: i64 = count_query_builder
        .build_query_scalar::<i64>()
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to count products", e))?;

    let products: Vec<Product> = query_builder
        .build_query_as::<Product>()
        .fetch_all(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to retrieve products", e))?;

    let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Products retrieved successfully",
        json!({
            "products": products,
            "pagination": {
                "current_page": page,
                "total_pages": total_pages,
                "total_products": total,
                "has_next_page": page < total_pages,
                "has_prev_page": page > 1,
            }
        }),
    ))
}

/// Storefront listing; only approved products leave the back office
#[utoipa::path(
    get,
    path = "/products/approved",
    responses(
        (status = 200, description = "Approved products", body = Vec<Product>),
        (status = 500, description = "Failed to retrieve products")
    ),
    tag = "Products"
)]
pub async fn get_approved_products(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Product>>, ApiResponse<()>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE settings->>'product_status' = 'Approved' \
         ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve products", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Products retrieved successfully", products))
}

#[utoipa::path(
    get,
    path = "/sellers/{seller_id}/products",
    params(("seller_id" = i32, Path, description = "Owning seller")),
    responses(
        (status = 200, description = "Products retrieved successfully", body = Vec<Product>),
        (status = 404, description = "No products found for this seller")
    ),
    tag = "Products"
)]
pub async fn get_seller_products(
    State(db_pool): State<PgPool>,
    Path(seller_id): Path<i32>,
) -> Result<ApiResponse<Vec<Product>>, ApiResponse<()>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY created_at DESC"
    ))
    .bind(seller_id)
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve products", e))?;

    if products.is_empty() {
        return Err(ApiResponse::<()>::error(
            StatusCode::NOT_FOUND,
            "No products found for this seller.",
            None,
        ));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Products retrieved successfully", products))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}",
    params(("product_id" = i32, Path, description = "ID of the product")),
    responses(
        (status = 200, description = "Product retrieved successfully", body = Product),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(db_pool): State<PgPool>,
    Path(product_id): Path<i32>,
) -> Result<ApiResponse<Product>, ApiResponse<()>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(product_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to retrieve product", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Product not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Product retrieved successfully", product))
}

/// Partial update scoped to the owning seller; a SKU embedded in a new
/// general_info document also refreshes the unique column
#[utoipa::path(
    patch,
    path = "/products/{product_id}",
    params(("product_id" = i32, Path, description = "ID of the product to update")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Product not found or not owned by this seller")
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(db_pool): State<PgPool>,
    Path(product_id): Path<i32>,
    Json(payload): Json<UpdateProduct>,
) -> Result<ApiResponse<Product>, ApiResponse<()>> {
    if payload.is_empty() {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No fields provided for update", None));
    }

    let mut query_builder = QueryBuilder::new("UPDATE products SET ");
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

    push_if_some!(product_title);
    push_if_some!(product_description);
    push_if_some!(general_info);
    push_if_some!(settings);
    push_if_some!(pricing);
    push_if_some!(images);
    push_if_some!(seo);

    if let Some(sku) = payload
        .general_info
        .as_ref()
        .and_then(|gi| gi.pointer("/product_sku"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    {
        query_builder.push(", product_sku = ").push_bind(sku.to_string());
    }

    query_builder
        .push(", updated_at = NOW() WHERE id = ")
        .push_bind(product_id)
        .push(" AND seller_id = ")
        .push_bind(payload.seller_id)
        .push(&format!(" RETURNING {PRODUCT_COLUMNS}"));

    let product = query_builder
        .build_query_as::<Product>()
        .fetch_optional(&db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Duplicate product SKU. Please use a unique SKU.",
                None,
            ),
            _ => internal_error("Failed to update product", e),
        })?
        .ok_or_else(|| {
            ApiResponse::<()>::error(
                StatusCode::NOT_FOUND,
                "Product not found or not owned by this seller",
                None,
            )
        })?;

    Ok(ApiResponse::success(StatusCode::OK, "Product updated successfully", product))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    params(
        ("product_id" = i32, Path, description = "ID of the product to delete"),
        SellerScopeParams
    ),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 400, description = "seller_id query parameter is required"),
        (status = 404, description = "Product not found or not owned by this seller")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(db_pool): State<PgPool>,
    Path(product_id): Path<i32>,
    Query(scope): Query<SellerScopeParams>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let Some(seller_id) = scope.seller_id else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "seller_id query parameter is required",
            None,
        ));
    };

    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
        .bind(product_id)
        .bind(seller_id)
        .execute(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to delete product", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(
            StatusCode::NOT_FOUND,
            "Product not found or not owned by this seller",
            None,
        ));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Product deleted successfully", ()))
}

#[utoipa::path(
    patch,
    path = "/products/{product_id}/approve",
    params(("product_id" = i32, Path, description = "ID of the product to approve")),
    responses(
        (status = 200, description = "Product approved successfully"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn approve_product(
    State(db_pool): State<PgPool>,
    Path(product_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE products \
         SET settings = jsonb_set(settings, '{product_status}', '\"Approved\"'), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(product_id)
    .execute(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to approve product", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Product not found", None));
    }

    Ok(ApiResponse::success(StatusCode::OK, "Product approved successfully", ()))
}

/// Flip the featured flag; flipping twice restores the original value
#[utoipa::path(
    patch,
    path = "/products/{product_id}/feature",
    params(("product_id" = i32, Path, description = "ID of the product")),
    responses(
        (status = 200, description = "Featured status toggled"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn toggle_featured(
    State(db_pool): State<PgPool>,
    Path(product_id): Path<i32>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    let is_featured: bool = sqlx::query_scalar(
        "UPDATE products SET is_featured = NOT is_featured, updated_at = NOW() \
         WHERE id = $1 RETURNING is_featured",
    )
    .bind(product_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to toggle featured status", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Product not found", None))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Featured status toggled",
        json!({ "is_featured": is_featured }),
    ))
}

fn csv_value(record: &csv::StringRecord, headers: &csv::StringRecord, name: &str) -> Option<String> {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn csv_number(record: &csv::StringRecord, headers: &csv::StringRecord, name: &str) -> Option<f64> {
    csv_value(record, headers, name).and_then(|v| v.parse().ok())
}

/// One insert attempt per CSV row. The whole file is never transactional;
/// a duplicate SKU skips that row and the rest continue.
#[utoipa::path(
    post,
    path = "/products/import",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Bulk import completed", body = BulkImportReport),
        (status = 400, description = "No file uploaded or unknown seller")
    ),
    tag = "Products"
)]
pub async fn bulk_import_products(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<BulkImportReport>, ApiResponse<()>> {
    let mut seller_id: Option<i32> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Malformed multipart body", Some(json!({ "message": e.to_string() })))
    })? {
        match field.name().unwrap_or_default() {
            "seller_id" => {
                let text = field.text().await.map_err(|e| internal_error("Failed to read seller_id field", e))?;
                seller_id = text.trim().parse().ok();
            }
            "product-file" | "file" => {
                let data = field.bytes().await.map_err(|e| internal_error("Failed to read uploaded file", e))?;
                file_bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let Some(file_bytes) = file_bytes else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "No file uploaded", None));
    };
    let Some(seller_id) = seller_id else {
        return Err(ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "seller_id field is required", None));
    };

    let seller_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sellers WHERE id = $1)")
        .bind(seller_id)
        .fetch_one(&db_pool)
        .await
        .map_err(|e| internal_error("Failed to check seller", e))?;
    if !seller_exists {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Seller not found", None));
    }

    let mut reader = csv::Reader::from_reader(file_bytes.as_slice());
    let headers = reader
        .headers()
        .map_err(|e| {
            ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Unreadable import file", Some(json!({ "message": e.to_string() })))
        })?
        .clone();

    let mut saved_products = Vec::new();
    let mut failed_products = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let row_number = row_idx + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                failed_products.push(FailedImportRow {
                    row_number,
                    product_sku: None,
                    error: format!("unreadable row: {e}"),
                });
                continue;
            }
        };

        let sku = csv_value(&record, &headers, "product_sku");
        let title = csv_value(&record, &headers, "product_title");
        let unit_price = csv_number(&record, &headers, "unit_price");

        let (Some(sku), Some(title), Some(unit_price)) = (sku.clone(), title, unit_price) else {
            failed_products.push(FailedImportRow {
                row_number,
                product_sku: sku,
                error: "product_sku, product_title and unit_price are required".to_string(),
            });
            continue;
        };

        let general_info = json!({
            "category_id": csv_number(&record, &headers, "category_id"),
            "sub_category_id": csv_number(&record, &headers, "sub_category_id"),
            "sub_sub_category_id": csv_number(&record, &headers, "sub_sub_category_id"),
            "brand_id": csv_number(&record, &headers, "brand_id"),
            "product_type": csv_value(&record, &headers, "product_type"),
            "unit": csv_value(&record, &headers, "unit"),
            "product_sku": sku,
        });
        let pricing = json!({
            "unit_price": unit_price,
            "minimum_order_qty": csv_number(&record, &headers, "minimum_order_qty"),
            "current_stock_qty": csv_number(&record, &headers, "current_stock_qty"),
            "discount_type": csv_value(&record, &headers, "discount_type"),
            "discount_amount": csv_number(&record, &headers, "discount_amount"),
            "tax_amount": csv_number(&record, &headers, "tax_amount"),
            "tax_calculation": csv_value(&record, &headers, "tax_calculation"),
            "shipping_cost": csv_number(&record, &headers, "shipping_cost"),
        });
        let seo = json!({
            "meta_title": csv_value(&record, &headers, "meta_title"),
            "meta_description": csv_value(&record, &headers, "meta_description"),
            "meta_image": csv_value(&record, &headers, "meta_image"),
        });
        let description =
            csv_value(&record, &headers, "product_description").unwrap_or_default();

        let inserted = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products
                (product_title, product_description, product_sku,
                 general_info, settings, pricing, images, seo, seller_id)
            VALUES ($1, $2, $3, $4, '{{}}', $5, '{{}}', $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&title)
        .bind(&description)
        .bind(&sku)
        .bind(&general_info)
        .bind(&pricing)
        .bind(&seo)
        .bind(seller_id)
        .fetch_one(&db_pool)
        .await;

        match inserted {
            Ok(product) => saved_products.push(product),
            Err(e) => {
                let error = match &e {
                    sqlx::Error::Database(db) if db.is_unique_violation() => {
                        "Duplicate product SKU. Please use a unique SKU.".to_string()
                    }
                    _ => e.to_string(),
                };
                failed_products.push(FailedImportRow {
                    row_number,
                    product_sku: Some(sku),
                    error,
                });
            }
        }
    }

    tracing::info!(
        saved = saved_products.len(),
        failed = failed_products.len(),
        "bulk product import finished"
    );

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Bulk import completed",
        BulkImportReport { saved_products, failed_products },
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        get_products,
        get_approved_products,
        get_seller_products,
        get_product,
        update_product,
        delete_product,
        approve_product,
        toggle_featured,
        bulk_import_products,
    ),
    components(
        schemas(Product, NewProduct, UpdateProduct, BulkImportReport, FailedImportRow)
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ProductDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::product::NewProduct;

    fn base_payload() -> NewProduct {
        NewProduct {
            product_title: Some("Basmati Rice 5kg".to_string()),
            product_description: Some("Long grain".to_string()),
            general_info: json!({ "product_sku": "RICE-5KG", "unit": "bag" }),
            settings: json!({}),
            pricing: json!({ "unit_price": 12.5 }),
            images: json!({ "product_thumbnail": "/upload/rice.png" }),
            seo: json!({}),
            seller_id: Some(1),
        }
    }

    #[test]
    fn complete_payload_has_no_missing_fields() {
        assert!(missing_required_fields(&base_payload()).is_none());
    }

    #[test]
    fn each_absent_field_is_named() {
        let mut payload = base_payload();
        payload.product_title = None;
        payload.general_info = json!({});
        payload.pricing = json!({});
        payload.images = json!({});

        let missing = missing_required_fields(&payload).unwrap();
        let map = missing.as_object().unwrap();
        assert_eq!(map.len(), 4);
        assert!(map.contains_key("product_sku"));
        assert!(map.contains_key("product_thumbnail"));
        assert!(map.contains_key("product_title"));
        assert!(map.contains_key("unit_price"));
    }

    #[test]
    fn blank_sku_counts_as_missing() {
        let mut payload = base_payload();
        payload.general_info = json!({ "product_sku": "   " });

        let missing = missing_required_fields(&payload).unwrap();
        assert!(missing.as_object().unwrap().contains_key("product_sku"));
    }

    #[test]
    fn csv_helpers_read_by_header_name() {
        let data = "product_sku,unit_price,product_title\nSKU-1,9.99,Tea\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let record = reader.records().next().unwrap().unwrap();

        assert_eq!(csv_value(&record, &headers, "product_sku").as_deref(), Some("SKU-1"));
        assert_eq!(csv_number(&record, &headers, "unit_price"), Some(9.99));
        assert!(csv_value(&record, &headers, "absent_column").is_none());
    }
}
