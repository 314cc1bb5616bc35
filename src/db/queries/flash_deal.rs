use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use sqlx::PgPool;

use crate::db::models::flash_deal::{FlashDeal, FlashDealProducts, PublishUpdate};
use crate::db::models::product::Product;
use crate::utils::api_response::ApiResponse;
use crate::utils::image_store;

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResponse<()> {
    ApiResponse::<()>::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(json!({ "message": e.to_string() })),
    )
}

const FLASH_DEAL_COLUMNS: &str = "id, title, start_date, end_date, banner_image, status, \
     is_published, products, active_products, created_at, updated_at";

/// Banners render in a 5:1 slot; a tenth of a unit of ratio drift is the
/// accepted tolerance.
pub fn banner_aspect_ok(width: f64, height: f64) -> bool {
    height > 0.0 && (width / height - 5.0).abs() < 0.1
}

struct BannerFields {
    title: Option<String>,
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
    products: Option<Vec<i32>>,
    banner_url: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
}

/// Shared multipart reader for create and update. Dates arrive as
/// `YYYY-MM-DDTHH:MM:SS` text, products as a JSON array of ids, and the
/// banner's reported dimensions as separate numeric fields.
async fn read_banner_fields(multipart: &mut Multipart) -> Result<BannerFields, ApiResponse<()>> {
    let mut fields = BannerFields {
        title: None,
        start_date: None,
        end_date: None,
        products: None,
        banner_url: None,
        width: None,
        height: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Malformed multipart body",
            Some(json!({ "message": e.to_string() })),
        )
    })? {
        match field.name().unwrap_or_default() {
            "title" => {
                fields.title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| internal_error("Failed to read title field", e))?,
                );
            }
            "start_date" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read start_date field", e))?;
                fields.start_date = Some(parse_datetime(&text)?);
            }
            "end_date" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read end_date field", e))?;
                fields.end_date = Some(parse_datetime(&text)?);
            }
            "products" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read products field", e))?;
                fields.products = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiResponse::<()>::error(
                        StatusCode::BAD_REQUEST,
                        "products must be a JSON array of product ids",
                        Some(json!({ "message": e.to_string() })),
                    )
                })?);
            }
            "width" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read width field", e))?;
                fields.width = text.trim().parse().ok();
            }
            "height" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error("Failed to read height field", e))?;
                fields.height = text.trim().parse().ok();
            }
            "banner_image" => {
                let file_name = field.file_name().unwrap_or("banner").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| internal_error("Failed to read banner upload", e))?;
                let url = image_store::save_image(&file_name, data)
                    .await
                    .map_err(|e| internal_error("Failed to store banner", e))?;
                fields.banner_url = Some(url);
            }
            _ => {}
        }
    }

    Ok(fields)
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, ApiResponse<()>> {
    text.trim().parse().map_err(|_| {
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid date format for startDate or endDate.",
            None,
        )
    })
}

async fn reject_banner(url: &str, message: &str) -> ApiResponse<()> {
    image_store::destroy_image_best_effort(url).await;
    ApiResponse::<()>::error(StatusCode::BAD_REQUEST, message, None)
}

#[utoipa::path(
    post,
    path = "/flash-deals",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Flash deal created successfully", body = FlashDeal),
        (status = 400, description = "Missing fields, bad dates or wrong banner aspect ratio")
    ),
    tag = "Flash Deals"
)]
pub async fn create_flash_deal(
    State(db_pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<ApiResponse<FlashDeal>, ApiResponse<()>> {
    let fields = read_banner_fields(&mut multipart).await?;

    let (title, start_date, end_date) = match (
        fields.title.clone().filter(|t| !t.trim().is_empty()),
        fields.start_date,
        fields.end_date,
    ) {
        (Some(title), Some(start), Some(end)) => (title, start, end),
        _ => {
            if let Some(url) = &fields.banner_url {
                image_store::destroy_image_best_effort(url).await;
            }
            return Err(ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                "Title, Start Date, and End Date are required.",
                None,
            ));
        }
    };

    if start_date >= end_date {
        if let Some(url) = &fields.banner_url {
            image_store::destroy_image_best_effort(url).await;
        }
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Start date must be before the end date.",
            None,
        ));
    }

    let Some(banner_url) = fields.banner_url else {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Banner image is required.",
            None,
        ));
    };

    let (width, height) = (fields.width.unwrap_or(0.0), fields.height.unwrap_or(0.0));
    if !banner_aspect_ok(width, height) {
        return Err(reject_banner(&banner_url, "Image must have a 5:1 aspect ratio.").await);
    }

    let products = fields.products.unwrap_or_default();

    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        r#"
        INSERT INTO flash_deals
            (title, start_date, end_date, banner_image, status, is_published,
             products, active_products)
        VALUES ($1, $2, $3, $4, 'Active', TRUE, $5, $6)
        RETURNING {FLASH_DEAL_COLUMNS}
        "#
    ))
    .bind(title.trim())
    .bind(start_date)
    .bind(end_date)
    .bind(&banner_url)
    .bind(SqlJson(&products))
    .bind(products.len() as i32)
    .fetch_one(&db_pool)
    .await;

    let deal = match deal {
        Ok(deal) => deal,
        Err(e) => {
            image_store::destroy_image_best_effort(&banner_url).await;
            return Err(internal_error("Failed to create flash deal", e));
        }
    };

    Ok(ApiResponse::success(StatusCode::CREATED, "Flash deal created successfully", deal))
}

#[utoipa::path(
    get,
    path = "/flash-deals",
    responses(
        (status = 200, description = "Flash deals retrieved successfully", body = Vec<FlashDeal>),
        (status = 500, description = "Failed to fetch flash deals")
    ),
    tag = "Flash Deals"
)]
pub async fn get_flash_deals(
    State(db_pool): State<PgPool>,
) -> Result<ApiResponse<Vec<FlashDeal>>, ApiResponse<()>> {
    let deals = sqlx::query_as::<_, FlashDeal>(&format!(
        "SELECT {FLASH_DEAL_COLUMNS} FROM flash_deals ORDER BY created_at DESC"
    ))
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch flash deals", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Flash deals retrieved successfully", deals))
}

/// Single deal with its member products expanded
#[utoipa::path(
    get,
    path = "/flash-deals/{deal_id}",
    params(("deal_id" = i32, Path, description = "ID of the flash deal")),
    responses(
        (status = 200, description = "Flash deal retrieved successfully"),
        (status = 404, description = "Flash deal not found")
    ),
    tag = "Flash Deals"
)]
pub async fn get_flash_deal(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "SELECT {FLASH_DEAL_COLUMNS} FROM flash_deals WHERE id = $1"
    ))
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch flash deal", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash deal not found", None))?;

    let products = sqlx::query_as::<_, Product>(
        "SELECT id, product_title, product_description, product_sku, general_info, \
         settings, pricing, images, seo, seller_id, is_featured, total_sold, \
         total_sold_amount, created_at, updated_at \
         FROM products WHERE id = ANY($1)",
    )
    .bind(&deal.products.0)
    .fetch_all(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch deal products", e))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Flash deal retrieved successfully",
        json!({ "flash_deal": deal, "products": products }),
    ))
}

#[utoipa::path(
    patch,
    path = "/flash-deals/{deal_id}",
    request_body(content_type = "multipart/form-data"),
    params(("deal_id" = i32, Path, description = "ID of the flash deal to update")),
    responses(
        (status = 200, description = "Flash deal updated successfully", body = FlashDeal),
        (status = 400, description = "Bad dates or wrong banner aspect ratio"),
        (status = 404, description = "Flash deal not found")
    ),
    tag = "Flash Deals"
)]
pub async fn update_flash_deal(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<ApiResponse<FlashDeal>, ApiResponse<()>> {
    let fields = read_banner_fields(&mut multipart).await?;

    let existing = sqlx::query_as::<_, FlashDeal>(&format!(
        "SELECT {FLASH_DEAL_COLUMNS} FROM flash_deals WHERE id = $1"
    ))
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch flash deal", e))?;

    let Some(existing) = existing else {
        if let Some(url) = &fields.banner_url {
            image_store::destroy_image_best_effort(url).await;
        }
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash deal not found", None));
    };

    let start_date = fields.start_date.unwrap_or(existing.start_date);
    let end_date = fields.end_date.unwrap_or(existing.end_date);
    if start_date >= end_date {
        if let Some(url) = &fields.banner_url {
            image_store::destroy_image_best_effort(url).await;
        }
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Start date must be before the end date.",
            None,
        ));
    }

    if let Some(banner_url) = &fields.banner_url {
        let (width, height) = (fields.width.unwrap_or(0.0), fields.height.unwrap_or(0.0));
        if !banner_aspect_ok(width, height) {
            return Err(reject_banner(banner_url, "Image must have a 5:1 aspect ratio.").await);
        }
    }

    let title = fields
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(existing.title);
    let products = fields.products.unwrap_or_else(|| existing.products.0.clone());
    let banner_image = fields
        .banner_url
        .clone()
        .unwrap_or_else(|| existing.banner_image.clone());

    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        r#"
        UPDATE flash_deals
        SET title = $1, start_date = $2, end_date = $3, banner_image = $4,
            products = $5, active_products = $6, updated_at = NOW()
        WHERE id = $7
        RETURNING {FLASH_DEAL_COLUMNS}
        "#
    ))
    .bind(&title)
    .bind(start_date)
    .bind(end_date)
    .bind(&banner_image)
    .bind(SqlJson(&products))
    .bind(products.len() as i32)
    .bind(deal_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to update flash deal", e))?;

    // A replaced banner only goes away after the row points at the new one.
    if fields.banner_url.is_some() && existing.banner_image.contains("/upload/") {
        image_store::destroy_image_best_effort(&existing.banner_image).await;
    }

    Ok(ApiResponse::success(StatusCode::OK, "Flash deal updated successfully", deal))
}

#[utoipa::path(
    patch,
    path = "/flash-deals/{deal_id}/publish",
    params(("deal_id" = i32, Path, description = "ID of the flash deal")),
    request_body = PublishUpdate,
    responses(
        (status = 200, description = "Flash Deal status updated", body = FlashDeal),
        (status = 404, description = "Flash Deal not found")
    ),
    tag = "Flash Deals"
)]
pub async fn update_published_status(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
    Json(payload): Json<PublishUpdate>,
) -> Result<ApiResponse<FlashDeal>, ApiResponse<()>> {
    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "UPDATE flash_deals SET is_published = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING {FLASH_DEAL_COLUMNS}"
    ))
    .bind(payload.is_published)
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to update flash deal", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash Deal not found", None))?;

    Ok(ApiResponse::success(StatusCode::OK, "Flash Deal status updated", deal))
}

#[utoipa::path(
    post,
    path = "/flash-deals/{deal_id}/products",
    params(("deal_id" = i32, Path, description = "ID of the flash deal")),
    request_body = FlashDealProducts,
    responses(
        (status = 200, description = "Products added successfully", body = FlashDeal),
        (status = 400, description = "One or more products already in the deal"),
        (status = 404, description = "Flash deal not found")
    ),
    tag = "Flash Deals"
)]
pub async fn add_products_to_flash_deal(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
    Json(payload): Json<FlashDealProducts>,
) -> Result<ApiResponse<FlashDeal>, ApiResponse<()>> {
    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "SELECT {FLASH_DEAL_COLUMNS} FROM flash_deals WHERE id = $1"
    ))
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch flash deal", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash deal not found", None))?;

    let duplicates: Vec<String> = payload
        .product_ids
        .iter()
        .filter(|id| deal.products.0.contains(id))
        .map(|id| id.to_string())
        .collect();

    if !duplicates.is_empty() {
        return Err(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            &format!(
                "Product with ID {} already exists in the flash deal.",
                duplicates.join(", ")
            ),
            None,
        ));
    }

    let mut products = deal.products.0.clone();
    products.extend(payload.product_ids.iter().copied());

    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "UPDATE flash_deals SET products = $1, active_products = $2, updated_at = NOW() \
         WHERE id = $3 RETURNING {FLASH_DEAL_COLUMNS}"
    ))
    .bind(SqlJson(&products))
    .bind(products.len() as i32)
    .bind(deal_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to add products", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Products added successfully", deal))
}

#[utoipa::path(
    delete,
    path = "/flash-deals/{deal_id}/products/{product_id}",
    params(
        ("deal_id" = i32, Path, description = "ID of the flash deal"),
        ("product_id" = i32, Path, description = "ID of the product to remove")
    ),
    responses(
        (status = 200, description = "Product removed successfully", body = FlashDeal),
        (status = 404, description = "Flash deal not found")
    ),
    tag = "Flash Deals"
)]
pub async fn remove_product_from_flash_deal(
    State(db_pool): State<PgPool>,
    Path((deal_id, product_id)): Path<(i32, i32)>,
) -> Result<ApiResponse<FlashDeal>, ApiResponse<()>> {
    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "SELECT {FLASH_DEAL_COLUMNS} FROM flash_deals WHERE id = $1"
    ))
    .bind(deal_id)
    .fetch_optional(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to fetch flash deal", e))?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash deal not found", None))?;

    let products: Vec<i32> = deal
        .products
        .0
        .iter()
        .copied()
        .filter(|id| *id != product_id)
        .collect();

    let deal = sqlx::query_as::<_, FlashDeal>(&format!(
        "UPDATE flash_deals SET products = $1, active_products = $2, updated_at = NOW() \
         WHERE id = $3 RETURNING {FLASH_DEAL_COLUMNS}"
    ))
    .bind(SqlJson(&products))
    .bind(products.len() as i32)
    .bind(deal_id)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| internal_error("Failed to remove product", e))?;

    Ok(ApiResponse::success(StatusCode::OK, "Product removed successfully", deal))
}

#[utoipa::path(
    delete,
    path = "/flash-deals/{deal_id}",
    params(("deal_id" = i32, Path, description = "ID of the flash deal to delete")),
    responses(
        (status = 200, description = "Flash Deal deleted successfully."),
        (status = 404, description = "Flash Deal not found.")
    ),
    tag = "Flash Deals"
)]
pub async fn delete_flash_deal(
    State(db_pool): State<PgPool>,
    Path(deal_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let banner: Option<String> =
        sqlx::query_scalar("DELETE FROM flash_deals WHERE id = $1 RETURNING banner_image")
            .bind(deal_id)
            .fetch_optional(&db_pool)
            .await
            .map_err(|e| internal_error("Failed to delete Flash Deal", e))?;

    let Some(banner) = banner else {
        return Err(ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Flash Deal not found.", None));
    };

    if banner.contains("/upload/") {
        image_store::destroy_image_best_effort(&banner).await;
    }

    Ok(ApiResponse::success(StatusCode::OK, "Flash Deal deleted successfully.", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_flash_deal,
        get_flash_deals,
        get_flash_deal,
        update_flash_deal,
        update_published_status,
        add_products_to_flash_deal,
        remove_product_from_flash_deal,
        delete_flash_deal,
    ),
    components(schemas(FlashDeal, PublishUpdate, FlashDealProducts)),
    tags(
        (name = "Flash Deals", description = "Time-boxed product promotions")
    )
)]
pub struct FlashDealDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_five_to_one_passes() {
        assert!(banner_aspect_ok(1500.0, 300.0));
    }

    #[test]
    fn drift_under_tolerance_passes() {
        assert!(banner_aspect_ok(1495.0, 300.0));
        assert!(banner_aspect_ok(1520.0, 300.0));
    }

    #[test]
    fn drift_past_tolerance_fails() {
        assert!(!banner_aspect_ok(1560.0, 300.0));
        assert!(!banner_aspect_ok(1440.0, 300.0));
        assert!(!banner_aspect_ok(1200.0, 300.0));
    }

    #[test]
    fn degenerate_height_fails() {
        assert!(!banner_aspect_ok(1500.0, 0.0));
    }
}
