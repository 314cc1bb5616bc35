use crate::db::queries::flash_deal::{
    add_products_to_flash_deal, create_flash_deal, delete_flash_deal, get_flash_deal,
    get_flash_deals, remove_product_from_flash_deal, update_flash_deal, update_published_status,
};

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;

pub fn flash_deal_routes() -> Router<PgPool> {
    Router::new()
        .route("/flash-deals", post(create_flash_deal).get(get_flash_deals))
        .route(
            "/flash-deals/{deal_id}",
            get(get_flash_deal).patch(update_flash_deal).delete(delete_flash_deal),
        )
        .route("/flash-deals/{deal_id}/publish", patch(update_published_status))
        .route("/flash-deals/{deal_id}/products", post(add_products_to_flash_deal))
        .route(
            "/flash-deals/{deal_id}/products/{product_id}",
            delete(remove_product_from_flash_deal),
        )
}
