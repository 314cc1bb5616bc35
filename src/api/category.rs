use crate::db::queries::category::{
    bulk_import_categories, create_category, create_sub_category, create_sub_sub_category,
    delete_category, delete_sub_category, delete_sub_sub_category, export_categories,
    export_sub_categories, get_categories, get_category, get_sub_categories,
    get_sub_categories_by_category, get_sub_sub_categories, update_category,
    update_category_status, update_sub_category, update_sub_category_status,
    update_sub_sub_category, update_sub_sub_category_status,
};

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

/// All three taxonomy levels share one route table.
pub fn category_routes() -> Router<PgPool> {
    Router::new()
        .route("/categories", post(create_category).get(get_categories))
        .route("/categories/export", get(export_categories))
        .route("/categories/import", post(bulk_import_categories))
        .route(
            "/categories/{category_id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/categories/{category_id}/status", patch(update_category_status))
        .route("/sub-categories", post(create_sub_category).get(get_sub_categories))
        .route("/sub-categories/by-category", get(get_sub_categories_by_category))
        .route("/sub-categories/export", get(export_sub_categories))
        .route(
            "/sub-categories/{sub_category_id}",
            patch(update_sub_category).delete(delete_sub_category),
        )
        .route(
            "/sub-categories/{sub_category_id}/status",
            patch(update_sub_category_status),
        )
        .route(
            "/sub-sub-categories",
            post(create_sub_sub_category).get(get_sub_sub_categories),
        )
        .route(
            "/sub-sub-categories/{sub_sub_category_id}",
            patch(update_sub_sub_category).delete(delete_sub_sub_category),
        )
        .route(
            "/sub-sub-categories/{sub_sub_category_id}/status",
            patch(update_sub_sub_category_status),
        )
}
