use axum::{Extension, Router};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod config;
mod db;
mod utils;

use crate::config::Config;
use crate::db::queries::brand::BrandDoc;
use crate::db::queries::category::CategoryDoc;
use crate::db::queries::coupon::CouponDoc;
use crate::db::queries::customer::CustomerDoc;
use crate::db::queries::deal_of_the_day::DealOfTheDayDoc;
use crate::db::queries::device_token::DeviceTokenDoc;
use crate::db::queries::flash_deal::FlashDealDoc;
use crate::db::queries::notification::NotificationDoc;
use crate::db::queries::order::OrderDoc;
use crate::db::queries::product::ProductDoc;
use crate::db::queries::refund::RefundDoc;
use crate::db::queries::seller::SellerDoc;
use crate::db::queries::withdrawal_method::WithdrawalMethodDoc;
use crate::utils::push;

#[tokio::main]
async fn main() {
    dotenv().ok();
    Config::init();

    tracing_subscriber::fmt().with_target(true).init();

    let pool = db::pool::get_db_pool().await;

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let token_cache = push::create_token_cache();

    let merged_doc = ProductDoc::openapi()
        .merge_from(CategoryDoc::openapi())
        .merge_from(BrandDoc::openapi())
        .merge_from(SellerDoc::openapi())
        .merge_from(CustomerDoc::openapi())
        .merge_from(OrderDoc::openapi())
        .merge_from(RefundDoc::openapi())
        .merge_from(CouponDoc::openapi())
        .merge_from(FlashDealDoc::openapi())
        .merge_from(DealOfTheDayDoc::openapi())
        .merge_from(NotificationDoc::openapi())
        .merge_from(DeviceTokenDoc::openapi())
        .merge_from(WithdrawalMethodDoc::openapi());

    let app = Router::new()
        .merge(api::health::health_routes())
        .merge(api::product::product_routes())
        .merge(api::category::category_routes())
        .merge(api::brand::brand_routes())
        .merge(api::seller::seller_routes())
        .merge(api::customer::customer_routes())
        .merge(api::order::order_routes())
        .merge(api::refund::refund_routes())
        .merge(api::coupon::coupon_routes())
        .merge(api::flash_deal::flash_deal_routes())
        .merge(api::deal_of_the_day::deal_of_the_day_routes())
        .merge(api::notification::notification_routes())
        .merge(api::device_token::device_token_routes())
        .merge(api::withdrawal_method::withdrawal_method_routes())
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(token_cache))
        .with_state(pool.clone());

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let is_running = Arc::new(AtomicBool::new(true));

    run_server(app, shutdown_tx, pool, is_running).await;
    tracing::info!("Shutdown complete.");
}

async fn shutdown_signal(
    mut shutdown_rx: broadcast::Receiver<()>,
    pool: PgPool,
    is_running: Arc<AtomicBool>,
) {
    tokio::select! {
        _ = signal::ctrl_c() => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = shutdown_rx.recv() => tracing::info!("Received shutdown signal."),
    }
    tracing::info!("Closing database pool...");
    pool.close().await;
    tracing::info!("Database pool closed. Server shutting down.");
    is_running.store(false, Ordering::Relaxed);
}

async fn run_server(
    app: Router,
    shutdown_tx: broadcast::Sender<()>,
    pool: PgPool,
    is_running: Arc<AtomicBool>,
) {
    let config = Config::get();
    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(&addr).await.expect("Failed to bind listener");

    let shutdown_signal = shutdown_signal(shutdown_tx.subscribe(), pool.clone(), is_running.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .expect("Server encountered an error");
}
