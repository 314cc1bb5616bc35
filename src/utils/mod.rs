#[path = "ApiResponse.rs"]
pub mod api_response;
pub mod export;
pub mod ids;
pub mod image_store;
pub mod push;
