use std::sync::OnceLock;

use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;

use crate::config::Config;

/// Errors from the external image-store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Failed to write uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL does not reference a stored image: {0}")]
    InvalidUrl(String),
}

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn client() -> &'static reqwest::Client {
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Persist an uploaded image under the configured upload directory and
/// return the `/upload/...` URL stored on the owning record.
pub async fn save_image(original_name: &str, data: Bytes) -> Result<String, ImageStoreError> {
    let config = Config::get();
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize(original_name));
    let path = config.upload_dir.join(&stored_name);
    tokio::fs::write(&path, &data).await?;

    Ok(format!("/upload/{stored_name}"))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Derive the external store's public id from a stored URL.
///
/// The id is everything after `/upload/`, minus a leading `v<digits>`
/// version segment and the file extension.
pub fn derive_public_id(url: &str) -> Option<String> {
    let rest = url.split("/upload/").nth(1)?;
    if rest.is_empty() {
        return None;
    }

    let mut segments: Vec<&str> = rest.split('/').collect();
    if segments.len() > 1 {
        let first = segments[0];
        if first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit())
        {
            segments.remove(0);
        }
    }

    let last = segments.pop()?;
    let stem = match last.rfind('.') {
        Some(idx) if idx > 0 => &last[..idx],
        _ => last,
    };
    segments.push(stem);

    Some(segments.join("/"))
}

/// Ask the external store to remove an image. Callers treat failures as
/// non-fatal: the owning record is deleted either way.
pub async fn destroy_image(url: &str) -> Result<(), ImageStoreError> {
    let public_id =
        derive_public_id(url).ok_or_else(|| ImageStoreError::InvalidUrl(url.to_string()))?;

    let config = Config::get();
    let endpoint = format!(
        "{}/{}/image/destroy",
        config.image_store_url, config.image_store_cloud
    );

    client()
        .post(&endpoint)
        .json(&json!({ "public_id": public_id }))
        .send()
        .await?
        .error_for_status()?;

    tracing::info!(public_id, "deleted image from external store");
    Ok(())
}

/// Best-effort removal used by delete/replace paths. Logs and swallows
/// every failure.
pub async fn destroy_image_best_effort(url: &str) {
    if let Err(e) = destroy_image(url).await {
        tracing::warn!(url, error = %e, "failed to delete image from external store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_drops_version_and_extension() {
        let url = "https://img.example.com/demo/image/upload/v1712345678/categories/fruit.png";
        assert_eq!(derive_public_id(url).as_deref(), Some("categories/fruit"));
    }

    #[test]
    fn public_id_without_version_segment() {
        let url = "https://img.example.com/demo/image/upload/brands/acme.jpg";
        assert_eq!(derive_public_id(url).as_deref(), Some("brands/acme"));
    }

    #[test]
    fn public_id_single_segment() {
        assert_eq!(
            derive_public_id("/upload/logo.webp").as_deref(),
            Some("logo")
        );
    }

    #[test]
    fn malformed_url_yields_none() {
        assert!(derive_public_id("https://img.example.com/logo.png").is_none());
        assert!(derive_public_id("/upload/").is_none());
    }
}
