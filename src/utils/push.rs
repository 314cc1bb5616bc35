use std::sync::OnceLock;
use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};

use crate::config::Config;

/// Result type for push operations
pub type PushResult<T> = Result<T, PushError>;

/// Errors that can occur while dispatching push messages
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Push provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("No recipient tokens to send to")]
    NoRecipients,
}

/// Success/failure counts reported by the push provider for one fan-out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PushOutcome {
    #[serde(alias = "success")]
    pub success_count: i32,
    #[serde(alias = "failure")]
    pub failure_count: i32,
}

/// Cached copy of the registered device-token list. Advisory only; the
/// dispatcher re-reads the table when the entry has expired.
pub type DeviceTokenCache = Cache<&'static str, Vec<String>>;

const TOKEN_CACHE_KEY: &str = "device_tokens";

pub fn create_token_cache() -> DeviceTokenCache {
    Cache::builder()
        .max_capacity(4)
        .time_to_live(Duration::from_secs(60))
        .build()
}

/// All registered device tokens, served from the cache when fresh.
pub async fn stored_tokens(
    pool: &PgPool,
    cache: &DeviceTokenCache,
) -> PushResult<Vec<String>> {
    if let Some(tokens) = cache.get(TOKEN_CACHE_KEY) {
        return Ok(tokens);
    }

    let rows = sqlx::query("SELECT token FROM device_tokens")
        .fetch_all(pool)
        .await?;
    let tokens: Vec<String> = rows.iter().map(|r| r.get("token")).collect();

    cache.insert(TOKEN_CACHE_KEY, tokens.clone());
    Ok(tokens)
}

/// Drop the cached token list after a registration writes a new token.
pub fn invalidate_tokens(cache: &DeviceTokenCache) {
    cache.invalidate(TOKEN_CACHE_KEY);
}

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn client() -> &'static reqwest::Client {
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Fan a message out to the given tokens through the external provider and
/// return its reported counts.
pub async fn send_to_tokens(
    tokens: &[String],
    title: &str,
    description: &str,
    image_url: Option<&str>,
) -> PushResult<PushOutcome> {
    if tokens.is_empty() {
        return Err(PushError::NoRecipients);
    }

    let config = Config::get();
    let payload = json!({
        "registration_ids": tokens,
        "notification": {
            "title": title,
            "body": description,
        },
        "data": {
            "image_url": image_url,
        },
    });

    let outcome = client()
        .post(&config.push_endpoint)
        .header("Authorization", format!("key={}", config.push_server_key))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json::<PushOutcome>()
        .await?;

    tracing::info!(
        success = outcome.success_count,
        failure = outcome.failure_count,
        "push fan-out finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accepts_provider_field_names() {
        let outcome: PushOutcome =
            serde_json::from_str(r#"{"success": 3, "failure": 1}"#).unwrap();
        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.failure_count, 1);
    }

    #[test]
    fn empty_token_list_is_rejected() {
        let err = tokio_test::block_on(send_to_tokens(&[], "t", "d", None)).unwrap_err();
        assert!(matches!(err, PushError::NoRecipients));
    }
}
