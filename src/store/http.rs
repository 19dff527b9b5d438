//! HTTP-backed profile store client.
//!
//! Wire contract:
//! - `GET  {base}/api/config/{phone}` → 200 profile JSON, 404 `null` when missing
//! - `POST {base}/api/config` body `{phone, config}` → 200
//! - `GET  {base}/api/onboarding` → 200 `[{question, placeholder, key}, ...]`

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::StoreError;
use crate::store::model::{OnboardingStep, Profile};
use crate::store::traits::ProfileStore;

/// Profile store reachable over HTTP, backed by flat JSON documents.
pub struct HttpProfileStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProfileStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn config_url(&self, phone: &str) -> String {
        format!("{}/api/config/{phone}", self.base_url)
    }

    fn save_url(&self) -> String {
        format!("{}/api/config", self.base_url)
    }

    fn onboarding_url(&self) -> String {
        format!("{}/api/onboarding", self.base_url)
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn fetch_profile(&self, phone: &str) -> Result<Option<Profile>, StoreError> {
        let url = self.config_url(phone);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                // The server answers 404 with a `null` body; tolerate the same
                // shape on a 200 from older deployments.
                let value: serde_json::Value = response.json().await?;
                if value.is_null() {
                    return Ok(None);
                }
                let profile: Profile = serde_json::from_value(value)?;
                Ok(Some(profile))
            }
            status => Err(StoreError::Status {
                endpoint: url,
                status: status.as_u16(),
            }),
        }
    }

    async fn save_profile(
        &self,
        phone: &str,
        config: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let url = self.save_url();
        let body = serde_json::json!({
            "phone": phone,
            "config": config,
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: url,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn fetch_onboarding_steps(&self) -> Result<Vec<OnboardingStep>, StoreError> {
        let url = self.onboarding_url();
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Status {
                endpoint: url,
                status: response.status().as_u16(),
            });
        }

        let steps: Vec<OnboardingStep> = response.json().await?;
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_base() {
        let store = HttpProfileStore::new("http://localhost:3000");
        assert_eq!(
            store.config_url("972500000000@c.us"),
            "http://localhost:3000/api/config/972500000000@c.us"
        );
        assert_eq!(store.save_url(), "http://localhost:3000/api/config");
        assert_eq!(
            store.onboarding_url(),
            "http://localhost:3000/api/onboarding"
        );
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let store = HttpProfileStore::new("http://localhost:3000/");
        assert_eq!(store.save_url(), "http://localhost:3000/api/config");
    }

    #[tokio::test]
    async fn fetch_profile_network_error_is_http_variant() {
        // Port 9 (discard) refuses connections; no server in tests.
        let store = HttpProfileStore::new("http://127.0.0.1:9");
        let err = store.fetch_profile("123").await.unwrap_err();
        assert!(matches!(err, StoreError::Http(_)));
    }
}
