//! Backend REST client
//!
//! Read-only access to the bond index. Every response is unwrapped from the
//! `{ success, data, message, error }` envelope.

use bluelink_core::{ApiResponse, BondError, BondOffering, BondToken, Result};
use crate::config::ApiConfig;
use serde::de::DeserializeOwned;

/// Backend index client
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    page_limit: u32,
}

impl BackendClient {
    /// Create a client from API settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BondError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| BondError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BondError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .map_err(|e| BondError::ConnectionFailed(e.to_string()))?;

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if !status.is_success() => Err(BondError::Api(format!("HTTP {}", status))),
            Err(e) => Err(e.into()),
        }
    }

    /// Backend liveness
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get("/health", &[]).await
    }

    /// All indexed offerings
    pub async fn bonds(&self) -> Result<Vec<BondOffering>> {
        self.get("/bonds", &[]).await
    }

    /// One offering by backend id
    pub async fn bond(&self, id: u64) -> Result<BondOffering> {
        self.get(&format!("/bonds/{}", id), &[]).await
    }

    /// Offerings created by `issuer`
    pub async fn bonds_by_issuer(&self, issuer: &str) -> Result<Vec<BondOffering>> {
        self.get(&format!("/bonds/issuer/{}", issuer), &[]).await
    }

    /// Every token held by `owner`, following pagination
    pub async fn tokens_by_owner(&self, owner: &str) -> Result<Vec<BondToken>> {
        self.paged("/bond-tokens/owner", ("owner", owner)).await
    }

    /// Every token sold by a project
    pub async fn tokens_by_project(&self, project_id: &str) -> Result<Vec<BondToken>> {
        self.paged("/bond-tokens/project", ("project_id", project_id)).await
    }

    async fn paged(&self, path: &str, key: (&str, &str)) -> Result<Vec<BondToken>> {
        let mut tokens = Vec::new();
        let mut offset = 0u64;

        loop {
            let query = [
                (key.0, key.1.to_string()),
                ("limit", self.page_limit.to_string()),
                ("offset", offset.to_string()),
            ];
            let page: Vec<BondToken> = self.get(path, &query).await?;
            let fetched = page.len();
            tokens.extend(page);

            if is_last_page(fetched, self.page_limit) {
                break;
            }
            offset += fetched as u64;
        }

        tracing::debug!(path, count = tokens.len(), "tokens fetched");
        Ok(tokens)
    }
}

fn is_last_page(fetched: usize, limit: u32) -> bool {
    fetched < limit as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/api/v1/".into(),
            ..Default::default()
        };
        let client = BackendClient::new(&config).unwrap();

        assert_eq!(client.url("/bonds"), "http://localhost:8080/api/v1/bonds");
        assert_eq!(client.url("health"), "http://localhost:8080/api/v1/health");
    }

    #[test]
    fn test_page_limit_floor() {
        let config = ApiConfig {
            page_limit: 0,
            ..Default::default()
        };
        assert_eq!(BackendClient::new(&config).unwrap().page_limit, 1);
    }

    #[test]
    fn test_last_page() {
        assert!(is_last_page(0, 50));
        assert!(is_last_page(49, 50));
        assert!(!is_last_page(50, 50));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_recoverable() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/api/v1".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = BackendClient::new(&config).unwrap();

        let err = client.bonds().await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
