use localagent_types::{
    CacheConfig, CacheStats, CrawlJob, CrawlRequest, HttpRequestConfig, JobAccepted, ProxyConfig,
    RequestJob,
};
use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct NetworkService {
    client: ApiClient,
}

impl NetworkService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn request_path(id: &str) -> String {
        format!("/network/requests/{}", id.trim())
    }

    #[must_use]
    pub fn crawl_path(id: &str) -> String {
        format!("/network/crawls/{}", id.trim())
    }

    /// Hands the request to the backend proxy; acknowledged with the
    /// request id and an initial `pending` status.
    pub async fn send_request(&self, config: &HttpRequestConfig) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/network/requests", config).await
    }

    pub async fn request_result(&self, id: &str) -> Result<RequestJob, ApiError> {
        self.client.get_json(Self::request_path(id).as_str()).await
    }

    pub async fn cancel_request(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::request_path(id)).as_str())
            .await
    }

    pub async fn start_crawl(&self, request: &CrawlRequest) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/network/crawls", request).await
    }

    pub async fn crawl_result(&self, id: &str) -> Result<CrawlJob, ApiError> {
        self.client.get_json(Self::crawl_path(id).as_str()).await
    }

    pub async fn cancel_crawl(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::crawl_path(id)).as_str())
            .await
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, ApiError> {
        self.client.get_json("/network/cache/stats").await
    }

    pub async fn cache_config(&self) -> Result<CacheConfig, ApiError> {
        self.client.get_json("/network/cache/config").await
    }

    pub async fn set_cache_config(&self, config: &CacheConfig) -> Result<CacheConfig, ApiError> {
        self.client.put_json("/network/cache/config", config).await
    }

    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        self.client.post_empty("/network/cache/clear").await
    }

    pub async fn proxies(&self) -> Result<Vec<ProxyConfig>, ApiError> {
        self.client.get_json("/network/proxies").await
    }

    pub async fn test_proxy(&self, proxy: &ProxyConfig) -> Result<serde_json::Value, ApiError> {
        self.client.post_json("/network/proxies/test", proxy).await
    }

    pub async fn stats(&self) -> Result<serde_json::Value, ApiError> {
        self.client.get_json("/network/stats").await
    }

    pub async fn error_logs(&self, limit: Option<u32>) -> Result<Vec<serde_json::Value>, ApiError> {
        let path = match limit {
            Some(limit) => format!("/network/errors?limit={limit}"),
            None => "/network/errors".to_string(),
        };
        self.client.get_json(path.as_str()).await
    }

    pub async fn clear_error_logs(&self) -> Result<(), ApiError> {
        self.client.delete("/network/errors").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(NetworkService::request_path(" r1 "), "/network/requests/r1");
        assert_eq!(NetworkService::crawl_path("c1"), "/network/crawls/c1");
    }
}
