//! Proxied HTTP requests and crawls, each behind its own tracker, plus
//! cache bookkeeping.

use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, NetworkService};
use localagent_types::{CacheConfig, CacheStats, CrawlJob, CrawlRequest, HttpRequestConfig, RequestJob};
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct RequestDriver {
    service: NetworkService,
}

#[async_trait]
impl JobDriver for RequestDriver {
    type Request = HttpRequestConfig;
    type Record = RequestJob;

    async fn start(&self, request: &HttpRequestConfig) -> Result<String, ApiError> {
        self.service
            .send_request(request)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<RequestJob, ApiError> {
        self.service.request_result(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_request(id).await
    }
}

pub struct CrawlDriver {
    service: NetworkService,
}

#[async_trait]
impl JobDriver for CrawlDriver {
    type Request = CrawlRequest;
    type Record = CrawlJob;

    async fn start(&self, request: &CrawlRequest) -> Result<String, ApiError> {
        self.service
            .start_crawl(request)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<CrawlJob, ApiError> {
        self.service.crawl_result(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_crawl(id).await
    }
}

pub struct NetworkContainer {
    service: NetworkService,
    requests: JobTracker<RequestDriver>,
    crawls: JobTracker<CrawlDriver>,
    cache_stats: RwLock<Option<CacheStats>>,
}

impl NetworkContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = NetworkService::new(client);
        let requests = JobTracker::new(
            RequestDriver {
                service: service.clone(),
            },
            config.clone(),
        );
        let crawls = JobTracker::new(
            CrawlDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            requests,
            crawls,
            cache_stats: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn requests(&self) -> &JobTracker<RequestDriver> {
        &self.requests
    }

    #[must_use]
    pub fn crawls(&self) -> &JobTracker<CrawlDriver> {
        &self.crawls
    }

    pub async fn send_request(&self, config: &HttpRequestConfig) -> Result<String, StateError> {
        self.requests.submit(config).await
    }

    pub async fn cancel_request(&self, id: &str) -> Result<(), StateError> {
        self.requests.cancel(id).await
    }

    pub async fn start_crawl(&self, request: &CrawlRequest) -> Result<String, StateError> {
        self.crawls.submit(request).await
    }

    pub async fn cancel_crawl(&self, id: &str) -> Result<(), StateError> {
        self.crawls.cancel(id).await
    }

    pub async fn refresh_cache_stats(&self) -> Result<CacheStats, StateError> {
        let stats = self
            .service
            .cache_stats()
            .await
            .map_err(StateError::action)?;
        *self.cache_stats.write().await = Some(stats.clone());
        Ok(stats)
    }

    pub async fn cache_stats(&self) -> Option<CacheStats> {
        self.cache_stats.read().await.clone()
    }

    pub async fn set_cache_config(&self, config: &CacheConfig) -> Result<CacheConfig, StateError> {
        self.service
            .set_cache_config(config)
            .await
            .map_err(StateError::action)
    }

    pub async fn clear_cache(&self) -> Result<(), StateError> {
        self.service.clear_cache().await.map_err(StateError::action)?;
        *self.cache_stats.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::JobRecord;
    use localagent_client::ApiClientConfig;
    use localagent_types::JobStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn request_polls_to_completion() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/api/network/requests")
            .with_status(200)
            .with_body(r#"{"requestId": "r1", "status": "pending"}"#)
            .create_async()
            .await;
        let _result = server
            .mock("GET", "/api/network/requests/r1")
            .with_status(200)
            .with_body(
                r#"{
                    "id": "r1", "status": "completed",
                    "response": {
                        "status": 200, "statusText": "OK",
                        "timing": {"startTime": 1, "endTime": 5, "duration": 4}
                    },
                    "createdAt": "2026-01-01T00:00:00Z",
                    "updatedAt": "2026-01-01T00:00:01Z"
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = NetworkContainer::new(
            client,
            JobTrackerConfig {
                poll_interval: Duration::from_millis(10),
                ..JobTrackerConfig::default()
            },
        );

        let config = HttpRequestConfig {
            url: "https://example.com".to_string(),
            method: "GET".to_string(),
            headers: None,
            params: None,
            data: None,
            timeout: None,
            proxy: None,
            max_redirects: None,
            retry: None,
        };
        let id = container.send_request(&config).await.expect("submit");
        assert_eq!(id, "r1");

        let placeholder = container.requests().job("r1").await.expect("placeholder");
        assert_eq!(placeholder.status(), JobStatus::Pending);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let job = container.requests().job("r1").await.expect("tracked");
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.response.as_ref().map(|r| r.status), Some(200));
    }

    #[tokio::test]
    async fn cache_stats_snapshot_refreshes_and_clears() {
        let mut server = mockito::Server::new_async().await;
        let _stats = server
            .mock("GET", "/api/network/cache/stats")
            .with_status(200)
            .with_body(r#"{"hits": 7, "misses": 3, "size": 1024, "entries": 4}"#)
            .create_async()
            .await;
        let _clear = server
            .mock("POST", "/api/network/cache/clear")
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = NetworkContainer::new(client, JobTrackerConfig::default());

        let stats = container.refresh_cache_stats().await.expect("refresh");
        assert_eq!(stats.hits, 7);
        assert!(container.cache_stats().await.is_some());

        container.clear_cache().await.expect("clear");
        assert!(container.cache_stats().await.is_none());
    }
}
