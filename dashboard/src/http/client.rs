//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::DashboardError;

/// HTTP client for the deployer backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    /// Client without a total request timeout, used for the log stream
    stream_client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let client = Client::builder().timeout(timeout).build()?;
        let stream_client = Client::builder().connect_timeout(timeout).build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "backend URL cannot be a base: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            stream_client,
            base_url,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Result<Url, DashboardError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DashboardError::Config(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolve a possibly relative asset reference against the base URL
    pub fn absolute(&self, reference: &str) -> Result<Url, DashboardError> {
        Ok(self.base_url.join(reference)?)
    }

    async fn check(response: Response) -> Result<Response, DashboardError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        error!("HTTP request to {} failed: {} - {}", url, status, body);
        Err(DashboardError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DashboardError> {
        let url = response.url().clone();
        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            &b"null"[..]
        } else {
            &bytes[..]
        };
        serde_json::from_slice(body)
            .map_err(|e| DashboardError::Malformed(format!("{}: {}", url.path(), e)))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, DashboardError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// Make a GET request and return the body as text
    pub async fn get_text(&self, url: Url) -> Result<String, DashboardError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.text().await?)
    }

    /// Make a GET request and hand back the response for streaming the body
    pub async fn get_raw(&self, url: Url) -> Result<Response, DashboardError> {
        debug!("GET {} (raw)", url);
        let response = self.stream_client.get(url).send().await?;
        Self::check(response).await
    }

    /// Open a server-sent events stream
    pub async fn get_event_stream(&self, url: Url) -> Result<Response, DashboardError> {
        debug!("GET {} (event stream)", url);
        let response = self
            .stream_client
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        Self::check(response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, DashboardError> {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, DashboardError> {
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, DashboardError> {
        debug!("PUT {}", url);
        let response = self.client.put(url).json(body).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, DashboardError> {
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::decode(Self::check(response).await?).await
    }
}
