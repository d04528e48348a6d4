use crate::error::{ConsoleError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catalogctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("Making GET request");
        let response = self.client.get(url).send().await?;
        ensure_success(response, "GET").await
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POSTs `body` and returns the raw response text; callers decide whether
    /// it holds a full row or just an acknowledgement.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<String> {
        debug!("Making POST request");
        let response = self.client.post(url).json(body).send().await?;
        let response = ensure_success(response, "POST").await?;
        Ok(response.text().await?)
    }

    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<String> {
        debug!("Making PUT request");
        let response = self.client.put(url).json(body).send().await?;
        let response = ensure_success(response, "PUT").await?;
        Ok(response.text().await?)
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn delete(&self, url: &str) -> Result<()> {
        debug!("Making DELETE request");
        let response = self.client.delete(url).send().await?;
        ensure_success(response, "DELETE").await?;
        Ok(())
    }

    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

/// Passes successful responses through and turns everything else into
/// `ConsoleError::Status`, keeping the server's own message when it sent one.
pub async fn ensure_success(response: Response, verb: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    error!("HTTP {} failed with status: {}", verb, status);
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, url, &body))
}

pub fn status_error(status: StatusCode, url: String, body: &str) -> ConsoleError {
    ConsoleError::Status {
        status,
        url,
        message: server_message(body),
    }
}

/// Pulls `error`, `message` or `status_message` out of a JSON error body.
pub fn server_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error", "message", "status_message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| "no details".to_string())
}
