use log::{error, info};
use reqwest::Method;
use serde::Serialize;
use url::{Position, Url};

use crate::client::client_error::ClientError;
use crate::client::crawl_result::{CrawlReply, CrawlResult};
use crate::client::crawl_stream::CrawlStream;
use crate::client::run_config::{BrowserConfig, CrawlerRunConfig};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the crawling service's HTTP API.
///
/// The service may be mounted under a URL sub-path; the path component of the
/// base URL is kept as a prefix and prepended to every request path, so a
/// base of `https://host/sub/path` sends its health probe to
/// `https://host/sub/path/health`.
///
/// One client per crawl session. [`CrawlClient::authenticate`] must be called
/// before crawl or schema requests, otherwise they go out unauthenticated.
#[derive(Debug)]
pub struct CrawlClient {
    http: reqwest::Client,
    root: String,
    path_prefix: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CrawlRequest<'a> {
    urls: &'a [String],
    browser_config: &'a BrowserConfig,
    crawler_config: &'a CrawlerRunConfig,
}

impl CrawlClient {
    /// Creates a client for the given base URL and probes the service's
    /// health endpoint. A failed probe is fatal for the session; no retries.
    pub async fn connect(base_url: &str) -> Result<Self, ClientError> {
        let client = Self::new(base_url)?;
        client.check_server().await?;
        Ok(client)
    }

    fn new(base_url: &str) -> Result<Self, ClientError> {
        let (root, path_prefix) = split_base_url(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            root,
            path_prefix,
            api_key: None,
        })
    }

    async fn check_server(&self) -> Result<(), ClientError> {
        let probe = self
            .http
            .get(self.endpoint_url("/health"))
            .send()
            .await
            .and_then(|response| response.error_for_status());
        if let Err(e) = probe {
            error!("Server unreachable: {}", e);
            return Err(ClientError::Unreachable(e.to_string()));
        }
        info!("Connected to {}{}", self.root, self.path_prefix);
        Ok(())
    }

    /// Stores the API key sent as the `x-api-key` header on every subsequent
    /// request. No network call; a bad key only shows up when later requests
    /// run. Calling this again overwrites the key.
    pub fn authenticate(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_owned());
    }

    /// Submits a crawl and waits for the whole result batch.
    pub async fn crawl(
        &self,
        urls: &[String],
        browser_config: &BrowserConfig,
        crawler_config: &CrawlerRunConfig,
    ) -> Result<Vec<CrawlResult>, ClientError> {
        let body = CrawlRequest {
            urls,
            browser_config,
            crawler_config,
        };
        let response = self.request(Method::POST, "/crawl").json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::HttpError(response.status().as_u16()));
        }
        let reply: CrawlReply = response.json().await?;
        if !reply.success {
            return Err(ClientError::ServerError(
                reply.detail.unwrap_or_else(|| "crawl failed".to_owned()),
            ));
        }
        Ok(reply.results)
    }

    /// Submits a crawl whose results are delivered incrementally as each
    /// target completes.
    pub async fn crawl_stream(
        &self,
        urls: &[String],
        browser_config: &BrowserConfig,
        crawler_config: &CrawlerRunConfig,
    ) -> Result<CrawlStream, ClientError> {
        let body = CrawlRequest {
            urls,
            browser_config,
            crawler_config,
        };
        let response = self
            .request(Method::POST, "/crawl/stream")
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::HttpError(response.status().as_u16()));
        }
        Ok(CrawlStream::new(response))
    }

    /// Fetches the service's configuration schema.
    pub async fn schema(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.request(Method::GET, "/schema").send().await?;
        if !response.status().is_success() {
            return Err(ClientError::HttpError(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.endpoint_url(endpoint));
        if let Some(api_key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        builder
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.root, self.path_prefix, endpoint)
    }
}

/// Splits a base URL into its origin and path prefix, so that request paths
/// can be rebuilt as `origin + prefix + endpoint`.
fn split_base_url(base_url: &str) -> Result<(String, String), ClientError> {
    let url = Url::parse(base_url)?;
    let root = url[..Position::BeforePath].to_owned();
    let path_prefix = url.path().trim_end_matches('/').to_owned();
    Ok((root, path_prefix))
}
