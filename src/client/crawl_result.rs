use serde::Deserialize;

/// One crawled page as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub success: bool,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Envelope of a non-streaming crawl response.
#[derive(Debug, Deserialize)]
pub(crate) struct CrawlReply {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<CrawlResult>,
    #[serde(default)]
    pub detail: Option<String>,
}
