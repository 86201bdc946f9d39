use serde::Serialize;
use serde_json::{Map, Value};

/// Browser settings sent with a crawl submission. Recomputed per call from a
/// [`BotPolicy`](crate::policy::BotPolicy); fields are public so the caller
/// can layer overrides on top before submitting.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub user_agent: String,
    pub browser_mode: String,
    pub use_managed_browser: bool,
    pub user_agent_mode: String,
    pub user_agent_generator_config: Map<String, Value>,
    pub extra_args: Vec<String>,
    pub enable_stealth: bool,
}

/// Per-request settings controlling how a specific crawl executes.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlerRunConfig {
    pub check_robots_txt: bool,
    pub exclude_domains: Vec<String>,
    pub geolocation: Option<String>,
    pub timezone_id: Option<String>,
    pub locale: Option<String>,
    pub simulate_user: bool,
    pub semaphore_count: usize,
    pub user_agent: String,
    pub user_agent_mode: String,
    pub user_agent_generator_config: Map<String, Value>,
    pub stream: bool,
    pub cache_mode: CacheMode,
}

impl CrawlerRunConfig {
    /// Requests incremental result delivery.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }
}

/// Cache behavior the service applies to a crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    #[default]
    Enabled,
    Disabled,
    ReadOnly,
    WriteOnly,
    Bypass,
}
