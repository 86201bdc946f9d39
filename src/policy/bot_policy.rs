use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::client::{BrowserConfig, CrawlerRunConfig};
use crate::policy::policy_error::PolicyError;

pub const API_URL_VAR: &str = "CRAWLGATE_API_URL";
pub const API_KEY_VAR: &str = "CRAWLGATE_API_KEY";
pub const DENYLIST_PATH_VAR: &str = "CRAWLGATE_DENYLIST_PATH";

/// Upper bound on the number of concurrent page fetches the remote engine
/// may be asked for.
pub const MAX_SEMAPHORE_COUNT: usize = 50;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible) CrawlgateBot (+https://github.com/crawlgate/crawlgate)";

/// Crawl-behavior policy applied to every request sent to the crawling
/// service: bot identification, robots.txt compliance, the operator denylist
/// and a bounded fetch concurrency.
///
/// Built once per run from environment variables and defaults, then never
/// mutated. Validation is deferred to the accessors so that a policy can be
/// constructed and partially inspected even when some settings are absent;
/// only the accessor that actually needs a missing setting fails.
#[derive(Debug, Clone)]
pub struct BotPolicy {
    base_url: Option<String>,
    api_key: Option<String>,
    denylist_path: Option<String>,

    user_agent: String,
    headless: bool,
    browser_mode: String,
    use_managed_browser: bool,
    user_agent_mode: String,
    user_agent_generator_config: Map<String, Value>,
    extra_args: Vec<String>,
    enable_stealth: bool,
    check_robots_txt: bool,
    semaphore_count: usize,
}

impl BotPolicy {
    /// Reads `CRAWLGATE_API_URL`, `CRAWLGATE_API_KEY` and
    /// `CRAWLGATE_DENYLIST_PATH` from the process environment.
    pub fn from_env() -> Self {
        Self::load(|name| std::env::var(name).ok())
    }

    /// Builds a policy from the given environment accessor. No file I/O
    /// happens here; the denylist is only read when requested.
    pub fn load<E>(env: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: env(API_URL_VAR),
            api_key: env(API_KEY_VAR),
            denylist_path: env(DENYLIST_PATH_VAR),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headless: true,
            browser_mode: "dedicated".to_owned(),
            use_managed_browser: false,
            user_agent_mode: String::new(),
            user_agent_generator_config: Map::new(),
            extra_args: Vec::new(),
            enable_stealth: false,
            check_robots_txt: true,
            semaphore_count: MAX_SEMAPHORE_COUNT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_denylist_path(mut self, denylist_path: impl Into<String>) -> Self {
        self.denylist_path = Some(denylist_path.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Values above [`MAX_SEMAPHORE_COUNT`] are rejected when the crawl-run
    /// configuration is built.
    pub fn with_semaphore_count(mut self, semaphore_count: usize) -> Self {
        self.semaphore_count = semaphore_count;
        self
    }

    pub fn base_url(&self) -> Result<&str, PolicyError> {
        self.base_url
            .as_deref()
            .ok_or(PolicyError::MissingSetting(API_URL_VAR))
    }

    pub fn api_key(&self) -> Result<&str, PolicyError> {
        self.api_key
            .as_deref()
            .ok_or(PolicyError::MissingSetting(API_KEY_VAR))
    }

    /// Domains the crawler must not fetch, one per line in the denylist file.
    /// Lines are trimmed but otherwise passed through verbatim; blank lines
    /// become empty strings. The file is re-read on every call so an updated
    /// denylist is picked up without restarting.
    pub fn exclude_domains(&self) -> Result<Vec<String>, PolicyError> {
        let path = self
            .denylist_path
            .as_deref()
            .ok_or(PolicyError::MissingDenylistPath)?;
        let path = Path::new(path);
        if !path.exists() {
            return Err(PolicyError::DenylistNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(content.lines().map(|line| line.trim().to_owned()).collect())
    }

    /// Browser settings projected from this policy. The returned record is
    /// owned by the caller, which may adjust individual fields before
    /// submitting it.
    pub fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            headless: self.headless,
            user_agent: self.user_agent.clone(),
            browser_mode: self.browser_mode.clone(),
            use_managed_browser: self.use_managed_browser,
            user_agent_mode: self.user_agent_mode.clone(),
            user_agent_generator_config: self.user_agent_generator_config.clone(),
            extra_args: self.extra_args.clone(),
            enable_stealth: self.enable_stealth,
        }
    }

    /// Crawl-run settings projected from this policy, including the full
    /// denylist. Fails if the denylist is unavailable or if the configured
    /// concurrency exceeds [`MAX_SEMAPHORE_COUNT`].
    pub fn crawler_config(&self) -> Result<CrawlerRunConfig, PolicyError> {
        if self.semaphore_count > MAX_SEMAPHORE_COUNT {
            return Err(PolicyError::SemaphoreCapExceeded {
                requested: self.semaphore_count,
                max: MAX_SEMAPHORE_COUNT,
            });
        }
        Ok(CrawlerRunConfig {
            check_robots_txt: self.check_robots_txt,
            exclude_domains: self.exclude_domains()?,
            geolocation: None,
            timezone_id: None,
            locale: None,
            simulate_user: false,
            semaphore_count: self.semaphore_count,
            user_agent: self.user_agent.clone(),
            user_agent_mode: self.user_agent_mode.clone(),
            user_agent_generator_config: self.user_agent_generator_config.clone(),
            stream: false,
            cache_mode: Default::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn env_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    fn temp_denylist(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn base_url_missing_is_a_configuration_error() {
        let policy = BotPolicy::load(|_| None);
        match policy.base_url() {
            Err(PolicyError::MissingSetting(name)) => assert_eq!(name, API_URL_VAR),
            other => panic!("expected MissingSetting, got {:?}", other),
        }
    }

    #[test]
    fn base_url_returns_the_configured_value() {
        let policy = BotPolicy::load(env_from(&[(API_URL_VAR, "https://example.com/svc")]));
        assert_eq!(policy.base_url().unwrap(), "https://example.com/svc");
    }

    #[test]
    fn api_key_still_missing_when_only_url_is_set() {
        let policy = BotPolicy::load(env_from(&[(API_URL_VAR, "https://example.com/svc")]));
        assert!(policy.base_url().is_ok());
        match policy.api_key() {
            Err(PolicyError::MissingSetting(name)) => assert_eq!(name, API_KEY_VAR),
            other => panic!("expected MissingSetting, got {:?}", other),
        }
    }

    #[test]
    fn denylist_error_names_the_variable_when_path_is_unset() {
        let policy = BotPolicy::load(|_| None);
        let err = policy.exclude_domains().unwrap_err();
        assert!(matches!(err, PolicyError::MissingDenylistPath));
        assert!(err.to_string().contains(DENYLIST_PATH_VAR));
    }

    #[test]
    fn denylist_missing_file_is_not_found() {
        let path = std::env::temp_dir().join("crawlgate-denylist-does-not-exist.txt");
        let policy = BotPolicy::load(|_| None).with_denylist_path(path.to_str().unwrap());
        match policy.exclude_domains() {
            Err(PolicyError::DenylistNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected DenylistNotFound, got {:?}", other),
        }
    }

    #[test]
    fn denylist_lines_are_trimmed_and_blank_lines_kept() {
        let path = temp_denylist("crawlgate-denylist-trim.txt", "a.com\n b.com \n\n");
        let policy = BotPolicy::load(|_| None).with_denylist_path(path.to_str().unwrap());
        let domains = policy.exclude_domains().unwrap();
        assert_eq!(domains, ["a.com", "b.com", ""]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn denylist_is_reread_on_every_call() {
        let path = temp_denylist("crawlgate-denylist-reread.txt", "a.com\n");
        let policy = BotPolicy::load(|_| None).with_denylist_path(path.to_str().unwrap());
        assert_eq!(policy.exclude_domains().unwrap(), ["a.com"]);
        fs::write(&path, "a.com\nb.com\n").unwrap();
        assert_eq!(policy.exclude_domains().unwrap(), ["a.com", "b.com"]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn semaphore_count_above_the_ceiling_is_rejected() {
        let policy = BotPolicy::load(|_| None).with_semaphore_count(MAX_SEMAPHORE_COUNT + 1);
        match policy.crawler_config() {
            Err(PolicyError::SemaphoreCapExceeded { requested, max }) => {
                assert_eq!(requested, MAX_SEMAPHORE_COUNT + 1);
                assert_eq!(max, MAX_SEMAPHORE_COUNT);
            }
            other => panic!("expected SemaphoreCapExceeded, got {:?}", other),
        }
    }

    #[test]
    fn browser_config_carries_the_policy_defaults() {
        let policy = BotPolicy::load(|_| None);
        let browser = policy.browser_config();
        assert!(browser.headless);
        assert_eq!(browser.browser_mode, "dedicated");
        assert!(!browser.use_managed_browser);
        assert!(!browser.enable_stealth);
        assert!(browser.user_agent.contains("CrawlgateBot"));
        assert!(browser.extra_args.is_empty());
    }

    #[test]
    fn crawler_config_projects_the_policy_and_denylist() {
        let path = temp_denylist("crawlgate-denylist-project.txt", "blocked.example\n");
        let policy = BotPolicy::load(|_| None).with_denylist_path(path.to_str().unwrap());
        let config = policy.crawler_config().unwrap();
        assert!(config.check_robots_txt);
        assert_eq!(config.exclude_domains, ["blocked.example"]);
        assert_eq!(config.semaphore_count, MAX_SEMAPHORE_COUNT);
        assert!(!config.simulate_user);
        assert!(!config.stream);
        assert!(config.geolocation.is_none());
        assert!(config.timezone_id.is_none());
        assert!(config.locale.is_none());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn crawler_config_fails_without_a_denylist() {
        let policy = BotPolicy::load(|_| None);
        assert!(matches!(
            policy.crawler_config(),
            Err(PolicyError::MissingDenylistPath)
        ));
    }
}
