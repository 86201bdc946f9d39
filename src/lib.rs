pub mod client;
pub mod policy;

pub use client::{
    BrowserConfig, CacheMode, ClientError, CrawlClient, CrawlResult, CrawlStream, CrawlerRunConfig,
};
pub use policy::{BotPolicy, PolicyError};
