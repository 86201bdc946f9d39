mod api_client;
mod client_error;
mod crawl_result;
mod crawl_stream;
mod run_config;

pub use api_client::*;
pub use client_error::*;
pub use crawl_result::*;
pub use crawl_stream::*;
pub use run_config::*;
