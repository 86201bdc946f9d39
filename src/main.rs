use clap::Parser;
use crawlgate::client::{CacheMode, CrawlClient};
use crawlgate::policy::BotPolicy;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// Target URLs to submit for crawling
    #[arg(long, value_name = "URL", required = true)]
    url: Vec<String>,

    /// Skip the streaming crawl
    #[arg(long, default_value_t = false)]
    no_stream: bool,

    /// Fetch the service's configuration schema after crawling
    #[arg(long, default_value_t = false)]
    schema: bool,
}

async fn main_impl(args: &CommandLineArgs) -> anyhow::Result<()> {
    let policy = BotPolicy::from_env();

    let mut client = CrawlClient::connect(policy.base_url()?).await?;
    client.authenticate(policy.api_key()?);

    let browser_config = policy.browser_config();
    let crawler_config = policy.crawler_config()?.with_cache_mode(CacheMode::Bypass);
    let results = client
        .crawl(&args.url, &browser_config, &crawler_config)
        .await?;
    for result in &results {
        println!("{}, {}", result.url, result.success);
    }

    if !args.no_stream {
        // A failed streaming crawl is reported but does not abort the run.
        if let Err(e) = streaming_crawl(&client, &policy, &args.url).await {
            eprintln!("Streaming crawl failed: {}", e);
        }
    }

    if args.schema {
        let schema = client.schema().await?;
        println!("{}", serde_json::to_string_pretty(&schema)?);
    }

    Ok(())
}

async fn streaming_crawl(
    client: &CrawlClient,
    policy: &BotPolicy,
    urls: &[String],
) -> anyhow::Result<()> {
    let crawler_config = policy
        .crawler_config()?
        .streaming()
        .with_cache_mode(CacheMode::Bypass);
    let mut stream = client
        .crawl_stream(urls, &policy.browser_config(), &crawler_config)
        .await?;
    while let Some(result) = stream.next_result().await? {
        println!("streamed: {}, {}", result.url, result.success);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = CommandLineArgs::parse();

    if let Err(e) = main_impl(&args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
