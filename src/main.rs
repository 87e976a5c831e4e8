use std::process::exit;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use booru_deep_search::{
    GelbooruClient, Partition, RetryPolicy, SearchPartitioner, ServerConfig, TagQuery,
    DEFAULT_SERVERS,
};

#[derive(Parser, Debug)]
#[clap(name = "Booru Deep Search", version, about, long_about = None)]
pub struct Cli {
    /// Tags to search for
    #[clap(
        short,
        long,
        value_parser,
        required_unless_present = "servers",
        multiple_values = true,
        help_heading = "SEARCH"
    )]
    pub tags: Vec<String>,

    /// Website to generate the searches for
    ///
    /// Either a known label ["gelbooru", "safebooru", "rule34"] or the full
    /// post index URL of a custom Gelbooru-compatible API
    #[clap(short = 'a', long, default_value = "gelbooru", help_heading = "SEARCH")]
    pub api: String,

    /// Maximum pagination offset of a custom API
    ///
    /// Required when --api is not one of the known labels
    #[clap(long, value_name = "NUMBER", help_heading = "LIMITS")]
    pub max_per_search: Option<u64>,

    /// Maximum posts one API call of a custom API may return
    ///
    /// Required when --api is not one of the known labels
    #[clap(long, value_name = "NUMBER", help_heading = "LIMITS")]
    pub max_per_page: Option<u64>,

    /// Delay between API calls, in milliseconds
    #[clap(
        long,
        value_name = "MS",
        default_value_t = 500,
        help_heading = "GENERAL"
    )]
    pub delay_ms: u64,

    /// How many times a failed API call is sent before giving up
    #[clap(
        long,
        value_name = "NUMBER",
        default_value_t = 1,
        value_parser(clap::value_parser!(u32).range(1..)),
        help_heading = "GENERAL"
    )]
    pub attempts: u32,

    /// Print all known servers and exit
    #[clap(long)]
    pub servers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.servers {
        print_servers()
    }

    env_logger::builder().format_timestamp(None).init();

    let config = ServerConfig::resolve(&args.api, args.max_per_search, args.max_per_page)?;
    let query = TagQuery::new(&args.tags)?;

    let client = GelbooruClient::new(&config)?
        .debounce(Duration::from_millis(args.delay_ms))
        .retry_policy(RetryPolicy {
            max_attempts: args.attempts,
            ..Default::default()
        });

    let mut partitioner = SearchPartitioner::new(client, config.limits);
    let partition = partitioner.compute_partition(&query).await?;

    print_summary(partitioner.request_count(), partitioner.request_time(), &partition);

    for search in partition.queries(&query) {
        println!("{}", search);
    }

    Ok(())
}

fn print_summary(requests: u64, request_time: Duration, partition: &Partition) {
    let avg = if requests > 0 {
        request_time.as_secs_f64() / requests as f64
    } else {
        0.0
    };

    eprintln!(
        "{} {} {} {} {} {}",
        "Split into".bold(),
        partition.len().to_string().bold().blue(),
        "searches in".bold(),
        requests.to_string().bold().blue(),
        "requests".bold(),
        format!("(avg {:.3}s)", avg).bold().blue(),
    );
}

fn print_servers() {
    println!(
        "{}\n----------------",
        "Known servers:".underline().bold().blue()
    );

    for (label, server) in DEFAULT_SERVERS.iter() {
        println!(
            "{:<12} - {}:\n - {} {}\n - {} {}\n - {} {}\n",
            format!("[{}]", label),
            server.pretty_name.bold().green(),
            "Post index:".bold().blue(),
            server.post_list_url.bold().purple().underline(),
            "Max posts per search:".bold().blue(),
            server
                .limits
                .max_posts_per_search()
                .to_string()
                .bold()
                .yellow(),
            "Max posts per page:".bold().blue(),
            server
                .limits
                .max_posts_per_page()
                .to_string()
                .bold()
                .yellow(),
        )
    }

    exit(0)
}
