use clap::{Parser, Subcommand};
use folio_cms::client::ContentClient;
use folio_cms::config::{self, CONFIG_FILE};
use folio_cms::feed::{FeedOptions, SortOrder};
use folio_cms::output;
use folio_cms::snapshot::SnapshotLocation;
use folio_cms::source::RemoteSource;
use folio_cms::sync::sync_snapshot;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio-cms")]
#[command(about = "Resolve portfolio blog posts from a headless CMS with offline fallbacks")]
#[command(long_about = "\
Resolve portfolio blog posts from a headless CMS with offline fallbacks

Every request goes through the same chain, first answer wins:

  1. in-memory cache       (5 min for posts, 1 h for categories)
  2. live CMS              (only when cms.enabled / FOLIO_USE_CMS=true)
  3. build-time snapshot   (written by 'folio-cms sync')
  4. bundled posts         (compiled into the binary, always available)

The provenance of every post (cms, cache, static) is shown in the output.

Run 'folio-cms gen-config' to generate a documented config.toml.
Set RUST_LOG=folio_cms=debug to see which tier answered and why.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List posts
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Only posts tagged with this category (case-insensitive)
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive search on title, excerpt and tags
        #[arg(long)]
        search: Option<String>,
        /// date (newest first) or title
        #[arg(long, default_value_t = SortOrder::Date)]
        sort: SortOrder,
        /// Do not overlay the bundled posts on the first page
        #[arg(long)]
        no_merge: bool,
    },
    /// Show one post with its related posts
    Post { slug: String },
    /// List categories
    Categories,
    /// Count posts per tag
    Tags,
    /// Write the CMS snapshot file from the live CMS
    Sync {
        /// Output path (defaults to snapshot.location)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_cms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let load_config = || config::load_config(&cli.config);

    match cli.command {
        Command::Posts {
            page,
            limit,
            category,
            search,
            sort,
            no_merge,
        } => {
            let client = ContentClient::from_config(&load_config()?)?;
            let options = FeedOptions {
                limit,
                category,
                search,
                sort,
                merge_with_static: !no_merge,
            };
            let result = client.feed(page, &options).await;
            if cli.json {
                print_json(&result)?;
            } else {
                output::print_posts_output(&result);
            }
        }
        Command::Post { slug } => {
            let client = ContentClient::from_config(&load_config()?)?;
            let Some(found) = client.post_with_related(&slug).await else {
                return Err(format!("post '{slug}' not found").into());
            };
            if cli.json {
                print_json(&found)?;
            } else {
                output::print_post_output(&found, &client.author(None));
            }
        }
        Command::Categories => {
            let client = ContentClient::from_config(&load_config()?)?;
            let categories = client.fetch_categories().await;
            if cli.json {
                print_json(&categories)?;
            } else {
                output::print_categories(&categories);
            }
        }
        Command::Tags => {
            let client = ContentClient::from_config(&load_config()?)?;
            let tags = client.tag_counts().await;
            if cli.json {
                print_json(&tags)?;
            } else {
                output::print_tag_counts(&tags);
            }
        }
        Command::Sync { output: path } => {
            let config = load_config()?;
            let path = match path {
                Some(path) => path,
                None => match SnapshotLocation::parse(&config.snapshot.location) {
                    SnapshotLocation::File(path) => path,
                    SnapshotLocation::Url(url) => {
                        return Err(format!(
                            "snapshot.location is a URL ({url}); pass --output to sync to a file"
                        )
                        .into());
                    }
                },
            };
            let remote = RemoteSource::from_config(&config.cms)?;
            let report = sync_snapshot(&remote, &path).await?;
            output::print_sync_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
