//! `article-enricher` CLI entry-point.
//!
//! Available sub-commands:
//! - `enrich` — fetch a page of the demo catalogue with authors filled in.
//! - `lookup` — read one article and its author.
//!
//! Both run against an in-memory store seeded with demo data; flags let you
//! make individual authors slow or unavailable to watch the engine degrade.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use domain::AuthorId;
use engine::{ArticleService, DeadlinePolicy, EnrichConfig, ServiceConfig};
use store::seed::{demo_articles, demo_authors};
use store::{InMemoryArticleRepository, InMemoryAuthorRepository};

#[derive(Parser)]
#[command(
    name = "article-enricher",
    about = "Concurrent author enrichment for article listings",
    version
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

/// Engine and demo-store tuning shared by every sub-command.
#[derive(Args)]
struct Settings {
    /// Deadline for author lookups, in milliseconds.
    #[arg(long, global = true, env = "ENRICH_DEADLINE_MS", default_value_t = 1_000)]
    deadline_ms: u64,

    /// Maximum number of author lookups in flight at once.
    #[arg(long, global = true, env = "ENRICH_MAX_IN_FLIGHT", default_value_t = 16)]
    max_in_flight: usize,

    /// Apply the deadline to the whole drain instead of re-arming it per outcome.
    #[arg(long, global = true, env = "ENRICH_OVERALL_DEADLINE")]
    overall_deadline: bool,

    /// Budget for a whole request, in milliseconds.
    #[arg(long, global = true, env = "REQUEST_TIMEOUT_MS", default_value_t = 2_000)]
    request_timeout_ms: u64,

    /// Author id whose lookups are artificially slow.
    #[arg(long, global = true)]
    slow_author: Option<AuthorId>,

    /// Latency applied to `--slow-author`, in milliseconds.
    #[arg(long, global = true, default_value_t = 1_500)]
    slow_ms: u64,

    /// Author id whose lookups always fail.
    #[arg(long, global = true)]
    failing_author: Option<AuthorId>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a page of articles and enrich their authors.
    Enrich {
        /// Cursor returned by a previous page (empty for the first page).
        #[arg(long, default_value = "")]
        cursor: String,
        /// Page size; 0 uses the service default.
        #[arg(long, default_value_t = 0)]
        num: usize,
    },
    /// Read one article by id, author included.
    Lookup {
        id: i64,
    },
}

impl Settings {
    fn service_config(&self) -> ServiceConfig {
        let policy = if self.overall_deadline {
            DeadlinePolicy::Overall
        } else {
            DeadlinePolicy::PerOutcome
        };

        ServiceConfig {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            enrich: EnrichConfig {
                deadline: Duration::from_millis(self.deadline_ms),
                max_in_flight: self.max_in_flight,
                policy,
            },
            ..ServiceConfig::default()
        }
    }

    fn author_repository(&self) -> InMemoryAuthorRepository {
        let mut authors = InMemoryAuthorRepository::seeded(demo_authors());
        if let Some(id) = self.slow_author {
            authors = authors.with_latency(id, Duration::from_millis(self.slow_ms));
        }
        if let Some(id) = self.failing_author {
            authors = authors.with_outage(id);
        }
        authors
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.settings.service_config();
    config
        .enrich
        .validate()
        .context("invalid enrichment settings")?;

    let service = ArticleService::new(
        Arc::new(InMemoryArticleRepository::seeded(demo_articles())),
        Arc::new(cli.settings.author_repository()),
        config,
    );

    match cli.command {
        Command::Enrich { cursor, num } => {
            info!(cursor = %cursor, num, "fetching article page");
            let (articles, next_cursor) = service
                .fetch(&cursor, num)
                .await
                .context("failed to fetch articles")?;

            let unresolved = articles.iter().filter(|a| a.author.is_unresolved()).count();
            info!(
                returned = articles.len(),
                unresolved,
                next_cursor = %next_cursor,
                "page ready"
            );

            let body = serde_json::json!({
                "articles": articles,
                "next_cursor": next_cursor,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Lookup { id } => {
            let article = service
                .get_by_id(id)
                .await
                .with_context(|| format!("failed to read article {id}"))?;
            println!("{}", serde_json::to_string_pretty(&article)?);
        }
    }

    Ok(())
}
