use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relwatch_analysis::Analyzer;
use relwatch_common::dates::parse_iso;
use relwatch_common::file_config::load_or_default;
use relwatch_common::{
    AnalyzeOptions, AppConfig, CancellationToken, DateRange, DetailLevel, ListOptions, SearchQuery,
    SortBy, YearRange, DEFAULT_FROM_YEAR, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
};

#[derive(Parser)]
#[command(name = "relwatch", about = "News retrieval and government-relation scoring")]
struct Cli {
    /// Path to config TOML file (overrides RELWATCH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the corpus, then the hosted provider, then source sites
    Search {
        terms: String,
        /// Restrict to a source (display name or key); repeatable
        #[arg(long = "source")]
        sources: Vec<String>,
        /// Earliest publication date, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Latest publication date, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Analyze a subject and store the result
    Analyze {
        subject: String,
        #[arg(long, default_value_t = DEFAULT_FROM_YEAR)]
        from_year: i32,
        /// Defaults to the current year
        #[arg(long)]
        to_year: Option<i32>,
        /// Skip roster individuals
        #[arg(long)]
        no_individuals: bool,
        /// basic, detailed or comprehensive
        #[arg(long, default_value = "detailed")]
        detail: DetailLevel,
    },
    /// Print a stored analysis
    Show { subject: String },
    /// List stored analyses
    List {
        /// "high relation", "orta ilişki", ... or free text
        #[arg(long)]
        filter: Option<String>,
        /// name, relationScore, articleCount or lastAnalyzed
        #[arg(long, default_value = "name")]
        sort_by: SortBy,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Search each keyword and backfill article bodies
    Harvest {
        #[arg(required = true)]
        keywords: Vec<String>,
        #[arg(long = "source")]
        sources: Vec<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let app = AppConfig::from_env()?;
    let config_path = cli.config.or_else(|| app.config_path.clone());
    let file = load_or_default(config_path.as_deref())?;
    if let Some(path) = &config_path {
        info!(config = %path.display(), "Loaded config");
    }

    let analyzer = Analyzer::connect(&app, &file).await?;

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                token.cancel();
            }
        });
    }

    match cli.command {
        Command::Search {
            terms,
            sources,
            from,
            to,
            limit,
        } => {
            let mut query = SearchQuery::new(terms).with_sources(sources).with_limit(limit);
            query.date_range = date_range(from.as_deref(), to.as_deref())?;
            let articles = analyzer.archive().search_cancellable(&query, &token).await?;
            print_json(&articles)
        }
        Command::Analyze {
            subject,
            from_year,
            to_year,
            no_individuals,
            detail,
        } => {
            let options = AnalyzeOptions {
                date_range_years: YearRange {
                    from: from_year,
                    to: to_year.unwrap_or(YearRange::default().to),
                },
                include_individuals: !no_individuals,
                detail_level: detail,
            };
            let result = analyzer.analyze_cancellable(&subject, &options, &token).await?;
            print_json(&result)
        }
        Command::Show { subject } => {
            let result = analyzer.require_analysis(&subject).await?;
            print_json(&result)
        }
        Command::List {
            filter,
            sort_by,
            limit,
        } => {
            let rows = analyzer
                .list_analyses(&ListOptions {
                    filter,
                    sort_by,
                    limit,
                })
                .await;
            print_json(&rows)
        }
        Command::Harvest {
            keywords,
            sources,
            from,
            to,
            limit,
        } => {
            let range = date_range(from.as_deref(), to.as_deref())?;
            let report = analyzer
                .archive()
                .harvest(&keywords, &sources, range, limit, &token)
                .await?;
            print_json(&report)
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("relwatch=info".parse()?);
    let json = std::env::var("RELWATCH_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn date_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }
    let from = from.map(parse_iso).transpose().context("Invalid --from")?;
    let to = to.map(parse_iso).transpose().context("Invalid --to")?;
    Ok(Some(DateRange::new(from, to)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
