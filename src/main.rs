use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use garx::client::{Client, Context};
use garx::config::{
    default_config_path, find_config_file, get_config, load_config, save_config, Config,
};
use garx::models::{
    with_max_results, with_sort_by, with_sort_order, FieldPrefix, SearchOp, SearchOperator,
    SortBy, SortOrder,
};
use garx::ui::{self, Status};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// garx - search arXiv from the command line
#[derive(Parser, Debug)]
#[command(name = "garx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv with boolean field queries", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Text on a terminal, JSON otherwise
    Auto,
    /// Human-readable text
    Text,
    /// JSON (machine-readable)
    Json,
}

/// Sort field for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    Relevance,
    #[value(name = "updated")]
    LastUpdated,
    Submitted,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => SortBy::Relevance,
            SortField::LastUpdated => SortBy::LastUpdatedDate,
            SortField::Submitted => SortBy::SubmittedDate,
        }
    }
}

/// Sort order
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Term for the first clause
    term: String,

    /// Field of the first clause: ti, au, abs, co, jr, cat, rn, id, all (or long names)
    #[arg(long, short, default_value = "all", value_parser = parse_field)]
    field: FieldPrefix,

    /// Extra clause as OP:FIELD:TERM, e.g. "and:au:bohr" or "andnot:cat:hep-ph".
    /// Applied left to right in the order given.
    #[arg(long = "clause", short = 'c', value_parser = parse_clause)]
    clauses: Vec<SearchOperator>,

    /// Maximum number of results (sent unchecked)
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    max_results: Option<i64>,

    /// Sort by field
    #[arg(long, value_enum)]
    sort_by: Option<SortField>,

    /// Sort order
    #[arg(long, value_enum)]
    order: Option<Order>,
}

impl QueryArgs {
    /// Clauses first, then sort and paging, falling back to config defaults
    fn operators(&self, config: &Config) -> Vec<SearchOperator> {
        let mut ops = self.clauses.clone();

        if let Some(n) = self.max_results.or(config.search.max_results) {
            ops.push(with_max_results(n));
        }
        if let Some(sort) = self.sort_by.map(SortBy::from).or(config.search.sort_by) {
            ops.push(with_sort_by(sort));
        }
        if let Some(order) = self.order.map(SortOrder::from).or(config.search.sort_order) {
            ops.push(with_sort_order(order));
        }
        ops
    }

    /// The query as rendered in `search_query`, for display
    fn describe(&self) -> String {
        let mut params = garx::client::RequestParams::new();
        params.search(self.field, self.term.as_str(), self.clauses.clone());
        params.query().render()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search arXiv
    #[command(alias = "s")]
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the request URL for a search without sending it
    Url {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Write a starter configuration file
    InitConfig {
        /// Destination (default: the platform config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_field(value: &str) -> Result<FieldPrefix, String> {
    Ok(FieldPrefix::from(value))
}

fn parse_clause(value: &str) -> Result<SearchOperator, String> {
    let mut parts = value.splitn(3, ':');
    let (Some(op), Some(field), Some(term)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected OP:FIELD:TERM, got {:?}", value));
    };

    let op = match op.trim().to_lowercase().as_str() {
        "and" => SearchOp::And,
        "or" => SearchOp::Or,
        "andnot" | "and-not" | "and_not" => SearchOp::AndNot,
        other => return Err(format!("unknown operator {:?} (and, or, andnot)", other)),
    };
    let prefix = FieldPrefix::from(field);
    let term = term.to_string();

    Ok(match op {
        SearchOp::And => SearchOperator::And { prefix, term },
        SearchOp::Or => SearchOperator::Or { prefix, term },
        SearchOp::AndNot => SearchOperator::AndNot { prefix, term },
    })
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("garx={}", level)),
    );
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.logging.format.as_deref() == Some("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let config = match &path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => get_config().context("failed to read GARX_* environment")?,
    };
    Ok((config, path))
}

fn warn_unrecognized(query: &QueryArgs) {
    let fields = std::iter::once(query.field).chain(query.clauses.iter().filter_map(|op| {
        match op {
            SearchOperator::And { prefix, .. }
            | SearchOperator::Or { prefix, .. }
            | SearchOperator::AndNot { prefix, .. } => Some(*prefix),
            _ => None,
        }
    }));
    if fields.into_iter().any(|f| f == FieldPrefix::Unrecognized) {
        tracing::warn!("Unrecognized field prefix; it will be sent as \"unk\"");
    }
}

async fn run_search(
    cli: &Cli,
    config: &Config,
    query: &QueryArgs,
    timeout: Option<u64>,
) -> Result<()> {
    warn_unrecognized(query);
    let client = Client::from_config(config)?;

    let (mut ctx, cancel) = Context::with_cancel();
    if let Some(secs) = timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    // Ctrl-C aborts the in-flight request
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let start = Instant::now();
    let feed = client
        .search(&ctx, query.field, &query.term, query.operators(config))
        .await?;
    let elapsed = start.elapsed();

    let json = match cli.output {
        OutputFormat::Json => true,
        OutputFormat::Text => false,
        OutputFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
    } else {
        ui::print_feed(&query.describe(), &feed, elapsed);
        if feed.entries.is_empty() && !cli.quiet {
            ui::print_status(Status::Warning, "No papers matched");
        }
    }
    Ok(())
}

fn init_config(cli: &Cli, config: &Config, path: Option<PathBuf>, force: bool) -> Result<()> {
    let Some(path) = path.or_else(default_config_path) else {
        bail!("no config directory on this platform; pass a path");
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    save_config(config, &path)?;
    if !cli.quiet {
        ui::print_status(
            Status::Success,
            &format!("Wrote configuration to {}", path.display()),
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load(&cli)?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    match &cli.command {
        Commands::Search { query, timeout } => run_search(&cli, &config, query, *timeout).await,
        Commands::Url { query } => {
            warn_unrecognized(query);
            let client = Client::from_config(&config)?;
            println!(
                "{}",
                client.search_url(query.field, &query.term, query.operators(&config))
            );
            Ok(())
        }
        Commands::InitConfig { path, force } => init_config(&cli, &config, path.clone(), *force),
    }
}
