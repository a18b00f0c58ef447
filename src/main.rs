use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use hql_rewrite::{rewrite, Order, RewriteConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "hql-rewrite")]
#[command(about = "Rewrite HQL queries with a sort order or into count queries", long_about = None)]
struct Args {
    /// Query to rewrite (read from stdin when omitted)
    query: Option<String>,

    /// Sort term, e.g. --sort lastName,desc --sort firstName,asc,ignorecase
    #[arg(short, long = "sort")]
    sort: Vec<Order>,

    /// Produce a count query
    #[arg(long)]
    count: bool,

    /// Expression to count instead of the primary alias
    #[arg(long)]
    count_projection: Option<String>,

    /// Configuration file
    #[arg(long, conflicts_with = "dir")]
    config: Option<PathBuf>,

    /// Directory holding hql-rewrite.toml and .env
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Print query, alias, projection and constructor flag as JSON
    #[arg(long, conflicts_with = "alias_only")]
    json: bool,

    /// Print only the detected primary alias
    #[arg(long)]
    alias_only: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging (stderr, so stdout stays the rewritten query)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hql_rewrite=info,hql_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match (&args.config, &args.dir) {
        (Some(path), _) => {
            let mut config = RewriteConfig::load(path)?;
            config.apply_env_overrides()?;
            config
        }
        (None, Some(dir)) => RewriteConfig::load_from_dir(dir)?,
        (None, None) => RewriteConfig::load_from_dir(Path::new("."))?,
    };

    // Command-line flags win over file and environment
    if !args.sort.is_empty() {
        config.sort = args.sort;
    }
    if args.count {
        config.count = true;
    }
    if let Some(projection) = args.count_projection {
        config.count_projection = Some(projection);
    }

    let query = match args.query {
        Some(query) => query,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let output = rewrite(query.trim(), &config)?;

    if args.alias_only {
        println!("{}", output.alias.unwrap_or_default());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.query);
    }

    Ok(())
}
