use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::warn;

use pubsync_core::config::USER_ID_ENV;
use pubsync_core::{
    CatalogFilter, PathsConfig, Pipeline, SyncConfig, SyncOutcome, combine, group_by_year,
    load_dataset, resolve_user_id,
};
use pubsync_scholar::{GoogleScholarSource, JsonDumpSource};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pubsync",
    about = "Refresh a publication dataset from a Google Scholar profile",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    sync: SyncArgs,

    /// Config file. Defaults to $PUBSYNC_CONFIG, ./pubsync.toml, then
    /// ~/.config/pubsync/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the curated, auto and template datasets.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct SyncArgs {
    /// Google Scholar profile id. Falls back to $SCHOLAR_USER_ID, the config
    /// file, then the built-in default.
    #[arg(long)]
    user_id: Option<String>,

    /// Only regenerate the manual template from the curated dataset.
    #[arg(long)]
    manual_template: bool,

    /// Read raw records from a JSON dump instead of Google Scholar.
    #[arg(long, value_name = "PATH", conflicts_with = "manual_template")]
    from_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List curated and fetched publications, grouped by year.
    List {
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Output in JSON format.
        #[arg(long)]
        json: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let mut paths = config.paths.clone();
    if let Some(data_dir) = cli.data_dir {
        paths.data_dir = data_dir;
    }

    match cli.command {
        None => run_sync(cli.sync, &config, paths).await,
        Some(Commands::List {
            year,
            venue,
            tag,
            json,
        }) => run_list(&paths, CatalogFilter { year, venue, tag }, json),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "pubsync=warn,pubsync_core=warn,pubsync_scholar=warn",
        1 => "pubsync=info,pubsync_core=info,pubsync_scholar=info",
        _ => "pubsync=debug,pubsync_core=debug,pubsync_scholar=debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<SyncConfig> {
    let config = match explicit {
        Some(path) => SyncConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SyncConfig::load()?,
    };
    Ok(config)
}

// ─── Sync ────────────────────────────────────────────────────────────────────

async fn run_sync(args: SyncArgs, config: &SyncConfig, paths: PathsConfig) -> Result<()> {
    let pipeline = Pipeline::new(paths);

    if args.manual_template {
        let report = pipeline.write_manual_template()?;
        println!("Wrote manual template: {}", report.path.display());
        return Ok(());
    }

    let env_user_id = std::env::var(USER_ID_ENV).ok();
    let user_id = resolve_user_id(
        args.user_id.as_deref(),
        env_user_id.as_deref(),
        config.scholar.user_id.as_deref(),
    );

    let outcome = match args.from_file {
        Some(path) => pipeline.run(&JsonDumpSource::new(path), &user_id).await?,
        None => match GoogleScholarSource::new(&config.scholar) {
            Ok(source) => pipeline.run(&source, &user_id).await?,
            Err(e) => {
                warn!("could not build Google Scholar client: {e}");
                pipeline.fall_back(format!("could not build Google Scholar client: {e}"))?
            }
        },
    };

    match outcome {
        SyncOutcome::Updated {
            path,
            count,
            user_id,
            source_name,
        } => {
            println!(
                "Updated {} with {count} publications from {source_name} user {user_id}.",
                path.display()
            );
        }
        SyncOutcome::Fallback {
            reason,
            auto_path,
            template,
        } => {
            println!("Fetch failed; leaving {} unchanged.", auto_path.display());
            println!("Reason: {reason}");
            println!(
                "Manual fallback: fill {} and copy entries into {}.",
                template.path.display(),
                auto_path.display()
            );
        }
    }
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

fn run_list(paths: &PathsConfig, filter: CatalogFilter, json_output: bool) -> Result<()> {
    let curated = load_dataset(&paths.curated_path())?;
    let auto = load_dataset(&paths.auto_path())?;
    let combined = combine(&curated, &auto);
    let selected = filter.apply(&combined);
    let groups = group_by_year(&selected);

    if json_output {
        print_json(&serde_json::json!({
            "status": "ok",
            "data": { "groups": groups, "total": selected.len() }
        }))?;
    } else if selected.is_empty() {
        println!("No publications match.");
    } else {
        for group in &groups {
            println!("{}", group.label);
            for publication in &group.publications {
                let citations = publication
                    .citation_count
                    .map(|n| format!("  [{n} citations]"))
                    .unwrap_or_default();
                if publication.venue.is_empty() {
                    println!("  {}{citations}", publication.title);
                } else {
                    println!("  {} — {}{citations}", publication.title, publication.venue);
                }
            }
        }
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
