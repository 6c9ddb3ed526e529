//! Terminal Family Tree Renderer
//!
//! Loads a JSON record file, scopes it to one owner, builds the forest and prints
//! it as an indented outline (or as layout JSON for a drawing front end).
//!
//! # Usage
//!
//! ```bash
//! FAMILY_TREE_OWNER=user-1 cargo run --bin render-tree -- members.json
//! FAMILY_TREE_OWNER=user-1 cargo run --bin render-tree -- --json --today 2024-06-01
//! ```
//!
//! # Environment
//!
//! - `FAMILY_TREE_OWNER` - user whose records are shown (required)
//! - `FAMILY_TREE_DATA` - record file, if not given as an argument
//! - `FAMILY_TREE_CONFIG` - config file, defaults to `<config dir>/familytree/config.json`
//! - `RUST_LOG` - log filter, defaults to `info`
//!
//! Without a data path from the arguments, the environment or the config file,
//! `~/.familytree/members.json` is used.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use familytree_core::db::JsonFileStore;
use familytree_core::{render_text, FamilyService, FamilyTreeConfig, Session, TreeState};
use std::path::PathBuf;
use std::sync::Arc;

const DATA_FILE: &str = "members.json";

#[derive(Debug, Default)]
struct Args {
    json: bool,
    today: Option<NaiveDate>,
    data_path: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => parsed.json = true,
                "--today" => {
                    let value = args.next().context("--today needs a YYYY-MM-DD date")?;
                    let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .with_context(|| format!("Invalid --today date: {}", value))?;
                    parsed.today = Some(date);
                }
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                path => parsed.data_path = Some(PathBuf::from(path)),
            }
        }
        Ok(parsed)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn config_path() -> PathBuf {
    env_var("FAMILY_TREE_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("familytree").join("config.json")))
        .unwrap_or_else(|| PathBuf::from("familytree.json"))
}

fn data_path(args: &Args, config: &FamilyTreeConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = args.data_path.clone() {
        return Ok(path);
    }
    if let Some(path) = env_var("FAMILY_TREE_DATA") {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.data_path.clone() {
        return Ok(path);
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".familytree").join(DATA_FILE))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for the rendered tree
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = FamilyTreeConfig::load(config_path()).await?;
    let path = data_path(&args, &config)?;
    tracing::info!("Reading records from {}", path.display());

    let store = Arc::new(JsonFileStore::new(&path));
    let service = FamilyService::from_config(store, &config);
    let session = env_var("FAMILY_TREE_OWNER").map(Session::new);

    let forest = match service.refresh(session.as_ref()).await {
        TreeState::Ready(forest) => forest,
        TreeState::SignedOut => {
            eprintln!("Signed out. Set FAMILY_TREE_OWNER to the user whose tree to show.");
            return Ok(());
        }
        TreeState::Failed { message } => bail!(message),
        TreeState::NotLoaded => bail!("Family tree was not loaded"),
    };

    if !forest.excluded.is_empty() {
        eprintln!(
            "Left out {} member(s) caught in a parent cycle: {}",
            forest.excluded.len(),
            forest.excluded.join(", ")
        );
    }

    match (&session, args.json) {
        (Some(session), true) => {
            let layout = service
                .layout(session, &config.layout)
                .await
                .context("Family tree is not ready")?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        _ => {
            let today = args
                .today
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            print!("{}", render_text(&forest, today));
        }
    }

    Ok(())
}
