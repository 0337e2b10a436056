//! Promo Builder: author promo campaign configs from the command line.
//!
//! A draft lives in a JSON file. Edits are applied from a JSON list of edit
//! values, and the derived campaign config can be previewed, validated,
//! exported, or checked against a user id.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use promo_core::config::{AppConfig, EligibilityMode};
use promo_draft::{export_to_dir, Draft, DraftEdit, DraftSession, FIELDS};
use promo_integrations::checker_from_config;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "promo-builder")]
#[command(about = "Author promo campaign configs: rewards, audience rules, caps and integrations")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./promo-builder.toml when present)
    #[arg(long, global = true, env = "PROMO_BUILDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a fresh draft seeded with the starter values
    Init {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the derived campaign config
    Preview {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Report whether the draft can be created
    Validate {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Apply a JSON list of edits to a draft file
    Edit {
        #[arg(long)]
        draft: PathBuf,
        /// JSON file holding an array of edits
        #[arg(long)]
        edits: PathBuf,
        /// Where to write the edited draft (overwrites --draft when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the campaign config to `<slug>-config.json`
    Export {
        #[arg(long)]
        draft: PathBuf,
        /// Output directory (overrides config)
        #[arg(long, env = "PROMO_BUILDER__OUTPUT_DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Run an eligibility check for one user id
    Check {
        #[arg(long)]
        draft: PathBuf,
        #[arg(long, default_value = "user-123")]
        uid: String,
        /// Use the randomized placeholder instead of the eligibility API
        #[arg(long, default_value_t = false)]
        mock: bool,
    },
    /// List audience fields and their operators
    Fields,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promo_builder=info,promo_draft=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    match cli.command {
        Command::Init { out } => {
            let draft = Draft::new(&config.integrations);
            let body = serde_json::to_string_pretty(&draft)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "Draft created");
                }
                None => println!("{body}"),
            }
        }
        Command::Preview { draft } => {
            let session = DraftSession::new(load_draft(&draft)?);
            println!("{}", session.preview()?);
        }
        Command::Validate { draft } => {
            let session = DraftSession::new(load_draft(&draft)?);
            if session.is_valid() {
                println!("valid");
            } else {
                for issue in session.issues() {
                    println!("invalid: {issue}");
                }
                bail!("draft has {} issue(s)", session.issues().len());
            }
        }
        Command::Edit { draft, edits, out } => {
            let mut session = DraftSession::new(load_draft(&draft)?);
            let raw = std::fs::read_to_string(&edits)
                .with_context(|| format!("reading {}", edits.display()))?;
            let edits: Vec<DraftEdit> =
                serde_json::from_str(&raw).context("parsing edit list")?;
            let count = edits.len();
            session.apply_all(edits)?;

            let target = out.unwrap_or(draft);
            let body = serde_json::to_string_pretty(session.draft())?;
            std::fs::write(&target, body)
                .with_context(|| format!("writing {}", target.display()))?;
            info!(
                path = %target.display(),
                edits = count,
                valid = session.is_valid(),
                "Draft updated"
            );
        }
        Command::Export { draft, out_dir } => {
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            let draft = load_draft(&draft)?;
            let path = export_to_dir(&draft, &config.output_dir)?;
            println!("{}", path.display());
        }
        Command::Check { draft, uid, mock } => {
            if mock {
                config.eligibility.mode = EligibilityMode::Mock;
            }
            let session = DraftSession::new(load_draft(&draft)?);
            let checker = checker_from_config(&config.eligibility)?;
            let outcome = checker.check(uid.trim(), session.payload()).await?;
            println!("{outcome}");
        }
        Command::Fields => {
            for field in FIELDS.iter() {
                let ops: Vec<&str> = field
                    .field_type
                    .operators()
                    .iter()
                    .map(|op| op.as_str())
                    .collect();
                println!(
                    "{:<24} {:<24} {}",
                    field.key.as_str(),
                    field.label,
                    ops.join(" ")
                );
            }
        }
    }

    Ok(())
}

fn load_draft(path: &Path) -> anyhow::Result<Draft> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let draft: Draft = serde_json::from_str(&raw)
        .with_context(|| format!("parsing draft {}", path.display()))?;
    draft.check()?;
    Ok(draft)
}
