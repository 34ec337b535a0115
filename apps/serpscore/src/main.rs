mod commands;
mod report;
mod stores;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::stores::settings::default_store_path;

/// Analyze a page's SEO from its URL and keep a history of the results.
#[derive(Parser)]
#[command(name = "serpscore", version, about)]
struct Cli {
    /// Settings file. Defaults to `serpscore/settings.json` in the platform config directory.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, analyze and score a URL.
    Analyze {
        url: String,

        /// Keyword to score against. Defaults to the top primary keyword.
        #[arg(long, short, default_value = "")]
        keyword: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Do not save the analysis to the history.
        #[arg(long)]
        no_save: bool,
    },

    /// List saved analyses, newest first.
    History {
        #[arg(long)]
        url: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: u64,

        #[arg(long)]
        json: bool,
    },

    /// Show a saved analysis in full, rescored from its stored result.
    Show {
        id: i32,

        #[arg(long)]
        json: bool,
    },

    /// Delete a saved analysis.
    Delete { id: i32 },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Write TypeScript definitions of the report types.
    ExportTypes { path: PathBuf },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    SetKey { key: String },
    SetModel { model: String },
    /// Point at another OpenAI compatible endpoint.
    SetApiBase { url: String },
    /// Any sea-orm database URL, e.g. `sqlite:///path/analyses.db?mode=rwc`.
    SetDatabase { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store_path = cli.settings.unwrap_or_else(default_store_path);

    match cli.command {
        Commands::Analyze {
            url,
            keyword,
            json,
            no_save,
        } => commands::analyze(&store_path, &url, &keyword, json, !no_save).await,
        Commands::History { url, limit, json } => {
            commands::history(&store_path, url, limit, json).await
        }
        Commands::Show { id, json } => commands::show(&store_path, id, json).await,
        Commands::Delete { id } => commands::delete(&store_path, id).await,
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::show_settings(&store_path),
            SettingsAction::SetKey { key } => {
                commands::update_settings(&store_path, |s| s.api_key = Some(key.trim().to_string()))
            }
            SettingsAction::SetModel { model } => {
                commands::update_settings(&store_path, |s| s.model = Some(model))
            }
            SettingsAction::SetApiBase { url } => {
                commands::update_settings(&store_path, |s| s.api_base = Some(url))
            }
            SettingsAction::SetDatabase { url } => {
                commands::update_settings(&store_path, |s| s.database_url = Some(url))
            }
        },
        Commands::ExportTypes { path } => commands::export_types(&path),
    }
}
