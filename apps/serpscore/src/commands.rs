use std::path::Path;

use anyhow::{Context, Result};
use seo_analyzer::{AnalysisReport, CancellationToken, Pipeline};
use seo_scoring::{calculate_seo_score, AnalysisResult, ScoreDetail};
use seo_storage::entities::AnalysisModel;
use seo_storage::{save_analysis, AnalysisQuery, AnalysisStore, SeoStorage};
use specta::TypeCollection;
use specta_typescript::Typescript;
use tracing::{info, warn};

use crate::stores::settings::{AnalyzerSettingsStore, API_KEY_ENV};

async fn open_storage(settings: &AnalyzerSettingsStore, store_path: &Path) -> Result<SeoStorage> {
    if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let storage = SeoStorage::connect(&settings.database_url(store_path)).await?;
    storage.migrate().await?;
    Ok(storage)
}

pub async fn analyze(
    store_path: &Path,
    url: &str,
    keyword: &str,
    json: bool,
    save: bool,
) -> Result<()> {
    let settings = AnalyzerSettingsStore::get_or_default(store_path).map_err(anyhow::Error::msg)?;
    let config = settings.analyzer_config(std::env::var(API_KEY_ENV).ok());
    let pipeline = Pipeline::new(&config)?;

    let token = CancellationToken::new();
    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };
    let outcome = pipeline.analyze_with_cancel(url, keyword, &token).await;
    ctrl_c.abort();
    let report = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", crate::report::render_report(&report));
    }

    if save {
        // a failed save never hides the analysis that was already printed
        if let Err(e) = save_report(&settings, store_path, url, keyword, &report).await {
            warn!("Failed to save analysis: {:#}", e);
            eprintln!("Note: the analysis could not be saved ({e})");
        }
    }
    Ok(())
}

async fn save_report(
    settings: &AnalyzerSettingsStore,
    store_path: &Path,
    url: &str,
    keyword: &str,
    report: &AnalysisReport,
) -> Result<()> {
    let storage = open_storage(settings, store_path).await?;
    let outcome = save_analysis(&storage, url.trim(), keyword, &report.result, &report.score).await?;
    info!("Saved analysis #{}", outcome.id());
    if let Some(notice) = outcome.notice() {
        eprintln!("Note: {notice}");
    }
    Ok(())
}

pub async fn history(store_path: &Path, url: Option<String>, limit: u64, json: bool) -> Result<()> {
    let settings = AnalyzerSettingsStore::get_or_default(store_path).map_err(anyhow::Error::msg)?;
    let storage = open_storage(&settings, store_path).await?;
    let records = storage
        .select(AnalysisQuery {
            url,
            ..AnalysisQuery::newest(limit)
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", crate::report::render_history(&records));
    }
    Ok(())
}

/// Loads a saved record and rescores its stored result against the stored keyword.
async fn load_saved(
    storage: &SeoStorage,
    id: i32,
) -> Result<(AnalysisModel, AnalysisResult, ScoreDetail)> {
    let record = storage
        .find(id)
        .await?
        .with_context(|| format!("No analysis with id {id}"))?;
    let result = record
        .analysis_result()
        .with_context(|| format!("Analysis #{id} holds an unreadable result"))?;
    let focus_keyword = record.stored_focus_keyword().unwrap_or_default();
    let score = calculate_seo_score(&result, &record.url, &focus_keyword);
    Ok((record, result, score))
}

pub async fn show(store_path: &Path, id: i32, json: bool) -> Result<()> {
    let settings = AnalyzerSettingsStore::get_or_default(store_path).map_err(anyhow::Error::msg)?;
    let storage = open_storage(&settings, store_path).await?;
    let (record, result, score) = load_saved(&storage, id).await?;

    if json {
        let saved = serde_json::json!({
            "id": record.id,
            "url": record.url,
            "createdAt": record.created_at,
            "result": result,
            "score": score,
        });
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        print!("{}", crate::report::render_saved(&record, &result, &score));
    }
    Ok(())
}

pub async fn delete(store_path: &Path, id: i32) -> Result<()> {
    let settings = AnalyzerSettingsStore::get_or_default(store_path).map_err(anyhow::Error::msg)?;
    let storage = open_storage(&settings, store_path).await?;
    if storage.delete(id).await? {
        println!("Deleted analysis #{id}");
    } else {
        anyhow::bail!("No analysis with id {id}");
    }
    Ok(())
}

pub fn show_settings(store_path: &Path) -> Result<()> {
    let settings = AnalyzerSettingsStore::get_or_default(store_path).map_err(anyhow::Error::msg)?;
    let config = settings.analyzer_config(std::env::var(API_KEY_ENV).ok());

    println!("Settings file: {}", store_path.display());
    println!(
        "API key:       {}",
        match (settings.masked_api_key(), config.has_credential()) {
            (Some(masked), _) => masked,
            (None, true) => format!("(from {API_KEY_ENV})"),
            (None, false) => "(not set)".to_string(),
        }
    );
    println!("Model:         {}", config.model);
    println!("API base:      {}", config.api_base);
    println!("Database:      {}", settings.database_url(store_path));
    Ok(())
}

pub fn update_settings(store_path: &Path, update: impl FnOnce(&mut AnalyzerSettingsStore)) -> Result<()> {
    AnalyzerSettingsStore::update(store_path, update).map_err(anyhow::Error::msg)?;
    println!("Settings saved to {}", store_path.display());
    Ok(())
}

pub fn export_types(path: &Path) -> Result<()> {
    let mut types = TypeCollection::default();
    types
        .register::<AnalysisResult>()
        .register::<ScoreDetail>()
        .register::<AnalysisReport>()
        .register::<seo_storage::SaveOutcome>()
        .register::<seo_storage::entities::AnalysisModel>();

    Typescript::default()
        .export_to(path, &types)
        .with_context(|| format!("Failed to export typescript bindings to {}", path.display()))?;
    println!("Exported TypeScript bindings to {}", path.display());
    Ok(())
}
