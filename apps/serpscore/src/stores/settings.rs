use std::fs;
use std::path::{Path, PathBuf};

use seo_analyzer::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use specta::Type;

pub const ANALYZER_SETTINGS_KEY: &str = "analyzer_settings";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const APP_DIR: &str = "serpscore";
const STORE_FILE: &str = "settings.json";
const DATABASE_FILE: &str = "analyses.db";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct AnalyzerSettingsStore {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub database_url: Option<String>,
}

pub fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(STORE_FILE)
}

fn read_store(path: &Path) -> Result<Map<String, Value>, String> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings file {}: {e}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(format!("Settings file {} is not a JSON object", path.display())),
        Err(e) => Err(format!("Failed to parse settings file {}: {e}", path.display())),
    }
}

impl AnalyzerSettingsStore {
    pub fn get(path: &Path) -> Result<Option<Self>, String> {
        match read_store(path)?.remove(ANALYZER_SETTINGS_KEY) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| format!("Failed to deserialize analyzer settings store: {e}")),
            None => Ok(None),
        }
    }

    pub fn get_or_default(path: &Path) -> Result<Self, String> {
        Self::get(path).map(|settings| settings.unwrap_or_default())
    }

    /// Read-modify-write of this section only; other keys in the file are kept.
    pub fn update(path: &Path, update: impl FnOnce(&mut Self)) -> Result<Self, String> {
        let mut settings = Self::get_or_default(path)?;
        update(&mut settings);
        settings.save(path)?;
        Ok(settings)
    }

    fn save(&self, path: &Path) -> Result<(), String> {
        let mut store = read_store(path)?;
        store.insert(ANALYZER_SETTINGS_KEY.to_string(), json!(self));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&Value::Object(store))
            .map_err(|e| e.to_string())?;
        fs::write(path, contents)
            .map_err(|e| format!("Failed to write settings file {}: {e}", path.display()))
    }

    /// Stored key first, then the environment value.
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_key.filter(|k| !k.trim().is_empty()))
    }

    pub fn analyzer_config(&self, env_key: Option<String>) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::new(self.resolve_api_key(env_key));
        if let Some(model) = self.model.clone().filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(api_base) = self.api_base.clone().filter(|b| !b.trim().is_empty()) {
            config.api_base = api_base;
        }
        config
    }

    /// The configured database, or a sqlite file next to the settings file.
    pub fn database_url(&self, store_path: &Path) -> String {
        match self.database_url.as_ref().filter(|u| !u.trim().is_empty()) {
            Some(url) => url.clone(),
            None => {
                let dir = store_path.parent().unwrap_or_else(|| Path::new("."));
                format!("sqlite://{}?mode=rwc", dir.join(DATABASE_FILE).display())
            }
        }
    }

    /// The api key with all but its last four characters hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let visible: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", visible)
        })
    }
}
