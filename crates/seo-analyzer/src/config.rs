use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A passthrough endpoint that fetches a third-party page on our behalf.
///
/// `template` may contain `{url}` (percent-encoded target) and `{raw_url}`
/// (target inserted verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,
    pub template: String,
}

impl RelayConfig {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    pub fn build_url(&self, target: &str) -> String {
        self.template
            .replace("{url}", &urlencoding::encode(target))
            .replace("{raw_url}", target)
    }
}

pub fn default_relays() -> Vec<RelayConfig> {
    vec![
        RelayConfig::new("corsproxy", "https://corsproxy.io/?{url}"),
        RelayConfig::new("allorigins", "https://api.allorigins.win/raw?url={url}"),
        RelayConfig::new("cors-anywhere", "https://cors-anywhere.herokuapp.com/{raw_url}"),
    ]
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model_timeout_secs: u64,
    pub relays: Vec<RelayConfig>,
    pub relay_timeout_secs: u64,
    pub min_content_chars: usize,
    pub max_content_chars: usize,
}

impl AnalyzerConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// The configured API key, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 1500,
            model_timeout_secs: 60,
            relays: default_relays(),
            relay_timeout_secs: 10,
            min_content_chars: 500,
            max_content_chars: 15_000,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("relays", &self.relays)
            .field("relay_timeout_secs", &self.relay_timeout_secs)
            .field("min_content_chars", &self.min_content_chars)
            .field("max_content_chars", &self.max_content_chars)
            .finish()
    }
}
