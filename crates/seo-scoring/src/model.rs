use serde::{Deserialize, Serialize};
use specta::Type;

/// Whether an analysis was grounded in fetched page content or only in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    #[default]
    FullContent,
    UrlOnly,
}

impl AnalysisType {
    pub fn from_content_available(content_available: bool) -> Self {
        if content_available {
            Self::FullContent
        } else {
            Self::UrlOnly
        }
    }

    pub fn is_url_only(&self) -> bool {
        matches!(self, Self::UrlOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullContent => "full-content",
            Self::UrlOnly => "url-only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Type)]
pub struct ContentAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// Structured content facts reported by the model.
///
/// Every flag is optional. A missing flag means the model did not report it,
/// and scoring falls back to phrase matching over `analysis.strengths` for
/// that flag alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct ContentSignals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_in_title: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_at_content_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_in_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_external_links: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_internal_links: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_at_title_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_has_sentiment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_has_power_words: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_in_subheadings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_in_image_alt: Option<bool>,
}

/// Structured SEO metadata generated for a single URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub primary_keywords: Vec<String>,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta_descriptions: Vec<String>,
    #[serde(default)]
    pub analysis: ContentAnalysis,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<ContentSignals>,
}

impl AnalysisResult {
    pub fn is_url_only(&self) -> bool {
        self.analysis_type.is_url_only()
    }

    /// True when any strength sentence contains one of `phrases`, ignoring case.
    pub fn strengths_mention(&self, phrases: &[&str]) -> bool {
        self.analysis.strengths.iter().any(|strength| {
            let strength = strength.to_lowercase();
            phrases.iter().any(|phrase| strength.contains(phrase))
        })
    }

    /// Reads one signal flag, falling back to strength phrases when the flag is absent.
    pub fn signal_or_strengths(
        &self,
        flag: impl Fn(&ContentSignals) -> Option<bool>,
        phrases: &[&str],
    ) -> bool {
        match self.signals.as_ref().and_then(flag) {
            Some(value) => value,
            None => self.strengths_mention(phrases),
        }
    }
}
