use serde::{Deserialize, Serialize};
use specta::Type;
use url::Url;

use crate::model::{AnalysisResult, AnalysisType};
use crate::score::{CategoryScore, ScoreCheck};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub enum CategoryKey {
    FocusKeywordPlacement,
    Linking,
    TitleReadability,
    ContentQuality,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 4] = [
        CategoryKey::FocusKeywordPlacement,
        CategoryKey::Linking,
        CategoryKey::TitleReadability,
        CategoryKey::ContentQuality,
    ];

    /// Share of the overall score, in percent. The four weights sum to 100.
    pub fn weight(&self) -> u32 {
        match self {
            CategoryKey::FocusKeywordPlacement => 40,
            CategoryKey::Linking => 20,
            CategoryKey::TitleReadability => 30,
            CategoryKey::ContentQuality => 10,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryKey::FocusKeywordPlacement => "Focus Keyword Placement",
            CategoryKey::Linking => "Linking",
            CategoryKey::TitleReadability => "Title Readability",
            CategoryKey::ContentQuality => "Content Quality",
        }
    }
}

/// Everything a rule may look at while scoring one analysis.
pub struct ScoringContext<'a> {
    pub result: &'a AnalysisResult,
    pub url: &'a str,
    pub focus_keyword: &'a str,
    path_segments: Vec<String>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(result: &'a AnalysisResult, url: &'a str, focus_keyword: &'a str) -> Self {
        // an unparsable URL yields no segments, so path based rules fail instead of erroring
        let path_segments = Url::parse(url)
            .map(|parsed| {
                parsed
                    .path()
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            result,
            url,
            focus_keyword,
            path_segments,
        }
    }

    pub fn analysis_type(&self) -> AnalysisType {
        self.result.analysis_type
    }

    /// Non-empty, still percent-encoded path segments of the analyzed URL.
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }
}

// Rule definition
#[derive(Clone)]
pub struct Rule {
    pub id: &'static str,
    pub passed_message: &'static str,
    pub failed_message: &'static str,
    pub check: fn(&ScoringContext<'_>) -> bool,
}

impl Rule {
    pub fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScoreCheck {
        let passed = (self.check)(ctx);
        ScoreCheck {
            rule_id: self.id.to_string(),
            passed,
            text: if passed {
                self.passed_message
            } else {
                self.failed_message
            }
            .to_string(),
        }
    }
}

// A scored group of rules with its own point budget per analysis type
pub trait ScoreCategory: Send + Sync {
    fn key(&self) -> CategoryKey;

    fn weight(&self) -> u32 {
        self.key().weight()
    }

    // Categories that need a focus keyword score zero without one
    fn requires_focus_keyword(&self) -> bool {
        false
    }

    fn available_rules(&self, analysis_type: AnalysisType) -> Vec<Rule>;

    fn max_points(&self, analysis_type: AnalysisType) -> u32 {
        self.available_rules(analysis_type).len() as u32
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> CategoryScore {
        let rules = self.available_rules(ctx.analysis_type());
        let max_points = rules.len() as u32;

        if self.requires_focus_keyword() && ctx.focus_keyword.is_empty() {
            return CategoryScore::empty(max_points);
        }

        let details: Vec<ScoreCheck> = rules.iter().map(|rule| rule.evaluate(ctx)).collect();
        let points = details.iter().filter(|check| check.passed).count() as u32;
        CategoryScore::new(points, max_points, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one_hundred() {
        let total: u32 = CategoryKey::ALL.iter().map(|key| key.weight()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_path_segments_skip_empty_parts() {
        let result = AnalysisResult::default();
        let ctx = ScoringContext::new(&result, "https://a.com//blog/seo-tips/", "");
        assert_eq!(ctx.path_segments(), ["blog", "seo-tips"]);
    }

    #[test]
    fn test_unparsable_url_has_no_segments() {
        let result = AnalysisResult::default();
        let ctx = ScoringContext::new(&result, "not a url", "");
        assert!(ctx.path_segments().is_empty());
    }

    #[test]
    fn test_category_key_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&CategoryKey::FocusKeywordPlacement).unwrap(),
            "\"focusKeywordPlacement\""
        );
    }
}
