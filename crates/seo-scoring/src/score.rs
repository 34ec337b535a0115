use serde::{Deserialize, Serialize};
use specta::Type;

use crate::categories::default_categories;
use crate::model::AnalysisResult;
use crate::rules::{CategoryKey, ScoringContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCheck {
    pub rule_id: String,
    pub passed: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    /// Percentage of points earned, 0 to 100.
    pub score: f64,
    pub details: Vec<ScoreCheck>,
    pub points: u32,
    pub max_points: u32,
}

impl CategoryScore {
    pub fn new(points: u32, max_points: u32, details: Vec<ScoreCheck>) -> Self {
        let score = if max_points == 0 {
            0.0
        } else {
            f64::from(points) / f64::from(max_points) * 100.0
        };
        Self {
            score,
            details,
            points,
            max_points,
        }
    }

    pub fn empty(max_points: u32) -> Self {
        Self::new(0, max_points, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub focus_keyword_placement: CategoryScore,
    pub linking: CategoryScore,
    pub title_readability: CategoryScore,
    pub content_quality: CategoryScore,
}

impl CategoryScores {
    pub fn get(&self, key: CategoryKey) -> &CategoryScore {
        match key {
            CategoryKey::FocusKeywordPlacement => &self.focus_keyword_placement,
            CategoryKey::Linking => &self.linking,
            CategoryKey::TitleReadability => &self.title_readability,
            CategoryKey::ContentQuality => &self.content_quality,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, &CategoryScore)> {
        CategoryKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Weighted sum of the category percentages, rounded to the nearest integer.
    pub fn overall(&self) -> u32 {
        let total: f64 = self
            .iter()
            .map(|(key, category)| category.score * f64::from(key.weight()) / 100.0)
            .sum();
        total.round().clamp(0.0, 100.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetail {
    pub scores: CategoryScores,
    pub overall_score: u32,
    pub focus_keyword: String,
    pub is_url_only_analysis: bool,
}

/// The user's keyword wins; otherwise the top primary keyword, otherwise empty.
pub fn resolve_focus_keyword(result: &AnalysisResult, user_focus_keyword: &str) -> String {
    let user_focus_keyword = user_focus_keyword.trim();
    if !user_focus_keyword.is_empty() {
        return user_focus_keyword.to_string();
    }
    result
        .primary_keywords
        .first()
        .cloned()
        .unwrap_or_default()
}

/// Scores an analysis result. Deterministic: equal inputs always give equal output.
pub fn calculate_seo_score(
    result: &AnalysisResult,
    url: &str,
    user_focus_keyword: &str,
) -> ScoreDetail {
    let focus_keyword = resolve_focus_keyword(result, user_focus_keyword);
    let ctx = ScoringContext::new(result, url, &focus_keyword);

    let mut evaluated = default_categories()
        .into_iter()
        .map(|category| (category.key(), category.evaluate(&ctx)));

    let mut take = |expected: CategoryKey| {
        evaluated
            .find(|(key, _)| *key == expected)
            .map(|(_, score)| score)
            .unwrap_or_else(|| CategoryScore::empty(0))
    };

    let scores = CategoryScores {
        focus_keyword_placement: take(CategoryKey::FocusKeywordPlacement),
        linking: take(CategoryKey::Linking),
        title_readability: take(CategoryKey::TitleReadability),
        content_quality: take(CategoryKey::ContentQuality),
    };

    ScoreDetail {
        overall_score: scores.overall(),
        scores,
        is_url_only_analysis: result.is_url_only(),
        focus_keyword,
    }
}
