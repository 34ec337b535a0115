use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AnalysisType;
use crate::rules::{CategoryKey, Rule, ScoreCategory, ScoringContext};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercases the keyword and joins its words with hyphens, the way they appear in a slug.
pub fn keyword_slug(keyword: &str) -> String {
    WHITESPACE
        .replace_all(&keyword.to_lowercase(), "-")
        .into_owned()
}

// Keyword Placement Category
pub struct KeywordPlacementCategory {}

impl Default for KeywordPlacementCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordPlacementCategory {
    pub fn new() -> Self {
        Self {}
    }

    fn structural_rules() -> Vec<Rule> {
        vec![
            Rule {
                id: "focus_keyword.in_title",
                passed_message: "Focus keyword found in SEO title",
                failed_message: "Focus keyword missing from SEO title",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_in_title,
                        &["keyword in title", "title contains keyword"],
                    )
                },
            },
            Rule {
                id: "focus_keyword.in_meta_description",
                passed_message: "Focus keyword found in meta description",
                failed_message: "Focus keyword missing from meta description",
                check: |ctx| {
                    let keyword = ctx.focus_keyword.to_lowercase();
                    ctx.result
                        .meta_descriptions
                        .iter()
                        .any(|desc| desc.to_lowercase().contains(&keyword))
                },
            },
            Rule {
                id: "focus_keyword.in_url",
                passed_message: "Focus keyword found in URL",
                failed_message: "Focus keyword missing from URL",
                check: |ctx| {
                    ctx.url
                        .to_lowercase()
                        .contains(&keyword_slug(ctx.focus_keyword))
                },
            },
        ]
    }

    fn content_rules() -> Vec<Rule> {
        vec![
            Rule {
                id: "focus_keyword.at_content_start",
                passed_message: "Focus keyword found in first 10% of content",
                failed_message: "Focus keyword missing from first 10% of content",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_at_content_start,
                        &["beginning of content", "first paragraph"],
                    )
                },
            },
            Rule {
                id: "focus_keyword.in_content",
                passed_message: "Focus keyword found in content",
                failed_message: "Focus keyword missing from content",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_in_content,
                        &["keyword density", "keyword appears"],
                    )
                },
            },
        ]
    }
}

impl ScoreCategory for KeywordPlacementCategory {
    fn key(&self) -> CategoryKey {
        CategoryKey::FocusKeywordPlacement
    }

    fn requires_focus_keyword(&self) -> bool {
        true
    }

    fn available_rules(&self, analysis_type: AnalysisType) -> Vec<Rule> {
        let mut rules = Self::structural_rules();
        // content checks are skipped, not failed, when only the URL was analyzed
        if !analysis_type.is_url_only() {
            rules.extend(Self::content_rules());
        }
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisResult, ContentSignals};

    fn result_with(strengths: &[&str], analysis_type: AnalysisType) -> AnalysisResult {
        let mut result = AnalysisResult {
            analysis_type,
            meta_descriptions: vec![
                "Learn SEO audit basics in minutes.".to_string(),
                "A quick checklist for technical SEO.".to_string(),
                "Improve rankings with better content.".to_string(),
            ],
            ..Default::default()
        };
        result.analysis.strengths = strengths.iter().map(|s| s.to_string()).collect();
        result
    }

    #[test]
    fn test_keyword_slug() {
        assert_eq!(keyword_slug("SEO  Audit Guide"), "seo-audit-guide");
        assert_eq!(keyword_slug("single"), "single");
    }

    #[test]
    fn test_full_content_all_passed() {
        let result = result_with(
            &[
                "Title contains keyword prominently",
                "Keyword appears at the beginning of content",
                "Healthy keyword density throughout",
            ],
            AnalysisType::FullContent,
        );
        let ctx = ScoringContext::new(&result, "https://example.com/seo-audit", "SEO audit");
        let score = KeywordPlacementCategory::new().evaluate(&ctx);
        assert_eq!(score.max_points, 5);
        assert_eq!(score.points, 5);
        assert_eq!(score.score, 100.0);
        assert!(score.details.iter().all(|d| d.passed));
    }

    #[test]
    fn test_url_only_skips_content_checks() {
        let result = result_with(&[], AnalysisType::UrlOnly);
        let ctx = ScoringContext::new(&result, "https://example.com/seo-audit", "seo audit");
        let score = KeywordPlacementCategory::new().evaluate(&ctx);
        assert_eq!(score.max_points, 3);
        assert_eq!(score.details.len(), 3);
        // meta description and URL match, title does not
        assert_eq!(score.points, 2);
        assert_eq!(score.details[0].text, "Focus keyword missing from SEO title");
        assert_eq!(score.details[2].text, "Focus keyword found in URL");
    }

    #[test]
    fn test_empty_focus_keyword_scores_zero_without_details() {
        let result = result_with(&["Keyword in title"], AnalysisType::FullContent);
        let ctx = ScoringContext::new(&result, "https://example.com/", "");
        let score = KeywordPlacementCategory::new().evaluate(&ctx);
        assert_eq!(score.score, 0.0);
        assert_eq!(score.points, 0);
        assert!(score.details.is_empty());
    }

    #[test]
    fn test_explicit_signal_overrides_strength_text() {
        let mut result = result_with(&["Keyword in title"], AnalysisType::FullContent);
        result.signals = Some(ContentSignals {
            keyword_in_title: Some(false),
            keyword_in_content: Some(true),
            ..Default::default()
        });
        let ctx = ScoringContext::new(&result, "https://example.com/", "crm");
        let score = KeywordPlacementCategory::new().evaluate(&ctx);
        let by_id = |id: &str| {
            score
                .details
                .iter()
                .find(|d| d.rule_id == id)
                .map(|d| d.passed)
                .unwrap()
        };
        assert!(!by_id("focus_keyword.in_title"));
        assert!(by_id("focus_keyword.in_content"));
    }
}
