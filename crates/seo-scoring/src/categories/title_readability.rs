use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AnalysisType;
use crate::rules::{CategoryKey, Rule, ScoreCategory, ScoringContext};

static SLUG_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9-]+$").expect("valid regex"));

fn is_readable_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() < 50
        && !segment.contains("%20")
        && SLUG_SEGMENT.is_match(segment)
}

// Title Readability Category
pub struct TitleReadabilityCategory {}

impl Default for TitleReadabilityCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleReadabilityCategory {
    pub fn new() -> Self {
        Self {}
    }
}

impl ScoreCategory for TitleReadabilityCategory {
    fn key(&self) -> CategoryKey {
        CategoryKey::TitleReadability
    }

    fn available_rules(&self, analysis_type: AnalysisType) -> Vec<Rule> {
        if analysis_type.is_url_only() {
            return vec![Rule {
                id: "title.readable_url",
                passed_message: "URL is readable and well-structured",
                failed_message: "URL could be more readable and user-friendly",
                check: |ctx| {
                    ctx.path_segments()
                        .iter()
                        .any(|segment| is_readable_segment(segment))
                },
            }];
        }

        vec![
            Rule {
                id: "title.keyword_at_start",
                passed_message: "Focus keyword used at beginning of title",
                failed_message: "Focus keyword not at beginning of title",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_at_title_start,
                        &["beginning of title", "starts with keyword"],
                    )
                },
            },
            Rule {
                id: "title.has_sentiment",
                passed_message: "Title has positive or negative sentiment",
                failed_message: "Title lacks emotional sentiment",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.title_has_sentiment,
                        &["sentiment", "emotional", "engaging title"],
                    )
                },
            },
            Rule {
                id: "title.has_power_words",
                passed_message: "Title contains power words",
                failed_message: "Title lacks power words",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.title_has_power_words,
                        &["power word", "compelling word", "strong word"],
                    )
                },
            },
        ]
    }
}
