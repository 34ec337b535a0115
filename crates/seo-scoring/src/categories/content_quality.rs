use crate::model::AnalysisType;
use crate::rules::{CategoryKey, Rule, ScoreCategory};

// Content Quality Category
pub struct ContentQualityCategory {}

impl Default for ContentQualityCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentQualityCategory {
    pub fn new() -> Self {
        Self {}
    }
}

impl ScoreCategory for ContentQualityCategory {
    fn key(&self) -> CategoryKey {
        CategoryKey::ContentQuality
    }

    fn available_rules(&self, analysis_type: AnalysisType) -> Vec<Rule> {
        if analysis_type.is_url_only() {
            return vec![Rule {
                id: "content.descriptive_url",
                passed_message: "URL suggests descriptive content structure",
                failed_message: "URL structure could be more descriptive",
                check: |ctx| {
                    ctx.path_segments()
                        .iter()
                        .any(|segment| segment.len() > 3 && segment.contains('-'))
                },
            }];
        }

        vec![
            Rule {
                id: "content.keyword_in_subheadings",
                passed_message: "Focus keyword found in subheadings",
                failed_message: "Focus keyword missing from subheadings",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_in_subheadings,
                        &["subheading", "heading"],
                    )
                },
            },
            Rule {
                id: "content.keyword_in_image_alt",
                passed_message: "Focus keyword found in image alt attributes",
                failed_message: "Focus keyword missing from image alt attributes",
                check: |ctx| {
                    ctx.result.signal_or_strengths(
                        |s| s.keyword_in_image_alt,
                        &["image alt", "alt text", "alt attribute"],
                    )
                },
            },
        ]
    }
}
