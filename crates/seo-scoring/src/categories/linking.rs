use crate::model::AnalysisType;
use crate::rules::{CategoryKey, Rule, ScoreCategory, ScoringContext};

const EXTERNAL_LINK_PHRASES: &[&str] = &["external link", "outbound link"];
const INTERNAL_LINK_PHRASES: &[&str] = &["internal link", "links to other"];

fn has_external_links(ctx: &ScoringContext<'_>) -> bool {
    ctx.result
        .signal_or_strengths(|s| s.has_external_links, EXTERNAL_LINK_PHRASES)
}

// Linking Category
pub struct LinkingCategory {}

impl Default for LinkingCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkingCategory {
    pub fn new() -> Self {
        Self {}
    }
}

impl ScoreCategory for LinkingCategory {
    fn key(&self) -> CategoryKey {
        CategoryKey::Linking
    }

    fn available_rules(&self, analysis_type: AnalysisType) -> Vec<Rule> {
        if analysis_type.is_url_only() {
            return vec![Rule {
                id: "linking.url_hierarchy",
                passed_message: "URL structure suggests proper site hierarchy",
                failed_message: "URL structure may not reflect proper site hierarchy",
                check: |ctx| ctx.path_segments().len() > 1,
            }];
        }

        vec![
            Rule {
                id: "linking.has_external_links",
                passed_message: "External links found in content",
                failed_message: "No external links found",
                check: has_external_links,
            },
            // Same check as linking.has_external_links; the signal is counted twice
            // until product decides whether the extra weight is intended.
            Rule {
                id: "linking.has_at_least_one_external_link",
                passed_message: "At least one external link present",
                failed_message: "Missing at least one external link",
                check: has_external_links,
            },
            Rule {
                id: "linking.has_internal_links",
                passed_message: "Internal links to other resources found",
                failed_message: "No internal links found",
                check: |ctx| {
                    ctx.result
                        .signal_or_strengths(|s| s.has_internal_links, INTERNAL_LINK_PHRASES)
                },
            },
        ]
    }
}
