pub mod categories;
pub mod display;
pub mod model;
pub mod rules;
pub mod score;

pub use display::{MetaDescriptionLength, ScoreRating, describe_meta_description};
pub use model::{AnalysisResult, AnalysisType, ContentAnalysis, ContentSignals};
pub use rules::{CategoryKey, Rule, ScoreCategory, ScoringContext};
pub use score::{
    CategoryScore, CategoryScores, ScoreCheck, ScoreDetail, calculate_seo_score,
    resolve_focus_keyword,
};
