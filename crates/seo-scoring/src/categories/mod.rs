pub mod content_quality;
pub mod keyword_placement;
pub mod linking;
pub mod title_readability;

pub use content_quality::ContentQualityCategory;
pub use keyword_placement::KeywordPlacementCategory;
pub use linking::LinkingCategory;
pub use title_readability::TitleReadabilityCategory;

use crate::rules::ScoreCategory;

/// The four categories in report order.
pub fn default_categories() -> Vec<Box<dyn ScoreCategory>> {
    vec![
        Box::new(KeywordPlacementCategory::new()),
        Box::new(LinkingCategory::new()),
        Box::new(TitleReadabilityCategory::new()),
        Box::new(ContentQualityCategory::new()),
    ]
}
