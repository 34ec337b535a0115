use serde::{Deserialize, Serialize};
use specta::Type;

pub const META_DESCRIPTION_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum MetaDescriptionLength {
    Good,
    TooLong,
}

impl MetaDescriptionLength {
    pub fn of(description: &str) -> Self {
        if description.chars().count() <= META_DESCRIPTION_MAX_CHARS {
            Self::Good
        } else {
            Self::TooLong
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "(Good)",
            Self::TooLong => "(Too long)",
        }
    }
}

/// "`<n> characters (Good)`" style annotation shown under each meta description.
pub fn describe_meta_description(description: &str) -> String {
    format!(
        "{} characters {}",
        description.chars().count(),
        MetaDescriptionLength::of(description).label()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum ScoreRating {
    Good,
    NeedsImprovement,
    Poor,
}

impl ScoreRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::NeedsImprovement
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_description_threshold() {
        assert_eq!(
            MetaDescriptionLength::of(&"a".repeat(160)),
            MetaDescriptionLength::Good
        );
        assert_eq!(
            MetaDescriptionLength::of(&"a".repeat(165)),
            MetaDescriptionLength::TooLong
        );
        assert_eq!(describe_meta_description(&"a".repeat(165)), "165 characters (Too long)");
        assert_eq!(describe_meta_description(&"a".repeat(160)), "160 characters (Good)");
    }

    #[test]
    fn test_meta_description_counts_characters_not_bytes() {
        let description = "é".repeat(160);
        assert_eq!(MetaDescriptionLength::of(&description), MetaDescriptionLength::Good);
    }

    #[test]
    fn test_score_rating_bands() {
        assert_eq!(ScoreRating::from_score(80.0), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(79.9), ScoreRating::NeedsImprovement);
        assert_eq!(ScoreRating::from_score(60.0), ScoreRating::NeedsImprovement);
        assert_eq!(ScoreRating::from_score(59.0).label(), "Poor");
    }
}
