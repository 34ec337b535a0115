use seo_scoring::{AnalysisResult, AnalysisType, ContentAnalysis};
use url::Url;

use super::prompt::truncate_chars;

const STRIPPED_SUFFIXES: [&str; 4] = [".html", ".htm", ".php", ".aspx"];
const MIN_PRIMARY_KEYWORDS: usize = 5;
const MAX_PRIMARY_KEYWORDS: usize = 7;
const META_DESCRIPTION_CHARS: usize = 160;

/// Turns a path segment into a keyword: decoded, suffix stripped, separators
/// replaced by spaces and lowercased.
pub fn segment_keyword(segment: &str) -> Option<String> {
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
        .to_lowercase();

    let stem = STRIPPED_SUFFIXES
        .iter()
        .find_map(|suffix| decoded.strip_suffix(suffix))
        .unwrap_or(&decoded);

    let keyword = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (!keyword.is_empty()).then_some(keyword)
}

/// First label of the host, ignoring a leading `www.`.
pub fn domain_label(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(str::to_lowercase)
}

/// Keywords derived from the URL path, in path order without duplicates.
pub fn keywords_from_url(url: &Url) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in url
        .path_segments()
        .into_iter()
        .flatten()
        .filter_map(segment_keyword)
    {
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Builds a minimal analysis from the URL alone, without any model call.
///
/// Strength sentences are fixed text with no URL words in them, and none of
/// them mention a phrase the scoring rules look for, so a fallback never
/// earns content points whatever the URL says.
pub fn fallback_analysis(url: &str, content_available: bool) -> AnalysisResult {
    let parsed = Url::parse(url).ok();
    let domain = parsed
        .as_ref()
        .and_then(domain_label)
        .unwrap_or_else(|| "website".to_string());
    let mut derived = parsed.as_ref().map(keywords_from_url).unwrap_or_default();
    if derived.is_empty() {
        derived.push(domain.clone());
    }
    let main = derived[0].clone();

    let mut primary_keywords: Vec<String> =
        derived.into_iter().take(MAX_PRIMARY_KEYWORDS).collect();
    for candidate in [
        format!("{} guide", main),
        format!("{} tips", main),
        format!("best {}", main),
        format!("{} {}", domain, main),
        format!("{} online", main),
    ] {
        if primary_keywords.len() >= MIN_PRIMARY_KEYWORDS {
            break;
        }
        push_unique(&mut primary_keywords, candidate);
    }

    let secondary_keywords = vec![
        format!("{} benefits", main),
        format!("{} examples", main),
        format!("{} checklist", main),
        format!("{} best practices", main),
        format!("how to choose {}", main),
        format!("{} resources", domain),
    ];

    let tags = vec![
        main.clone(),
        domain.clone(),
        format!("{} tips", main),
        format!("{} guide", main),
        format!("{} blog", domain),
        "seo".to_string(),
    ];

    let meta_descriptions = [
        format!(
            "Learn everything about {} on {}. Practical advice and answers to common questions.",
            main, domain
        ),
        format!(
            "Discover {} tips and best practices from {}, explained in plain language.",
            main, domain
        ),
        format!(
            "Looking for {}? {} covers what you need to know to get started today.",
            main, domain
        ),
    ]
    .into_iter()
    .map(|description| truncate_chars(&description, META_DESCRIPTION_CHARS).to_string())
    .collect();

    let mut weaknesses =
        vec!["Suggestions were inferred from the URL and may not match what the page is about".to_string()];
    if content_available {
        weaknesses.push("The automated review of the page did not produce a usable result".to_string());
    } else {
        weaknesses.push("Page content could not be retrieved, so nothing on the page was reviewed".to_string());
    }

    AnalysisResult {
        primary_keywords,
        secondary_keywords,
        tags,
        meta_descriptions,
        analysis: ContentAnalysis {
            strengths: vec![
                "The page has a well-formed, crawlable address".to_string(),
                "The address is readable without query parameters".to_string(),
            ],
            weaknesses,
        },
        recommendations: vec![
            format!("Build the page around one clear topic, such as \"{}\"", main),
            format!("Make sure the page title includes \"{}\"", main),
            format!("Write a meta description under 160 characters that mentions \"{}\"", main),
            "Run the analysis again once the page content is reachable".to_string(),
        ],
        analysis_type: AnalysisType::from_content_available(content_available),
        url: Some(url.to_string()),
        signals: None,
    }
}
