pub const SYSTEM_INSTRUCTION: &str = "You are an SEO expert assistant. Analyze webpages and provide SEO optimization suggestions. Respond with a single JSON object and nothing else.";

const RESPONSE_SCHEMA: &str = r#"{
  "primaryKeywords": ["keyword1", "keyword2", ...],
  "secondaryKeywords": ["keyword1", "keyword2", ...],
  "tags": ["tag1", "tag2", ...],
  "metaDescriptions": ["description1", "description2", "description3"],
  "analysis": {
    "strengths": ["strength1", "strength2", ...],
    "weaknesses": ["weakness1", "weakness2", ...]
  },
  "recommendations": ["recommendation1", "recommendation2", ...],
  "signals": {
    "keywordInTitle": true,
    "keywordAtContentStart": true,
    "keywordInContent": true,
    "hasExternalLinks": true,
    "hasInternalLinks": true,
    "keywordAtTitleStart": true,
    "titleHasSentiment": true,
    "titleHasPowerWords": true,
    "keywordInSubheadings": true,
    "keywordInImageAlt": true
  }
}"#;

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub fn full_content_prompt(url: &str, content: &str, max_content_chars: usize) -> String {
    let content = truncate_chars(content, max_content_chars);
    format!(
        r#"Analyze the following webpage content for SEO optimization:
URL: {url}

Content:
{content}

Please provide:
1. 5-7 primary keywords that best represent the content, most relevant first
2. 5-7 secondary keywords that could improve SEO
3. 5-7 relevant tags for the content
4. 3 optimized meta descriptions (under 160 characters each)
5. A brief analysis of the content's SEO strengths and weaknesses
6. 3-5 specific recommendations to improve SEO
7. Signals: for the most relevant primary keyword, report true or false for each flag in "signals" based on the content above

Format your response as a JSON object with the following structure:
{RESPONSE_SCHEMA}

Respond with the JSON object only. Do not add any text before or after it."#
    )
}

pub fn url_only_prompt(url: &str) -> String {
    format!(
        r#"The content of the following webpage could not be retrieved:
URL: {url}

Infer plausible SEO metadata from the URL alone: use the words in the path segments and the domain name to guess what the page is about. Treat everything you produce as speculative and say so in the analysis weaknesses.

Please provide:
1. 5-7 primary keywords suggested by the URL, most relevant first
2. 5-7 secondary keywords that could improve SEO
3. 5-7 relevant tags
4. 3 optimized meta descriptions (under 160 characters each)
5. A brief analysis of the URL's SEO strengths and weaknesses
6. 3-5 specific recommendations to improve SEO
7. Omit the "signals" object, since the page content is unknown

Format your response as a JSON object with the following structure:
{RESPONSE_SCHEMA}

Respond with the JSON object only. Do not add any text before or after it."#
    )
}

pub fn build_prompt(url: &str, content: Option<&str>, max_content_chars: usize) -> String {
    match content {
        Some(content) => full_content_prompt(url, content, max_content_chars),
        None => url_only_prompt(url),
    }
}
