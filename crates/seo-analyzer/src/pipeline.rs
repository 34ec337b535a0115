use std::fmt;

use seo_scoring::{calculate_seo_score, AnalysisResult, ScoreDetail};
use serde::{Deserialize, Serialize};
use specta::Type;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AnalyzerConfig;
use crate::fetcher::ContentFetcher;
use crate::generator::{AnalysisGenerationError, AnalysisGenerator, AnalysisSource};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("No model API key configured")]
    MissingCredential,
    #[error("Failed to set up analysis pipeline: {0}")]
    Setup(String),
    #[error("Analysis generation failed: {0}")]
    Generation(#[from] AnalysisGenerationError),
    #[error("Analysis was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Idle,
    Fetching,
    Generating,
    Scoring,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Generating => "generating",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub score: ScoreDetail,
    pub source: AnalysisSource,
    /// Relay that supplied the page content, absent for url-only analyses.
    pub relay: Option<String>,
}

/// Accepts absolute URLs that can carry a path, e.g. `https://example.com/page`.
pub fn validate_url(url: &str) -> Result<Url, PipelineError> {
    let parsed = Url::parse(url).map_err(|e| PipelineError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() {
        return Err(PipelineError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host or path".to_string(),
        });
    }

    Ok(parsed)
}

/// Fetch, generate and score, strictly in that order.
///
/// A failed fetch downgrades the run to a url-only analysis instead of
/// failing it. Only invalid input, a missing credential, a failed model call
/// or cancellation end a run with an error.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: ContentFetcher,
    generator: AnalysisGenerator,
    has_credential: bool,
}

impl Pipeline {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, PipelineError> {
        let fetcher = ContentFetcher::new(config).map_err(|e| PipelineError::Setup(e.to_string()))?;
        let generator =
            AnalysisGenerator::new(config).map_err(|e| PipelineError::Setup(e.to_string()))?;
        Ok(Self::from_parts(fetcher, generator, config.has_credential()))
    }

    pub fn from_parts(
        fetcher: ContentFetcher,
        generator: AnalysisGenerator,
        has_credential: bool,
    ) -> Self {
        Self {
            fetcher,
            generator,
            has_credential,
        }
    }

    pub async fn analyze(
        &self,
        url: &str,
        focus_keyword: &str,
    ) -> Result<AnalysisReport, PipelineError> {
        self.analyze_with_progress(url, focus_keyword, |_| {}).await
    }

    /// Runs the pipeline until it finishes or `token` is cancelled, whichever
    /// comes first. A cancelled run leaves nothing behind.
    pub async fn analyze_with_cancel(
        &self,
        url: &str,
        focus_keyword: &str,
        token: &CancellationToken,
    ) -> Result<AnalysisReport, PipelineError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Analysis of {} cancelled", url);
                Err(PipelineError::Cancelled)
            }
            report = self.analyze(url, focus_keyword) => report,
        }
    }

    pub async fn analyze_with_progress<F>(
        &self,
        url: &str,
        focus_keyword: &str,
        mut on_stage: F,
    ) -> Result<AnalysisReport, PipelineError>
    where
        F: FnMut(PipelineStage) + Send,
    {
        let url = url.trim();
        debug!("Pipeline {} for {}", PipelineStage::Idle, url);
        validate_url(url)?;

        if !self.has_credential {
            return Err(PipelineError::MissingCredential);
        }

        let mut enter = |stage: PipelineStage| {
            debug!("Pipeline stage {} for {}", stage, url);
            on_stage(stage);
        };

        enter(PipelineStage::Fetching);
        let (content, relay) = match self.fetcher.fetch(url).await {
            Ok(fetched) => (Some(fetched.content), Some(fetched.relay)),
            Err(e) => {
                warn!(
                    "Could not fetch content for {}, continuing with a url-only analysis: {}",
                    url, e
                );
                (None, None)
            }
        };

        enter(PipelineStage::Generating);
        let generation = self
            .generator
            .generate_with_source(url, content.as_deref(), content.is_some())
            .await?;

        enter(PipelineStage::Scoring);
        let score = calculate_seo_score(&generation.result, url, focus_keyword);

        enter(PipelineStage::Done);
        info!(
            "Analyzed {} ({}, {}): overall score {}",
            url,
            generation.result.analysis_type.as_str(),
            generation.source.as_str(),
            score.overall_score
        );

        Ok(AnalysisReport {
            result: generation.result,
            score,
            source: generation.source,
            relay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::test_server::{chat_completion, html_page, start_test_server, TestServer};
    use seo_scoring::{AnalysisType, CategoryKey};

    const MODEL_JSON: &str = r#"{
        "primaryKeywords": ["cardiac care", "heart health", "cardiology", "heart disease", "checkups"],
        "secondaryKeywords": ["blood pressure", "cholesterol", "exercise", "diet", "stress"],
        "tags": ["health", "heart", "care", "medicine", "wellness"],
        "metaDescriptions": [
            "Cardiac care basics: how to keep your heart healthy.",
            "Learn about cardiology checkups and heart disease prevention.",
            "A practical guide to heart health."
        ],
        "analysis": {
            "strengths": ["Keyword in title", "Links to other guides on the site"],
            "weaknesses": ["No outbound references"]
        },
        "recommendations": ["Cite medical sources", "Add an FAQ", "Compress images"],
        "signals": {
            "keywordInTitle": true,
            "keywordAtContentStart": true,
            "keywordInContent": true,
            "hasExternalLinks": false,
            "hasInternalLinks": true,
            "keywordAtTitleStart": true,
            "titleHasSentiment": false,
            "titleHasPowerWords": false,
            "keywordInSubheadings": true,
            "keywordInImageAlt": false
        }
    }"#;

    fn config(server: &TestServer, relays: &[&str], api_key: Option<&str>) -> AnalyzerConfig {
        AnalyzerConfig {
            api_key: api_key.map(str::to_string),
            api_base: server.url("/v1"),
            relays: relays
                .iter()
                .map(|path| RelayConfig::new(path.trim_start_matches('/'), server.url(&format!("{}?url={{url}}", path))))
                .collect(),
            ..AnalyzerConfig::default()
        }
    }

    fn max_points(score: &ScoreDetail) -> Vec<u32> {
        CategoryKey::ALL
            .iter()
            .map(|key| score.scores.get(*key).max_points)
            .collect()
    }

    #[tokio::test]
    async fn test_full_content_analysis() {
        let server = start_test_server(vec![
            ("/blocked", 403, "forbidden".to_string()),
            ("/relay", 200, html_page(800)),
            ("/v1/chat/completions", 200, chat_completion(MODEL_JSON)),
        ])
        .await;
        let pipeline = Pipeline::new(&config(&server, &["/blocked", "/relay"], Some("sk-test"))).unwrap();

        let report = pipeline
            .analyze("https://a.com/cardiac-care-guide", "cardiac care")
            .await
            .unwrap();

        assert_eq!(report.result.analysis_type, AnalysisType::FullContent);
        assert_eq!(report.source, AnalysisSource::Model);
        assert_eq!(report.relay.as_deref(), Some("relay"));
        assert_eq!(max_points(&report.score), vec![5, 3, 3, 2]);
        assert!(!report.score.is_url_only_analysis);
        assert_eq!(report.score.focus_keyword, "cardiac care");
        // title, meta, url, start and body all hold the keyword
        assert_eq!(report.score.scores.focus_keyword_placement.points, 5);
        assert_eq!(report.score.scores.linking.points, 1);

        let model_request = server
            .requests()
            .into_iter()
            .find(|r| r.path == "/v1/chat/completions")
            .unwrap();
        assert!(model_request.body.contains("Cardiac Care Guide"));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_url_only() {
        let server = start_test_server(vec![
            ("/short", 200, "<html></html>".to_string()),
            ("/v1/chat/completions", 200, chat_completion(MODEL_JSON)),
        ])
        .await;
        let pipeline = Pipeline::new(&config(&server, &["/short", "/missing"], Some("sk-test"))).unwrap();

        let report = pipeline.analyze("https://a.com/blog/heart", "").await.unwrap();

        assert_eq!(report.result.analysis_type, AnalysisType::UrlOnly);
        assert!(report.score.is_url_only_analysis);
        assert_eq!(max_points(&report.score), vec![3, 1, 1, 1]);
        assert_eq!(report.relay, None);
        assert_eq!(report.score.focus_keyword, "cardiac care");

        let model_request = server
            .requests()
            .into_iter()
            .find(|r| r.path == "/v1/chat/completions")
            .unwrap();
        assert!(!model_request.body.contains("Content:"));
    }

    #[tokio::test]
    async fn test_url_only_fallback_scenario() {
        let server = start_test_server(vec![(
            "/v1/chat/completions",
            200,
            chat_completion("I'm not able to browse that page."),
        )])
        .await;
        let pipeline = Pipeline::new(&config(&server, &["/down"], Some("sk-test"))).unwrap();

        let report = pipeline
            .analyze("https://a.com/cardiac-care-guide", "")
            .await
            .unwrap();

        assert_eq!(report.source, AnalysisSource::Fallback);
        assert_eq!(report.result.analysis_type, AnalysisType::UrlOnly);
        assert_eq!(report.score.scores.linking.max_points, 1);
        assert_eq!(report.score.scores.linking.score, 0.0);
        assert!(report.score.overall_score <= 100);
    }

    #[tokio::test]
    async fn test_progress_reports_each_stage_in_order() {
        let server = start_test_server(vec![(
            "/v1/chat/completions",
            200,
            chat_completion(MODEL_JSON),
        )])
        .await;
        let pipeline = Pipeline::new(&config(&server, &[], Some("sk-test"))).unwrap();

        let mut stages = Vec::new();
        pipeline
            .analyze_with_progress("https://a.com/", "", |stage| stages.push(stage))
            .await
            .unwrap();

        assert_eq!(
            stages,
            vec![
                PipelineStage::Fetching,
                PipelineStage::Generating,
                PipelineStage::Scoring,
                PipelineStage::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let server = start_test_server(vec![("/relay", 200, html_page(800))]).await;
        let pipeline = Pipeline::new(&config(&server, &["/relay"], Some("  "))).unwrap();

        let err = pipeline.analyze("https://a.com/", "").await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingCredential));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_urls_are_rejected() {
        let server = start_test_server(vec![]).await;
        let pipeline = Pipeline::new(&config(&server, &["/relay"], Some("sk-test"))).unwrap();

        for url in ["not a url", "/relative/path", "mailto:someone@example.com", ""] {
            let err = pipeline.analyze(url, "").await.unwrap_err();
            assert!(matches!(err, PipelineError::InvalidUrl { .. }), "{}", url);
        }
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_model_auth_failure_is_fatal() {
        let server = start_test_server(vec![
            ("/relay", 200, html_page(800)),
            (
                "/v1/chat/completions",
                401,
                r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
            ),
        ])
        .await;
        let pipeline = Pipeline::new(&config(&server, &["/relay"], Some("sk-bad"))).unwrap();

        let err = pipeline.analyze("https://a.com/", "").await.unwrap_err();
        match err {
            PipelineError::Generation(AnalysisGenerationError::ApiError { status, .. }) => {
                assert_eq!(status, 401)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_cancelled() {
        let server = start_test_server(vec![("/relay", 200, html_page(800))]).await;
        let pipeline = Pipeline::new(&config(&server, &["/relay"], Some("sk-test"))).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let err = pipeline
            .analyze_with_cancel("https://a.com/", "", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8080/a/b?q=1").is_ok());
    }
}
