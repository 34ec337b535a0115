pub mod client;
pub mod fallback;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use seo_scoring::{AnalysisResult, AnalysisType};
use serde::{Deserialize, Serialize};
use specta::Type;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use client::{CompletionModel, CompletionRequest, OpenAiClient};
use fallback::fallback_analysis;
use parse::parse_analysis;
use prompt::{build_prompt, SYSTEM_INSTRUCTION};

#[derive(Debug, Error)]
pub enum AnalysisGenerationError {
    #[error("No model API key configured")]
    MissingCredential,
    #[error("Failed to build model client: {0}")]
    ClientError(String),
    #[error("Model request failed: {0}")]
    RequestError(String),
    #[error("Model API returned HTTP {status}: {message}")]
    ApiError { status: u16, message: String },
}

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Model => "model",
            AnalysisSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
}

/// Produces an `AnalysisResult` from a model, degrading to URL heuristics
/// whenever the model's reply cannot be used.
#[derive(Clone)]
pub struct AnalysisGenerator {
    model: Arc<dyn CompletionModel>,
    temperature: f32,
    max_tokens: u32,
    max_content_chars: usize,
}

impl AnalysisGenerator {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalysisGenerationError> {
        let client = OpenAiClient::new(config)?;
        Ok(Self::with_model(Arc::new(client), config))
    }

    pub fn with_model(model: Arc<dyn CompletionModel>, config: &AnalyzerConfig) -> Self {
        Self {
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_content_chars: config.max_content_chars,
        }
    }

    pub async fn generate(
        &self,
        url: &str,
        content: Option<&str>,
        content_available: bool,
    ) -> Result<AnalysisResult, AnalysisGenerationError> {
        self.generate_with_source(url, content, content_available)
            .await
            .map(|generation| generation.result)
    }

    pub async fn generate_with_source(
        &self,
        url: &str,
        content: Option<&str>,
        content_available: bool,
    ) -> Result<Generation, AnalysisGenerationError> {
        // content is only embedded when the caller says it is usable
        let content = content.filter(|_| content_available);
        let analysis_type = AnalysisType::from_content_available(content.is_some());

        let request = CompletionRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: build_prompt(url, content, self.max_content_chars),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: true,
        };

        debug!("Requesting {} analysis for {}", analysis_type.as_str(), url);
        let reply = self.model.complete(&request).await?;

        let (mut result, source) = match parse_analysis(&reply) {
            Ok(result) => (result, AnalysisSource::Model),
            Err(e) => {
                warn!("Unusable model reply for {}, using URL heuristics: {}", url, e);
                debug!("Raw model reply: {}", reply);
                (fallback_analysis(url, content.is_some()), AnalysisSource::Fallback)
            }
        };

        result.analysis_type = analysis_type;
        result.url = Some(url.to_string());
        if analysis_type.is_url_only() {
            // nothing on the page was seen, so content flags cannot be trusted
            result.signals = None;
        }

        info!(
            "Generated {} analysis for {} from {}",
            analysis_type.as_str(),
            url,
            source.as_str()
        );
        Ok(Generation { result, source })
    }
}
