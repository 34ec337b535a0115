pub mod config;
pub mod fetcher;
pub mod generator;
pub mod pipeline;

#[cfg(test)]
mod test_server;

pub use config::{default_relays, AnalyzerConfig, RelayConfig};
pub use fetcher::{ContentFetchError, ContentFetcher, FetchedContent};
pub use generator::client::{CompletionModel, CompletionRequest, OpenAiClient};
pub use generator::fallback::fallback_analysis;
pub use generator::parse::{parse_analysis, AnalysisParseError};
pub use generator::{AnalysisGenerationError, AnalysisGenerator, AnalysisSource, Generation};
pub use pipeline::{validate_url, AnalysisReport, Pipeline, PipelineError, PipelineStage};
pub use tokio_util::sync::CancellationToken;

pub use seo_scoring::{AnalysisResult, AnalysisType, ScoreDetail};
