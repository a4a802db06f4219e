use crate::domain::model::{Pair, RouteSummary, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// What to do with an input row whose tag matches neither the actor nor the location tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedRowPolicy {
    Skip,
    #[default]
    Warn,
    Fail,
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn details_filename(&self) -> Option<&str>;
    fn actor_tag(&self) -> &str;
    fn location_tag(&self) -> &str;
    fn actor_header(&self) -> &str;
    fn unmatched_rows(&self) -> UnmatchedRowPolicy;
    fn endpoint(&self) -> &str;
    fn max_concurrent_requests(&self) -> usize;
    fn request_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Pair>>;
    async fn transform(&self, pairs: Vec<Pair>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Retrieves the body of a route search page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Reads the duration and arrival fragments out of a route search page.
pub trait RouteExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<RouteSummary>;
}
