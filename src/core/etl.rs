use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting travel time run...");

        // Extract
        let pairs = self.pipeline.extract().await?;
        tracing::info!("📋 Expanded {} teacher/school pairs", pairs.len());

        // Transform
        let result = self.pipeline.transform(pairs).await?;
        tracing::info!(
            "🔄 Fetched {} routes ({} ok, {} failed)",
            result.outcomes.len(),
            result.succeeded(),
            result.failed()
        );

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
