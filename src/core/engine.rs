use crate::core::duration::parse_duration_text;
use crate::domain::model::{EnrichedPair, FetchFailure, FetchOutcome, RequestDescriptor};
use crate::domain::ports::{ConfigProvider, PageFetcher, RouteExtractor};
use crate::utils::error::Result;
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound on requests in flight at once.
    pub max_concurrent: usize,
    /// Pause before every request, taken while holding a slot.
    pub delay: Duration,
    /// Extra attempts after a transient failure.
    pub retry_attempts: u32,
    /// First backoff; doubles on each further attempt.
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            delay: Duration::from_secs(1),
            retry_attempts: 2,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl FetchOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            max_concurrent: config.max_concurrent_requests(),
            delay: config.request_delay(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        }
    }
}

/// Runs every request descriptor to an outcome: fetch, extract, parse.
///
/// All requests are driven from one future with `join_all`, so outcomes come
/// back in submission order whatever order they complete in. A semaphore caps
/// how many are in flight. A failed request becomes a [`FetchFailure`] and
/// never aborts the rest.
pub struct FetchEngine<F: PageFetcher, X: RouteExtractor> {
    fetcher: F,
    extractor: X,
    options: FetchOptions,
}

impl<F: PageFetcher, X: RouteExtractor> FetchEngine<F, X> {
    pub fn new(fetcher: F, extractor: X, options: FetchOptions) -> Self {
        Self {
            fetcher,
            extractor,
            options,
        }
    }

    pub async fn run(&self, requests: Vec<RequestDescriptor>) -> Vec<FetchOutcome> {
        let permits = self.options.max_concurrent.clamp(1, Semaphore::MAX_PERMITS);
        let limiter = Semaphore::new(permits);
        let total = requests.len();
        tracing::info!(
            "🚆 Fetching {} routes (max {} in flight, {:?} delay)",
            total,
            permits,
            self.options.delay
        );

        let tasks = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| self.run_one(&limiter, index, total, request));
        join_all(tasks).await
    }

    async fn run_one(
        &self,
        limiter: &Semaphore,
        index: usize,
        total: usize,
        request: RequestDescriptor,
    ) -> FetchOutcome {
        // 取得並發名額，失敗時不 panic
        let _permit = match limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => return Err(into_failure(request, e.to_string())),
        };
        sleep(self.options.delay).await;

        tracing::debug!(
            "[{}/{}] {} -> {}",
            index + 1,
            total,
            request.pair.actor.name,
            request.pair.location.name
        );

        let body = match self.fetch_with_retry(&request.url).await {
            Ok(body) => body,
            Err(e) => {
                let failure = into_failure(request, e.to_string());
                tracing::warn!("❌ {}", failure);
                return Err(failure);
            }
        };

        match self.extractor.extract(&body) {
            Ok(summary) => {
                let duration = parse_duration_text(&summary.duration_text);
                if duration.is_none() {
                    tracing::warn!(
                        "Unrecognized duration '{}' for {} -> {}",
                        summary.duration_text,
                        request.pair.actor.name,
                        request.pair.location.name
                    );
                }
                Ok(EnrichedPair {
                    pair: request.pair,
                    arrival_time: summary.arrival_time,
                    duration,
                })
            }
            Err(e) => {
                let failure = into_failure(request, e.to_string());
                tracing::warn!("❌ {}", failure);
                Err(failure)
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        let mut backoff = self.options.retry_delay;
        loop {
            match self.fetcher.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.options.retry_attempts => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        url,
                        backoff,
                        attempt,
                        self.options.retry_attempts,
                        e
                    );
                    sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn into_failure(request: RequestDescriptor, message: String) -> FetchFailure {
    FetchFailure {
        url: request.url,
        pair: request.pair,
        message,
    }
}
