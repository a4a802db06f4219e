use crate::adapters::{HttpFetcher, TransitPageExtractor};
use crate::core::classifier::RowClassifier;
use crate::core::engine::{FetchEngine, FetchOptions};
use crate::core::expander::expand_pairs;
use crate::core::input::parse_rows;
use crate::core::matrix::aggregate;
use crate::core::query::QueryBuilder;
use crate::core::report::details_csv;
use crate::core::{
    ConfigProvider, PageFetcher, Pair, Pipeline, RequestDescriptor, RouteExtractor, Storage,
    TransformResult,
};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::Path;

/// Reads the staff CSV, queries every teacher/school route and writes the duration matrix.
pub struct TravelTimePipeline<S, C, F = HttpFetcher, X = TransitPageExtractor>
where
    S: Storage,
    C: ConfigProvider,
    F: PageFetcher,
    X: RouteExtractor,
{
    storage: S,
    config: C,
    builder: QueryBuilder,
    engine: FetchEngine<F, X>,
}

impl<S: Storage, C: ConfigProvider> TravelTimePipeline<S, C> {
    /// Live pipeline against the configured endpoint.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout())?;
        let engine = FetchEngine::new(
            fetcher,
            TransitPageExtractor::new(),
            FetchOptions::from_config(&config),
        );
        Ok(Self::with_engine(storage, config, engine))
    }
}

impl<S, C, F, X> TravelTimePipeline<S, C, F, X>
where
    S: Storage,
    C: ConfigProvider,
    F: PageFetcher,
    X: RouteExtractor,
{
    pub fn with_engine(storage: S, config: C, engine: FetchEngine<F, X>) -> Self {
        let builder = QueryBuilder::new(config.endpoint());
        Self {
            storage,
            config,
            builder,
            engine,
        }
    }

    /// Request descriptors for the given pairs, without sending anything.
    pub fn plan(&self, pairs: Vec<Pair>) -> Vec<RequestDescriptor> {
        self.builder.build_all(pairs)
    }

    /// Dry run: reads the input and writes one JSON request descriptor per line.
    pub async fn write_plan<W: Write>(&self, out: &mut W) -> Result<usize> {
        let requests = self.plan(self.extract().await?);
        for request in &requests {
            serde_json::to_writer(&mut *out, request)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(requests.len())
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S, C, F, X> Pipeline for TravelTimePipeline<S, C, F, X>
where
    S: Storage,
    C: ConfigProvider,
    F: PageFetcher,
    X: RouteExtractor,
{
    async fn extract(&self) -> Result<Vec<Pair>> {
        let input = self.config.input_path();
        tracing::debug!("Reading input CSV: {}", input);

        let data = self
            .storage
            .read_file(input)
            .await
            .map_err(|e| EtlError::InputFileError {
                path: input.to_string(),
                message: e.to_string(),
            })?;
        let rows = parse_rows(&data)?;

        let classifier = RowClassifier::new(
            self.config.actor_tag(),
            self.config.location_tag(),
            self.config.unmatched_rows(),
        );
        let classified = classifier.classify(rows)?;
        tracing::info!(
            "👥 {} teachers, {} schools ({} rows dropped)",
            classified.actors.len(),
            classified.locations.len(),
            classified.dropped
        );

        Ok(expand_pairs(&classified.actors, &classified.locations))
    }

    async fn transform(&self, pairs: Vec<Pair>) -> Result<TransformResult> {
        let requests = self.plan(pairs);
        let outcomes = self.engine.run(requests).await;
        Ok(TransformResult { outcomes })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        if result.failed() > 0 {
            tracing::warn!(
                "⚠️ {} of {} routes failed; their cells are left blank",
                result.failed(),
                result.outcomes.len()
            );
        }

        let matrix = aggregate(&result.outcomes, self.config.actor_header());
        let output_path = self.output_file(self.config.output_filename());
        tracing::debug!(
            "Writing {}x{} matrix to {}",
            matrix.rows.len(),
            matrix.header.len().saturating_sub(1),
            output_path
        );
        self.storage
            .write_file(&output_path, &matrix.to_csv()?)
            .await?;

        if let Some(details) = self.config.details_filename() {
            let details_path = self.output_file(details);
            self.storage
                .write_file(&details_path, &details_csv(&result.outcomes)?)
                .await?;
            tracing::info!("📝 Details saved to: {}", details_path);
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RouteSummary, UnmatchedRowPolicy};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        output_path: String,
        details_filename: Option<String>,
        unmatched_rows: UnmatchedRowPolicy,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                output_path: "out".to_string(),
                details_filename: None,
                unmatched_rows: UnmatchedRowPolicy::Warn,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "staff.csv"
        }
        fn output_path(&self) -> &str {
            &self.output_path
        }
        fn output_filename(&self) -> &str {
            "durations.csv"
        }
        fn details_filename(&self) -> Option<&str> {
            self.details_filename.as_deref()
        }
        fn actor_tag(&self) -> &str {
            "Teacher"
        }
        fn location_tag(&self) -> &str {
            "School"
        }
        fn actor_header(&self) -> &str {
            "Actor"
        }
        fn unmatched_rows(&self) -> UnmatchedRowPolicy {
            self.unmatched_rows
        }
        fn endpoint(&self) -> &str {
            "http://transit.test/search"
        }
        fn max_concurrent_requests(&self) -> usize {
            4
        }
        fn request_delay(&self) -> Duration {
            Duration::ZERO
        }
        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
        fn retry_attempts(&self) -> u32 {
            0
        }
        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }
    }

    /// Answers by origin/destination address pair; unknown pairs fail.
    struct RouteTable {
        routes: HashMap<String, String>,
    }

    impl RouteTable {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            let builder = QueryBuilder::new("http://transit.test/search");
            let routes = entries
                .iter()
                .map(|(from, to, text)| {
                    let pair = Pair {
                        actor: crate::core::Entity::new("", *from),
                        location: crate::core::Entity::new("", *to),
                    };
                    (builder.url_for(&pair), text.to_string())
                })
                .collect();
            Self { routes }
        }
    }

    #[async_trait]
    impl PageFetcher for RouteTable {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.routes
                .get(url)
                .cloned()
                .ok_or_else(|| EtlError::HttpStatusError {
                    url: url.to_string(),
                    status: 500,
                })
        }
    }

    struct EchoExtractor;

    impl RouteExtractor for EchoExtractor {
        fn extract(&self, html: &str) -> Result<RouteSummary> {
            Ok(RouteSummary {
                duration_text: html.to_string(),
                arrival_time: "10:00着".to_string(),
            })
        }
    }

    const STAFF: &str = "type,name,address\n\
Teacher,A1,addrA1\n\
Teacher,A2,addrA2\n\
School,L1,addrL1\n\
School,L2,addrL2\n";

    fn pipeline(
        storage: MockStorage,
        config: MockConfig,
    ) -> TravelTimePipeline<MockStorage, MockConfig, RouteTable, EchoExtractor> {
        let fetcher = RouteTable::new(&[
            ("addrA1", "addrL1", "1時間30分"),
            ("addrA1", "addrL2", "45分"),
            ("addrA2", "addrL2", "2時間0分"),
        ]);
        let options = FetchOptions::from_config(&config);
        TravelTimePipeline::with_engine(
            storage,
            config,
            FetchEngine::new(fetcher, EchoExtractor, options),
        )
    }

    #[tokio::test]
    async fn test_extract_expands_cross_product() {
        let storage = MockStorage::with_file("staff.csv", STAFF);
        let pipeline = pipeline(storage, MockConfig::new());

        let pairs = pipeline.extract().await.unwrap();

        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].actor.name, "A1");
        assert_eq!(pairs[0].location.name, "L1");
        assert_eq!(pairs[3].actor.name, "A2");
        assert_eq!(pairs[3].location.name, "L2");
    }

    #[tokio::test]
    async fn test_extract_missing_input_is_input_error() {
        let storage = MockStorage::with_file("other.csv", STAFF);
        let pipeline = pipeline(storage, MockConfig::new());

        match pipeline.extract().await {
            Err(EtlError::InputFileError { path, .. }) => assert_eq!(path, "staff.csv"),
            other => panic!("expected InputFileError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_fail_policy_aborts() {
        let staff = format!("{}Janitor,J1,addrJ\n", STAFF);
        let storage = MockStorage::with_file("staff.csv", &staff);
        let mut config = MockConfig::new();
        config.unmatched_rows = UnmatchedRowPolicy::Fail;
        let pipeline = pipeline(storage, config);

        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::UnmatchedRowError { line: 6, .. })
        ));
    }

    #[tokio::test]
    async fn test_full_run_writes_matrix_and_details() {
        let storage = MockStorage::with_file("staff.csv", STAFF);
        let mut config = MockConfig::new();
        config.details_filename = Some("detail.csv".to_string());
        let pipeline = pipeline(storage.clone(), config);

        let pairs = pipeline.extract().await.unwrap();
        let result = pipeline.transform(pairs).await.unwrap();
        assert_eq!(result.succeeded(), 3);
        assert_eq!(result.failed(), 1);

        let output_path = pipeline.load(result).await.unwrap();
        let expected_path = Path::new("out").join("durations.csv");
        assert_eq!(output_path, expected_path.to_string_lossy());

        let matrix = storage.get_file(&output_path).await.unwrap();
        assert_eq!(matrix, "Actor,L1,L2\nA1,1:30,0:45\nA2,,2:00\n");

        let details_path = Path::new("out").join("detail.csv");
        let details = storage
            .get_file(&details_path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(details.lines().count(), 5);
        assert!(details.contains("A1,L1,10:00着,1:30,"));
        assert!(details.contains("A2,L1,,,HTTP 500"));
    }

    #[tokio::test]
    async fn test_write_plan_emits_json_line_per_pair() {
        let storage = MockStorage::with_file("staff.csv", STAFF);
        let pipeline = pipeline(storage.clone(), MockConfig::new());
        let mut out = Vec::new();

        let planned = pipeline.write_plan(&mut out).await.unwrap();

        assert_eq!(planned, 4);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<RequestDescriptor> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].pair.actor.name, "A1");
        assert_eq!(lines[0].pair.location.name, "L1");
        assert!(lines[3].url.contains("from=addrA2"));
        // 乾跑不寫輸出檔
        assert!(storage.get_file("out/durations.csv").await.is_none());
    }

    #[test]
    fn test_plan_is_pure() {
        let storage = MockStorage::with_file("staff.csv", STAFF);
        let pipeline = pipeline(storage, MockConfig::new());
        let pair = Pair {
            actor: crate::core::Entity::new("A1", "addrA1"),
            location: crate::core::Entity::new("L1", "addrL1"),
        };

        let first = pipeline.plan(vec![pair.clone()]);
        let second = pipeline.plan(vec![pair]);
        assert_eq!(first, second);
        assert!(first[0].url.starts_with("http://transit.test/search?from=addrA1&"));
    }
}
