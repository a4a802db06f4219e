pub mod classifier;
pub mod duration;
pub mod engine;
pub mod etl;
pub mod expander;
pub mod input;
pub mod matrix;
pub mod query;
pub mod report;

pub use crate::domain::model::{
    EnrichedPair, Entity, FetchFailure, FetchOutcome, Matrix, Pair, RawRow, RequestDescriptor,
    RouteSummary, TransformResult, TravelDuration,
};
pub use crate::domain::ports::{
    ConfigProvider, PageFetcher, Pipeline, RouteExtractor, Storage, UnmatchedRowPolicy,
};
pub use crate::utils::error::Result;
