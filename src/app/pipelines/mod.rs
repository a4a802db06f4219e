pub mod travel_time_pipeline;

pub use travel_time_pipeline::TravelTimePipeline;
