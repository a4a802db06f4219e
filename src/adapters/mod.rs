// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod html;
pub mod http;

pub use html::TransitPageExtractor;
pub use http::HttpFetcher;
