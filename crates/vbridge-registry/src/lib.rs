//! [`StreamRegistry`](vbridge_core::StreamRegistry) backed by the stream
//! service's REST API.

mod config;
pub use config::HttpRegistryConfig;

mod http;
pub use http::HttpStreamRegistry;
