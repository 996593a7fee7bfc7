#[derive(Debug, Clone)]
pub struct HttpRegistryConfig {
    /// Base URL of the stream service, e.g. `http://localhost:5010`.
    pub endpoint: String,
    /// Per-call timeout.
    pub timeout_ms: u64,
}

impl HttpRegistryConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: 10_000,
        }
    }
}
