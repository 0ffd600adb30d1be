mod free_dictionary;

pub use free_dictionary::FreeDictionaryClient;

use lexi_types::LookupResult;

pub const NO_DEFINITION: &str = "No definition found";
pub const TIMED_OUT: &str = "Request timed out";
pub const FETCH_FAILED: &str = "Failed to fetch definition";

/// Definition source interface
#[async_trait::async_trait]
pub trait DefinitionProvider: Send + Sync {
    /// Look up `text`, never failing: every problem is folded into
    /// [`LookupResult::Failure`]
    async fn lookup(&self, text: &str) -> LookupResult;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),
}
