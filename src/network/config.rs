use crate::constants::{DEFAULT_ENDPOINT, PLAYGROUND_ROUTE_PREFIX};

/// Playground endpoint configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    /// Points at the local playground server.  Builds that ship to a
    /// different host inject `PLAYGROUND_ENDPOINT` at compile time (see
    /// `ApiConfig::new`) or switch at runtime via `set_endpoint`.
    fn default() -> Self {
        Self::from_url(DEFAULT_ENDPOINT)
    }
}

impl ApiConfig {
    /// Create a new ApiConfig from the PLAYGROUND_ENDPOINT environment
    /// variable, falling back to the local default when it is unset.
    pub fn new() -> Self {
        match option_env!("PLAYGROUND_ENDPOINT") {
            Some(url) if !url.trim().is_empty() => Self::from_url(url),
            _ => Self::default(),
        }
    }

    /// Create a new ApiConfig from a URL string
    pub fn from_url(url: &str) -> Self {
        Self {
            base_url: url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the endpoint, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a playground route such as `/agents`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, PLAYGROUND_ROUTE_PREFIX, path)
    }

    pub fn status_url(&self) -> String {
        self.url("/status")
    }

    pub fn agents_url(&self) -> String {
        self.url("/agents")
    }

    pub fn teams_url(&self) -> String {
        self.url("/teams")
    }
}
