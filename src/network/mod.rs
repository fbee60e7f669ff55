// HTTP access to the playground backend
pub mod api_client;
pub mod catalog;
pub mod config;

pub use api_client::{ApiClient, IPlaygroundApi};
pub use catalog::{fetch_agents, fetch_bootstrap, fetch_teams, probe_endpoint, BootstrapFetch, CatalogFetch};
pub use config::ApiConfig;
