//! Failure-collapsing wrappers around the playground API.
//!
//! None of these functions return an error.  The probe turns every failure
//! into `Unhealthy`; the list fetches turn failures into an empty list and
//! remember that they failed so a notification can be raised later.

use super::api_client::IPlaygroundApi;
use crate::constants::{MSG_AGENTS_FETCH_FAILED, MSG_TEAMS_FETCH_FAILED};
use crate::models::{Catalog, EndpointStatus, EntityKind, SelectableEntity};

/// Outcome of one list fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogFetch {
    pub kind: EntityKind,
    pub items: Vec<SelectableEntity>,
    pub failed: bool,
}

impl CatalogFetch {
    /// Notification text to show when this fetch failed.
    pub fn failure_notice(&self) -> Option<&'static str> {
        if !self.failed {
            return None;
        }
        Some(match self.kind {
            EntityKind::Agent => MSG_AGENTS_FETCH_FAILED,
            EntityKind::Team => MSG_TEAMS_FETCH_FAILED,
        })
    }
}

/// Everything `initialize()` needs, gathered in one concurrent round.
#[derive(Clone, Debug, PartialEq)]
pub struct BootstrapFetch {
    pub status: EndpointStatus,
    pub agents: CatalogFetch,
    pub teams: CatalogFetch,
}

impl BootstrapFetch {
    /// The catalog that is allowed to reach the store: an unhealthy endpoint
    /// contributes nothing, whatever the list routes returned.
    pub fn catalog(&self) -> Catalog {
        match self.status {
            EndpointStatus::Healthy => Catalog {
                agents: self.agents.items.clone(),
                teams: self.teams.items.clone(),
            },
            EndpointStatus::Unhealthy => Catalog::default(),
        }
    }
}

pub async fn probe_endpoint(api: &dyn IPlaygroundApi, endpoint: &str) -> EndpointStatus {
    match api.get_status(endpoint).await {
        Ok(code) => EndpointStatus::from_http(code),
        Err(e) => {
            log::warn!("Status probe for {} failed: {}", endpoint, e);
            EndpointStatus::Unhealthy
        }
    }
}

pub async fn fetch_agents(api: &dyn IPlaygroundApi, endpoint: &str) -> CatalogFetch {
    match api.list_agents(endpoint).await {
        Ok(items) => CatalogFetch { kind: EntityKind::Agent, items, failed: false },
        Err(e) => {
            log::warn!("Fetching agents from {} failed: {}", endpoint, e);
            CatalogFetch { kind: EntityKind::Agent, items: Vec::new(), failed: true }
        }
    }
}

pub async fn fetch_teams(api: &dyn IPlaygroundApi, endpoint: &str) -> CatalogFetch {
    match api.list_teams(endpoint).await {
        Ok(items) => CatalogFetch { kind: EntityKind::Team, items, failed: false },
        Err(e) => {
            log::warn!("Fetching teams from {} failed: {}", endpoint, e);
            CatalogFetch { kind: EntityKind::Team, items: Vec::new(), failed: true }
        }
    }
}

/// Issue the probe and both list fetches together and wait for all three.
pub async fn fetch_bootstrap(api: &dyn IPlaygroundApi, endpoint: &str) -> BootstrapFetch {
    let (status, agents, teams) = futures::join!(
        probe_endpoint(api, endpoint),
        fetch_agents(api, endpoint),
        fetch_teams(api, endpoint),
    );
    BootstrapFetch { status, agents, teams }
}
