use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::config::ApiConfig;
use crate::error::{PlaygroundError, Result};
use crate::models::{ApiAgent, ApiTeam, SelectableEntity};

/// The three backend calls the playground depends on.
///
/// Every method takes the endpoint explicitly: the user can switch endpoints
/// at any time, and a call already in flight keeps talking to the endpoint it
/// started with.
#[async_trait(?Send)]
pub trait IPlaygroundApi {
    /// HTTP status code of the status route.  Transport failures are errors.
    async fn get_status(&self, endpoint: &str) -> Result<u16>;
    async fn list_agents(&self, endpoint: &str) -> Result<Vec<SelectableEntity>>;
    async fn list_teams(&self, endpoint: &str) -> Result<Vec<SelectableEntity>>;
}

// REST client for the playground routes, backed by `window.fetch`
#[derive(Clone, Copy, Debug, Default)]
pub struct ApiClient;

impl ApiClient {
    pub fn new() -> Self {
        Self
    }

    async fn send(url: &str) -> Result<Response> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new().map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;
        headers
            .append("Accept", "application/json")
            .map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;

        let window = web_sys::window().ok_or_else(|| PlaygroundError::config("no global window exists"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;
        resp_value
            .dyn_into::<Response>()
            .map_err(|_| PlaygroundError::transport("fetch did not resolve to a Response"))
    }

    // Helper function to make fetch requests; fails on non-2xx statuses
    async fn fetch_json(url: &str) -> Result<String> {
        let resp = Self::send(url).await?;

        if !resp.ok() {
            return Err(PlaygroundError::HttpStatus {
                status: resp.status(),
                status_text: resp.status_text(),
            });
        }

        let text_promise = resp
            .text()
            .map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| PlaygroundError::transport(PlaygroundError::describe_js(&e)))?;
        Ok(text.as_string().unwrap_or_default())
    }
}

#[async_trait(?Send)]
impl IPlaygroundApi for ApiClient {
    async fn get_status(&self, endpoint: &str) -> Result<u16> {
        let url = ApiConfig::from_url(endpoint).status_url();
        let resp = Self::send(&url).await?;
        Ok(resp.status())
    }

    async fn list_agents(&self, endpoint: &str) -> Result<Vec<SelectableEntity>> {
        let url = ApiConfig::from_url(endpoint).agents_url();
        let body = Self::fetch_json(&url).await?;
        decode_agents(&body)
    }

    async fn list_teams(&self, endpoint: &str) -> Result<Vec<SelectableEntity>> {
        let url = ApiConfig::from_url(endpoint).teams_url();
        let body = Self::fetch_json(&url).await?;
        decode_teams(&body)
    }
}

pub fn decode_agents(body: &str) -> Result<Vec<SelectableEntity>> {
    let agents: Vec<ApiAgent> = serde_json::from_str(body).map_err(|e| PlaygroundError::Decode {
        what: "agent list",
        message: e.to_string(),
    })?;
    Ok(agents.into_iter().map(SelectableEntity::from).collect())
}

pub fn decode_teams(body: &str) -> Result<Vec<SelectableEntity>> {
    let teams: Vec<ApiTeam> = serde_json::from_str(body).map_err(|e| PlaygroundError::Decode {
        what: "team list",
        message: e.to_string(),
    })?;
    Ok(teams.into_iter().map(SelectableEntity::from).collect())
}
