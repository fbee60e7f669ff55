//! JavaScript surface of the playground.
//!
//! The rendering layer owns one `PlaygroundHandle`, calls `initialize` on
//! mount and whenever the endpoint changes, and re-reads `state()` from a
//! `subscribe` callback.

use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::effects::BrowserEffects;
use crate::models::{ChatMessage, EntityKind, SelectableEntity};
use crate::network::api_client::ApiClient;
use crate::network::config::ApiConfig;
use crate::playground::Playground;
use crate::query_state::UrlQueryStore;
use crate::state::SessionStore;

/// Plain view of the store handed to JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView {
    selected_endpoint: String,
    is_endpoint_active: bool,
    is_endpoint_loading: bool,
    selected_model: String,
    has_storage: bool,
    selected_team_id: Option<String>,
    selected_entity_type: Option<EntityKind>,
    agent_id: Option<String>,
    team_id: Option<String>,
    session_id: Option<String>,
    agents: Vec<SelectableEntity>,
    teams: Vec<SelectableEntity>,
    messages: Vec<ChatMessage>,
}

#[wasm_bindgen]
pub struct PlaygroundHandle {
    playground: Playground,
}

#[wasm_bindgen]
impl PlaygroundHandle {
    /// `endpoint` overrides the build-time default.
    #[wasm_bindgen(constructor)]
    pub fn new(endpoint: Option<String>) -> PlaygroundHandle {
        let config = endpoint
            .map(|url| ApiConfig::from_url(&url))
            .unwrap_or_else(ApiConfig::new);
        let playground = Playground::new(
            SessionStore::new(config),
            Rc::new(UrlQueryStore::new()),
            Rc::new(ApiClient::new()),
            Rc::new(BrowserEffects::default()),
        );
        playground.watch_query_state();
        PlaygroundHandle { playground }
    }

    /// Resolves to `{ agents, teams }`; never rejects on backend failures.
    pub fn initialize(&self) -> Promise {
        let playground = self.playground.clone();
        future_to_promise(async move {
            let catalog = playground.initialize().await;
            serde_wasm_bindgen::to_value(&catalog).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = setEndpoint)]
    pub fn set_endpoint(&self, url: String) -> Promise {
        let playground = self.playground.clone();
        future_to_promise(async move {
            let catalog = playground.set_endpoint(&url).await;
            serde_wasm_bindgen::to_value(&catalog).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = refreshAgents)]
    pub fn refresh_agents(&self) -> Promise {
        let playground = self.playground.clone();
        future_to_promise(async move {
            let agents = playground.get_agents().await;
            serde_wasm_bindgen::to_value(&agents).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = refreshTeams)]
    pub fn refresh_teams(&self) -> Promise {
        let playground = self.playground.clone();
        future_to_promise(async move {
            let teams = playground.get_teams().await;
            serde_wasm_bindgen::to_value(&teams).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = selectTeam)]
    pub fn select_team(&self, id: Option<String>) -> Result<(), JsValue> {
        Ok(self.playground.select_team(id.as_deref())?)
    }

    #[wasm_bindgen(js_name = selectAgent)]
    pub fn select_agent(&self, id: Option<String>) -> Result<(), JsValue> {
        Ok(self.playground.select_agent(id.as_deref())?)
    }

    #[wasm_bindgen(js_name = clearSession)]
    pub fn clear_session(&self) -> Result<(), JsValue> {
        Ok(self.playground.clear_session()?)
    }

    /// Accepts `{ role, content, created_at, streaming_error? }`.
    #[wasm_bindgen(js_name = appendMessage)]
    pub fn append_message(&self, message: JsValue) -> Result<(), JsValue> {
        let message: ChatMessage = serde_wasm_bindgen::from_value(message)?;
        Ok(self.playground.append_message(message)?)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        let state = self.playground.snapshot();
        let query = self.playground.query();
        let view = StateView {
            selected_endpoint: state.endpoint.base_url().to_string(),
            is_endpoint_active: state.is_endpoint_active,
            is_endpoint_loading: state.is_endpoint_loading,
            selected_model: state.selected_model_provider,
            has_storage: state.has_storage,
            selected_team_id: state.selected_team_id,
            selected_entity_type: state.selected_entity_type,
            agent_id: query.agent_id(),
            team_id: query.team_id(),
            session_id: query.session_id(),
            agents: state.agents,
            teams: state.teams,
            messages: state.messages,
        };
        Ok(serde_wasm_bindgen::to_value(&view)?)
    }

    /// `callback` runs with no arguments after every state change.
    pub fn subscribe(&self, callback: Function) {
        self.playground.subscribe(Rc::new(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("State listener threw: {:?}", e);
            }
        }));
    }
}
