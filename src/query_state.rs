//! Selection ids persisted in the page URL.
//!
//! `IQueryStore` is the raw key/value seam (the browser URL in production,
//! a map in tests).  `QueryStateBinding` sits on top of it and owns the one
//! invariant the URL has to respect: `agent` and `team` are never both set.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::constants::{QUERY_KEY_AGENT, QUERY_KEY_SESSION, QUERY_KEY_TEAM};
use crate::error::{PlaygroundError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Agent,
    Team,
    Session,
}

impl QueryKey {
    pub const ALL: [QueryKey; 3] = [QueryKey::Agent, QueryKey::Team, QueryKey::Session];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Agent => QUERY_KEY_AGENT,
            QueryKey::Team => QUERY_KEY_TEAM,
            QueryKey::Session => QUERY_KEY_SESSION,
        }
    }
}

/// Called with the key that changed outside of our own writes (for the
/// browser: back/forward navigation).
pub type QueryListener = Rc<dyn Fn(QueryKey)>;

pub trait IQueryStore {
    /// Current value; empty strings read as absent.
    fn get(&self, key: QueryKey) -> Option<String>;
    /// Write a value, `None` (or an empty string) removes the key.
    fn set(&self, key: QueryKey, value: Option<&str>) -> Result<()>;
    fn clear(&self, key: QueryKey) -> Result<()> {
        self.set(key, None)
    }
    fn subscribe(&self, listener: QueryListener);
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Typed binding
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct QueryStateBinding {
    store: Rc<dyn IQueryStore>,
}

impl QueryStateBinding {
    pub fn new(store: Rc<dyn IQueryStore>) -> Self {
        Self { store }
    }

    pub fn agent_id(&self) -> Option<String> {
        self.store.get(QueryKey::Agent)
    }

    pub fn team_id(&self) -> Option<String> {
        self.store.get(QueryKey::Team)
    }

    pub fn session_id(&self) -> Option<String> {
        self.store.get(QueryKey::Session)
    }

    /// True when neither an agent nor a team id is present.
    pub fn has_no_selection(&self) -> bool {
        self.agent_id().is_none() && self.team_id().is_none()
    }

    /// Set (or clear) the team id.  Setting a team always clears the agent.
    pub fn set_team_id(&self, id: Option<&str>) -> Result<()> {
        let id = non_empty(id);
        if id.is_some() {
            self.store.clear(QueryKey::Agent)?;
        }
        self.store.set(QueryKey::Team, id)
    }

    /// Set (or clear) the agent id.  Setting an agent always clears the team.
    pub fn set_agent_id(&self, id: Option<&str>) -> Result<()> {
        let id = non_empty(id);
        if id.is_some() {
            self.store.clear(QueryKey::Team)?;
        }
        self.store.set(QueryKey::Agent, id)
    }

    pub fn clear_selection(&self) -> Result<()> {
        self.store.clear(QueryKey::Agent)?;
        self.store.clear(QueryKey::Team)
    }

    pub fn set_session_id(&self, id: Option<&str>) -> Result<()> {
        self.store.set(QueryKey::Session, non_empty(id))
    }

    pub fn clear_session(&self) -> Result<()> {
        self.store.clear(QueryKey::Session)
    }

    pub fn subscribe(&self, listener: QueryListener) {
        self.store.subscribe(listener);
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Map-backed store for tests and non-browser hosts.
///
/// Like the browser, our own `set` calls do not notify subscribers; use
/// `navigate` to simulate a change made from outside.
#[derive(Default)]
pub struct MemoryQueryStore {
    values: RefCell<HashMap<QueryKey, String>>,
    listeners: RefCell<Vec<QueryListener>>,
}

impl MemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: QueryKey, value: &str) -> Self {
        self.values.borrow_mut().insert(key, value.to_string());
        self
    }

    /// Replace a value and notify subscribers, as a back/forward navigation
    /// would.
    pub fn navigate(&self, key: QueryKey, value: Option<&str>) {
        match non_empty(value) {
            Some(v) => {
                self.values.borrow_mut().insert(key, v.to_string());
            }
            None => {
                self.values.borrow_mut().remove(&key);
            }
        }
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(key);
        }
    }
}

impl IQueryStore for MemoryQueryStore {
    fn get(&self, key: QueryKey) -> Option<String> {
        self.values.borrow().get(&key).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&self, key: QueryKey, value: Option<&str>) -> Result<()> {
        let mut values = self.values.borrow_mut();
        match non_empty(value) {
            Some(v) => {
                values.insert(key, v.to_string());
            }
            None => {
                values.remove(&key);
            }
        }
        Ok(())
    }

    fn subscribe(&self, listener: QueryListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

// ---------------------------------------------------------------------------
// Browser URL store
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
}

/// Reads and writes `window.location.search`.
///
/// Team changes push a history entry so the back button walks through team
/// picks; everything else replaces the current entry.
#[derive(Default)]
pub struct UrlQueryStore {
    listeners: Rc<RefCell<Vec<QueryListener>>>,
    popstate: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>>,
}

impl UrlQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn history_mode(key: QueryKey) -> HistoryMode {
        match key {
            QueryKey::Team => HistoryMode::Push,
            QueryKey::Agent | QueryKey::Session => HistoryMode::Replace,
        }
    }

    fn window() -> Result<web_sys::Window> {
        web_sys::window().ok_or_else(|| PlaygroundError::config("no global window exists"))
    }

    fn current_url() -> Result<web_sys::Url> {
        let href = Self::window()?
            .location()
            .href()
            .map_err(|e| PlaygroundError::query_state(PlaygroundError::describe_js(&e)))?;
        web_sys::Url::new(&href).map_err(|e| PlaygroundError::query_state(PlaygroundError::describe_js(&e)))
    }

    fn install_popstate_listener(&self) -> Result<()> {
        if self.popstate.borrow().is_some() {
            return Ok(());
        }
        let listeners = self.listeners.clone();
        let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let snapshot = listeners.borrow().clone();
            for key in QueryKey::ALL {
                for listener in &snapshot {
                    listener(key);
                }
            }
        }) as Box<dyn FnMut(_)>);

        Self::window()?
            .add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref())
            .map_err(|e| PlaygroundError::query_state(PlaygroundError::describe_js(&e)))?;
        self.popstate.replace(Some(callback));
        Ok(())
    }
}

impl IQueryStore for UrlQueryStore {
    fn get(&self, key: QueryKey) -> Option<String> {
        let url = Self::current_url().ok()?;
        url.search_params().get(key.as_str()).filter(|v| !v.is_empty())
    }

    fn set(&self, key: QueryKey, value: Option<&str>) -> Result<()> {
        let value = non_empty(value);
        if self.get(key).as_deref() == value {
            return Ok(());
        }

        let url = Self::current_url()?;
        let params = url.search_params();
        match value {
            Some(v) => params.set(key.as_str(), v),
            None => params.delete(key.as_str()),
        }

        let history = Self::window()?
            .history()
            .map_err(|e| PlaygroundError::query_state(PlaygroundError::describe_js(&e)))?;
        let href = url.href();
        let written = match Self::history_mode(key) {
            HistoryMode::Push => history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&href)),
            HistoryMode::Replace => history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&href)),
        };
        written.map_err(|e| PlaygroundError::query_state(PlaygroundError::describe_js(&e)))
    }

    fn subscribe(&self, listener: QueryListener) {
        self.listeners.borrow_mut().push(listener);
        if let Err(e) = self.install_popstate_listener() {
            log::warn!("Could not watch URL changes: {}", e);
        }
    }
}

impl Drop for UrlQueryStore {
    fn drop(&mut self) {
        if let Some(callback) = self.popstate.borrow_mut().take() {
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref());
            }
        }
    }
}
