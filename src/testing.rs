//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use crate::effects::IUiEffects;
use crate::error::{PlaygroundError, Result};
use crate::models::SelectableEntity;
use crate::network::api_client::IPlaygroundApi;
use crate::query_state::{IQueryStore, MemoryQueryStore, QueryKey, QueryListener};

/// Backend that answers every call from a fixed script.
#[derive(Clone)]
pub struct ScriptedApi {
    status: Result<u16>,
    agents: Result<Vec<SelectableEntity>>,
    teams: Result<Vec<SelectableEntity>>,
    pub calls: Rc<Cell<usize>>,
}

impl ScriptedApi {
    pub fn healthy() -> Self {
        Self {
            status: Ok(200),
            agents: Ok(Vec::new()),
            teams: Ok(Vec::new()),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        let down = PlaygroundError::transport("connection refused");
        Self {
            status: Err(down.clone()),
            agents: Err(down.clone()),
            teams: Err(down),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_status(mut self, status: Result<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_agents(mut self, agents: Vec<SelectableEntity>) -> Self {
        self.agents = Ok(agents);
        self
    }

    pub fn with_teams(mut self, teams: Vec<SelectableEntity>) -> Self {
        self.teams = Ok(teams);
        self
    }

    pub fn failing_agents(mut self) -> Self {
        self.agents = Err(PlaygroundError::HttpStatus { status: 500, status_text: "Internal Server Error".into() });
        self
    }

    pub fn failing_teams(mut self) -> Self {
        self.teams = Err(PlaygroundError::HttpStatus { status: 500, status_text: "Internal Server Error".into() });
        self
    }
}

#[async_trait(?Send)]
impl IPlaygroundApi for ScriptedApi {
    async fn get_status(&self, _endpoint: &str) -> Result<u16> {
        self.calls.set(self.calls.get() + 1);
        self.status.clone()
    }

    async fn list_agents(&self, _endpoint: &str) -> Result<Vec<SelectableEntity>> {
        self.calls.set(self.calls.get() + 1);
        self.agents.clone()
    }

    async fn list_teams(&self, _endpoint: &str) -> Result<Vec<SelectableEntity>> {
        self.calls.set(self.calls.get() + 1);
        self.teams.clone()
    }
}

/// Records notifications and focus requests instead of touching the DOM.
#[derive(Default)]
pub struct RecordingEffects {
    pub notices: RefCell<Vec<String>>,
    pub focus_requests: Cell<usize>,
}

impl IUiEffects for RecordingEffects {
    fn notify_error(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn focus_chat_input(&self) {
        self.focus_requests.set(self.focus_requests.get() + 1);
    }
}

/// Query store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyQueryStore {
    pub inner: MemoryQueryStore,
    pub fail_writes: Cell<bool>,
}

impl IQueryStore for FlakyQueryStore {
    fn get(&self, key: QueryKey) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: QueryKey, value: Option<&str>) -> Result<()> {
        if self.fail_writes.get() {
            return Err(PlaygroundError::query_state("history.replaceState rejected"));
        }
        self.inner.set(key, value)
    }

    fn subscribe(&self, listener: QueryListener) {
        self.inner.subscribe(listener);
    }
}

pub fn team(id: &str, provider: &str, storage: bool) -> SelectableEntity {
    SelectableEntity::team(id, id.to_uppercase())
        .with_model_provider(provider)
        .with_storage(storage)
}

pub fn agent(id: &str, provider: &str, storage: bool) -> SelectableEntity {
    SelectableEntity::agent(id, id.to_uppercase())
        .with_model_provider(provider)
        .with_storage(storage)
}
