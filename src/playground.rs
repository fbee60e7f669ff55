//! The playground runtime: owns the store handle and the collaborators, runs
//! the message loop and the asynchronous initialization.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::debug_log;
use crate::effects::IUiEffects;
use crate::error::{PlaygroundError, Result};
use crate::messages::{Command, Message};
use crate::models::{Catalog, ChatMessage, SelectableEntity};
use crate::network::api_client::IPlaygroundApi;
use crate::network::catalog::{fetch_agents, fetch_bootstrap, fetch_teams};
use crate::query_state::{IQueryStore, QueryStateBinding};
use crate::state::{Selection, SessionStore};
use crate::update::update;

/// Called after every dispatch; read the store through `Playground::store`.
pub type StoreListener = Rc<dyn Fn()>;

struct Inner {
    store: Rc<RefCell<SessionStore>>,
    query: QueryStateBinding,
    api: Rc<dyn IPlaygroundApi>,
    effects: Rc<dyn IUiEffects>,
    listeners: RefCell<Vec<StoreListener>>,
}

/// Cheap to clone; all clones share one store.
#[derive(Clone)]
pub struct Playground {
    inner: Rc<Inner>,
}

/// Keeps `is_endpoint_loading` raised for as long as it lives.
struct LoadingGuard {
    store: Rc<RefCell<SessionStore>>,
}

impl LoadingGuard {
    fn engage(store: &Rc<RefCell<SessionStore>>) -> Result<Self> {
        store.try_borrow_mut()?.is_endpoint_loading = true;
        Ok(Self { store: store.clone() })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        match self.store.try_borrow_mut() {
            Ok(mut state) => state.is_endpoint_loading = false,
            Err(e) => log::error!("Could not clear loading flag: {}", e),
        }
    }
}

impl Playground {
    pub fn new(
        store: SessionStore,
        query: Rc<dyn IQueryStore>,
        api: Rc<dyn IPlaygroundApi>,
        effects: Rc<dyn IUiEffects>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                store: Rc::new(RefCell::new(store)),
                query: QueryStateBinding::new(query),
                api,
                effects,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn store(&self) -> Rc<RefCell<SessionStore>> {
        self.inner.store.clone()
    }

    /// Copy of the current observable state.
    pub fn snapshot(&self) -> SessionStore {
        self.inner.store.borrow().clone()
    }

    pub fn query(&self) -> &QueryStateBinding {
        &self.inner.query
    }

    pub fn selection(&self) -> Selection {
        Selection::from_query(&self.inner.query)
    }

    pub fn subscribe(&self, listener: StoreListener) {
        self.inner.listeners.borrow_mut().push(listener);
    }

    /// Re-run reconciliation whenever the URL changes underneath us
    /// (back/forward navigation).
    pub fn watch_query_state(&self) {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.query.subscribe(Rc::new(move |key| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let playground = Playground { inner };
            if let Err(e) = playground.dispatch(Message::QueryStateChanged(key)) {
                log::warn!("Reconciliation after URL change failed: {}", e);
            }
        }));
    }

    // -----------------------------------------------------------------------
    // Message loop
    // -----------------------------------------------------------------------

    /// Apply a message and everything it chains, then run the collected side
    /// effects once the store borrow is released.
    pub fn dispatch(&self, msg: Message) -> Result<()> {
        let mut notices = Vec::new();
        let mut focus = false;
        let outcome = self.run_queue(msg, &mut notices, &mut focus);

        for notice in &notices {
            self.inner.effects.notify_error(notice);
        }
        if focus {
            self.inner.effects.focus_chat_input();
        }
        self.notify_listeners();
        outcome
    }

    fn run_queue(&self, msg: Message, notices: &mut Vec<String>, focus: &mut bool) -> Result<()> {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let commands = {
                let mut state = self.inner.store.try_borrow_mut()?;
                update(&mut state, &self.inner.query, msg)?
            };
            for command in commands {
                match command {
                    Command::SendMessage(next) => queue.push_back(next),
                    Command::Notify(text) => notices.push(text),
                    // Several focus requests in one dispatch collapse into one.
                    Command::FocusChatInput => *focus = true,
                }
            }
        }
        Ok(())
    }

    fn notify_listeners(&self) {
        let listeners = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    fn endpoint(&self) -> Result<String> {
        let state = self
            .inner
            .store
            .try_borrow()
            .map_err(|e| PlaygroundError::StateBorrow(e.to_string()))?;
        Ok(state.endpoint.base_url().to_string())
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Probe the endpoint, load both catalogs and settle the selection.
    ///
    /// Never fails: anything unexpected ends in the inactive, unselected state
    /// with empty catalogs.  Concurrent calls are not deduplicated; the one
    /// that resolves last decides the final state.
    pub async fn initialize(&self) -> Catalog {
        let outcome = match LoadingGuard::engage(&self.inner.store) {
            Ok(_loading) => {
                self.notify_listeners();
                self.try_initialize().await
            }
            Err(e) => Err(e),
        };

        let catalog = match outcome {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Error initializing playground: {}", e);
                self.degrade();
                Catalog::default()
            }
        };
        self.notify_listeners();
        catalog
    }

    async fn try_initialize(&self) -> Result<Catalog> {
        let endpoint = self.endpoint()?;
        debug_log!("Initializing playground against {}", endpoint);

        let fetched = fetch_bootstrap(self.inner.api.as_ref(), &endpoint).await;
        let catalog = fetched.catalog();
        self.dispatch(Message::BootstrapFetched(fetched))?;
        Ok(catalog)
    }

    fn degrade(&self) {
        if let Err(e) = self.dispatch(Message::InitializeFailed) {
            log::error!("Could not reset selection after failure: {}", e);
            if let Ok(mut state) = self.inner.store.try_borrow_mut() {
                state.is_endpoint_active = false;
                state.clear_selection_fields();
                state.agents.clear();
                state.teams.clear();
            }
        }
    }

    /// Switch to another endpoint and initialize against it.
    pub async fn set_endpoint(&self, url: &str) -> Catalog {
        if let Err(e) = self.dispatch(Message::SetEndpoint(url.to_string())) {
            log::error!("Could not switch endpoint: {}", e);
        }
        self.initialize().await
    }

    // -----------------------------------------------------------------------
    // Individual catalog refreshes
    // -----------------------------------------------------------------------

    /// Refetch the agent list.  A failed fetch is reported and leaves the
    /// current list in place.
    pub async fn get_agents(&self) -> Vec<SelectableEntity> {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                log::error!("Cannot refresh agents: {}", e);
                return Vec::new();
            }
        };
        let fetched = fetch_agents(self.inner.api.as_ref(), &endpoint).await;
        match fetched.failure_notice() {
            Some(notice) => self.inner.effects.notify_error(notice),
            None => {
                if let Err(e) = self.dispatch(Message::AgentsLoaded(fetched.items.clone())) {
                    log::error!("Could not apply refreshed agents: {}", e);
                }
            }
        }
        fetched.items
    }

    /// Refetch the team list; see `get_agents`.
    pub async fn get_teams(&self) -> Vec<SelectableEntity> {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                log::error!("Cannot refresh teams: {}", e);
                return Vec::new();
            }
        };
        let fetched = fetch_teams(self.inner.api.as_ref(), &endpoint).await;
        match fetched.failure_notice() {
            Some(notice) => self.inner.effects.notify_error(notice),
            None => {
                if let Err(e) = self.dispatch(Message::TeamsLoaded(fetched.items.clone())) {
                    log::error!("Could not apply refreshed teams: {}", e);
                }
            }
        }
        fetched.items
    }

    // -----------------------------------------------------------------------
    // Rendering-layer entry points
    // -----------------------------------------------------------------------

    pub fn select_team(&self, id: Option<&str>) -> Result<()> {
        self.dispatch(Message::SelectTeam(id.map(str::to_string)))
    }

    pub fn select_agent(&self, id: Option<&str>) -> Result<()> {
        self.dispatch(Message::SelectAgent(id.map(str::to_string)))
    }

    pub fn clear_session(&self) -> Result<()> {
        self.dispatch(Message::ClearSession)
    }

    pub fn append_message(&self, message: ChatMessage) -> Result<()> {
        self.dispatch(Message::AppendMessage(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MSG_AGENTS_FETCH_FAILED, MSG_TEAMS_FETCH_FAILED};
    use crate::models::{EntityKind, MessageRole};
    use crate::network::config::ApiConfig;
    use crate::query_state::{MemoryQueryStore, QueryKey};
    use crate::testing::{agent, team, FlakyQueryStore, RecordingEffects, ScriptedApi};
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct Harness {
        playground: Playground,
        query: Rc<MemoryQueryStore>,
        effects: Rc<RecordingEffects>,
    }

    fn harness(api: ScriptedApi) -> Harness {
        harness_with_query(api, MemoryQueryStore::new())
    }

    fn harness_with_query(api: ScriptedApi, query: MemoryQueryStore) -> Harness {
        let query = Rc::new(query);
        let effects = Rc::new(RecordingEffects::default());
        let playground = Playground::new(
            SessionStore::new(ApiConfig::default()),
            query.clone(),
            Rc::new(api),
            effects.clone(),
        );
        Harness { playground, query, effects }
    }

    #[test]
    fn test_initialize_selects_first_team() {
        let h = harness(
            ScriptedApi::healthy()
                .with_agents(vec![agent("a1", "openai", false)])
                .with_teams(vec![team("t1", "openai", true), team("t2", "docker", false)]),
        );
        let catalog = block_on(h.playground.initialize());

        assert_eq!(catalog.teams.len(), 2);
        assert_eq!(catalog.agents.len(), 1);
        assert_eq!(h.playground.selection(), Selection::Team("t1".into()));

        let state = h.playground.snapshot();
        assert!(state.is_endpoint_active);
        assert!(!state.is_endpoint_loading);
        assert_eq!(state.selected_model_provider, "openai");
        assert!(state.has_storage);
        assert_eq!(state.selected_entity_type, Some(EntityKind::Team));
        // Reconciliation asks for focus once a provider is known.
        assert_eq!(h.effects.focus_requests.get(), 1);
        assert!(h.effects.notices.borrow().is_empty());
    }

    #[test]
    fn test_initialize_issues_one_round_of_requests() {
        let api = ScriptedApi::healthy();
        let calls = api.calls.clone();
        let h = harness(api);
        block_on(h.playground.initialize());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_initialize_unreachable_endpoint() {
        let query = MemoryQueryStore::new().with_value(QueryKey::Agent, "a1");
        let h = harness_with_query(ScriptedApi::unreachable(), query);
        let catalog = block_on(h.playground.initialize());

        assert_eq!(catalog, Catalog::default());
        let state = h.playground.snapshot();
        assert!(!state.is_endpoint_active);
        assert!(!state.is_endpoint_loading);
        assert_eq!(state.selected_entity_type, None);
        assert_eq!(h.query.get(QueryKey::Agent), None);
        // Transport failures are not surfaced to the user.
        assert!(h.effects.notices.borrow().is_empty());
    }

    #[test]
    fn test_catalog_failures_are_reported_per_list() {
        let h = harness(ScriptedApi::healthy().with_agents(vec![agent("a1", "", false)]).failing_teams());
        let catalog = block_on(h.playground.initialize());

        assert_eq!(catalog.agents.len(), 1);
        assert_eq!(*h.effects.notices.borrow(), vec![MSG_TEAMS_FETCH_FAILED.to_string()]);
        assert_eq!(h.playground.selection(), Selection::Agent("a1".into()));
    }

    #[test]
    fn test_existing_url_selection_survives_initialize() {
        let query = MemoryQueryStore::new().with_value(QueryKey::Agent, "a2");
        let h = harness_with_query(
            ScriptedApi::healthy()
                .with_agents(vec![agent("a1", "", false), agent("a2", "docker", true)])
                .with_teams(vec![team("t1", "openai", true)]),
            query,
        );
        block_on(h.playground.initialize());

        assert_eq!(h.playground.selection(), Selection::Agent("a2".into()));
        let state = h.playground.snapshot();
        assert_eq!(state.selected_model_provider, "docker");
        assert_eq!(state.selected_team_id, None);
    }

    #[test]
    fn test_stale_team_in_url_falls_back() {
        let query = MemoryQueryStore::new().with_value(QueryKey::Team, "t9");
        let h = harness_with_query(ScriptedApi::healthy().with_teams(vec![team("t1", "", false)]), query);
        block_on(h.playground.initialize());

        assert_eq!(h.query.get(QueryKey::Team).as_deref(), Some("t1"));
        assert_eq!(h.playground.snapshot().selected_team_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let h = harness(ScriptedApi::healthy().with_teams(vec![team("t1", "openai", true)]));
        block_on(h.playground.initialize());
        let first = (h.playground.selection(), h.playground.snapshot());
        block_on(h.playground.initialize());
        let second = (h.playground.selection(), h.playground.snapshot());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unexpected_failure_degrades_to_inactive() {
        let query = Rc::new(FlakyQueryStore::default());
        let effects = Rc::new(RecordingEffects::default());
        let playground = Playground::new(
            SessionStore::new(ApiConfig::default()),
            query.clone(),
            Rc::new(ScriptedApi::healthy().with_teams(vec![team("t1", "openai", true)])),
            effects,
        );
        query.fail_writes.set(true);

        let catalog = block_on(playground.initialize());

        assert_eq!(catalog, Catalog::default());
        let state = playground.snapshot();
        assert!(!state.is_endpoint_active);
        assert!(!state.is_endpoint_loading);
        assert!(state.teams.is_empty());
        assert_eq!(state.selected_model_provider, "");
        assert_eq!(state.selected_entity_type, None);
    }

    #[test]
    fn test_loading_flag_visible_to_listeners() {
        let h = harness(ScriptedApi::healthy());
        let store = h.playground.store();
        let seen_loading = Rc::new(Cell::new(false));
        let seen = seen_loading.clone();
        h.playground.subscribe(Rc::new(move || {
            if store.borrow().is_endpoint_loading {
                seen.set(true);
            }
        }));

        block_on(h.playground.initialize());
        assert!(seen_loading.get());
        assert!(!h.playground.snapshot().is_endpoint_loading);
    }

    #[test]
    fn test_select_team_resets_conversation() {
        let h = harness(
            ScriptedApi::healthy()
                .with_agents(vec![agent("a1", "openai", false)])
                .with_teams(vec![team("t1", "openai", true), team("t2", "", false)]),
        );
        block_on(h.playground.initialize());
        h.query.set(QueryKey::Session, Some("s-42")).unwrap();
        h.playground.append_message(ChatMessage::new(MessageRole::User, "hello")).unwrap();
        assert_eq!(h.playground.snapshot().messages.len(), 1);

        h.playground.select_team(Some("t2")).unwrap();

        let state = h.playground.snapshot();
        assert!(state.messages.is_empty());
        assert_eq!(h.query.get(QueryKey::Session), None);
        assert_eq!(state.selected_team_id.as_deref(), Some("t2"));
        assert_eq!(state.selected_model_provider, "");

        h.playground.select_agent(Some("a1")).unwrap();
        assert_eq!(h.query.get(QueryKey::Team), None);
        assert_eq!(h.playground.selection(), Selection::Agent("a1".into()));

        h.playground.select_agent(Some("a1")).unwrap();
        assert_eq!(h.playground.selection(), Selection::None);
    }

    #[test]
    fn test_clear_session() {
        let h = harness(ScriptedApi::healthy());
        h.query.set(QueryKey::Session, Some("s-1")).unwrap();
        h.playground.append_message(ChatMessage::new(MessageRole::User, "hi")).unwrap();

        h.playground.clear_session().unwrap();

        assert!(h.playground.snapshot().messages.is_empty());
        assert_eq!(h.query.get(QueryKey::Session), None);
    }

    #[test]
    fn test_url_navigation_is_reconciled() {
        let h = harness(ScriptedApi::healthy().with_teams(vec![team("t1", "", false), team("t2", "openai", true)]));
        h.playground.watch_query_state();
        block_on(h.playground.initialize());

        h.query.navigate(QueryKey::Team, Some("t2"));
        assert_eq!(h.playground.snapshot().selected_team_id.as_deref(), Some("t2"));
        assert!(h.playground.snapshot().has_storage);

        h.query.navigate(QueryKey::Team, Some("missing"));
        assert_eq!(h.query.get(QueryKey::Team).as_deref(), Some("t1"));
    }

    #[test]
    fn test_refresh_failure_keeps_current_list() {
        let h = harness(ScriptedApi::healthy().failing_agents());
        h.playground.store().borrow_mut().agents = vec![agent("a1", "", false)];

        let agents = block_on(h.playground.get_agents());

        assert!(agents.is_empty());
        assert_eq!(h.playground.snapshot().agents.len(), 1);
        assert_eq!(*h.effects.notices.borrow(), vec![MSG_AGENTS_FETCH_FAILED.to_string()]);
    }

    #[test]
    fn test_refresh_teams_reconciles() {
        let query = MemoryQueryStore::new().with_value(QueryKey::Team, "old");
        let h = harness_with_query(ScriptedApi::healthy().with_teams(vec![team("t5", "openai", false)]), query);

        let teams = block_on(h.playground.get_teams());

        assert_eq!(teams.len(), 1);
        assert_eq!(h.query.get(QueryKey::Team).as_deref(), Some("t5"));
        assert_eq!(h.effects.focus_requests.get(), 1);
    }

    #[test]
    fn test_set_endpoint_reinitializes() {
        let h = harness(ScriptedApi::healthy().with_teams(vec![team("t1", "", false)]));
        h.query.set(QueryKey::Team, Some("from-old-endpoint")).unwrap();

        block_on(h.playground.set_endpoint("http://other:7777/"));

        assert_eq!(h.playground.snapshot().endpoint.base_url(), "http://other:7777");
        // The old id was dropped with the endpoint, so the default applies.
        assert_eq!(h.query.get(QueryKey::Team).as_deref(), Some("t1"));
    }

    /// Backend whose status route for an endpoint waits until released.
    struct GatedApi {
        gates: RefCell<HashMap<String, oneshot::Receiver<u16>>>,
        teams: HashMap<String, Vec<SelectableEntity>>,
    }

    #[async_trait(?Send)]
    impl IPlaygroundApi for GatedApi {
        async fn get_status(&self, endpoint: &str) -> Result<u16> {
            let gate = self.gates.borrow_mut().remove(endpoint);
            match gate {
                Some(rx) => rx.await.map_err(|_| PlaygroundError::transport("gate dropped")),
                None => Ok(200),
            }
        }

        async fn list_agents(&self, _endpoint: &str) -> Result<Vec<SelectableEntity>> {
            Ok(Vec::new())
        }

        async fn list_teams(&self, endpoint: &str) -> Result<Vec<SelectableEntity>> {
            Ok(self.teams.get(endpoint).cloned().unwrap_or_default())
        }
    }

    #[test]
    fn test_overlapping_initializations_last_resolution_wins() {
        let (release_a, gate_a) = oneshot::channel();
        let (release_b, gate_b) = oneshot::channel();
        let api = GatedApi {
            gates: RefCell::new(HashMap::from([
                ("http://a".to_string(), gate_a),
                ("http://b".to_string(), gate_b),
            ])),
            teams: HashMap::from([
                ("http://a".to_string(), vec![team("ta", "", false)]),
                ("http://b".to_string(), vec![team("tb", "", false)]),
            ]),
        };
        let playground = Playground::new(
            SessionStore::new(ApiConfig::from_url("http://a")),
            Rc::new(MemoryQueryStore::new()),
            Rc::new(api),
            Rc::new(RecordingEffects::default()),
        );

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let first = playground.clone();
        spawner.spawn_local(async move { first.initialize().await; }).unwrap();
        pool.run_until_stalled();

        playground.dispatch(Message::SetEndpoint("http://b".into())).unwrap();
        let second = playground.clone();
        spawner.spawn_local(async move { second.initialize().await; }).unwrap();
        pool.run_until_stalled();

        release_b.send(200).unwrap();
        pool.run_until_stalled();
        assert_eq!(playground.selection(), Selection::Team("tb".into()));

        // The earlier call resolves last and overwrites the store.
        release_a.send(200).unwrap();
        pool.run_until_stalled();
        let state = playground.snapshot();
        assert_eq!(state.teams, vec![team("ta", "", false)]);
        assert_eq!(playground.selection(), Selection::Team("ta".into()));
        assert!(!state.is_endpoint_loading);
    }
}
