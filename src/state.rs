use crate::models::{ChatMessage, EntityKind, SelectableEntity};
use crate::network::config::ApiConfig;
use crate::query_state::QueryStateBinding;

/// The entity currently chosen in the sidebar, as recorded in the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    None,
    Agent(String),
    Team(String),
}

impl Selection {
    /// Read the selection from the URL.  A team id wins if, against the
    /// binding's invariant, both ids are present.
    pub fn from_query(query: &QueryStateBinding) -> Self {
        match (query.team_id(), query.agent_id()) {
            (Some(team), _) => Selection::Team(team),
            (None, Some(agent)) => Selection::Agent(agent),
            (None, None) => Selection::None,
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Selection::None => None,
            Selection::Agent(_) => Some(EntityKind::Agent),
            Selection::Team(_) => Some(EntityKind::Team),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Agent(id) | Selection::Team(id) => Some(id),
        }
    }
}

/// Observable state read by the rendering layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStore {
    pub endpoint: ApiConfig,

    // Endpoint flags
    pub is_endpoint_active: bool,
    pub is_endpoint_loading: bool,

    // Fields derived from the selected entity
    pub selected_model_provider: String,
    pub has_storage: bool,
    pub selected_team_id: Option<String>,
    pub selected_entity_type: Option<EntityKind>,

    // Catalog of the last initialization
    pub agents: Vec<SelectableEntity>,
    pub teams: Vec<SelectableEntity>,

    // Conversation
    pub messages: Vec<ChatMessage>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(ApiConfig::new())
    }
}

impl SessionStore {
    pub fn new(endpoint: ApiConfig) -> Self {
        Self {
            endpoint,
            is_endpoint_active: false,
            is_endpoint_loading: false,
            selected_model_provider: String::new(),
            has_storage: false,
            selected_team_id: None,
            selected_entity_type: None,
            agents: Vec::new(),
            teams: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Copy the UI-relevant fields of `entity` into the store.
    pub fn adopt_entity(&mut self, entity: &SelectableEntity) {
        self.selected_model_provider = entity.model_provider.clone();
        self.has_storage = entity.has_storage;
        self.selected_entity_type = Some(entity.kind);
        self.selected_team_id = match entity.kind {
            EntityKind::Team => Some(entity.id.clone()),
            EntityKind::Agent => None,
        };
    }

    /// Reset every selection-derived field to its default.
    pub fn clear_selection_fields(&mut self) {
        self.selected_model_provider.clear();
        self.has_storage = false;
        self.selected_team_id = None;
        self.selected_entity_type = None;
    }

    pub fn find_team(&self, id: &str) -> Option<&SelectableEntity> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn find_agent(&self, id: &str) -> Option<&SelectableEntity> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn find(&self, kind: EntityKind, id: &str) -> Option<&SelectableEntity> {
        match kind {
            EntityKind::Agent => self.find_agent(id),
            EntityKind::Team => self.find_team(id),
        }
    }

    pub fn catalog_of(&self, kind: EntityKind) -> &[SelectableEntity] {
        match kind {
            EntityKind::Agent => &self.agents,
            EntityKind::Team => &self.teams,
        }
    }
}
