use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag distinguishing a team selection from an agent selection.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Agent,
    Team,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Agent => "agent",
            EntityKind::Team => "team",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of the configured endpoint as seen by the probe.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EndpointStatus {
    Healthy,
    Unhealthy,
}

impl EndpointStatus {
    /// Only a plain `200 OK` from the status route counts as healthy.
    pub fn from_http(code: u16) -> Self {
        if code == crate::constants::HTTP_OK {
            EndpointStatus::Healthy
        } else {
            EndpointStatus::Unhealthy
        }
    }
}

/// An agent or team the user can pick in the sidebar.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SelectableEntity {
    pub kind: EntityKind,
    pub id: String,
    pub label: String,
    /// Empty when the backend did not report a provider.
    pub model_provider: String,
    pub has_storage: bool,
    /// Team composition as sent by the backend; always empty for agents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<serde_json::Value>,
}

impl SelectableEntity {
    pub fn agent(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Agent,
            id: id.into(),
            label: label.into(),
            model_provider: String::new(),
            has_storage: false,
            members: Vec::new(),
        }
    }

    pub fn team(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Team,
            ..Self::agent(id, label)
        }
    }

    pub fn with_model_provider(mut self, provider: impl Into<String>) -> Self {
        self.model_provider = provider.into();
        self
    }

    pub fn with_storage(mut self, has_storage: bool) -> Self {
        self.has_storage = has_storage;
        self
    }
}

/// Agents and teams fetched in one initialization cycle.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Debug)]
pub struct Catalog {
    pub agents: Vec<SelectableEntity>,
    pub teams: Vec<SelectableEntity>,
}

// ---------------------------------------------------------------------------
// Wire models returned by the playground backend
// ---------------------------------------------------------------------------

/// `model` block attached to agents and teams.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct ApiModel {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// ApiAgent is one entry of `GET /v1/playground/agents`
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ApiAgent {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<ApiModel>,
    #[serde(default)]
    pub storage: Option<bool>,
}

/// ApiTeam is one entry of `GET /v1/playground/teams`
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ApiTeam {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<ApiModel>,
    #[serde(default)]
    pub storage: Option<bool>,
    #[serde(default)]
    pub members: Option<Vec<serde_json::Value>>,
}

fn provider_of(model: Option<ApiModel>) -> String {
    model.and_then(|m| m.provider).unwrap_or_default()
}

impl From<ApiAgent> for SelectableEntity {
    fn from(api: ApiAgent) -> Self {
        Self {
            kind: EntityKind::Agent,
            id: api.agent_id.unwrap_or_default(),
            label: api.name.unwrap_or_default(),
            model_provider: provider_of(api.model),
            has_storage: api.storage.unwrap_or(false),
            members: Vec::new(),
        }
    }
}

impl From<ApiTeam> for SelectableEntity {
    fn from(api: ApiTeam) -> Self {
        Self {
            kind: EntityKind::Team,
            id: api.team_id.unwrap_or_default(),
            label: api.name.unwrap_or_default(),
            model_provider: provider_of(api.model),
            has_storage: api.storage.unwrap_or(false),
            members: api.members.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat history
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
    System,
    Tool,
}

/// One entry of the conversation shown in the chat pane.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct ChatMessage {
    /// Stable key for the rendering layer.
    #[serde(default = "new_message_id")]
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Unix timestamp in seconds.
    pub created_at: i64,
    #[serde(default)]
    pub streaming_error: bool,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp(),
            streaming_error: false,
        }
    }
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
