// src/messages.rs
//
// Events the playground reacts to, and the side effects reducers ask for.
//
use crate::models::{ChatMessage, SelectableEntity};
use crate::network::catalog::BootstrapFetch;
use crate::query_state::QueryKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Initialization
    BootstrapFetched(BootstrapFetch),   // probe + both catalogs settled
    InitializeFailed,                   // anything unexpected during initialize()
    SetEndpoint(String),

    // Individual catalog refreshes
    AgentsLoaded(Vec<SelectableEntity>),
    TeamsLoaded(Vec<SelectableEntity>),

    // Reactive rule: catalog or selection id changed
    ReconcileSelection,
    QueryStateChanged(QueryKey),

    // User-driven reselection (None deselects)
    SelectTeam(Option<String>),
    SelectAgent(Option<String>),

    // Conversation
    ClearSession,
    AppendMessage(ChatMessage),
}

/// Work to run after the store borrow has been released.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Chain another message to be processed
    SendMessage(Message),

    /// Transient, non-blocking error notification
    Notify(String),

    /// Move keyboard focus to the chat input (deferred, best effort)
    FocusChatInput,
}
