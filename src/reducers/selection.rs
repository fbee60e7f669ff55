//! Selection reducer: default selection after initialization, user-driven
//! reselection, and reconciliation of URL ids against fresh catalogs.
//!
//! The URL (through `QueryStateBinding`) is the source of truth for which
//! entity is selected; the store only mirrors the fields the UI needs.

use crate::debug_log;
use crate::error::Result;
use crate::messages::{Command, Message};
use crate::models::{Catalog, EndpointStatus, EntityKind, SelectableEntity};
use crate::network::catalog::BootstrapFetch;
use crate::query_state::{QueryKey, QueryStateBinding};
use crate::state::{Selection, SessionStore};

/// Returns `true` when the message was handled by the selection reducer.
pub fn update(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    msg: &Message,
    cmds: &mut Vec<Command>,
) -> Result<bool> {
    match msg {
        Message::BootstrapFetched(fetched) => {
            apply_bootstrap(state, query, fetched, cmds)?;
            Ok(true)
        }
        Message::InitializeFailed => {
            state.agents.clear();
            state.teams.clear();
            enter_inactive(state, query)?;
            Ok(true)
        }
        Message::AgentsLoaded(agents) => {
            state.agents = agents.clone();
            cmds.push(Command::SendMessage(Message::ReconcileSelection));
            Ok(true)
        }
        Message::TeamsLoaded(teams) => {
            state.teams = teams.clone();
            cmds.push(Command::SendMessage(Message::ReconcileSelection));
            Ok(true)
        }
        Message::ReconcileSelection => {
            reconcile(state, query, cmds)?;
            Ok(true)
        }
        Message::QueryStateChanged(key) => {
            // Session ids belong to the conversation, not to the selection.
            if *key != QueryKey::Session {
                cmds.push(Command::SendMessage(Message::ReconcileSelection));
            }
            Ok(true)
        }
        Message::SelectTeam(id) => {
            reselect(state, query, EntityKind::Team, id.as_deref(), cmds)?;
            Ok(true)
        }
        Message::SelectAgent(id) => {
            reselect(state, query, EntityKind::Agent, id.as_deref(), cmds)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

fn apply_bootstrap(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    fetched: &BootstrapFetch,
    cmds: &mut Vec<Command>,
) -> Result<()> {
    let catalog = fetched.catalog();

    match fetched.status {
        EndpointStatus::Healthy => {
            state.is_endpoint_active = true;
            for notice in [fetched.teams.failure_notice(), fetched.agents.failure_notice()]
                .into_iter()
                .flatten()
            {
                cmds.push(Command::Notify(notice.to_string()));
            }
            apply_default_selection(state, query, &catalog)?;
        }
        EndpointStatus::Unhealthy => enter_inactive(state, query)?,
    }

    state.agents = catalog.agents;
    state.teams = catalog.teams;
    cmds.push(Command::SendMessage(Message::ReconcileSelection));
    Ok(())
}

/// Pick the default entity for a healthy endpoint.  First match wins:
/// an id already in the URL is kept, then the first team, then the first
/// agent, otherwise nothing.
pub fn apply_default_selection(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    catalog: &Catalog,
) -> Result<()> {
    if !query.has_no_selection() {
        debug_log!("Keeping selection from URL: {:?}", Selection::from_query(query));
        return Ok(());
    }

    if let Some(team) = catalog.teams.first() {
        query.set_team_id(Some(&team.id))?;
        state.adopt_entity(team);
    } else if let Some(agent) = catalog.agents.first() {
        query.set_agent_id(Some(&agent.id))?;
        query.set_team_id(None)?;
        state.adopt_entity(agent);
    } else {
        state.clear_selection_fields();
    }
    Ok(())
}

/// Terminal state for an unreachable endpoint or a failed initialization.
pub fn enter_inactive(state: &mut SessionStore, query: &QueryStateBinding) -> Result<()> {
    state.is_endpoint_active = false;
    state.clear_selection_fields();
    query.clear_selection()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Re-validate the id in the URL against the current catalogs.
///
/// A matching entry is adopted; an unknown id is replaced by the first entry
/// of its catalog.  Empty catalogs leave the URL alone.
pub fn reconcile(state: &mut SessionStore, query: &QueryStateBinding, cmds: &mut Vec<Command>) -> Result<()> {
    let selection = Selection::from_query(query);
    match (selection.kind(), selection.id()) {
        (Some(kind), Some(id)) => reconcile_kind(state, query, kind, id, cmds),
        _ => {
            state.clear_selection_fields();
            Ok(())
        }
    }
}

fn reconcile_kind(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    kind: EntityKind,
    id: &str,
    cmds: &mut Vec<Command>,
) -> Result<()> {
    let entity = match state.find(kind, id) {
        Some(entity) => entity.clone(),
        None => match state.catalog_of(kind).first() {
            Some(first) => {
                debug_log!("{} '{}' not in catalog, falling back to '{}'", kind, id, first.id);
                first.clone()
            }
            None => return Ok(()),
        },
    };

    write_selected_id(query, kind, &entity.id)?;
    state.adopt_entity(&entity);
    request_focus_if_ready(&entity, cmds);
    Ok(())
}

// ---------------------------------------------------------------------------
// User-driven reselection
// ---------------------------------------------------------------------------

/// Handle a pick from the team or agent list.  Picking the current id again
/// deselects.  Any change resets the running conversation.
fn reselect(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    kind: EntityKind,
    picked: Option<&str>,
    cmds: &mut Vec<Command>,
) -> Result<()> {
    let selection = Selection::from_query(query);
    let current = selection.id().filter(|_| selection.kind() == Some(kind));
    let next = picked.filter(|id| !id.is_empty() && current != Some(*id));

    match next {
        Some(id) => {
            write_selected_id(query, kind, id)?;
            match state.find(kind, id).cloned() {
                Some(entity) => {
                    state.adopt_entity(&entity);
                    request_focus_if_ready(&entity, cmds);
                }
                None => {
                    state.clear_selection_fields();
                    state.selected_entity_type = Some(kind);
                    if kind == EntityKind::Team {
                        state.selected_team_id = Some(id.to_string());
                    }
                }
            }
        }
        None => {
            query.clear_selection()?;
            state.clear_selection_fields();
        }
    }

    crate::reducers::chat::reset_session(state, query)?;
    cmds.push(Command::SendMessage(Message::ReconcileSelection));
    Ok(())
}

fn write_selected_id(query: &QueryStateBinding, kind: EntityKind, id: &str) -> Result<()> {
    match kind {
        EntityKind::Team => query.set_team_id(Some(id)),
        EntityKind::Agent => query.set_agent_id(Some(id)),
    }
}

/// Focus only makes sense once a model is attached.
fn request_focus_if_ready(entity: &SelectableEntity, cmds: &mut Vec<Command>) {
    if !entity.model_provider.is_empty() {
        cmds.push(Command::FocusChatInput);
    }
}
