// src/update.rs
//
use crate::error::Result;
use crate::messages::{Command, Message};
use crate::network::config::ApiConfig;
use crate::query_state::QueryStateBinding;
use crate::state::SessionStore;

/// Apply one message to the store and collect the commands it produced.
///
/// Domain reducers get the first look; whatever none of them consumes is
/// handled here.
pub fn update(state: &mut SessionStore, query: &QueryStateBinding, msg: Message) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    if crate::reducers::selection::update(state, query, &msg, &mut commands)? {
        return Ok(commands);
    }
    if crate::reducers::chat::update(state, query, &msg, &mut commands)? {
        return Ok(commands);
    }

    match msg {
        Message::SetEndpoint(url) => {
            let config = ApiConfig::from_url(&url);
            if config == state.endpoint {
                return Ok(commands);
            }
            log::info!("Switching endpoint to {}", config.base_url());
            // Ids and history belong to the old backend.
            state.endpoint = config;
            state.agents.clear();
            state.teams.clear();
            state.clear_selection_fields();
            query.clear_selection()?;
            crate::reducers::chat::reset_session(state, query)?;
        }
        other => {
            log::warn!("Unhandled message: {:?}", other);
        }
    }

    Ok(commands)
}
