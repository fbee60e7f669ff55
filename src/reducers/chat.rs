//! Chat history reducer.
//!
//! The history is append-only while a conversation is running and is thrown
//! away as a whole whenever the session is reset.

use crate::error::Result;
use crate::messages::{Command, Message};
use crate::query_state::QueryStateBinding;
use crate::state::SessionStore;

/// Returns `true` when the message was handled by the chat reducer.
pub fn update(
    state: &mut SessionStore,
    query: &QueryStateBinding,
    msg: &Message,
    _cmds: &mut Vec<Command>,
) -> Result<bool> {
    match msg {
        Message::ClearSession => {
            reset_session(state, query)?;
            Ok(true)
        }
        Message::AppendMessage(message) => {
            state.messages.push(message.clone());
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Empty the history and drop the session id from the URL.
pub fn reset_session(state: &mut SessionStore, query: &QueryStateBinding) -> Result<()> {
    state.messages.clear();
    query.clear_session()
}
