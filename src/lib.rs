use wasm_bindgen::prelude::*;

#[macro_use]
pub mod macros;

pub mod bindings;
pub mod constants;
pub mod effects;
pub mod error;
pub mod logging;
pub mod messages;
pub mod models;
pub mod network;
pub mod playground;
pub mod query_state;
pub mod reducers;
pub mod state;
pub mod toast;
pub mod update;

#[cfg(test)]
mod testing;

pub use bindings::PlaygroundHandle;
pub use error::{PlaygroundError, Result};
pub use playground::Playground;

// Main entry point for the WASM module
#[wasm_bindgen(start)]
pub fn start() {
    // Better panic messages in the console
    console_error_panic_hook::set_once();
    logging::init();
    debug_log!("agent playground module loaded");
}
