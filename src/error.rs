//! Error type shared by the playground frontend.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between the browser, the URL and the
/// playground backend.
///
/// Most variants never reach the rendering layer: the probe collapses
/// transport problems into an unhealthy status, the catalog wrappers turn
/// fetch problems into empty lists, and `Playground::initialize` swallows the
/// rest after logging them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaygroundError {
    /// The request never produced a response (CORS, DNS, connection refused).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status code.
    #[error("API request failed: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    /// Reading or writing the page URL failed.
    #[error("Query state error: {0}")]
    QueryState(String),

    /// The session store was already mutably borrowed.
    #[error("Session store is busy: {0}")]
    StateBorrow(String),

    /// Missing browser globals or an unusable endpoint.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaygroundError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn query_state(message: impl Into<String>) -> Self {
        Self::QueryState(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Render a `JsValue` coming back from a rejected promise or a failed
    /// DOM call.
    pub fn describe_js(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{:?}", value))
    }
}

impl From<serde_json::Error> for PlaygroundError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            what: "JSON payload",
            message: err.to_string(),
        }
    }
}

impl From<std::cell::BorrowMutError> for PlaygroundError {
    fn from(err: std::cell::BorrowMutError) -> Self {
        Self::StateBorrow(err.to_string())
    }
}

impl From<PlaygroundError> for JsValue {
    fn from(err: PlaygroundError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
