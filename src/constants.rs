// Constants and default values used across the playground frontend

// Endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:7777";
pub const PLAYGROUND_ROUTE_PREFIX: &str = "/v1/playground";

// URL query keys
pub const QUERY_KEY_AGENT: &str = "agent";
pub const QUERY_KEY_TEAM: &str = "team";
pub const QUERY_KEY_SESSION: &str = "session";

// Notifications
pub const MSG_AGENTS_FETCH_FAILED: &str = "Error fetching agents";
pub const MSG_TEAMS_FETCH_FAILED: &str = "Error fetching teams";

// DOM
pub const ID_CHAT_INPUT: &str = "chat-input";
pub const ID_TOAST_ROOT: &str = "toast-root";
pub const ID_TOAST_STYLES: &str = "toast-styles";
pub const TOAST_LIFETIME_MS: i32 = 4000;

// HTTP status reported by the backend when the playground is up
pub const HTTP_OK: u16 = 200;
