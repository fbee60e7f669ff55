//! Small crate-wide convenience macros.

/// Debug-level log line tagged with the calling module.
///
/// ```rust,ignore
/// debug_log!("selected team {}", team_id);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!(target: module_path!(), $($arg)*)
    };
}
