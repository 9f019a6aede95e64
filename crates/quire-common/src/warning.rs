//! Deduplicated warnings for unsupported layout features.
//!
//! Layout runs once per page and once per line, so the same unsupported
//! property would otherwise be reported hundreds of times. Each distinct
//! `(component, message)` pair is forwarded to the `log` facade once.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (logged once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("table", "table-layout: auto is laid out with the fixed algorithm");
/// ```
///
/// A poisoned warning set only loses deduplication; the warning is still
/// logged.
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_log = WARNED.lock().map_or(true, |mut guard| {
        guard.get_or_insert_with(HashSet::new).insert(key)
    });

    if should_log {
        log::warn!(target: "quire", "[{component}] {message}");
    }
}

/// Returns true if `warn_once` has already reported this message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .is_ok_and(|guard| guard.as_ref().is_some_and(|set| set.contains(&key)))
}

/// Clear all recorded warnings (call when starting a new rendering run)
pub fn clear_warnings() {
    if let Ok(mut guard) = WARNED.lock() {
        if let Some(set) = guard.as_mut() {
            set.clear();
        }
    }
}
