//! Deduplicated warnings.
//!
//! Some failures repeat on every page interaction: an inline handler with a
//! syntax error is recompiled on each dispatch and fails the same way each
//! time. [`warn_once`] reports such a failure the first time it is seen and
//! stays quiet afterwards. Warnings are emitted as `tracing` events; the
//! binary decides how to render them.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A poisoned set of strings is still a valid set.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Warn about a problem once per unique `(component, message)` pair.
///
/// # Example
/// ```ignore
/// warn_once("JS", "onclick handler in page.html:12 failed to compile");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let should_emit = warned()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Whether `warn_once` has already emitted this warning.
pub fn has_warned(component: &str, message: &str) -> bool {
    warned()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Clear all recorded warnings (call when loading a new page)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
