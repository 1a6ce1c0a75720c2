//! Script worlds.
//!
//! A world is an isolated script environment inside one document: the page's
//! own scripts run in the main world, and extension-style scripts can run in
//! isolated worlds that share the DOM but not the global object or the node
//! objects. Each world is backed by its own Boa realm.

use std::fmt;

/// Identifies a script world within a [`crate::JsRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(u32);

impl WorldId {
    /// The page's own world. Always live while the runtime exists.
    pub const MAIN: WorldId = WorldId(0);

    pub(crate) const fn isolated(id: u32) -> Self {
        Self(id)
    }

    /// Whether this is the main world.
    pub const fn is_main(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_main() {
            f.write_str("main")
        } else {
            write!(f, "isolated-{}", self.0)
        }
    }
}
