//! Script execution context of a document.

use koala_dom::DomTree;

use crate::JsRuntime;

/// A document as seen by its scripts: the DOM, the document URL, and the
/// script runtime when scripting is running.
///
/// [§ 8.1.3.1 Script settings objects](https://html.spec.whatwg.org/multipage/webappapis.html#environment-settings-object)
///
/// The runtime can go away while the document lives on (navigation, a
/// crashed or disabled engine). Every event handler operation treats a
/// missing runtime as "nothing to do" and tries again next time.
pub struct ExecutionContext {
    url: String,
    dom: DomTree,
    runtime: Option<JsRuntime>,
}

impl ExecutionContext {
    /// Create a context with a fresh script runtime.
    pub fn new(url: impl Into<String>, dom: DomTree) -> Self {
        Self {
            url: url.into(),
            dom,
            runtime: Some(JsRuntime::new()),
        }
    }

    /// Create a context whose document runs no script.
    pub fn without_scripting(url: impl Into<String>, dom: DomTree) -> Self {
        Self {
            url: url.into(),
            dom,
            runtime: None,
        }
    }

    /// The document URL, used as the source URL of inline handlers.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The document's DOM tree.
    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// Mutable access to the DOM tree.
    pub fn dom_mut(&mut self) -> &mut DomTree {
        &mut self.dom
    }

    /// The script runtime, if scripting is running.
    pub fn runtime_mut(&mut self) -> Option<&mut JsRuntime> {
        self.runtime.as_mut()
    }

    /// The DOM together with the runtime, if scripting is running.
    pub fn scripting(&mut self) -> Option<(&DomTree, &mut JsRuntime)> {
        let runtime = self.runtime.as_mut()?;
        Some((&self.dom, runtime))
    }

    /// Whether a script runtime is attached.
    pub fn is_scripting_enabled(&self) -> bool {
        self.runtime.is_some()
    }

    /// Detach the runtime, leaving the document without scripting.
    pub fn suspend_scripting(&mut self) -> Option<JsRuntime> {
        let runtime = self.runtime.take();
        if runtime.is_some() {
            tracing::debug!(url = %self.url, "scripting suspended");
        }
        runtime
    }

    /// Attach `runtime`, returning the one it replaces.
    pub fn resume_scripting(&mut self, runtime: JsRuntime) -> Option<JsRuntime> {
        tracing::debug!(url = %self.url, "scripting resumed");
        self.runtime.replace(runtime)
    }
}
