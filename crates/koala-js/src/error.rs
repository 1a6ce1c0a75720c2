//! Why an inline event handler could not be prepared.

use koala_dom::NodeId;
use thiserror::Error;

use crate::WorldId;
use crate::event_listener::SourceRecord;

/// Failure to prepare or dispatch an inline event handler.
///
/// None of these reach the page: [`crate::LazyEventListener::ensure_compiled`]
/// logs them and leaves the listener uncompiled, so the next dispatch tries
/// again. Exceptions thrown by the handler while it runs are not represented
/// here; they propagate as the engine's own `JsError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The document has no script runtime.
    #[error("scripting is disabled for this document")]
    ScriptingDisabled,

    /// The listener's world has been torn down.
    #[error("script world {0} is not available")]
    WorldUnavailable(WorldId),

    /// The node has no script object to act as `this`.
    #[error("node {0:?} has no script object")]
    ReceiverUnresolvable(NodeId),

    /// The handler source did not compile into a function.
    #[error(transparent)]
    Compile(#[from] Diagnostic),
}

/// A compile failure, located in the document the handler came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{function_name} handler in {source_url}:{line} failed to compile: {message}")]
pub struct Diagnostic {
    /// The handler's function name, e.g. `onclick`.
    pub function_name: String,
    /// URL of the document holding the handler.
    pub source_url: String,
    /// 1-based document line the engine reported, or the handler's first
    /// line when the engine gave no position.
    pub line: u32,
    /// The engine's message.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic from an engine error message about the compiled
    /// unit of `source`.
    ///
    /// The compiled unit starts on the handler's first line, so a unit line
    /// maps to the document line `source.line() + unit_line - 1`.
    pub fn new(source: &SourceRecord, message: String) -> Self {
        let line = reported_line(&message)
            .map_or(source.position().line, |unit_line| source.document_line(unit_line));
        Self {
            function_name: source.function_name().to_string(),
            source_url: source.source_url().to_string(),
            line,
            message,
        }
    }
}

/// Extract the last `line N` position from an engine message.
fn reported_line(message: &str) -> Option<u32> {
    message
        .match_indices("line ")
        .filter_map(|(index, marker)| {
            let digits: String = message[index + marker.len()..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextPosition;

    #[test]
    fn test_reported_line() {
        assert_eq!(
            reported_line("SyntaxError: expected token ';', got 'x' at line 3, col 7"),
            Some(3)
        );
        assert_eq!(reported_line("abrupt end"), None);
        assert_eq!(reported_line("line x, then at line 12"), Some(12));
    }

    #[test]
    fn test_diagnostic_maps_unit_line_to_document_line() {
        let source = SourceRecord::new("onclick", "a();\nb(;\n")
            .with_origin("page.html", TextPosition::new(40, 5));
        let diagnostic = Diagnostic::new(&source, "unexpected token at line 2, col 3".into());
        assert_eq!(diagnostic.line, 41);
        assert_eq!(diagnostic.source_url, "page.html");
        assert_eq!(
            diagnostic.to_string(),
            "onclick handler in page.html:41 failed to compile: unexpected token at line 2, col 3"
        );
    }

    #[test]
    fn test_diagnostic_without_position_uses_first_line() {
        let source = SourceRecord::new("onload", "(").with_origin("a.html", TextPosition::new(9, 1));
        assert_eq!(Diagnostic::new(&source, "abrupt end".into()).line, 9);
    }
}
