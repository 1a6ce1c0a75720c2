//! The authored form of an inline event handler.

/// A 1-based line/column position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPosition {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl TextPosition {
    /// A position at `line`, `column`.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Everything known about a handler before it is compiled.
///
/// [§ 8.1.8.1 Event handler content attributes](https://html.spec.whatwg.org/multipage/webappapis.html#event-handler-content-attributes)
///
/// Immutable once built: the builder methods consume the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    function_name: String,
    is_svg_event: bool,
    code: String,
    source_url: String,
    position: TextPosition,
}

impl SourceRecord {
    /// An HTML handler named `function_name` with body `code`, at line 1 of
    /// an unnamed document.
    pub fn new(function_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            is_svg_event: false,
            code: code.into(),
            source_url: String::new(),
            position: TextPosition::default(),
        }
    }

    /// Mark the handler as coming from an SVG element.
    #[must_use]
    pub fn with_svg_event(mut self, is_svg_event: bool) -> Self {
        self.is_svg_event = is_svg_event;
        self
    }

    /// Set where the handler text starts in its document.
    #[must_use]
    pub fn with_origin(mut self, source_url: impl Into<String>, position: TextPosition) -> Self {
        self.source_url = source_url.into();
        self.position = position;
        self
    }

    /// Name reported by the compiled function, e.g. `onclick`.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Whether the handler belongs to an SVG element.
    pub fn is_svg_event(&self) -> bool {
        self.is_svg_event
    }

    /// The handler body as authored.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// URL of the document the handler came from.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Where the handler text starts.
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// Number of lines in the handler body.
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.code.lines().count().max(1)).unwrap_or(u32::MAX)
    }

    /// The event parameter name shown by `toString()`.
    ///
    /// SVG handlers historically take `evt`, HTML handlers `event`.
    pub fn parameter_name(&self) -> &'static str {
        if self.is_svg_event { "evt" } else { "event" }
    }

    /// The source `toString()` reports for the compiled handler.
    ///
    /// Only the first body line is indented; the body is otherwise left as
    /// written.
    pub fn reconstructed_source(&self) -> String {
        format!(
            "function {}({}) {{\n  {}\n}}",
            self.function_name,
            self.parameter_name(),
            self.code
        )
    }

    /// Map a 1-based line of the compiled unit to a document line.
    pub fn document_line(&self, unit_line: u32) -> u32 {
        self.position.line.saturating_add(unit_line.saturating_sub(1))
    }
}
