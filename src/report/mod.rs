//! Append-only text outputs of a compilation
//!
//! The front end never writes files itself. Everything it produces (listing,
//! token trace, symbol dump, memory offsets) goes through the [`Collector`]
//! trait, and the caller decides where the lines end up.

pub mod diagnostic;
pub mod listing;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use listing::Listing;

/// Sink for formatted output lines
pub trait Collector {
    fn append_line(&mut self, line: String);
}

impl Collector for Vec<String> {
    fn append_line(&mut self, line: String) {
        self.push(line);
    }
}

/// In-memory collector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextCollector {
    lines: Vec<String>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined, each terminated by a newline.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl Collector for TextCollector {
    fn append_line(&mut self, line: String) {
        self.lines.push(line);
    }
}
