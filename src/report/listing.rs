//! Line-numbered source listing with interleaved diagnostics
//!
//! Source lines are copied into the listing lazily, as the parser reaches
//! them, so a diagnostic lands right after the line it was found on.

use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::{Collector, TextCollector};

#[derive(Debug, Clone)]
pub struct Listing {
    source_lines: Vec<String>,
    emitted: usize,
    max_line_length: usize,
    out: TextCollector,
}

impl Listing {
    pub fn new(source: &str, max_line_length: usize) -> Self {
        Listing {
            source_lines: source.lines().map(str::to_string).collect(),
            emitted: 0,
            max_line_length,
            out: TextCollector::new(),
        }
    }

    /// Copy source lines up to and including `line` (1-based) into the
    /// listing. Returns a lexical diagnostic for every over-long line copied;
    /// those are already in the listing.
    ///
    /// Lines are only ever copied forward. A `line` that was already passed
    /// copies nothing, so a diagnostic added afterwards lands below the
    /// lines emitted since, not directly under its own line.
    pub fn advance_to(&mut self, line: usize) -> Vec<Diagnostic> {
        let target = line.min(self.source_lines.len());
        let mut overlong = Vec::new();

        while self.emitted < target {
            let number = self.emitted + 1;
            let text = &self.source_lines[self.emitted];
            let length = text.chars().count();
            self.out.append_line(format!("{}: {}", number, text));

            if length > self.max_line_length {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::Lexical,
                    number,
                    format!(
                        "The length of the line exceeds {} characters.",
                        self.max_line_length
                    ),
                );
                self.out.append_line(diagnostic.to_string());
                overlong.push(diagnostic);
            }

            self.emitted += 1;
        }

        overlong
    }

    /// Copy whatever source is left.
    pub fn finish(&mut self) -> Vec<Diagnostic> {
        self.advance_to(self.source_lines.len())
    }

    pub fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.out.append_line(diagnostic.to_string());
    }

    pub fn lines(&self) -> &[String] {
        self.out.lines()
    }

    pub fn to_text(&self) -> String {
        self.out.to_text()
    }
}
