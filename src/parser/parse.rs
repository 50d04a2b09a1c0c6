//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the shared helper methods every
//! production uses, and the [`Compilation`] result handed back to callers.
//!
//! # Parser Architecture
//!
//! The Parser is a one-pass recursive descent parser over an LL(1) grammar.
//! It pulls tokens from the [`Scanner`] on demand and performs declaration
//! processing and type checking while it parses:
//! - This module: Parser struct, token helpers, error reporting, recovery
//! - `declarations`: program header, variable declarations, procedures
//! - `statements`: compound, assignment, call, `if`, `while`
//! - `expressions`: relational, additive and multiplicative chains, factors
//!
//! # Error Recovery
//!
//! Problems never abort the parse. A syntax error is reported once, then the
//! parser discards tokens until it reaches the expected token or a member of
//! the current production's synchronizing set (see [`super::recovery`]).
//! Lexical errors are reported as the tokens arrive and the `LEXERR` tokens
//! are skipped. Once end of file is reported as unexpected, later
//! expectations fail silently so a truncated file produces one error.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use super::recovery::{Expected, SYNC_PROGRAM};
use super::scanner::Scanner;
use super::token::{Attribute, Token, TokenKind};
use crate::config::CompilerConfig;
use crate::report::{Collector, Diagnostic, DiagnosticKind, Listing, TextCollector};
use crate::semantics::{ScopeId, ScopeTree, SymbolTable};
use tracing::{debug, info};

/// Everything one compilation run produced
#[derive(Debug, Clone)]
pub struct Compilation {
    /// In the order they were found
    pub diagnostics: Vec<Diagnostic>,
    pub listing: Listing,
    /// One line per non-whitespace token: `<line>: "<lexeme>" KIND ATTR`
    pub tokens: TextCollector,
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
}

impl Compilation {
    /// No diagnostics of any kind.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn symbol_dump(&self) -> TextCollector {
        let mut out = TextCollector::new();
        self.symbols.write(&mut out);
        out
    }

    pub fn memory_offsets(&self) -> TextCollector {
        let mut out = TextCollector::new();
        self.scopes.get_memory_offset(&mut out);
        out
    }
}

/// Recursive descent parser with inline semantic analysis
pub struct Parser {
    pub(crate) scanner: Scanner,
    pub(crate) current: Token,
    pub(crate) symbols: SymbolTable,
    pub(crate) scopes: ScopeTree,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) listing: Listing,
    pub(crate) tokens: TextCollector,
    pub(crate) eof_reported: bool,
}

impl Parser {
    pub fn new(source: &str, config: &CompilerConfig) -> Self {
        let mut parser = Self {
            scanner: Scanner::new(source, config.reserved.clone(), config.limits),
            current: Token::new(TokenKind::Whitespace, Attribute::Null, "", 1),
            symbols: SymbolTable::new(),
            scopes: ScopeTree::new(),
            diagnostics: Vec::new(),
            listing: Listing::new(source, config.limits.line),
            tokens: TextCollector::new(),
            eof_reported: false,
        };
        parser.advance();
        parser
    }

    /// Parse the whole program and hand back everything collected.
    pub fn parse(mut self) -> Compilation {
        self.program();

        self.skip_trivia();
        if !self.current.is_eof() {
            self.unexpected(&[Expected::Kind(TokenKind::Eof)]);
            self.synchronize(SYNC_PROGRAM);
        }

        let overlong = self.listing.finish();
        self.diagnostics.extend(overlong);

        info!(
            diagnostics = self.diagnostics.len(),
            symbols = self.symbols.len(),
            scopes = self.scopes.len(),
            "parse finished"
        );

        Compilation {
            diagnostics: self.diagnostics,
            listing: self.listing,
            tokens: self.tokens,
            symbols: self.symbols,
            scopes: self.scopes,
        }
    }

    // ===== Helper methods =====

    /// Pull the next token from the scanner. End of file is sticky.
    pub(crate) fn advance(&mut self) {
        if self.current.is_eof() {
            return;
        }

        let token = match self.scanner.next_token() {
            Ok(tok) => tok,
            Err(err) => {
                self.report_at(DiagnosticKind::Lexical, err.line(), err.message);
                err.token
            }
        };

        if token.kind() != TokenKind::Whitespace {
            self.tokens.append_line(format!("{}: {}", token.line(), token));
        }
        self.current = token;
    }

    /// Current token, then advance.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current.clone();
        self.advance();
        token
    }

    pub(crate) fn skip_trivia(&mut self) {
        while self.current.is_trivia() {
            self.advance();
        }
    }

    /// Does the next significant token match? Never consumes it.
    pub(crate) fn accept(&mut self, expected: Expected) -> bool {
        self.skip_trivia();
        expected.matches(&self.current)
    }

    /// Consume the expected token, or report and recover.
    ///
    /// On a mismatch the error is reported, then tokens are discarded until
    /// either the expected token turns up (it is consumed and returned) or a
    /// member of `sync` is reached (left in place, `None` returned).
    pub(crate) fn expect(&mut self, expected: Expected, sync: &[Expected]) -> Option<Token> {
        if self.accept(expected) {
            return Some(self.bump());
        }

        self.unexpected(&[expected]);

        let start = self.current.line();
        let mut skipped = 0usize;
        loop {
            self.skip_trivia();
            if expected.matches(&self.current) {
                debug!(skipped, line = start, "resynchronized on expected token");
                return Some(self.bump());
            }
            if self.at_sync_point(sync) {
                debug!(skipped, line = start, "resynchronized on follow set");
                return None;
            }
            self.advance();
            skipped += 1;
        }
    }

    /// Report that none of `expected` was found, then skip to `sync`.
    pub(crate) fn syntax_error(&mut self, expected: &[Expected], sync: &[Expected]) {
        self.unexpected(expected);
        self.synchronize(sync);
    }

    /// Discard tokens until a member of `sync` or end of file.
    pub(crate) fn synchronize(&mut self, sync: &[Expected]) {
        let mut skipped = 0usize;
        loop {
            self.skip_trivia();
            if self.at_sync_point(sync) {
                break;
            }
            self.advance();
            skipped += 1;
        }
        debug!(skipped, line = self.current.line(), "panic-mode recovery");
    }

    fn at_sync_point(&self, sync: &[Expected]) -> bool {
        self.current.is_eof() || sync.iter().any(|s| s.matches(&self.current))
    }

    pub(crate) fn unexpected(&mut self, expected: &[Expected]) {
        if self.current.is_eof() {
            if self.eof_reported {
                return;
            }
            self.eof_reported = true;
        }

        let wanted = expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        let message = format!("expected {}, got {}", wanted, self.current.describe());
        self.report(DiagnosticKind::Syntax, message);
    }

    /// Report a problem at the current token's line.
    pub(crate) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let line = self.current.line();
        self.report_at(kind, line, message);
    }

    pub(crate) fn report_at(
        &mut self,
        kind: DiagnosticKind,
        line: usize,
        message: impl Into<String>,
    ) {
        let overlong = self.listing.advance_to(line);
        self.diagnostics.extend(overlong);

        let diagnostic = Diagnostic::new(kind, line, message);
        debug!(%diagnostic, line, "diagnostic");
        self.listing.add_diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Innermost open scope, once the program scope exists.
    pub(crate) fn current_scope(&self) -> Option<ScopeId> {
        self.scopes.current()
    }
}

/// Run the front end over one source text.
pub fn compile(source: &str, config: &CompilerConfig) -> Compilation {
    Parser::new(source, config).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Compilation {
        compile(source, &CompilerConfig::default())
    }

    #[test]
    fn test_clean_program() {
        let result = run("program p(); begin end.");
        assert!(result.is_clean(), "{:?}", result.diagnostics);
    }

    #[test]
    fn test_trailing_tokens_reported_once() {
        let result = run("program p(); begin end. x y z");
        assert_eq!(result.count(DiagnosticKind::Syntax), 1);
        assert!(result.diagnostics[0].message.contains("expected end of file"));
    }

    #[test]
    fn test_truncated_file_reports_eof_once() {
        let result = run("program p(); begin");
        assert_eq!(result.count(DiagnosticKind::Syntax), 1);
        assert!(result.diagnostics[0].message.ends_with("got end of file"));
    }

    #[test]
    fn test_lexical_errors_are_skipped() {
        let result = run("program p(); var x: integer; begin x := 1 @ end.");
        assert_eq!(result.count(DiagnosticKind::Lexical), 1);
        assert_eq!(result.count(DiagnosticKind::Syntax), 0);
    }

    #[test]
    fn test_token_trace_skips_whitespace() {
        let result = run("program p(); begin end.");
        let trace = result.tokens.lines();
        assert_eq!(trace[0], "1: \"program\" RES PROG");
        assert!(trace.iter().all(|line| !line.contains(" WS ")));
        assert!(trace.last().is_some_and(|l| l.contains("EOF")));
    }

    #[test]
    fn test_diagnostic_follows_source_line_in_listing() {
        let result = run("program p();\nbegin\n  y := 1\nend.");
        let lines = result.listing.lines();
        let at = lines
            .iter()
            .position(|l| l.starts_with("Scope Error"))
            .unwrap();
        assert_eq!(lines[at - 1], "3:   y := 1");
        assert_eq!(lines.last().unwrap(), "4: end.");
    }

    #[test]
    fn test_expect_leaves_sync_token_for_caller() {
        // `then` is missing; `x` and `:=` are skipped, `;` is left in place
        // so the statement list carries on with the next statement
        let source = "program p();\nvar x: integer;\nbegin\n  if x = 1 x := 1;\n  x := 1.5\nend.";
        let result = run(source);
        let messages: Vec<String> = result.diagnostics.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Syntax Error: expected 'then', got 'x' (ID)",
                "Type Error: cannot assign REAL to INT",
            ]
        );
    }

    #[test]
    fn test_expect_consumes_expected_token_after_skip() {
        // the stray `1` is skipped and the `)` after it closes the header
        let result = run("program p(a 1); begin end.");
        assert_eq!(result.count(DiagnosticKind::Syntax), 1);
        let root = result.scopes.root().expect("program scope");
        assert_eq!(result.scopes.node(root).param_count, 1);
    }
}
