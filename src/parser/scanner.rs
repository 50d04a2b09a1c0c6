//! Scanner (tokenizer) for Pascal-like source text
//!
//! The scanner works over the raw bytes of the source with two cursors: the
//! *committed* cursor marks the end of the last accepted lexeme, and the
//! *forward* cursor runs ahead speculatively. Each call to
//! [`Scanner::next_token`] tries a fixed sequence of sub-scans (identifier,
//! whitespace, long real, real, integer, operators, punctuation). A sub-scan
//! that does not match rolls the forward cursor back to the committed one, so
//! no partial consumption leaks into the next attempt.
//!
//! # Numbers
//!
//! ```text
//! long real  whole "." fraction "E" [+|-] exponent
//! real       whole "." fraction
//! integer    digits
//! ```
//!
//! `whole` may only start with `0` when it is exactly `0` and is followed by
//! `.`; an integer starting with `0` (including a bare `0`) is a lexical
//! error. Over-long parts are consumed whole and reported once.

use super::token::{Attribute, Token, TokenKind};
use crate::config::{ReservedWords, ScanLimits};
use thiserror::Error;
use tracing::trace;

/// A malformed or unrecognized lexeme.
///
/// Carries the `LEXERR` token so the caller can log it and skip it like any
/// other token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    pub token: Token,
    pub message: String,
}

impl LexError {
    pub fn line(&self) -> usize {
        self.token.line()
    }

    pub fn cause(&self) -> Attribute {
        self.token.attr()
    }
}

/// Saved scanner position, see [`Scanner::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    forward: usize,
    committed: usize,
    line: usize,
}

/// Scanner over one source buffer
pub struct Scanner {
    source: Vec<u8>,
    forward: usize,
    committed: usize,
    line: usize,
    reserved: ReservedWords,
    limits: ScanLimits,
}

impl Scanner {
    /// Create a scanner for the given source string.
    pub fn new(source: &str, reserved: ReservedWords, limits: ScanLimits) -> Self {
        Self {
            source: source.as_bytes().to_vec(),
            forward: 0,
            committed: 0,
            line: 1,
            reserved,
            limits,
        }
    }

    /// Current 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            forward: self.forward,
            committed: self.committed,
            line: self.line,
        }
    }

    /// Rewind to a saved position. Scanning from there reproduces the same
    /// tokens.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.forward = checkpoint.forward;
        self.committed = checkpoint.committed;
        self.line = checkpoint.line;
    }

    /// Scan the whole input, up to and including the EOF token.
    pub fn tokenize(&mut self) -> Vec<Result<Token, LexError>> {
        let mut tokens = Vec::new();

        loop {
            let next = self.next_token();
            let done = matches!(&next, Ok(tok) if tok.is_eof());
            tokens.push(next);
            if done {
                break;
            }
        }

        tokens
    }

    /// Produce the next token.
    ///
    /// Lexical errors come back as `Err`; the error carries the `LEXERR`
    /// token and the scanner has already moved past the offending lexeme.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_layout();

        if self.is_at_end() {
            return Ok(Token::eof(self.line));
        }

        let result = self.scan();
        if let Ok(tok) = &result {
            trace!(line = tok.line(), token = %tok, "scanned");
        }
        result
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        if let Some(result) = self.scan_identifier() {
            return result;
        }
        if let Some(tok) = self.scan_whitespace() {
            return Ok(tok);
        }
        if let Some(result) = self.scan_long_real() {
            return result;
        }
        if let Some(result) = self.scan_real() {
            return result;
        }
        if let Some(result) = self.scan_integer() {
            return result;
        }
        if let Some(tok) = self.scan_assign() {
            return Ok(tok);
        }
        if let Some(tok) = self.scan_relop() {
            return Ok(tok);
        }
        if let Some(tok) = self.scan_addop() {
            return Ok(tok);
        }
        if let Some(tok) = self.scan_mulop() {
            return Ok(tok);
        }
        if let Some(tok) = self.scan_punctuation() {
            return Ok(tok);
        }

        Err(self.scan_unrecognized())
    }

    /// Newlines (counted) and tabs produce no token.
    fn skip_layout(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b'\n' => {
                    self.line += 1;
                    self.bump();
                }
                b'\t' | b'\r' => {
                    self.bump();
                }
                _ => break,
            }
        }
        self.commit();
    }

    fn scan_identifier(&mut self) -> Option<Result<Token, LexError>> {
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.bump();
        }

        let lexeme = self.lexeme();
        if lexeme.len() > self.limits.identifier {
            let message = format!(
                "Identifier '{}' exceeds {} characters",
                lexeme, self.limits.identifier
            );
            return Some(Err(self.reject(Attribute::ExtraLongId, message)));
        }

        let (kind, attr) = self
            .reserved
            .lookup(&lexeme)
            .unwrap_or((TokenKind::Identifier, Attribute::Null));
        Some(Ok(self.accept(kind, attr)))
    }

    fn scan_whitespace(&mut self) -> Option<Token> {
        if self.peek() != Some(b' ') {
            return None;
        }
        while self.peek() == Some(b' ') {
            self.bump();
        }
        Some(self.accept(TokenKind::Whitespace, Attribute::Null))
    }

    fn scan_long_real(&mut self) -> Option<Result<Token, LexError>> {
        let Some((whole, fraction)) = self.scan_real_prefix() else {
            self.reset();
            return None;
        };

        if self.peek() != Some(b'E') {
            self.reset();
            return None;
        }
        self.bump();
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.bump();
        }

        let exponent = self.digits();
        if exponent == 0 {
            self.reset();
            return None;
        }

        Some(self.finish_real(whole, fraction, exponent, Attribute::LongReal))
    }

    fn scan_real(&mut self) -> Option<Result<Token, LexError>> {
        let Some((whole, fraction)) = self.scan_real_prefix() else {
            self.reset();
            return None;
        };

        Some(self.finish_real(whole, fraction, 0, Attribute::Real))
    }

    /// `whole "." fraction`, returning the digit counts of both parts.
    fn scan_real_prefix(&mut self) -> Option<(usize, usize)> {
        let whole = match self.peek() {
            Some(b'0') => {
                self.bump();
                if self.peek() != Some(b'.') {
                    return None;
                }
                1
            }
            Some(c) if c.is_ascii_digit() => self.digits(),
            _ => return None,
        };

        if self.peek() != Some(b'.') || !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        self.bump();

        let fraction = self.digits();
        Some((whole, fraction))
    }

    fn finish_real(
        &mut self,
        whole: usize,
        fraction: usize,
        exponent: usize,
        attr: Attribute,
    ) -> Result<Token, LexError> {
        let lexeme = self.lexeme();

        if whole > self.limits.whole_digits {
            let message = format!(
                "Whole part of '{}' exceeds {} digits",
                lexeme, self.limits.whole_digits
            );
            return Err(self.reject(Attribute::ExtraLongInt, message));
        }
        if fraction > self.limits.fraction_digits {
            let message = format!(
                "Fractional part of '{}' exceeds {} digits",
                lexeme, self.limits.fraction_digits
            );
            return Err(self.reject(Attribute::ExtraLongFrac, message));
        }
        if exponent > self.limits.exponent_digits {
            let message = format!(
                "Exponent of '{}' exceeds {} digits",
                lexeme, self.limits.exponent_digits
            );
            return Err(self.reject(Attribute::ExtraLongExp, message));
        }

        Ok(self.accept(TokenKind::Number, attr))
    }

    fn scan_integer(&mut self) -> Option<Result<Token, LexError>> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }

        let count = self.digits();
        let lexeme = self.lexeme();

        if lexeme.starts_with('0') {
            let message = format!("Leading zero in integer '{}'", lexeme);
            return Some(Err(self.reject(Attribute::LeadingZero, message)));
        }
        if count > self.limits.integer_digits {
            let message = format!(
                "Integer '{}' exceeds {} digits",
                lexeme, self.limits.integer_digits
            );
            return Some(Err(self.reject(Attribute::ExtraLongInt, message)));
        }

        Some(Ok(self.accept(TokenKind::Number, Attribute::Int)))
    }

    fn scan_assign(&mut self) -> Option<Token> {
        if self.peek() == Some(b':') && self.peek_at(1) == Some(b'=') {
            self.bump();
            self.bump();
            return Some(self.accept(TokenKind::Assign, Attribute::Null));
        }
        None
    }

    fn scan_relop(&mut self) -> Option<Token> {
        let attr = match self.peek()? {
            b'<' => {
                self.bump();
                match self.peek() {
                    Some(b'>') => {
                        self.bump();
                        Attribute::NotEq
                    }
                    Some(b'=') => {
                        self.bump();
                        Attribute::LessEq
                    }
                    _ => Attribute::Less,
                }
            }
            b'>' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    Attribute::GreaterEq
                } else {
                    Attribute::Greater
                }
            }
            b'=' => {
                self.bump();
                Attribute::Eq
            }
            _ => return None,
        };
        Some(self.accept(TokenKind::RelOp, attr))
    }

    fn scan_addop(&mut self) -> Option<Token> {
        let attr = match self.peek()? {
            b'+' => Attribute::Add,
            b'-' => Attribute::Sub,
            _ => return None,
        };
        self.bump();
        Some(self.accept(TokenKind::AddOp, attr))
    }

    fn scan_mulop(&mut self) -> Option<Token> {
        let attr = match self.peek()? {
            b'*' => Attribute::Mul,
            b'/' => Attribute::Div,
            _ => return None,
        };
        self.bump();
        Some(self.accept(TokenKind::MulOp, attr))
    }

    fn scan_punctuation(&mut self) -> Option<Token> {
        let attr = match self.peek()? {
            b'(' => Attribute::LeftParen,
            b')' => Attribute::RightParen,
            b'[' => Attribute::LeftBracket,
            b']' => Attribute::RightBracket,
            b',' => Attribute::Comma,
            b';' => Attribute::Semicolon,
            b':' => Attribute::Colon,
            b'.' => {
                self.bump();
                if self.peek() == Some(b'.') {
                    self.bump();
                    return Some(self.accept(TokenKind::Range, Attribute::Null));
                }
                return Some(self.accept(TokenKind::Reserved, Attribute::Period));
            }
            _ => return None,
        };
        self.bump();
        Some(self.accept(TokenKind::Reserved, attr))
    }

    /// Consume one character (a whole UTF-8 sequence for non-ASCII input).
    fn scan_unrecognized(&mut self) -> LexError {
        if let Some(first) = self.bump() {
            if first >= 0x80 {
                while self.peek().is_some_and(|c| c & 0xC0 == 0x80) {
                    self.bump();
                }
            }
        }

        let message = format!("Unrecognized symbol '{}'", self.lexeme());
        self.reject(Attribute::Unrecognized, message)
    }

    // ===== Cursor helpers =====

    fn peek(&self) -> Option<u8> {
        self.source.get(self.forward).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.source.get(self.forward + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.forward += 1;
        Some(ch)
    }

    fn digits(&mut self) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            count += 1;
        }
        count
    }

    fn is_at_end(&self) -> bool {
        self.forward >= self.source.len()
    }

    fn reset(&mut self) {
        self.forward = self.committed;
    }

    fn commit(&mut self) {
        self.committed = self.forward;
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.source[self.committed..self.forward]).into_owned()
    }

    fn accept(&mut self, kind: TokenKind, attr: Attribute) -> Token {
        let tok = Token::new(kind, attr, self.lexeme(), self.line);
        self.commit();
        tok
    }

    fn reject(&mut self, cause: Attribute, message: String) -> LexError {
        let token = self.accept(TokenKind::LexError, cause);
        LexError { token, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(source: &str) -> Scanner {
        Scanner::new(source, ReservedWords::default(), ScanLimits::default())
    }

    fn scan_ok(source: &str) -> Vec<Token> {
        scanner(source)
            .tokenize()
            .into_iter()
            .map(|r| r.expect("unexpected lexical error"))
            .filter(|t| t.kind() != TokenKind::Whitespace)
            .collect()
    }

    fn single(source: &str) -> Result<Token, LexError> {
        scanner(source).next_token()
    }

    #[test]
    fn test_program_header() {
        let tokens = scan_ok("program p(a, b);");
        let shape: Vec<(TokenKind, Attribute)> =
            tokens.iter().map(|t| (t.kind(), t.attr())).collect();

        assert_eq!(
            shape,
            vec![
                (TokenKind::Reserved, Attribute::Program),
                (TokenKind::Identifier, Attribute::Null),
                (TokenKind::Reserved, Attribute::LeftParen),
                (TokenKind::Identifier, Attribute::Null),
                (TokenKind::Reserved, Attribute::Comma),
                (TokenKind::Identifier, Attribute::Null),
                (TokenKind::Reserved, Attribute::RightParen),
                (TokenKind::Reserved, Attribute::Semicolon),
                (TokenKind::Eof, Attribute::Null),
            ]
        );
    }

    #[test]
    fn test_whitespace_token() {
        let tok = single("   x").unwrap();
        assert_eq!(tok.kind(), TokenKind::Whitespace);
        assert_eq!(tok.lexeme(), "   ");
    }

    #[test]
    fn test_newlines_and_tabs_counted_not_emitted() {
        let mut s = scanner("\n\t\nx");
        let tok = s.next_token().unwrap();
        assert_eq!(tok.kind(), TokenKind::Identifier);
        assert_eq!(tok.line(), 3);
    }

    #[test]
    fn test_identifier_length_limit() {
        let ok = single("abcdefghij").unwrap();
        assert_eq!(ok.kind(), TokenKind::Identifier);

        let err = single("abcdefghijk").unwrap_err();
        assert_eq!(err.cause(), Attribute::ExtraLongId);
        assert_eq!(err.token.kind(), TokenKind::LexError);
        assert_eq!(err.token.lexeme(), "abcdefghijk");
    }

    #[test]
    fn test_operator_attributes() {
        let tokens = scan_ok("<> <= >= < > = + - * / := or and mod");
        let attrs: Vec<Attribute> = tokens.iter().map(|t| t.attr()).collect();
        assert_eq!(
            attrs,
            vec![
                Attribute::NotEq,
                Attribute::LessEq,
                Attribute::GreaterEq,
                Attribute::Less,
                Attribute::Greater,
                Attribute::Eq,
                Attribute::Add,
                Attribute::Sub,
                Attribute::Mul,
                Attribute::Div,
                Attribute::Null,
                Attribute::Or,
                Attribute::And,
                Attribute::Mod,
                Attribute::Null,
            ]
        );
        assert_eq!(tokens[10].kind(), TokenKind::Assign);
        assert_eq!(tokens[11].kind(), TokenKind::AddOp);
        assert_eq!(tokens[12].kind(), TokenKind::MulOp);
    }

    #[test]
    fn test_number_classes() {
        assert_eq!(single("42").unwrap().attr(), Attribute::Int);
        assert_eq!(single("3.25").unwrap().attr(), Attribute::Real);
        assert_eq!(single("0.5").unwrap().attr(), Attribute::Real);
        assert_eq!(single("1.5E10").unwrap().attr(), Attribute::LongReal);
        assert_eq!(single("0.5E-3").unwrap().attr(), Attribute::LongReal);
    }

    #[test]
    fn test_range_splits_integers() {
        let tokens = scan_ok("1..10");
        assert_eq!(tokens[0].attr(), Attribute::Int);
        assert_eq!(tokens[0].lexeme(), "1");
        assert_eq!(tokens[1].kind(), TokenKind::Range);
        assert_eq!(tokens[2].lexeme(), "10");
    }

    #[test]
    fn test_incomplete_exponent_falls_back_to_real() {
        let tokens = scan_ok("1.5E");
        assert_eq!(tokens[0].attr(), Attribute::Real);
        assert_eq!(tokens[0].lexeme(), "1.5");
        assert_eq!(tokens[1].kind(), TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme(), "E");
    }

    #[test]
    fn test_leading_zero_integer() {
        let err = single("007").unwrap_err();
        assert_eq!(err.cause(), Attribute::LeadingZero);
        assert_eq!(err.token.lexeme(), "007");

        let err = single("0").unwrap_err();
        assert_eq!(err.cause(), Attribute::LeadingZero);
    }

    #[test]
    fn test_numeric_length_limits() {
        assert_eq!(single("12345678901").unwrap_err().cause(), Attribute::ExtraLongInt);
        assert_eq!(single("123456.5").unwrap_err().cause(), Attribute::ExtraLongInt);
        assert_eq!(single("1.123456").unwrap_err().cause(), Attribute::ExtraLongFrac);
        assert_eq!(single("1.5E123").unwrap_err().cause(), Attribute::ExtraLongExp);
    }

    #[test]
    fn test_unrecognized_symbol() {
        let mut s = scanner("@x");
        let err = s.next_token().unwrap_err();
        assert_eq!(err.cause(), Attribute::Unrecognized);
        assert_eq!(err.to_string(), "Unrecognized symbol '@'");

        let next = s.next_token().unwrap();
        assert_eq!(next.lexeme(), "x");
    }

    #[test]
    fn test_non_ascii_consumed_whole() {
        let mut s = scanner("é;");
        let err = s.next_token().unwrap_err();
        assert_eq!(err.token.lexeme(), "é");
        assert_eq!(s.next_token().unwrap().attr(), Attribute::Semicolon);
    }

    #[test]
    fn test_eof_repeats() {
        let mut s = scanner("x");
        s.next_token().unwrap();
        assert!(s.next_token().unwrap().is_eof());
        assert!(s.next_token().unwrap().is_eof());
    }

    #[test]
    fn test_restore_rescans_identically() {
        let mut s = scanner("x := 1.5E2;\ny");
        s.next_token().unwrap();
        let saved = s.checkpoint();

        let first: Vec<_> = (0..5).map(|_| s.next_token()).collect();
        s.restore(saved);
        let second: Vec<_> = (0..5).map(|_| s.next_token()).collect();

        assert_eq!(first, second);
    }
}
