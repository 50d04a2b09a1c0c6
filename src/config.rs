//! Front-end configuration
//!
//! [`CompilerConfig`] bundles everything the scanner needs before the first
//! token is read: the numeric and identifier limits ([`ScanLimits`]) and the
//! reserved-word dictionary ([`ReservedWords`]).
//!
//! The reserved-word list can be loaded from a plain text file with one word
//! per line. Blank lines and lines starting with `#` are ignored. Every word
//! must be one the grammar knows about, since the file only chooses *which*
//! spellings are reserved; the token each one produces is fixed.

use crate::constants::*;
use crate::parser::token::{Attribute, TokenKind};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read reserved-word file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: '{word}' is not a reserved word of the language")]
    UnknownReservedWord { word: String, line: usize },
}

/// Every spelling the grammar can treat as reserved, with the token it yields.
const KEYWORDS: &[(&str, TokenKind, Attribute)] = &[
    ("program", TokenKind::Reserved, Attribute::Program),
    ("var", TokenKind::Reserved, Attribute::Var),
    ("array", TokenKind::Reserved, Attribute::Array),
    ("of", TokenKind::Reserved, Attribute::Of),
    ("integer", TokenKind::Reserved, Attribute::IntegerDecl),
    ("real", TokenKind::Reserved, Attribute::RealDecl),
    ("procedure", TokenKind::Reserved, Attribute::Procedure),
    ("begin", TokenKind::Reserved, Attribute::Begin),
    ("end", TokenKind::Reserved, Attribute::End),
    ("if", TokenKind::Reserved, Attribute::If),
    ("then", TokenKind::Reserved, Attribute::Then),
    ("else", TokenKind::Reserved, Attribute::Else),
    ("while", TokenKind::Reserved, Attribute::While),
    ("do", TokenKind::Reserved, Attribute::Do),
    ("not", TokenKind::Reserved, Attribute::Not),
    ("call", TokenKind::Reserved, Attribute::Call),
    ("or", TokenKind::AddOp, Attribute::Or),
    ("and", TokenKind::MulOp, Attribute::And),
    ("mod", TokenKind::MulOp, Attribute::Mod),
];

/// Reserved-word dictionary consulted by the identifier sub-scan
#[derive(Debug, Clone)]
pub struct ReservedWords {
    words: FxHashMap<String, (TokenKind, Attribute)>,
}

impl ReservedWords {
    /// Empty dictionary: every word scans as an identifier.
    pub fn empty() -> Self {
        ReservedWords {
            words: FxHashMap::default(),
        }
    }

    /// Parse a one-word-per-line list.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut reserved = ReservedWords::empty();

        for (idx, raw) in text.lines().enumerate() {
            let word = raw.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }

            let (_, kind, attr) = KEYWORDS
                .iter()
                .find(|(spelling, _, _)| *spelling == word)
                .ok_or_else(|| ConfigError::UnknownReservedWord {
                    word: word.to_string(),
                    line: idx + 1,
                })?;
            reserved.words.insert(word.to_string(), (*kind, *attr));
        }

        Ok(reserved)
    }

    /// Read and parse a reserved-word file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn lookup(&self, word: &str) -> Option<(TokenKind, Attribute)> {
        self.words.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        let words = KEYWORDS
            .iter()
            .map(|(spelling, kind, attr)| (spelling.to_string(), (*kind, *attr)))
            .collect();
        ReservedWords { words }
    }
}

/// Length limits enforced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub identifier: usize,
    pub line: usize,
    pub integer_digits: usize,
    pub whole_digits: usize,
    pub fraction_digits: usize,
    pub exponent_digits: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        ScanLimits {
            identifier: MAX_IDENTIFIER_LENGTH,
            line: MAX_LINE_LENGTH,
            integer_digits: MAX_INTEGER_DIGITS,
            whole_digits: MAX_WHOLE_DIGITS,
            fraction_digits: MAX_FRACTION_DIGITS,
            exponent_digits: MAX_EXPONENT_DIGITS,
        }
    }
}

/// Configuration for one compilation run
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub limits: ScanLimits,
    pub reserved: ReservedWords,
}

impl CompilerConfig {
    pub fn new(reserved: ReservedWords) -> Self {
        CompilerConfig {
            limits: ScanLimits::default(),
            reserved,
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }
}
