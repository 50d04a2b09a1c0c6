//! # Introduction
//!
//! `pasfront` is the front end of a compiler for a small Pascal-like
//! language. One pass over the source scans tokens, parses them by recursive
//! descent, and checks declarations and types along the way. Nothing is
//! executed and no code is generated; the outputs are the diagnostics and the
//! tables a later back end would need.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Scanner → Parser (+ scope tree, symbol table, type checks) → Compilation
//! ```
//!
//! 1. [`parser::scanner`] hands out one token at a time, reporting malformed
//!    lexemes as `LEXERR` tokens.
//! 2. [`parser`] drives the grammar, recovers from syntax errors in panic
//!    mode, and performs declaration processing and type checking inline.
//! 3. [`semantics`] owns the symbol table, the scope tree and the
//!    memory-offset pass.
//! 4. [`report`] collects the source listing, diagnostics and text dumps.
//!
//! ## Example
//!
//! ```
//! use pasfront::{compile, CompilerConfig};
//!
//! let result = compile(
//!     "program p(); var x: integer; begin x := 1 end.",
//!     &CompilerConfig::default(),
//! );
//! assert!(result.is_clean());
//! assert_eq!(result.memory_offsets().lines(), &["p, N/A", "x, 0"]);
//! ```

pub mod config;
pub mod constants;
pub mod logger;
pub mod parser;
pub mod report;
pub mod semantics;

pub use config::CompilerConfig;
pub use parser::{compile, Compilation};
