//! Source text front end
//!
//! This module turns source text into diagnostics and semantic tables:
//! - [`token`]: token kinds, attributes and the [`token::Token`] value
//! - [`scanner`]: on-demand tokenization with backtracking sub-scans
//! - [`recovery`]: synchronizing sets for panic-mode recovery
//! - [`parse`]: the [`Parser`] and the [`Compilation`] it produces
//!
//! # Supported Language
//!
//! A small Pascal-like language:
//! - Types: `integer`, `real`, one-dimensional `array [lo..hi] of T`
//! - Nested procedures with value parameters, invoked with `call`
//! - Statements: assignment, `call`, `begin ... end`, `if/then/else`, `while/do`
//! - No functions, no records, no I/O
//!
//! # Parser Implementation
//!
//! Hand-written one-pass recursive descent over an LL(1) grammar, with type
//! checking and scope bookkeeping done inline. No external parser generator
//! dependencies.

mod declarations;
mod expressions;
pub mod parse;
pub mod recovery;
pub mod scanner;
mod statements;
pub mod token;

pub use parse::{compile, Compilation, Parser};
