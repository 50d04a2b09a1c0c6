//! Name and type bookkeeping for the parser
//!
//! - [`types`]: semantic types (`INT`, `REAL`, arrays, parameter forms, ...)
//! - [`symbols`]: flat `(name, type)` registry that owns every symbol
//! - [`scope`]: the scope tree with outward name resolution and the
//!   memory-offset pass
//!
//! # Storage Sizes
//!
//! - `integer`: 4 bytes
//! - `real`: 8 bytes
//! - `array [lo..hi] of T`: `(hi - lo + 1) * sizeof(T)`
//! - program parameters and procedure names: 0 bytes

pub mod scope;
pub mod symbols;
pub mod types;

pub use scope::{Binding, MemoryOffset, ScopeError, ScopeId, ScopeNode, ScopeTree};
pub use symbols::{Symbol, SymbolError, SymbolId, SymbolTable};
pub use types::Type;
