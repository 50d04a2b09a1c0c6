//! Flat registry of declared names
//!
//! Symbols are keyed by `(name, type)` rather than by name alone, so the same
//! spelling can be declared with different types in nested procedures. The
//! table owns every symbol for the whole compilation; scope bindings refer to
//! them by [`SymbolId`].

use super::types::Type;
use crate::report::Collector;
use thiserror::Error;

/// Index of a symbol in its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub size: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, size: usize) -> Self {
        Symbol {
            name: name.into(),
            ty,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol '{name}' of type {ty} already exists")]
    Duplicate { name: String, ty: Type },

    #[error("symbol '{name}' of type {ty} not found")]
    NotFound { name: String, ty: Type },
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol unless its `(name, type)` pair is already present.
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<SymbolId, SymbolError> {
        if self.get_ptr(&symbol.name, symbol.ty).is_ok() {
            return Err(SymbolError::Duplicate {
                name: symbol.name,
                ty: symbol.ty,
            });
        }

        self.symbols.push(symbol);
        Ok(SymbolId(self.symbols.len() - 1))
    }

    /// Find the symbol with exactly this `(name, type)` pair.
    pub fn get_ptr(&self, name: &str, ty: Type) -> Result<SymbolId, SymbolError> {
        self.symbols
            .iter()
            .position(|s| s.name == name && s.ty == ty)
            .map(SymbolId)
            .ok_or_else(|| SymbolError::NotFound {
                name: name.to_string(),
                ty,
            })
    }

    /// Register a symbol, or return the existing one for the same pair.
    pub fn intern(&mut self, symbol: Symbol) -> SymbolId {
        match self.get_ptr(&symbol.name, symbol.ty) {
            Ok(id) => id,
            Err(_) => {
                self.symbols.push(symbol);
                SymbolId(self.symbols.len() - 1)
            }
        }
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Dump every symbol as `name, TYPE, size`.
    pub fn write<C: Collector + ?Sized>(&self, out: &mut C) {
        for symbol in self.iter() {
            out.append_line(format!("{}, {}, {}", symbol.name, symbol.ty, symbol.size));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TextCollector;

    #[test]
    fn test_add_then_lookup() {
        let mut table = SymbolTable::new();
        let id = table.add_symbol(Symbol::new("x", Type::Int, 4)).unwrap();

        assert_eq!(table.get_ptr("x", Type::Int), Ok(id));
        assert_eq!(table.get(id).size, 4);
    }

    #[test]
    fn test_iter_keeps_insertion_order() {
        let mut table = SymbolTable::new();
        table.add_symbol(Symbol::new("b", Type::Real, 8)).unwrap();
        table.add_symbol(Symbol::new("a", Type::Int, 4)).unwrap();

        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut table = SymbolTable::new();
        table.add_symbol(Symbol::new("x", Type::Int, 4)).unwrap();

        let err = table.add_symbol(Symbol::new("x", Type::Int, 4)).unwrap_err();
        assert!(matches!(err, SymbolError::Duplicate { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_name_other_type_allowed() {
        let mut table = SymbolTable::new();
        let a = table.add_symbol(Symbol::new("x", Type::Int, 4)).unwrap();
        let b = table.add_symbol(Symbol::new("x", Type::Real, 8)).unwrap();

        assert_ne!(a, b);
        assert!(table.get_ptr("x", Type::Bool).is_err());
    }

    #[test]
    fn test_intern_reuses() {
        let mut table = SymbolTable::new();
        let a = table.intern(Symbol::new("i", Type::Int, 4));
        let b = table.intern(Symbol::new("i", Type::Int, 4));
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_write() {
        let mut table = SymbolTable::new();
        table.intern(Symbol::new("p", Type::ProgramName, 0));
        table.intern(Symbol::new("v", Type::ArrayReal, 80));

        let mut out = TextCollector::new();
        table.write(&mut out);
        assert_eq!(out.lines(), &["p, PGNAME, 0", "v, AREAL, 80"]);
    }
}
