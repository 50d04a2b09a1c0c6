//! Lexical scope tree
//!
//! Every program and procedure opens a scope node. Nodes live in an arena
//! owned by the [`ScopeTree`]; a node lists its children by [`ScopeId`] and
//! points back at its parent by id, so parents own children and nothing owns a
//! parent.
//!
//! Alongside the persistent tree the parser keeps a stack of the scopes that
//! are still open. Closing a procedure pops it from the stack only; the node
//! stays in the tree for the memory-offset pass.
//!
//! # Lookup
//!
//! Variable and procedure lookups start at a scope and walk outward through
//! its ancestors, first match wins. Siblings are never searched for
//! variables. Procedures additionally see the direct children of every scope
//! on that path, which is how a body calls a nested procedure, a sibling, or
//! itself.

use super::symbols::SymbolId;
use super::types::Type;
use crate::constants::OFFSET_SENTINEL;
use crate::report::Collector;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Index of a scope node in its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("'{name}' is already declared with type {ty}")]
    Duplicate { name: String, ty: Type },

    #[error("undeclared variable '{name}'")]
    VariableNotFound { name: String },

    #[error("undeclared procedure '{name}'")]
    ProcedureNotFound { name: String },
}

/// Variable or parameter bound in one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub symbol: SymbolId,
    /// Copied from the symbol so lookups don't need the symbol table.
    pub ty: Type,
    pub size: usize,
    pub is_param: bool,
}

/// One lexical scope: the program or a procedure
#[derive(Debug, Clone)]
pub struct ScopeNode {
    pub name: String,
    pub symbol: SymbolId,
    pub bindings: Vec<Binding>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub param_count: usize,
}

impl ScopeNode {
    fn new(name: &str, symbol: SymbolId, parent: Option<ScopeId>) -> Self {
        ScopeNode {
            name: name.to_string(),
            symbol,
            bindings: Vec::new(),
            parent,
            children: Vec::new(),
            param_count: 0,
        }
    }

    /// Declared parameter types, in order.
    pub fn param_types(&self) -> Vec<Type> {
        self.bindings
            .iter()
            .filter(|b| b.is_param)
            .map(|b| b.ty)
            .collect()
    }
}

/// One line of the memory-offset table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOffset {
    pub name: String,
    /// `None` for names whose storage is not laid out by this pass
    pub offset: Option<usize>,
}

impl fmt::Display for MemoryOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}, {}", self.name, offset),
            None => write!(f, "{}, {}", self.name, OFFSET_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
    stack: Vec<ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the program scope. Must be the first scope created.
    pub fn create_root(&mut self, name: &str, symbol: SymbolId) -> ScopeId {
        debug_assert!(self.nodes.is_empty(), "root scope created twice");
        debug!(scope = name, "open program scope");

        self.nodes.push(ScopeNode::new(name, symbol, None));
        let id = ScopeId(0);
        self.stack.push(id);
        id
    }

    /// Open a procedure scope under the current one.
    pub fn add_green_node(&mut self, name: &str, symbol: SymbolId) -> ScopeId {
        let parent = self.current();
        let id = ScopeId(self.nodes.len());
        debug!(scope = name, depth = self.stack.len(), "open procedure scope");

        self.nodes.push(ScopeNode::new(name, symbol, parent));
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.stack.push(id);
        id
    }

    /// Close the current scope. The node stays in the tree.
    pub fn pop(&mut self) -> Option<ScopeId> {
        let id = self.stack.pop()?;
        debug!(scope = %self.nodes[id.0].name, "close scope");
        Some(id)
    }

    /// Innermost open scope.
    pub fn current(&self) -> Option<ScopeId> {
        self.stack.last().copied()
    }

    pub fn root(&self) -> Option<ScopeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(ScopeId(0))
        }
    }

    pub fn node(&self, id: ScopeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bind a variable or parameter in `scope`.
    ///
    /// Fails when a binding of the same name and type is already in this scope,
    /// or when the nearest visible binding of that name (possibly in an
    /// enclosing scope) has the same type.
    pub fn add_blue_node(
        &mut self,
        scope: ScopeId,
        binding: Binding,
    ) -> Result<(), ScopeError> {
        let clash_here = self.nodes[scope.0]
            .bindings
            .iter()
            .any(|b| b.name == binding.name && b.ty == binding.ty);
        let clash_visible = self
            .find_blue_node(scope, &binding.name)
            .is_ok_and(|b| b.ty == binding.ty);

        if clash_here || clash_visible {
            return Err(ScopeError::Duplicate {
                name: binding.name,
                ty: binding.ty,
            });
        }

        let node = &mut self.nodes[scope.0];
        if binding.is_param {
            node.param_count += 1;
        }
        node.bindings.push(binding);
        Ok(())
    }

    /// Resolve a variable name from `scope` outward.
    pub fn find_blue_node(&self, scope: ScopeId, name: &str) -> Result<&Binding, ScopeError> {
        let mut cursor = Some(scope);

        while let Some(id) = cursor {
            let node = &self.nodes[id.0];
            if let Some(binding) = node.bindings.iter().find(|b| b.name == name) {
                return Ok(binding);
            }
            cursor = node.parent;
        }

        Err(ScopeError::VariableNotFound {
            name: name.to_string(),
        })
    }

    /// Resolve a procedure name from `scope` outward: each scope on the path
    /// is checked itself, then its direct children.
    pub fn find_green_node(&self, scope: ScopeId, name: &str) -> Result<ScopeId, ScopeError> {
        let mut cursor = Some(scope);

        while let Some(id) = cursor {
            let node = &self.nodes[id.0];
            if node.name == name && node.parent.is_some() {
                return Ok(id);
            }
            if let Some(child) = node
                .children
                .iter()
                .copied()
                .find(|c| self.nodes[c.0].name == name)
            {
                return Ok(child);
            }
            cursor = node.parent;
        }

        Err(ScopeError::ProcedureNotFound {
            name: name.to_string(),
        })
    }

    /// Procedure declared directly inside `scope` with this name.
    pub fn find_child(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.nodes[scope.0]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].name == name)
    }

    /// Walk the tree depth-first from the root and lay out storage.
    ///
    /// Offsets restart at 0 in every scope and grow by each binding's size.
    /// Parameters and the scope names themselves get no offset.
    pub fn memory_offsets(&self) -> Vec<MemoryOffset> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            self.collect_offsets(root, &mut out);
        }
        out
    }

    /// Write the memory-offset table, one `name, offset` line per entry.
    pub fn get_memory_offset<C: Collector + ?Sized>(&self, out: &mut C) {
        for entry in self.memory_offsets() {
            out.append_line(entry.to_string());
        }
    }

    fn collect_offsets(&self, id: ScopeId, out: &mut Vec<MemoryOffset>) {
        let node = &self.nodes[id.0];
        out.push(MemoryOffset {
            name: node.name.clone(),
            offset: None,
        });

        let mut next = 0;
        for binding in &node.bindings {
            let offset = if binding.is_param {
                None
            } else {
                let here = next;
                next += binding.size;
                Some(here)
            };
            out.push(MemoryOffset {
                name: binding.name.clone(),
                offset,
            });
        }

        for child in &node.children {
            self.collect_offsets(*child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::symbols::{Symbol, SymbolTable};

    fn binding(table: &mut SymbolTable, name: &str, ty: Type, size: usize, is_param: bool) -> Binding {
        let symbol = table.intern(Symbol::new(name, ty, size));
        Binding {
            name: name.to_string(),
            symbol,
            ty,
            size,
            is_param,
        }
    }

    fn program(table: &mut SymbolTable) -> ScopeTree {
        let mut tree = ScopeTree::new();
        let sym = table.intern(Symbol::new("p", Type::ProgramName, 0));
        tree.create_root("p", sym);
        tree
    }

    #[test]
    fn test_outer_binding_visible_from_inner() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);
        let root = tree.root().unwrap();
        tree.add_blue_node(root, binding(&mut table, "x", Type::Int, 4, false))
            .unwrap();

        let sym = table.intern(Symbol::new("q", Type::Procedure, 0));
        let inner = tree.add_green_node("q", sym);

        let found = tree.find_blue_node(inner, "x").unwrap();
        assert_eq!(found.ty, Type::Int);
    }

    #[test]
    fn test_inner_shadow_needs_different_type() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);
        let root = tree.root().unwrap();
        tree.add_blue_node(root, binding(&mut table, "x", Type::Int, 4, false))
            .unwrap();

        let sym = table.intern(Symbol::new("q", Type::Procedure, 0));
        let inner = tree.add_green_node("q", sym);

        let same = tree.add_blue_node(inner, binding(&mut table, "x", Type::Int, 4, false));
        assert!(matches!(same, Err(ScopeError::Duplicate { .. })));

        tree.add_blue_node(inner, binding(&mut table, "x", Type::Real, 8, false))
            .unwrap();
        assert_eq!(tree.find_blue_node(inner, "x").unwrap().ty, Type::Real);
        assert_eq!(tree.find_blue_node(root, "x").unwrap().ty, Type::Int);
    }

    #[test]
    fn test_same_scope_overload_by_type() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);
        let root = tree.root().unwrap();

        tree.add_blue_node(root, binding(&mut table, "x", Type::Int, 4, false))
            .unwrap();
        tree.add_blue_node(root, binding(&mut table, "x", Type::Real, 8, false))
            .unwrap();
        let again = tree.add_blue_node(root, binding(&mut table, "x", Type::Real, 8, false));
        assert!(again.is_err());
    }

    #[test]
    fn test_siblings_not_searched_for_variables() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);

        let a = table.intern(Symbol::new("a", Type::Procedure, 0));
        let first = tree.add_green_node("a", a);
        tree.add_blue_node(first, binding(&mut table, "local", Type::Int, 4, false))
            .unwrap();
        tree.pop();

        let b = table.intern(Symbol::new("b", Type::Procedure, 0));
        let second = tree.add_green_node("b", b);

        assert!(tree.find_blue_node(second, "local").is_err());
        // but the sibling procedure itself is callable
        assert_eq!(tree.find_green_node(second, "a"), Ok(first));
        assert_eq!(tree.find_green_node(second, "b"), Ok(second));
    }

    #[test]
    fn test_pop_keeps_node_in_tree() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);
        let root = tree.root().unwrap();

        let sym = table.intern(Symbol::new("q", Type::Procedure, 0));
        let q = tree.add_green_node("q", sym);
        assert_eq!(tree.pop(), Some(q));
        assert_eq!(tree.current(), Some(root));
        assert_eq!(tree.node(root).children, vec![q]);
        assert_eq!(tree.node(q).parent, Some(root));
    }

    #[test]
    fn test_program_name_is_not_a_procedure() {
        let mut table = SymbolTable::new();
        let tree = program(&mut table);
        let root = tree.root().unwrap();
        assert!(tree.find_green_node(root, "p").is_err());
    }

    #[test]
    fn test_offsets_reset_per_scope() {
        let mut table = SymbolTable::new();
        let mut tree = program(&mut table);
        let root = tree.root().unwrap();

        tree.add_blue_node(root, binding(&mut table, "input", Type::ProgramParam, 0, true))
            .unwrap();
        tree.add_blue_node(root, binding(&mut table, "x", Type::Int, 4, false))
            .unwrap();
        tree.add_blue_node(root, binding(&mut table, "y", Type::Real, 8, false))
            .unwrap();

        let sym = table.intern(Symbol::new("q", Type::Procedure, 0));
        let q = tree.add_green_node("q", sym);
        tree.add_blue_node(q, binding(&mut table, "n", Type::ParamInt, 4, true))
            .unwrap();
        tree.add_blue_node(q, binding(&mut table, "t", Type::ArrayInt, 40, false))
            .unwrap();
        tree.pop();

        let lines: Vec<String> = tree.memory_offsets().iter().map(|m| m.to_string()).collect();
        assert_eq!(
            lines,
            vec!["p, N/A", "input, N/A", "x, 0", "y, 4", "q, N/A", "n, N/A", "t, 0"]
        );
        assert_eq!(tree.node(q).param_count, 1);
        assert_eq!(tree.node(q).param_types(), vec![Type::ParamInt]);
    }
}
