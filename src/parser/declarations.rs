//! Declaration parsing implementation
//!
//! This module handles the program header and everything that introduces a
//! name:
//!
//! - Program header: `program id ( [identifier_list] ) ;`
//! - Variable declarations: `var id : type ;`
//! - Types: `integer`, `real`, `array [ num .. num ] of standard_type`
//! - Procedures: `procedure id [ ( [parameter_list] ) ] ;` followed by a body
//!
//! # Grammar
//!
//! ```text
//! program         ::= "program" id "(" [identifier_list] ")" ";" program_body
//! program_body    ::= [declarations] [subprogram_decls] compound_statement "."
//! identifier_list ::= id { "," id }
//! declarations    ::= "var" id ":" type ";" { "var" id ":" type ";" }
//! type            ::= standard_type | "array" "[" num ".." num "]" "of" standard_type
//! standard_type   ::= "integer" | "real"
//! subprogram_decls ::= subprogram_decl ";" { subprogram_decl ";" }
//! subprogram_decl ::= subprogram_head [declarations] [subprogram_decls] compound_statement
//! subprogram_head ::= "procedure" id [ "(" [parameter_list] ")" ] ";"
//! parameter_list  ::= id ":" type { ";" id ":" type }
//! ```
//!
//! Each declaration is registered in the symbol table and bound in the
//! innermost open scope as soon as it is parsed.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::parse::Parser;
use crate::parser::recovery::*;
use crate::parser::token::{Attribute, Token, TokenKind};
use crate::report::DiagnosticKind;
use crate::semantics::types::array_size;
use crate::semantics::{Binding, Symbol, Type};

/// Scope name used when the header's identifier is missing
const UNNAMED_SCOPE: &str = "?";

impl Parser {
    /// Parse a whole program, from `program` to the final `.`
    pub(crate) fn program(&mut self) {
        if !self.program_head() && self.accept(Expected::Attr(Attribute::Semicolon)) {
            self.advance();
        }

        if self.accept(Expected::Attr(Attribute::Var)) {
            self.declarations();
        }
        if self.accept(Expected::Attr(Attribute::Procedure)) {
            self.subprogram_declarations();
        }
        self.compound_statement();
        self.expect(Expected::Attr(Attribute::Period), SYNC_PROGRAM);
    }

    /// Returns false if the header was malformed; the parser has then been
    /// synchronized on the header's follow set. The program scope is opened
    /// either way.
    fn program_head(&mut self) -> bool {
        let name = match self.expect(Expected::Attr(Attribute::Program), SYNC_PROGRAM_HEAD) {
            Some(_) => self.expect(Expected::Kind(TokenKind::Identifier), SYNC_PROGRAM_HEAD),
            None => None,
        };
        self.open_program_scope(name.as_ref());
        if name.is_none() {
            return false;
        }

        if self
            .expect(Expected::Attr(Attribute::LeftParen), SYNC_PROGRAM_HEAD)
            .is_none()
        {
            return false;
        }
        if self.accept(Expected::Kind(TokenKind::Identifier)) {
            self.identifier_list();
        }
        if self
            .expect(Expected::Attr(Attribute::RightParen), SYNC_PROGRAM_HEAD)
            .is_none()
        {
            return false;
        }

        self.expect(Expected::Attr(Attribute::Semicolon), SYNC_PROGRAM_HEAD)
            .is_some()
    }

    fn open_program_scope(&mut self, name: Option<&Token>) {
        let name = name.map_or(UNNAMED_SCOPE, Token::lexeme).to_string();
        let symbol = self.symbols.intern(Symbol::new(&name, Type::ProgramName, 0));
        self.scopes.create_root(&name, symbol);
    }

    /// Program parameters: bound in the program scope, no storage
    fn identifier_list(&mut self) {
        loop {
            let Some(id) = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_IDENTIFIER_LIST)
            else {
                return;
            };
            self.declare(&id, Type::ProgramParam, 0, true);

            if !self.accept(Expected::Attr(Attribute::Comma)) {
                return;
            }
            self.advance();
        }
    }

    pub(crate) fn declarations(&mut self) {
        while self.accept(Expected::Attr(Attribute::Var)) {
            self.advance();
            self.variable_declaration();
        }
    }

    fn variable_declaration(&mut self) {
        let Some(id) = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_DECLARATIONS) else {
            return;
        };
        if self
            .expect(Expected::Attr(Attribute::Colon), SYNC_DECLARATIONS)
            .is_none()
        {
            return;
        }

        if let Some((ty, size)) = self.type_spec() {
            self.declare(&id, ty, size, false);
        }
        self.expect(Expected::Attr(Attribute::Semicolon), SYNC_DECLARATIONS);
    }

    /// Parse a type, returning it with its storage size.
    fn type_spec(&mut self) -> Option<(Type, usize)> {
        if !self.accept(Expected::Attr(Attribute::Array)) {
            let ty = self.standard_type()?;
            return Some((ty, ty.scalar_size()));
        }

        let line = self.current.line();
        self.advance();
        self.expect(Expected::Attr(Attribute::LeftBracket), SYNC_TYPE)?;
        let low = self.expect(Expected::Kind(TokenKind::Number), SYNC_TYPE)?;
        self.expect(Expected::Kind(TokenKind::Range), SYNC_TYPE)?;
        let high = self.expect(Expected::Kind(TokenKind::Number), SYNC_TYPE)?;
        self.expect(Expected::Attr(Attribute::RightBracket), SYNC_TYPE)?;
        self.expect(Expected::Attr(Attribute::Of), SYNC_TYPE)?;
        let element = self.standard_type()?;

        let ty = element.array_of();
        let (Some(lo), Some(hi)) = (self.array_bound(&low), self.array_bound(&high)) else {
            return Some((ty, 0));
        };

        match array_size(element, lo, hi) {
            Some(size) => Some((ty, size)),
            None => {
                self.report_at(
                    DiagnosticKind::Type,
                    line,
                    format!("array lower bound {} exceeds upper bound {}", lo, hi),
                );
                Some((ty, 0))
            }
        }
    }

    fn array_bound(&mut self, bound: &Token) -> Option<i64> {
        let value = match bound.attr() {
            Attribute::Int => bound.lexeme().parse::<i64>().ok(),
            _ => None,
        };
        if value.is_none() {
            self.report_at(
                DiagnosticKind::Type,
                bound.line(),
                format!("array bound '{}' must be an integer", bound.lexeme()),
            );
        }
        value
    }

    fn standard_type(&mut self) -> Option<Type> {
        if self.accept(Expected::Attr(Attribute::IntegerDecl)) {
            self.advance();
            return Some(Type::Int);
        }
        if self.accept(Expected::Attr(Attribute::RealDecl)) {
            self.advance();
            return Some(Type::Real);
        }

        self.syntax_error(
            &[
                Expected::Attr(Attribute::IntegerDecl),
                Expected::Attr(Attribute::RealDecl),
                Expected::Attr(Attribute::Array),
            ],
            SYNC_TYPE,
        );
        None
    }

    pub(crate) fn subprogram_declarations(&mut self) {
        while self.accept(Expected::Attr(Attribute::Procedure)) {
            self.subprogram_declaration();
            self.expect(
                Expected::Attr(Attribute::Semicolon),
                SYNC_SUBPROGRAM_DECLARATIONS,
            );
        }
    }

    fn subprogram_declaration(&mut self) {
        self.subprogram_head();

        if self.accept(Expected::Attr(Attribute::Var)) {
            self.declarations();
        }
        if self.accept(Expected::Attr(Attribute::Procedure)) {
            self.subprogram_declarations();
        }
        self.compound_statement();

        self.scopes.pop();
    }

    /// Opens the procedure's scope, even when the head is malformed, so the
    /// caller's `pop` always balances.
    fn subprogram_head(&mut self) {
        self.expect(Expected::Attr(Attribute::Procedure), SYNC_SUBPROGRAM_HEAD);
        let name = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_SUBPROGRAM_HEAD);
        self.open_procedure_scope(name.as_ref());
        if name.is_none() {
            return;
        }

        if self.accept(Expected::Attr(Attribute::LeftParen)) {
            self.advance();
            if self.accept(Expected::Kind(TokenKind::Identifier)) {
                self.parameter_list();
            }
            if self
                .expect(Expected::Attr(Attribute::RightParen), SYNC_SUBPROGRAM_HEAD)
                .is_none()
            {
                return;
            }
        }

        self.expect(Expected::Attr(Attribute::Semicolon), SYNC_SUBPROGRAM_HEAD);
    }

    fn open_procedure_scope(&mut self, name: Option<&Token>) {
        let line = self.current.line();
        let name = name.map_or(UNNAMED_SCOPE, Token::lexeme).to_string();

        if let Some(parent) = self.current_scope() {
            if self.scopes.find_child(parent, &name).is_some() {
                self.report_at(
                    DiagnosticKind::Scope,
                    line,
                    format!("procedure '{}' is already declared in this scope", name),
                );
            }
        }

        let symbol = self.symbols.intern(Symbol::new(&name, Type::Procedure, 0));
        self.scopes.add_green_node(&name, symbol);
    }

    fn parameter_list(&mut self) {
        loop {
            self.parameter();
            if !self.accept(Expected::Attr(Attribute::Semicolon)) {
                return;
            }
            self.advance();
        }
    }

    fn parameter(&mut self) {
        let Some(id) = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_PARAMETER_LIST)
        else {
            return;
        };
        if self
            .expect(Expected::Attr(Attribute::Colon), SYNC_PARAMETER_LIST)
            .is_none()
        {
            return;
        }

        if let Some((ty, size)) = self.type_spec() {
            self.declare(&id, ty.as_param(), size, true);
        }
    }

    /// Register `id` in the symbol table and bind it in the innermost scope.
    fn declare(&mut self, id: &Token, ty: Type, size: usize, is_param: bool) {
        let Some(scope) = self.current_scope() else {
            return;
        };

        let symbol = self.symbols.intern(Symbol::new(id.lexeme(), ty, size));
        let binding = Binding {
            name: id.lexeme().to_string(),
            symbol,
            ty,
            size,
            is_param,
        };

        if let Err(err) = self.scopes.add_blue_node(scope, binding) {
            self.report_at(DiagnosticKind::Scope, id.line(), err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::parser::parse::compile;
    use crate::report::DiagnosticKind;
    use crate::semantics::Type;

    #[test]
    fn test_program_parameters_bound_in_root() {
        let result = compile("program p(input, output); begin end.", &CompilerConfig::default());
        assert!(result.is_clean(), "{:?}", result.diagnostics);

        let root = result.scopes.root().unwrap();
        let node = result.scopes.node(root);
        assert_eq!(node.name, "p");
        assert_eq!(node.param_count, 2);
        assert!(node.bindings.iter().all(|b| b.ty == Type::ProgramParam));
    }

    #[test]
    fn test_array_size() {
        let result = compile(
            "program p(); var a: array [1..10] of real; var b: integer; begin end.",
            &CompilerConfig::default(),
        );
        assert!(result.is_clean(), "{:?}", result.diagnostics);
        assert_eq!(
            result.memory_offsets().lines(),
            &["p, N/A", "a, 0", "b, 80"]
        );
    }

    #[test]
    fn test_inverted_bounds() {
        let result = compile(
            "program p(); var a: array [5..1] of integer; begin end.",
            &CompilerConfig::default(),
        );
        assert_eq!(result.count(DiagnosticKind::Type), 1);
        assert!(result.diagnostics[0].message.contains("exceeds upper bound"));
    }

    #[test]
    fn test_real_bound_rejected() {
        let result = compile(
            "program p(); var a: array [1..2.5] of integer; begin end.",
            &CompilerConfig::default(),
        );
        assert_eq!(result.count(DiagnosticKind::Type), 1);
        assert_eq!(result.count(DiagnosticKind::Syntax), 0);
    }

    #[test]
    fn test_parameters_use_param_types() {
        let result = compile(
            "program p();\nprocedure q(n: integer; v: array [1..3] of real);\nbegin end;\nbegin end.",
            &CompilerConfig::default(),
        );
        assert!(result.is_clean(), "{:?}", result.diagnostics);

        let root = result.scopes.root().unwrap();
        let q = result.scopes.find_child(root, "q").unwrap();
        assert_eq!(
            result.scopes.node(q).param_types(),
            vec![Type::ParamInt, Type::ParamArrayReal]
        );
    }

    #[test]
    fn test_duplicate_variable() {
        let result = compile(
            "program p(); var x: integer; var x: integer; begin end.",
            &CompilerConfig::default(),
        );
        assert_eq!(result.count(DiagnosticKind::Scope), 1);
    }

    #[test]
    fn test_duplicate_procedure() {
        let result = compile(
            "program p(); procedure q; begin end; procedure q; begin end; begin end.",
            &CompilerConfig::default(),
        );
        assert_eq!(result.count(DiagnosticKind::Scope), 1);
        assert_eq!(result.count(DiagnosticKind::Syntax), 0);
    }

    #[test]
    fn test_missing_type_recovers_at_semicolon() {
        let result = compile(
            "program p(); var x: ; var y: integer; begin y := 1 end.",
            &CompilerConfig::default(),
        );
        assert_eq!(result.count(DiagnosticKind::Syntax), 1);
        assert_eq!(result.count(DiagnosticKind::Scope), 0);
    }
}
