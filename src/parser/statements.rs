//! Statement parsing implementation
//!
//! This module handles parsing of all statement forms:
//!
//! - Compound statements: `begin ... end`
//! - Assignments: `variable := expression`
//! - Procedure calls: `call id [ ( expression_list ) ]`
//! - Control flow: `if ... then ... [else ...]`, `while ... do ...`
//!
//! # Grammar
//!
//! ```text
//! compound_statement ::= "begin" [statement_list] "end"
//! statement_list     ::= statement { ";" statement }
//! statement          ::= variable ":=" expression
//!                      | "call" id [ "(" expression_list ")" ]
//!                      | compound_statement
//!                      | "if" expression "then" statement [ "else" statement ]
//!                      | "while" expression "do" statement
//! variable           ::= id [ "[" expression "]" ]
//! ```
//!
//! A dangling `else` binds to the nearest `if`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::parse::Parser;
use crate::parser::recovery::*;
use crate::parser::token::{Attribute, Token, TokenKind};
use crate::report::DiagnosticKind;
use crate::semantics::Type;

impl Parser {
    pub(crate) fn compound_statement(&mut self) {
        if self
            .expect(Expected::Attr(Attribute::Begin), SYNC_COMPOUND_STATEMENT)
            .is_none()
        {
            return;
        }
        if !self.accept(Expected::Attr(Attribute::End)) {
            self.statement_list();
        }
        self.expect(Expected::Attr(Attribute::End), SYNC_COMPOUND_STATEMENT);
    }

    fn statement_list(&mut self) {
        self.statement();
        while self.accept(Expected::Attr(Attribute::Semicolon)) {
            self.advance();
            self.statement();
        }
    }

    fn statement(&mut self) {
        if self.accept(Expected::Kind(TokenKind::Identifier)) {
            self.assignment();
        } else if self.accept(Expected::Attr(Attribute::Call)) {
            self.procedure_statement();
        } else if self.accept(Expected::Attr(Attribute::Begin)) {
            self.compound_statement();
        } else if self.accept(Expected::Attr(Attribute::If)) {
            self.if_statement();
        } else if self.accept(Expected::Attr(Attribute::While)) {
            self.while_statement();
        } else {
            self.syntax_error(
                &[
                    Expected::Kind(TokenKind::Identifier),
                    Expected::Attr(Attribute::Call),
                    Expected::Attr(Attribute::Begin),
                    Expected::Attr(Attribute::If),
                    Expected::Attr(Attribute::While),
                ],
                SYNC_STATEMENT,
            );
        }
    }

    fn assignment(&mut self) {
        let line = self.current.line();
        let target = self.variable();
        if self
            .expect(Expected::Kind(TokenKind::Assign), SYNC_STATEMENT)
            .is_none()
        {
            return;
        }
        let value = self.expression();

        if target.is_error() || value.is_error() {
            return;
        }
        if target.family() != value.family() {
            self.report_at(
                DiagnosticKind::Type,
                line,
                format!("cannot assign {} to {}", value.family(), target.family()),
            );
        }
    }

    fn variable(&mut self) -> Type {
        let Some(id) = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_VARIABLE) else {
            return Type::Error;
        };
        self.variable_reference(&id, SYNC_VARIABLE)
    }

    /// Type of `id` or `id[expr]`, with the identifier already consumed.
    pub(crate) fn variable_reference(&mut self, id: &Token, sync: &[Expected]) -> Type {
        let declared = self.lookup_variable(id);
        if !self.accept(Expected::Attr(Attribute::LeftBracket)) {
            return declared;
        }

        self.advance();
        let index = self.expression();
        self.expect(Expected::Attr(Attribute::RightBracket), sync);

        if declared.is_error() {
            return Type::Error;
        }
        if !declared.is_array() {
            self.report_at(
                DiagnosticKind::Type,
                id.line(),
                format!("'{}' is not an array", id.lexeme()),
            );
            return Type::Error;
        }
        if !index.is_error() && index.family() != Type::Int {
            self.report_at(
                DiagnosticKind::Type,
                id.line(),
                format!("array index must be INT, got {}", index.family()),
            );
        }
        declared.family()
    }

    /// Resolve a variable from the innermost scope outward.
    fn lookup_variable(&mut self, id: &Token) -> Type {
        let Some(scope) = self.current_scope() else {
            return Type::Error;
        };

        let found = self
            .scopes
            .find_blue_node(scope, id.lexeme())
            .map(|binding| binding.ty);
        match found {
            Ok(Type::ProgramParam) => {
                self.report_at(
                    DiagnosticKind::Type,
                    id.line(),
                    format!("program parameter '{}' cannot be used as a variable", id.lexeme()),
                );
                Type::Error
            }
            Ok(ty) => ty.as_value(),
            Err(err) => {
                self.report_at(DiagnosticKind::Scope, id.line(), err.to_string());
                Type::Error
            }
        }
    }

    fn procedure_statement(&mut self) {
        self.advance();
        let Some(id) = self.expect(Expected::Kind(TokenKind::Identifier), SYNC_STATEMENT) else {
            return;
        };
        let params = self.lookup_procedure(&id);

        let mut args = Vec::new();
        if self.accept(Expected::Attr(Attribute::LeftParen)) {
            self.advance();
            args = self.expression_list();
            self.expect(Expected::Attr(Attribute::RightParen), SYNC_STATEMENT);
        }

        if let Some(params) = params {
            self.check_arguments(&id, &params, &args);
        }
    }

    /// Parameter types of the procedure `id` resolves to.
    fn lookup_procedure(&mut self, id: &Token) -> Option<Vec<Type>> {
        let scope = self.current_scope()?;
        match self.scopes.find_green_node(scope, id.lexeme()) {
            Ok(found) => Some(self.scopes.node(found).param_types()),
            Err(err) => {
                self.report_at(DiagnosticKind::Scope, id.line(), err.to_string());
                None
            }
        }
    }

    /// Arguments must match the declared parameter types exactly.
    fn check_arguments(&mut self, id: &Token, params: &[Type], args: &[Type]) {
        let name = id.lexeme();

        if args.len() != params.len() {
            let which = if args.len() > params.len() { "many" } else { "few" };
            self.report_at(
                DiagnosticKind::Type,
                id.line(),
                format!(
                    "too {} arguments in call to '{}': expected {}, got {}",
                    which,
                    name,
                    params.len(),
                    args.len()
                ),
            );
        }

        for (position, (param, arg)) in params.iter().zip(args).enumerate() {
            if arg.is_error() || param.as_value() == *arg {
                continue;
            }
            self.report_at(
                DiagnosticKind::Type,
                id.line(),
                format!(
                    "argument {} of '{}' expects {}, got {}",
                    position + 1,
                    name,
                    param.as_value(),
                    arg
                ),
            );
        }
    }

    fn if_statement(&mut self) {
        let line = self.current.line();
        self.advance();
        let condition = self.expression();
        self.check_condition("if", condition, line);

        if self
            .expect(Expected::Attr(Attribute::Then), SYNC_STATEMENT)
            .is_none()
        {
            return;
        }
        self.statement();

        if self.accept(Expected::Attr(Attribute::Else)) {
            self.advance();
            self.statement();
        }
    }

    fn while_statement(&mut self) {
        let line = self.current.line();
        self.advance();
        let condition = self.expression();
        self.check_condition("while", condition, line);

        if self
            .expect(Expected::Attr(Attribute::Do), SYNC_STATEMENT)
            .is_none()
        {
            return;
        }
        self.statement();
    }

    fn check_condition(&mut self, construct: &str, condition: Type, line: usize) {
        if condition.is_error() || condition == Type::Bool {
            return;
        }
        self.report_at(
            DiagnosticKind::Type,
            line,
            format!("{} condition must be BOOL, got {}", construct, condition),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::parser::parse::{compile, Compilation};
    use crate::report::DiagnosticKind;

    fn run(source: &str) -> Compilation {
        compile(source, &CompilerConfig::default())
    }

    #[test]
    fn test_assignment_type_mismatch() {
        let result = run("program p(); var x: integer; begin x := 1.5 end.");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Type);
        assert_eq!(result.diagnostics[0].message, "cannot assign REAL to INT");
    }

    #[test]
    fn test_undeclared_variable() {
        let result = run("program p(); begin y := 1 end.");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Scope);
        assert_eq!(result.diagnostics[0].message, "undeclared variable 'y'");
    }

    #[test]
    fn test_condition_must_be_bool() {
        let result = run(
            "program p();\nvar x: integer;\nbegin\n  if x then x := 1;\n  while x < 2 do x := 2\nend.",
        );
        assert_eq!(result.count(DiagnosticKind::Type), 1);
        assert_eq!(
            result.diagnostics[0].message,
            "if condition must be BOOL, got INT"
        );
    }

    #[test]
    fn test_dangling_else() {
        let result = run(
            "program p();\nvar x: integer;\nbegin\n  if x = 1 then if x = 2 then x := 3 else x := 4\nend.",
        );
        assert!(result.is_clean(), "{:?}", result.diagnostics);
    }

    #[test]
    fn test_array_element_assignment() {
        let result = run(
            "program p();\nvar a: array [1..5] of real;\nvar i: integer;\nbegin\n  a[i] := 2.0; a[1.0] := 1.0; i[1] := 2\nend.",
        );
        let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["array index must be INT, got REAL", "'i' is not an array"]
        );
    }

    #[test]
    fn test_program_parameter_not_usable() {
        let result = run("program p(input); var x: integer; begin x := input end.");
        assert_eq!(result.count(DiagnosticKind::Type), 1);
        assert!(result.diagnostics[0].message.contains("program parameter 'input'"));
    }

    #[test]
    fn test_call_argument_checks() {
        let source = "program p();
var r: real;
procedure q(n: integer; x: real);
begin end;
begin
  call q(1, r);
  call q(r, r);
  call q(1);
  call z
end.";
        let result = run(source);
        let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "argument 1 of 'q' expects INT, got REAL",
                "too few arguments in call to 'q': expected 2, got 1",
                "undeclared procedure 'z'",
            ]
        );
    }

    #[test]
    fn test_missing_semicolon_between_statements() {
        let result = run("program p(); var x: integer; begin x := 1 x := 2 end.");
        assert_eq!(result.count(DiagnosticKind::Syntax), 1);
    }
}
