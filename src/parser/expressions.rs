//! Expression parsing implementation
//!
//! This module handles parsing and type inference for expressions. Every
//! production returns the [`Type`] of what it parsed; `ERR` marks a subtree
//! whose problem was already reported and keeps follow-on errors quiet.
//!
//! # Grammar
//!
//! ```text
//! expression        ::= simple_expression [ relop simple_expression ]
//! simple_expression ::= [ "+" | "-" ] term { addop term }
//! term              ::= factor { mulop factor }
//! factor            ::= id [ "[" expression "]" ] | num
//!                     | "(" expression ")" | "not" factor
//! ```
//!
//! # Typing
//!
//! - `+ - * /`: both operands in the same numeric family, result is that family
//! - `mod`: `INT` operands only
//! - `and`, `or`, `not`: `BOOL` operands only
//! - relational operators: same numeric family on both sides, result `BOOL`
//! - a leading sign needs a numeric operand
//!
//! In an operator chain each new operand is checked against the type
//! accumulated so far, left to right.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::parse::Parser;
use crate::parser::recovery::*;
use crate::parser::token::{Attribute, Token, TokenKind};
use crate::report::DiagnosticKind;
use crate::semantics::Type;

impl Parser {
    pub(crate) fn expression(&mut self) -> Type {
        let left = self.simple_expression();
        if !self.accept(Expected::Kind(TokenKind::RelOp)) {
            return left;
        }

        let op = self.bump();
        let right = self.simple_expression();
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if left.is_numeric() && left.family() == right.family() {
            return Type::Bool;
        }

        self.operand_mismatch(&op, left, right);
        Type::Error
    }

    pub(crate) fn expression_list(&mut self) -> Vec<Type> {
        let mut types = vec![self.expression()];
        while self.accept(Expected::Attr(Attribute::Comma)) {
            self.advance();
            types.push(self.expression());
        }
        types
    }

    fn simple_expression(&mut self) -> Type {
        let signed = self.accept(Expected::Attr(Attribute::Add))
            || self.accept(Expected::Attr(Attribute::Sub));

        let mut acc = if signed {
            let sign = self.bump();
            let operand = self.term();
            self.signed(&sign, operand)
        } else {
            self.term()
        };

        while self.accept(Expected::Kind(TokenKind::AddOp)) {
            let op = self.bump();
            let right = self.term();
            acc = self.binary(&op, acc, right);
        }
        acc
    }

    fn term(&mut self) -> Type {
        let mut acc = self.factor();
        while self.accept(Expected::Kind(TokenKind::MulOp)) {
            let op = self.bump();
            let right = self.factor();
            acc = self.binary(&op, acc, right);
        }
        acc
    }

    fn factor(&mut self) -> Type {
        if self.accept(Expected::Kind(TokenKind::Identifier)) {
            let id = self.bump();
            return self.variable_reference(&id, SYNC_FACTOR);
        }

        if self.accept(Expected::Kind(TokenKind::Number)) {
            let number = self.bump();
            return match number.attr() {
                Attribute::Int => Type::Int,
                _ => Type::Real,
            };
        }

        if self.accept(Expected::Attr(Attribute::LeftParen)) {
            self.advance();
            let inner = self.expression();
            self.expect(Expected::Attr(Attribute::RightParen), SYNC_FACTOR);
            return inner;
        }

        if self.accept(Expected::Attr(Attribute::Not)) {
            let op = self.bump();
            let operand = self.factor();
            if operand.is_error() || operand == Type::Bool {
                return operand;
            }
            self.report_at(
                DiagnosticKind::Type,
                op.line(),
                format!("operator 'not' needs BOOL, got {}", operand),
            );
            return Type::Error;
        }

        self.syntax_error(
            &[
                Expected::Kind(TokenKind::Identifier),
                Expected::Kind(TokenKind::Number),
                Expected::Attr(Attribute::LeftParen),
                Expected::Attr(Attribute::Not),
            ],
            SYNC_FACTOR,
        );
        Type::Error
    }

    fn signed(&mut self, sign: &Token, operand: Type) -> Type {
        if operand.is_error() {
            return Type::Error;
        }
        if operand.is_numeric() {
            return operand.family();
        }

        self.report_at(
            DiagnosticKind::Type,
            sign.line(),
            format!("sign '{}' needs a numeric operand, got {}", sign.lexeme(), operand),
        );
        Type::Error
    }

    /// Result type of `left op right` for an adding or multiplying operator.
    fn binary(&mut self, op: &Token, left: Type, right: Type) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error;
        }

        let result = match op.attr() {
            Attribute::And | Attribute::Or => {
                (left == Type::Bool && right == Type::Bool).then_some(Type::Bool)
            }
            Attribute::Mod => (left.family() == Type::Int && right.family() == Type::Int)
                .then_some(Type::Int),
            _ => (left.is_numeric() && left.family() == right.family()).then(|| left.family()),
        };

        match result {
            Some(ty) => ty,
            None => {
                self.operand_mismatch(op, left, right);
                Type::Error
            }
        }
    }

    fn operand_mismatch(&mut self, op: &Token, left: Type, right: Type) {
        self.report_at(
            DiagnosticKind::Type,
            op.line(),
            format!(
                "operator '{}' cannot combine {} and {}",
                op.lexeme(),
                left,
                right
            ),
        );
    }
}
