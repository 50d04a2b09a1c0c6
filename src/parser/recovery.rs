//! Synchronizing sets for panic-mode recovery
//!
//! When a production cannot continue, the parser reports a syntax error and
//! discards tokens until it reaches a member of that production's set (its
//! FOLLOW set; end of file always stops the skip). Keeping the sets here as
//! named constants makes each production's recovery point easy to audit.

use super::token::{Attribute, Token, TokenKind};
use std::fmt;

/// Something the parser can test the current token against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Kind(TokenKind),
    Attr(Attribute),
}

impl Expected {
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Expected::Kind(kind) => token.kind() == *kind,
            Expected::Attr(attr) => token.attr() == *attr && token.kind() != TokenKind::LexError,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(TokenKind::Identifier) => write!(f, "identifier"),
            Expected::Kind(TokenKind::Number) => write!(f, "number"),
            Expected::Kind(TokenKind::Assign) => write!(f, "':='"),
            Expected::Kind(TokenKind::Range) => write!(f, "'..'"),
            Expected::Kind(TokenKind::RelOp) => write!(f, "relational operator"),
            Expected::Kind(TokenKind::AddOp) => write!(f, "adding operator"),
            Expected::Kind(TokenKind::MulOp) => write!(f, "multiplying operator"),
            Expected::Kind(TokenKind::Eof) => write!(f, "end of file"),
            Expected::Kind(kind) => write!(f, "{}", kind),
            Expected::Attr(attr) => match attr.spelling() {
                Some(s) => write!(f, "'{}'", s),
                None => write!(f, "{}", attr),
            },
        }
    }
}

const fn attr(a: Attribute) -> Expected {
    Expected::Attr(a)
}

const fn kind(k: TokenKind) -> Expected {
    Expected::Kind(k)
}

/// Nothing may follow the program; skip to end of file
pub const SYNC_PROGRAM: &[Expected] = &[];

pub const SYNC_PROGRAM_HEAD: &[Expected] = &[
    attr(Attribute::Semicolon),
    attr(Attribute::Var),
    attr(Attribute::Procedure),
    attr(Attribute::Begin),
];

pub const SYNC_IDENTIFIER_LIST: &[Expected] = &[attr(Attribute::RightParen)];

pub const SYNC_DECLARATIONS: &[Expected] = &[
    attr(Attribute::Var),
    attr(Attribute::Procedure),
    attr(Attribute::Begin),
];

pub const SYNC_TYPE: &[Expected] = &[attr(Attribute::Semicolon), attr(Attribute::RightParen)];

pub const SYNC_SUBPROGRAM_DECLARATIONS: &[Expected] =
    &[attr(Attribute::Procedure), attr(Attribute::Begin)];

pub const SYNC_SUBPROGRAM_HEAD: &[Expected] = &[
    attr(Attribute::Var),
    attr(Attribute::Procedure),
    attr(Attribute::Begin),
];

pub const SYNC_PARAMETER_LIST: &[Expected] = &[attr(Attribute::RightParen)];

pub const SYNC_COMPOUND_STATEMENT: &[Expected] = &[
    attr(Attribute::Period),
    attr(Attribute::Semicolon),
    attr(Attribute::End),
    attr(Attribute::Else),
];

pub const SYNC_STATEMENT: &[Expected] = &[
    attr(Attribute::Semicolon),
    attr(Attribute::End),
    attr(Attribute::Else),
];

pub const SYNC_VARIABLE: &[Expected] = &[kind(TokenKind::Assign)];

pub const SYNC_FACTOR: &[Expected] = &[
    kind(TokenKind::MulOp),
    kind(TokenKind::AddOp),
    kind(TokenKind::RelOp),
    attr(Attribute::Then),
    attr(Attribute::Do),
    attr(Attribute::RightBracket),
    attr(Attribute::RightParen),
    attr(Attribute::Comma),
    attr(Attribute::Semicolon),
    attr(Attribute::End),
    attr(Attribute::Else),
];
