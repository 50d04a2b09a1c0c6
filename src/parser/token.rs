//! Token model shared by the scanner and the parser
//!
//! A [`Token`] is an immutable `(kind, attribute, lexeme)` triple plus the line
//! it was scanned on. [`TokenKind`] is the coarse lexical category; the finer
//! [`Attribute`] says which reserved word, which operator, which number class or
//! which lexical error was seen.

use std::fmt;

/// Coarse lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Reserved,
    Identifier,
    Whitespace,
    Number,
    Range,
    Assign,
    RelOp,
    AddOp,
    MulOp,
    LexError,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TokenKind::Reserved => "RES",
            TokenKind::Identifier => "ID",
            TokenKind::Whitespace => "WS",
            TokenKind::Number => "NUM",
            TokenKind::Range => "RANGE",
            TokenKind::Assign => "ASSIGNOP",
            TokenKind::RelOp => "RELOP",
            TokenKind::AddOp => "ADDOP",
            TokenKind::MulOp => "MULOP",
            TokenKind::LexError => "LEXERR",
            TokenKind::Eof => "EOF",
        };
        f.write_str(tag)
    }
}

/// Fine-grained tag attached to every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Null,

    // Number classes
    Int,
    Real,
    LongReal,

    // Relational operators
    NotEq,     // <>
    LessEq,    // <=
    GreaterEq, // >=
    Eq,        // =
    Less,      // <
    Greater,   // >

    // Additive operators
    Add, // +
    Sub, // -
    Or,

    // Multiplicative operators
    Mul, // *
    Div, // /
    And,
    Mod,

    // Reserved words
    Program,
    Var,
    Array,
    Of,
    IntegerDecl,
    RealDecl,
    Procedure,
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    Not,
    Call,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Colon,
    Period,

    // Lexical error causes
    Unrecognized,
    ExtraLongId,
    ExtraLongInt,
    ExtraLongFrac,
    ExtraLongExp,
    LeadingZero,
}

impl Attribute {
    /// Source spelling for attributes that have exactly one, used in
    /// "expected X" messages.
    pub fn spelling(&self) -> Option<&'static str> {
        let s = match self {
            Attribute::NotEq => "<>",
            Attribute::LessEq => "<=",
            Attribute::GreaterEq => ">=",
            Attribute::Eq => "=",
            Attribute::Less => "<",
            Attribute::Greater => ">",
            Attribute::Add => "+",
            Attribute::Sub => "-",
            Attribute::Or => "or",
            Attribute::Mul => "*",
            Attribute::Div => "/",
            Attribute::And => "and",
            Attribute::Mod => "mod",
            Attribute::Program => "program",
            Attribute::Var => "var",
            Attribute::Array => "array",
            Attribute::Of => "of",
            Attribute::IntegerDecl => "integer",
            Attribute::RealDecl => "real",
            Attribute::Procedure => "procedure",
            Attribute::Begin => "begin",
            Attribute::End => "end",
            Attribute::If => "if",
            Attribute::Then => "then",
            Attribute::Else => "else",
            Attribute::While => "while",
            Attribute::Do => "do",
            Attribute::Not => "not",
            Attribute::Call => "call",
            Attribute::LeftParen => "(",
            Attribute::RightParen => ")",
            Attribute::LeftBracket => "[",
            Attribute::RightBracket => "]",
            Attribute::Comma => ",",
            Attribute::Semicolon => ";",
            Attribute::Colon => ":",
            Attribute::Period => ".",
            _ => return None,
        };
        Some(s)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Attribute::Null => "NULL",
            Attribute::Int => "INT",
            Attribute::Real => "REAL",
            Attribute::LongReal => "LONG_REAL",
            Attribute::NotEq => "NOT_EQ",
            Attribute::LessEq => "LESS_EQ",
            Attribute::GreaterEq => "GREATER_EQ",
            Attribute::Eq => "EQ",
            Attribute::Less => "LESS",
            Attribute::Greater => "GREATER",
            Attribute::Add => "ADD",
            Attribute::Sub => "SUB",
            Attribute::Or => "OR",
            Attribute::Mul => "MUL",
            Attribute::Div => "DIV",
            Attribute::And => "AND",
            Attribute::Mod => "MOD",
            Attribute::Program => "PROG",
            Attribute::Var => "VAR",
            Attribute::Array => "ARRAY",
            Attribute::Of => "OF",
            Attribute::IntegerDecl => "INT_DEC",
            Attribute::RealDecl => "REAL_DEC",
            Attribute::Procedure => "PROC",
            Attribute::Begin => "BEGIN",
            Attribute::End => "END",
            Attribute::If => "IF",
            Attribute::Then => "THEN",
            Attribute::Else => "ELSE",
            Attribute::While => "WHILE",
            Attribute::Do => "DO",
            Attribute::Not => "NOT",
            Attribute::Call => "CALL",
            Attribute::LeftParen => "LEFT_PAREN",
            Attribute::RightParen => "RIGHT_PAREN",
            Attribute::LeftBracket => "LEFT_BRACKET",
            Attribute::RightBracket => "RIGHT_BRACKET",
            Attribute::Comma => "COMMA",
            Attribute::Semicolon => "SEMI",
            Attribute::Colon => "COLON",
            Attribute::Period => "PERIOD",
            Attribute::Unrecognized => "UNREC",
            Attribute::ExtraLongId => "EXTRA_LONG_ID",
            Attribute::ExtraLongInt => "EXTRA_LONG_INT",
            Attribute::ExtraLongFrac => "EXTRA_LONG_FRAC",
            Attribute::ExtraLongExp => "EXTRA_LONG_EXP",
            Attribute::LeadingZero => "LEADING_ZERO",
        };
        f.write_str(tag)
    }
}

/// One scanned token. Never mutated after the scanner hands it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    attr: Attribute,
    lexeme: String,
    line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, attr: Attribute, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            attr,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// End-of-file marker for the given line.
    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, Attribute::Null, "", line)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn attr(&self) -> Attribute {
        self.attr
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// 1-based source line the token starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Whitespace and lexical-error tokens are skipped by the parser.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::LexError)
    }

    /// Render the token for an "expected X, got Y" message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}' ({})", self.lexeme, self.kind),
        }
    }
}

/// Token-trace format: `"<quoted-lexeme> <KIND> <ATTRIBUTE>"`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {} {}", self.lexeme, self.kind, self.attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_format() {
        let tok = Token::new(TokenKind::RelOp, Attribute::LessEq, "<=", 3);
        assert_eq!(tok.to_string(), "\"<=\" RELOP LESS_EQ");
    }

    #[test]
    fn test_trivia() {
        assert!(Token::new(TokenKind::Whitespace, Attribute::Null, "  ", 1).is_trivia());
        assert!(Token::new(TokenKind::LexError, Attribute::Unrecognized, "@", 1).is_trivia());
        assert!(!Token::eof(1).is_trivia());
    }

    #[test]
    fn test_describe() {
        let tok = Token::new(TokenKind::Identifier, Attribute::Null, "x", 1);
        assert_eq!(tok.describe(), "'x' (ID)");
        assert_eq!(Token::eof(4).describe(), "end of file");
    }
}
