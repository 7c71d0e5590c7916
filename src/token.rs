use crate::token_type::TokenType;

/// Compile-time literal carried by a token and by `Literal` expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    StringLiteral(String),
    BoolLiteral(bool),
    F64(f64),
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub typ: TokenType,
    pub lexeme: String,
    pub literal: Literal,
    pub line: usize,
}

impl Token {
    pub fn new(typ: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            typ,
            lexeme: lexeme.into(),
            literal: Literal::Nil,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenType::Eof, "", line)
    }
}
