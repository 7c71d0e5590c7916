use lazy_static::lazy_static;
use std::collections::HashMap;
use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use tracing::debug;

use crate::error::{Diagnostic, ScanError};
use crate::token::{Literal, Token};
use crate::token_type::TokenType::{self, *};

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("and", And),
        ("break", Break),
        ("class", Class),
        ("else", Else),
        ("false", False),
        ("for", For),
        ("fun", Fun),
        ("if", If),
        ("nil", Nil),
        ("or", Or),
        ("print", Print),
        ("return", Return),
        ("super", Super),
        ("this", This),
        ("true", True),
        ("var", Var),
        ("while", While),
    ]);
}

/// Turns source text into tokens, collecting lexical errors as it goes.
///
/// The token list always ends with a single `Eof` token, even when errors
/// were reported.
pub struct Scanner<'a> {
    source: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
    text: String,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source: source.chars().peekable(),
            tokens: Vec::new(),
            errors: Vec::new(),
            text: String::new(),
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while let Some(c) = self.source.next() {
            self.text.push(c);
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.line));
        debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "scanned source"
        );
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '?' => self.add_token(Question),
            ':' => self.add_token(Colon),
            '!' => {
                let matched = self.match_next('=');
                self.add_token(if matched { BangEqual } else { Bang })
            }
            '=' => {
                let matched = self.match_next('=');
                self.add_token(if matched { EqualEqual } else { Equal })
            }
            '<' => {
                let matched = self.match_next('=');
                self.add_token(if matched { LessEqual } else { Less })
            }
            '>' => {
                let matched = self.match_next('=');
                self.add_token(if matched { GreaterEqual } else { Greater })
            }
            '/' => {
                if self.match_next('/') {
                    while let Some(&char) = self.source.peek() {
                        if char == '\n' {
                            break;
                        }
                        self.source.next();
                    }
                    self.text.clear();
                } else if self.match_next('*') {
                    self.skip_block_comment();
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => {
                self.text.pop();
            }
            '\n' => {
                self.line += 1;
                self.text.pop();
            }
            '"' => self.scan_string(),
            _ => {
                if is_digit(c) {
                    self.scan_number();
                } else if is_alpha(c) {
                    self.scan_identifier();
                } else {
                    self.error(self.line, ScanError::UnexpectedCharacter(c));
                    self.text.clear();
                }
            }
        };
    }

    // `/*` has already been consumed; comments nest.
    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        let mut depth = 1usize;

        while depth > 0 {
            match self.source.next() {
                Some('/') if self.source.peek() == Some(&'*') => {
                    self.source.next();
                    depth += 1;
                }
                Some('*') if self.source.peek() == Some(&'/') => {
                    self.source.next();
                    depth -= 1;
                }
                Some('\n') => self.line += 1,
                Some(_) => {}
                None => {
                    self.error(start_line, ScanError::UnterminatedComment);
                    break;
                }
            }
        }

        self.text.clear();
    }

    fn scan_string(&mut self) {
        while let Some(&c) = self.source.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.text.push(c);
            self.source.next();
        }

        if self.source.peek().is_none() {
            self.error(self.line, ScanError::UnterminatedString);
            self.text.clear();
            return;
        }

        // closing "
        self.source.next();

        self.text.push('"');
        self.add_token(StringToken);
    }

    fn scan_number(&mut self) {
        self.advance_digits();

        // check for a fractional part
        if let Some(&c) = self.source.peek() {
            if c == '.' {
                // clone the source iterator so that we can peek 2 characters ahead
                let mut cloned = self.source.clone();
                cloned.next();
                if let Some(&next_c) = cloned.peek() {
                    if is_digit(next_c) {
                        self.text.push(c);
                        self.source.next();
                        self.advance_digits();
                    }
                }
            }
        }

        self.add_token(Number);
    }

    fn advance_digits(&mut self) {
        while let Some(&c) = self.source.peek() {
            if !is_digit(c) {
                break;
            }
            self.text.push(c);
            self.source.next();
        }
    }

    fn scan_identifier(&mut self) {
        while let Some(&c) = self.source.peek() {
            if !is_alpha_num(c) {
                break;
            }
            self.text.push(c);
            self.source.next();
        }

        let typ = *KEYWORDS.get(&self.text as &str).unwrap_or(&Identifier);

        self.add_token(typ);
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.source.peek() != Some(&expected) {
            return false;
        }

        self.source.next();
        self.text.push(expected);
        true
    }

    fn add_token(&mut self, typ: TokenType) {
        let mut lexeme = String::new();
        mem::swap(&mut self.text, &mut lexeme);

        // parse literals
        let literal = match typ {
            StringToken => Literal::StringLiteral(lexeme[1..lexeme.len() - 1].to_owned()),
            Number => match lexeme.parse() {
                Ok(value) => Literal::F64(value),
                Err(_) => {
                    self.error(self.line, ScanError::InvalidNumber(lexeme));
                    return;
                }
            },
            _ => Literal::Nil,
        };

        self.tokens.push(Token {
            typ,
            lexeme,
            literal,
            line: self.line,
        });
    }

    fn error(&mut self, line: usize, error: ScanError) {
        self.errors.push(Diagnostic::new(line, error));
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_num(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use pretty_assertions::assert_eq;

    fn types(source: &str) -> Vec<TokenType> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens.into_iter().map(|token| token.typ).collect()
    }

    #[test]
    fn test_operators_and_keywords() {
        assert_eq!(
            types("var x = a >= 1 ? !b : c; break"),
            vec![
                Var,
                Identifier,
                Equal,
                Identifier,
                GreaterEqual,
                Number,
                Question,
                Bang,
                Identifier,
                Colon,
                Identifier,
                Semicolon,
                Break,
                Eof
            ]
        );
    }

    #[test]
    fn test_literals() {
        let (tokens, errors) = Scanner::new("12.5 \"hi there\" 3. orchid").scan_tokens();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Literal::F64(12.5));
        assert_eq!(tokens[1].literal, Literal::StringLiteral("hi there".to_owned()));
        assert_eq!(tokens[1].lexeme, "\"hi there\"");
        // a trailing dot is not part of the number
        assert_eq!(tokens[2].literal, Literal::F64(3.0));
        assert_eq!(tokens[3].typ, Dot);
        assert_eq!(tokens[4].typ, Identifier);
        assert_eq!(tokens[4].lexeme, "orchid");
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(
            types("/* outer /* inner */ still comment */ print 1;"),
            vec![Print, Number, Semicolon, Eof]
        );
    }

    #[test]
    fn test_comments_track_lines() {
        let (tokens, _) = Scanner::new("// one\n/* two\nthree */\nx").scan_tokens();
        assert_eq!(tokens[0].typ, Identifier);
        assert_eq!(tokens[0].line, 4);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, errors) = Scanner::new("/* unterminated").scan_tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error,
            CompileError::Scan(ScanError::UnterminatedComment)
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Scanner::new("print \"oops").scan_tokens();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error,
            CompileError::Scan(ScanError::UnterminatedString)
        );
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_continues_after_bad_characters() {
        let (tokens, errors) = Scanner::new("a @ b\n# c").scan_tokens();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 2);
        let names: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", ""]);
    }
}
