// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Turns source text into a stream of [`Token`]s. Hand-written,
//! char-at-a-time scanner, no regex or generated tables.

use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Float(f64),
    Str(String),
    Char(char),
    Ident(String),

    // Keywords
    Var,
    Const,
    Let,
    Func,
    Return,
    If,
    Else,
    For,
    While,
    Foreach,
    In,
    True,
    False,
    Nil,
    Break,
    Continue,
    Struct,
    New,
    Enum,
    Import,
    As,
    Switch,
    Case,
    Default,
    This,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AmpAmp,
    PipePipe,
    Eq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    DotDotDot,
    Dot,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,

    Eof,
    /// The lexer could not recognize this character.
    Unrecognized(char),
    /// A string literal was never closed before end-of-line / end-of-input.
    UnterminatedString,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Lexer<'a> {
    input: &'a str,
    stream: std::str::CharIndices<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            stream: input.char_indices(),
        }
    }

    /// Lex the whole input into a token vector, always terminated by `Eof`.
    pub fn tokenize(input: &'a str) -> Vec<Token> {
        let mut lexer = Self::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok);
            if done {
                break;
            }
        }
        out
    }

    fn current_offset(&self) -> usize {
        self.peek_char().map_or(self.input.len(), |(pos, _)| pos)
    }

    fn peek_char(&self) -> Option<(usize, char)> {
        self.stream.clone().next()
    }

    fn peek_char_skip(&self, skip: usize) -> Option<(usize, char)> {
        self.stream.clone().nth(skip)
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        self.stream.next()
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek_char().map(|(_, c)| c) == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some((_, ch)) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.next_char();
        }
    }

    fn skip_block_comment(&mut self) {
        while let Some((_, ch)) = self.next_char() {
            if ch == '*' && self.bump_if('/') {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        macro_rules! tok {
            ($begin:expr, $kind:expr) => {
                return Token {
                    kind: $kind,
                    span: Span::new($begin, self.current_offset()),
                }
            };
        }

        loop {
            let (begin, ch) = match self.next_char() {
                Some(pair) => pair,
                None => {
                    return Token {
                        kind: TokenKind::Eof,
                        span: Span::new(self.input.len(), self.input.len()),
                    }
                }
            };

            match ch {
                _ if ch.is_whitespace() => continue,
                '/' if self.peek_char().map(|(_, c)| c) == Some('/') => {
                    self.skip_line_comment();
                    continue;
                }
                '/' if self.peek_char().map(|(_, c)| c) == Some('*') => {
                    self.next_char();
                    self.skip_block_comment();
                    continue;
                }

                '(' => tok!(begin, TokenKind::LParen),
                ')' => tok!(begin, TokenKind::RParen),
                '{' => tok!(begin, TokenKind::LBrace),
                '}' => tok!(begin, TokenKind::RBrace),
                '[' => tok!(begin, TokenKind::LBracket),
                ']' => tok!(begin, TokenKind::RBracket),
                ',' => tok!(begin, TokenKind::Comma),
                ':' => tok!(begin, TokenKind::Colon),
                ';' => tok!(begin, TokenKind::Semicolon),

                '.' => {
                    if self.peek_char().map(|(_, c)| c) == Some('.')
                        && self.peek_char_skip(1).map(|(_, c)| c) == Some('.')
                    {
                        self.next_char();
                        self.next_char();
                        tok!(begin, TokenKind::DotDotDot);
                    }
                    tok!(begin, TokenKind::Dot)
                }

                '+' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::PlusAssign)
                    }
                    tok!(begin, TokenKind::Plus)
                }
                '-' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::MinusAssign)
                    }
                    tok!(begin, TokenKind::Minus)
                }
                '*' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::StarAssign)
                    }
                    tok!(begin, TokenKind::Star)
                }
                '/' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::SlashAssign)
                    }
                    tok!(begin, TokenKind::Slash)
                }
                '%' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::PercentAssign)
                    }
                    tok!(begin, TokenKind::Percent)
                }
                '~' => tok!(begin, TokenKind::Tilde),
                '&' => {
                    if self.bump_if('&') {
                        tok!(begin, TokenKind::AmpAmp)
                    } else if self.bump_if('=') {
                        tok!(begin, TokenKind::AmpAssign)
                    }
                    tok!(begin, TokenKind::Amp)
                }
                '|' => {
                    if self.bump_if('|') {
                        tok!(begin, TokenKind::PipePipe)
                    } else if self.bump_if('=') {
                        tok!(begin, TokenKind::PipeAssign)
                    }
                    tok!(begin, TokenKind::Pipe)
                }
                '^' => {
                    if self.bump_if('=') {
                        tok!(begin, TokenKind::CaretAssign)
                    }
                    tok!(begin, TokenKind::Caret)
                }
                '!' => {
                    if self.bump_if('=') {
                        if self.bump_if('=') {
                            tok!(begin, TokenKind::NotEqEq)
                        }
                        tok!(begin, TokenKind::NotEq)
                    }
                    tok!(begin, TokenKind::Bang)
                }
                '=' => {
                    if self.bump_if('=') {
                        if self.bump_if('=') {
                            tok!(begin, TokenKind::EqEqEq)
                        }
                        tok!(begin, TokenKind::Eq)
                    }
                    tok!(begin, TokenKind::Assign)
                }
                '<' => {
                    if self.bump_if('<') {
                        if self.bump_if('=') {
                            tok!(begin, TokenKind::ShlAssign)
                        }
                        tok!(begin, TokenKind::Shl)
                    } else if self.bump_if('=') {
                        tok!(begin, TokenKind::Lte)
                    }
                    tok!(begin, TokenKind::Lt)
                }
                '>' => {
                    if self.bump_if('>') {
                        if self.bump_if('=') {
                            tok!(begin, TokenKind::ShrAssign)
                        }
                        tok!(begin, TokenKind::Shr)
                    } else if self.bump_if('=') {
                        tok!(begin, TokenKind::Gte)
                    }
                    tok!(begin, TokenKind::Gt)
                }

                '"' => return self.lex_string(begin),
                '\'' => return self.lex_char(begin),

                _ if ch.is_ascii_digit() => return self.lex_number(begin),
                _ if is_ident_start(ch) => return self.lex_ident(begin),

                other => tok!(begin, TokenKind::Unrecognized(other)),
            }
        }
    }

    fn lex_string(&mut self, begin: usize) -> Token {
        let mut value = String::new();
        let mut terminated = false;
        while let Some((_, ch)) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.next_char();
            if ch == '"' {
                terminated = true;
                break;
            }
            if ch == '\\' {
                if let Some((_, esc)) = self.next_char() {
                    value.push(unescape(esc));
                }
            } else {
                value.push(ch);
            }
        }
        let kind = if terminated {
            TokenKind::Str(value)
        } else {
            TokenKind::UnterminatedString
        };
        Token {
            kind,
            span: Span::new(begin, self.current_offset()),
        }
    }

    fn lex_char(&mut self, begin: usize) -> Token {
        let value = match self.next_char() {
            Some((_, '\\')) => self.next_char().map(|(_, esc)| unescape(esc)),
            Some((_, ch)) => Some(ch),
            None => None,
        };
        self.bump_if('\'');
        let kind = match value {
            Some(c) => TokenKind::Char(c),
            None => TokenKind::UnterminatedString,
        };
        Token {
            kind,
            span: Span::new(begin, self.current_offset()),
        }
    }

    fn lex_number(&mut self, begin: usize) -> Token {
        while let Some((_, ch)) = self.peek_char() {
            if ch.is_ascii_digit() {
                self.next_char();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek_char().map(|(_, c)| c) == Some('.')
            && self.peek_char_skip(1).map_or(false, |(_, c)| c.is_ascii_digit())
        {
            is_float = true;
            self.next_char();
            while let Some((_, ch)) = self.peek_char() {
                if ch.is_ascii_digit() {
                    self.next_char();
                } else {
                    break;
                }
            }
        }

        let end = self.current_offset();
        let text = &self.input[begin..end];
        let kind = if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::Integer(text.parse().unwrap_or(0))
        };
        Token {
            kind,
            span: Span::new(begin, end),
        }
    }

    fn lex_ident(&mut self, begin: usize) -> Token {
        while let Some((_, ch)) = self.peek_char() {
            if is_ident_cont(ch) {
                self.next_char();
            } else {
                break;
            }
        }
        let end = self.current_offset();
        let text = &self.input[begin..end];
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_owned()));
        Token {
            kind,
            span: Span::new(begin, end),
        }
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_cont(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

fn keyword(text: &str) -> Option<TokenKind> {
    Some(match text {
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "let" => TokenKind::Let,
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "foreach" => TokenKind::Foreach,
        "in" => TokenKind::In,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "struct" => TokenKind::Struct,
        "new" => TokenKind::New,
        "enum" => TokenKind::Enum,
        "import" => TokenKind::Import,
        "as" => TokenKind::As,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "this" => TokenKind::This,
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_arithmetic_expression() {
        assert_eq!(
            kinds("1 + 2 * 3"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Plus,
                TokenKind::Integer(2),
                TokenKind::Star,
                TokenKind::Integer(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_float() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
    }

    #[test]
    fn distinguishes_compound_operators() {
        assert_eq!(
            kinds("a += 1; a == b; a === b; a...b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::PlusAssign,
                TokenKind::Integer(1),
                TokenKind::Semicolon,
                TokenKind::Ident("a".into()),
                TokenKind::Eq,
                TokenKind::Ident("b".into()),
                TokenKind::Semicolon,
                TokenKind::Ident("a".into()),
                TokenKind::EqEqEq,
                TokenKind::Ident("b".into()),
                TokenKind::Semicolon,
                TokenKind::Ident("a".into()),
                TokenKind::DotDotDot,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn recognizes_keywords_and_identifiers() {
        assert_eq!(
            kinds("var foreach"),
            vec![TokenKind::Var, TokenKind::Foreach, TokenKind::Eof]
        );
    }

    #[test]
    fn strings_support_escapes() {
        let toks = kinds(r#""a\nb""#);
        assert_eq!(toks, vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("1 // trailing\n+ /* block */ 2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Plus,
                TokenKind::Integer(2),
                TokenKind::Eof
            ]
        );
    }
}
