// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Recursive-descent / precedence-climbing parser. Turns a [`Token`]
//! stream into the [`Node`] tree the evaluator consumes.

use std::fmt;

use crate::ast::{
    AssignOp, BinaryOp, BoolOp, DeclKeyword, EnumMember, FieldDecl, Node, NodeKind, SwitchCase,
    UnaryOp,
};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub info: ParseErrorInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorInfo {
    Unexpected { expected: String, actual: TokenKind },
    InvalidAssignmentTarget,
    DuplicateEnumMember(String),
    Eof,
}

impl fmt::Display for ParseErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorInfo::Unexpected { expected, actual } => {
                write!(f, "expected {}, but got {:?}", expected, actual)
            }
            ParseErrorInfo::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            ParseErrorInfo::DuplicateEnumMember(name) => {
                write!(f, "duplicate enum member {}", name)
            }
            ParseErrorInfo::Eof => write!(f, "unexpected end of input"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.span.begin, self.span.end, self.info)
    }
}

impl std::error::Error for ParseError {}

type PResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            tokens: Lexer::tokenize(source),
            pos: 0,
        }
    }

    /// Parse a whole program into a `Root` node.
    pub fn parse_program(source: &str) -> PResult<Node> {
        let mut parser = Parser::new(source);
        let mut stmts = Vec::new();
        let begin = parser.peek().span.begin;
        while !parser.at_eof() {
            stmts.push(parser.parse_statement()?);
        }
        let end = parser.peek().span.end;
        Ok(Node::new(Span::new(begin, end), NodeKind::Root(stmts)))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn accept(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let actual = self.peek().clone();
            Err(ParseError {
                span: actual.span,
                info: ParseErrorInfo::Unexpected {
                    expected: what.to_owned(),
                    actual: actual.kind,
                },
            })
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Span)> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(name) => Ok((name, tok.span)),
            other => Err(ParseError {
                span: tok.span,
                info: ParseErrorInfo::Unexpected {
                    expected: "identifier".to_owned(),
                    actual: other,
                },
            }),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let actual = self.peek().clone();
        ParseError {
            span: actual.span,
            info: ParseErrorInfo::Unexpected {
                expected: expected.to_owned(),
                actual: actual.kind,
            },
        }
    }

    // --- statements ---

    fn parse_statement(&mut self) -> PResult<Node> {
        match self.peek_kind() {
            TokenKind::Var | TokenKind::Const | TokenKind::Let => self.parse_declaration(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Foreach => self.parse_foreach(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Func => self.parse_function_statement(),
            TokenKind::Break => {
                let tok = self.advance();
                self.accept(&TokenKind::Semicolon);
                Ok(Node::new(tok.span, NodeKind::Break))
            }
            TokenKind::Continue => {
                let tok = self.advance();
                self.accept(&TokenKind::Semicolon);
                Ok(Node::new(tok.span, NodeKind::Continue))
            }
            TokenKind::Struct => self.parse_struct_declaration(),
            TokenKind::Enum => self.parse_enum_declaration(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Switch => self.parse_switch(),
            _ => {
                let expr = self.parse_expression()?;
                self.accept(&TokenKind::Semicolon);
                Ok(expr)
            }
        }
    }

    fn parse_decl_keyword(&mut self) -> DeclKeyword {
        match self.advance().kind {
            TokenKind::Var => DeclKeyword::Var,
            TokenKind::Const => DeclKeyword::Const,
            TokenKind::Let => DeclKeyword::Let,
            _ => unreachable!("parse_decl_keyword called on non-keyword token"),
        }
    }

    fn parse_declaration(&mut self) -> PResult<Node> {
        let begin = self.peek().span.begin;
        let keyword = self.parse_decl_keyword();
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Assign, "=")?;
        let value = self.parse_expression()?;
        let end = value.span.end;
        self.accept(&TokenKind::Semicolon);
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::Declarative {
                keyword,
                name,
                value: Box::new(value),
            },
        ))
    }

    fn parse_return(&mut self) -> PResult<Node> {
        let tok = self.advance();
        if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) {
            self.accept(&TokenKind::Semicolon);
            return Ok(Node::new(tok.span, NodeKind::Return(None)));
        }
        let value = self.parse_expression()?;
        let span = tok.span.to(value.span);
        self.accept(&TokenKind::Semicolon);
        Ok(Node::new(span, NodeKind::Return(Some(Box::new(value)))))
    }

    fn parse_block(&mut self) -> PResult<Node> {
        let begin = self.expect(TokenKind::LBrace, "{")?.span.begin;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            stmts.push(self.parse_statement()?);
        }
        let end = self.expect(TokenKind::RBrace, "}")?.span.end;
        Ok(Node::new(Span::new(begin, end), NodeKind::Block(stmts)))
    }

    fn parse_if(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, ")")?;
        let consequence = self.parse_block()?;
        let mut end = consequence.span.end;
        let alternative = if self.accept(&TokenKind::Else) {
            let alt = if self.check(&TokenKind::If) {
                self.parse_if()?
            } else {
                self.parse_block()?
            };
            end = alt.span.end;
            Some(Box::new(alt))
        } else {
            None
        };
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::If {
                condition: Box::new(condition),
                consequence: Box::new(consequence),
                alternative,
            },
        ))
    }

    fn parse_for(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        self.expect(TokenKind::LParen, "(")?;
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Const | TokenKind::Let
        ) {
            Some(Box::new(self.parse_declaration_no_semi()?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Semicolon, ";")?;
        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Semicolon, ";")?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        let end = body.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::ForLoop {
                init,
                condition,
                update,
                body: Box::new(body),
            },
        ))
    }

    fn parse_declaration_no_semi(&mut self) -> PResult<Node> {
        let begin = self.peek().span.begin;
        let keyword = self.parse_decl_keyword();
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Assign, "=")?;
        let value = self.parse_expression()?;
        let end = value.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::Declarative {
                keyword,
                name,
                value: Box::new(value),
            },
        ))
    }

    fn parse_while(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        self.expect(TokenKind::LParen, "(")?;
        let mut conditions = vec![self.parse_expression()?];
        while self.accept(&TokenKind::Comma) {
            conditions.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        let end = body.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::WhileLoop {
                conditions,
                body: Box::new(body),
            },
        ))
    }

    fn parse_foreach(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        self.expect(TokenKind::LParen, "(")?;
        let (iterator, _) = self.expect_ident()?;
        self.expect(TokenKind::In, "in")?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        let end = body.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::ForeachLoop {
                iterator,
                iterable: Box::new(iterable),
                body: Box::new(body),
            },
        ))
    }

    fn parse_function_statement(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let name = if let TokenKind::Ident(_) = self.peek_kind() {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        let end = body.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::FunctionStatement {
                name,
                params,
                body: Box::new(body),
            },
        ))
    }

    fn parse_param_list(&mut self) -> PResult<Vec<String>> {
        self.expect(TokenKind::LParen, "(")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident()?.0);
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(params)
    }

    fn parse_struct_declaration(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            match self.peek_kind() {
                TokenKind::Var | TokenKind::Const | TokenKind::Let => {
                    let keyword = self.parse_decl_keyword();
                    let (fname, _) = self.expect_ident()?;
                    self.expect(TokenKind::Assign, "=")?;
                    let value = self.parse_expression()?;
                    self.accept(&TokenKind::Semicolon);
                    fields.push(FieldDecl {
                        keyword,
                        name: fname,
                        value,
                    });
                }
                TokenKind::Func => methods.push(self.parse_function_statement()?),
                _ => return Err(self.unexpected("field or method declaration")),
            }
        }
        let end = self.expect(TokenKind::RBrace, "}")?.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::StructDeclaration {
                name,
                fields,
                methods,
            },
        ))
    }

    fn parse_enum_declaration(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut members = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut next_auto: i64 = 0;
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let (member_name, span) = self.expect_ident()?;
            if !seen.insert(member_name.clone()) {
                return Err(ParseError {
                    span,
                    info: ParseErrorInfo::DuplicateEnumMember(member_name),
                });
            }
            let value = if self.accept(&TokenKind::Assign) {
                let v = self.parse_expression()?;
                if let NodeKind::Integer(i) = v.kind {
                    next_auto = i + 1;
                } else {
                    next_auto = 0;
                }
                v
            } else {
                let auto = next_auto;
                next_auto += 1;
                Node::new(span, NodeKind::Integer(auto))
            };
            members.push(EnumMember {
                name: member_name,
                value,
            });
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "}")?.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::EnumDeclaration { name, members },
        ))
    }

    fn parse_import(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let (name, mut end) = self.expect_ident()?;
        let mut span_end = end;
        let alias = if self.accept(&TokenKind::As) {
            let (alias, alias_span) = self.expect_ident()?;
            span_end = alias_span.end;
            Some(alias)
        } else {
            None
        };
        end = span_end;
        self.accept(&TokenKind::Semicolon);
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::Import { name, alias },
        ))
    }

    fn parse_switch(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        self.expect(TokenKind::LParen, "(")?;
        let scrutinee = self.parse_expression()?;
        self.expect(TokenKind::RParen, ")")?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut cases = Vec::new();
        let mut default = None;
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            if self.accept(&TokenKind::Case) {
                let value = self.parse_expression()?;
                self.expect(TokenKind::Colon, ":")?;
                let body = self.parse_case_body()?;
                cases.push(SwitchCase { value, body });
            } else if self.accept(&TokenKind::Default) {
                self.expect(TokenKind::Colon, ":")?;
                let body = self.parse_case_body()?;
                default = Some(Box::new(body));
            } else {
                return Err(self.unexpected("case or default"));
            }
        }
        let end = self.expect(TokenKind::RBrace, "}")?.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::Switch {
                scrutinee: Box::new(scrutinee),
                cases,
                default,
            },
        ))
    }

    /// A case body is a run of statements up to the next `case`, `default`,
    /// or the closing brace of the `switch` — not wrapped in its own braces.
    fn parse_case_body(&mut self) -> PResult<Node> {
        let begin = self.peek().span.begin;
        let mut stmts = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace
        ) && !self.at_eof()
        {
            stmts.push(self.parse_statement()?);
        }
        let end = self.peek().span.begin;
        Ok(Node::new(Span::new(begin, end), NodeKind::Block(stmts)))
    }

    // --- expressions (precedence climbing) ---

    fn parse_expression(&mut self) -> PResult<Node> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<Node> {
        let target = self.parse_logic_or()?;
        let op = match self.peek_kind() {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::AddAssign,
            TokenKind::MinusAssign => AssignOp::SubAssign,
            TokenKind::StarAssign => AssignOp::MulAssign,
            TokenKind::SlashAssign => AssignOp::DivAssign,
            TokenKind::PercentAssign => AssignOp::ModAssign,
            TokenKind::AmpAssign => AssignOp::AndAssign,
            TokenKind::PipeAssign => AssignOp::OrAssign,
            TokenKind::CaretAssign => AssignOp::XorAssign,
            TokenKind::ShlAssign => AssignOp::ShlAssign,
            TokenKind::ShrAssign => AssignOp::ShrAssign,
            _ => return Ok(target),
        };
        if !is_assignable(&target.kind) {
            return Err(ParseError {
                span: target.span,
                info: ParseErrorInfo::InvalidAssignmentTarget,
            });
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.to(value.span);
        Ok(Node::new(
            span,
            NodeKind::Assignment {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
        ))
    }

    fn parse_logic_or(&mut self) -> PResult<Node> {
        let mut left = self.parse_logic_and()?;
        while self.accept(&TokenKind::PipePipe) {
            let right = self.parse_logic_and()?;
            let span = left.span.to(right.span);
            left = Node::new(
                span,
                NodeKind::Bool {
                    op: BoolOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_logic_and(&mut self) -> PResult<Node> {
        let mut left = self.parse_equality()?;
        while self.accept(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            let span = left.span.to(right.span);
            left = Node::new(
                span,
                NodeKind::Bool {
                    op: BoolOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Node> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Eq => BoolOp::Eq,
                TokenKind::NotEq => BoolOp::NotEq,
                TokenKind::EqEqEq => BoolOp::StrictEq,
                TokenKind::NotEqEq => BoolOp::StrictNotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.to(right.span);
            left = Node::new(
                span,
                NodeKind::Bool {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Node> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BoolOp::Lt,
                TokenKind::Lte => BoolOp::Lte,
                TokenKind::Gt => BoolOp::Gt,
                TokenKind::Gte => BoolOp::Gte,
                _ => break,
            };
            self.advance();
            let right = self.parse_range()?;
            let span = left.span.to(right.span);
            left = Node::new(
                span,
                NodeKind::Bool {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_range(&mut self) -> PResult<Node> {
        let left = self.parse_bitor()?;
        if self.accept(&TokenKind::DotDotDot) {
            let right = self.parse_bitor()?;
            let span = left.span.to(right.span);
            return Ok(Node::new(
                span,
                NodeKind::RangeLit {
                    start: Box::new(left),
                    end: Box::new(right),
                },
            ));
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> PResult<Node> {
        let mut left = self.parse_bitxor()?;
        while self.check(&TokenKind::Pipe) {
            self.advance();
            let right = self.parse_bitxor()?;
            left = binary_node(BinaryOp::BitOr, left, right);
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> PResult<Node> {
        let mut left = self.parse_bitand()?;
        while self.check(&TokenKind::Caret) {
            self.advance();
            let right = self.parse_bitand()?;
            left = binary_node(BinaryOp::BitXor, left, right);
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> PResult<Node> {
        let mut left = self.parse_shift()?;
        while self.check(&TokenKind::Amp) {
            self.advance();
            let right = self.parse_shift()?;
            left = binary_node(BinaryOp::BitAnd, left, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> PResult<Node> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Shl => BinaryOp::Shl,
                TokenKind::Shr => BinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary_node(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Node> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary_node(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary_node(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Node> {
        let op = match self.peek_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        let begin = self.advance().span.begin;
        let right = self.parse_unary()?;
        let span = Span::new(begin, right.span.end);
        Ok(Node::new(
            span,
            NodeKind::Unary {
                op,
                right: Box::new(right),
            },
        ))
    }

    fn parse_postfix(&mut self) -> PResult<Node> {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    let end = self.tokens[self.pos - 1].span.end;
                    let span = Span::new(node.span.begin, end);
                    node = Node::new(
                        span,
                        NodeKind::Call {
                            function: Box::new(node),
                            args,
                        },
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_ident()?;
                    let span = node.span.to(name_span);
                    node = Node::new(
                        span,
                        NodeKind::Dot {
                            left: Box::new(node),
                            right: name,
                        },
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    node = self.parse_index_or_slice(node)?;
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_args(&mut self) -> PResult<Vec<Node>> {
        self.expect(TokenKind::LParen, "(")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(args)
    }

    fn parse_index_or_slice(&mut self, left: Node) -> PResult<Node> {
        let begin = left.span.begin;
        if self.accept(&TokenKind::Colon) {
            let end_expr = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            let end = self.expect(TokenKind::RBracket, "]")?.span.end;
            return Ok(Node::new(
                Span::new(begin, end),
                NodeKind::Slice {
                    left: Box::new(left),
                    start: None,
                    end: end_expr,
                },
            ));
        }
        let first = self.parse_expression()?;
        if self.accept(&TokenKind::Colon) {
            let end_expr = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            let end = self.expect(TokenKind::RBracket, "]")?.span.end;
            return Ok(Node::new(
                Span::new(begin, end),
                NodeKind::Slice {
                    left: Box::new(left),
                    start: Some(Box::new(first)),
                    end: end_expr,
                },
            ));
        }
        let end = self.expect(TokenKind::RBracket, "]")?.span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::Index {
                left: Box::new(left),
                index: Box::new(first),
            },
        ))
    }

    fn parse_primary(&mut self) -> PResult<Node> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Integer(i) => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Integer(i)))
            }
            TokenKind::Float(x) => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Float(x)))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Str(s)))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Char(c)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Boolean(false)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Nil))
            }
            TokenKind::This => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Identifier("this".to_owned())))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Node::new(tok.span, NodeKind::Identifier(name)))
            }
            TokenKind::Func => self.parse_function_statement(),
            TokenKind::New => self.parse_new(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if self.check(&TokenKind::Comma) {
                    return self.parse_tuple_tail(tok.span.begin, inner);
                }
                let end = self.expect(TokenKind::RParen, ")")?.span.end;
                Ok(Node::new(
                    Span::new(tok.span.begin, end),
                    NodeKind::Parenthesized(Box::new(inner)),
                ))
            }
            TokenKind::LBracket => self.parse_array_or_list(),
            TokenKind::LBrace => self.parse_map_or_set(),
            other => Err(ParseError {
                span: tok.span,
                info: ParseErrorInfo::Unexpected {
                    expected: "an expression".to_owned(),
                    actual: other,
                },
            }),
        }
    }

    fn parse_tuple_tail(&mut self, begin: usize, first: Node) -> PResult<Node> {
        let mut items = vec![first];
        while self.accept(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        let end = self.expect(TokenKind::RParen, ")")?.span.end;
        Ok(Node::new(Span::new(begin, end), NodeKind::TupleLit(items)))
    }

    fn parse_new(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let (type_name, _) = self.expect_ident()?;
        let args = self.parse_args()?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Node::new(
            Span::new(begin, end),
            NodeKind::NewCallExpression { type_name, args },
        ))
    }

    /// `[...]` is an `Array`, `list[...]` is a `List` -- both are written
    /// with the same bracket syntax, distinguished by a `list` prefix
    /// keyword-identifier handled in `parse_postfix`'s caller; plain
    /// bracket literals default to `Array`.
    fn parse_array_or_list(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                items.push(self.parse_expression()?);
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RBracket, "]")?.span.end;
        Ok(Node::new(Span::new(begin, end), NodeKind::ArrayLit(items)))
    }

    /// `{...}` is a `Map` when entries look like `key: value`, otherwise a
    /// `Set` of bare expressions. An empty `{}` parses as an empty Map.
    fn parse_map_or_set(&mut self) -> PResult<Node> {
        let begin = self.advance().span.begin;
        if self.check(&TokenKind::RBrace) {
            let end = self.advance().span.end;
            return Ok(Node::new(
                Span::new(begin, end),
                NodeKind::MapLit {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
            ));
        }

        let first = self.parse_expression()?;
        if self.accept(&TokenKind::Colon) {
            let mut keys = vec![first];
            let mut values = vec![self.parse_expression()?];
            while self.accept(&TokenKind::Comma) {
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                keys.push(self.parse_expression()?);
                self.expect(TokenKind::Colon, ":")?;
                values.push(self.parse_expression()?);
            }
            let end = self.expect(TokenKind::RBrace, "}")?.span.end;
            Ok(Node::new(
                Span::new(begin, end),
                NodeKind::MapLit { keys, values },
            ))
        } else {
            let mut items = vec![first];
            while self.accept(&TokenKind::Comma) {
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                items.push(self.parse_expression()?);
            }
            let end = self.expect(TokenKind::RBrace, "}")?.span.end;
            Ok(Node::new(Span::new(begin, end), NodeKind::SetLit(items)))
        }
    }
}

fn binary_node(op: BinaryOp, left: Node, right: Node) -> Node {
    let span = left.span.to(right.span);
    Node::new(
        span,
        NodeKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    )
}

fn is_assignable(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Identifier(_) | NodeKind::Index { .. } | NodeKind::Dot { .. })
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(src: &str) -> Node {
        Parser::parse_program(src).expect("parse error")
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let node = parse("1 + 2 * 3;");
        match &node.kind {
            NodeKind::Root(stmts) => match &stmts[0].kind {
                NodeKind::Binary {
                    op: BinaryOp::Add,
                    right,
                    ..
                } => {
                    assert!(matches!(
                        right.kind,
                        NodeKind::Binary {
                            op: BinaryOp::Mul,
                            ..
                        }
                    ));
                }
                other => panic!("expected Add at top, got {:?}", other),
            },
            other => panic!("expected Root, got {:?}", other),
        }
    }

    #[test]
    fn parses_declaration_and_assignment() {
        let node = parse("var x = 1; x += 2;");
        match &node.kind {
            NodeKind::Root(stmts) => {
                assert!(matches!(stmts[0].kind, NodeKind::Declarative { .. }));
                assert!(matches!(
                    stmts[1].kind,
                    NodeKind::Assignment {
                        op: AssignOp::AddAssign,
                        ..
                    }
                ));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_closure_definition_and_call() {
        let node = parse(
            "func mk() { var n = 0; func inc() { n = n + 1; return n; } return inc; } var c = mk();",
        );
        match &node.kind {
            NodeKind::Root(stmts) => {
                assert!(matches!(stmts[0].kind, NodeKind::FunctionStatement { .. }));
                match &stmts[1].kind {
                    NodeKind::Declarative { value, .. } => {
                        assert!(matches!(value.kind, NodeKind::Call { .. }));
                    }
                    other => panic!("{:?}", other),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_range_literal_and_foreach() {
        let node = parse("foreach (i in 5...1) { }");
        match &node.kind {
            NodeKind::Root(stmts) => match &stmts[0].kind {
                NodeKind::ForeachLoop { iterable, .. } => {
                    assert!(matches!(iterable.kind, NodeKind::RangeLit { .. }));
                }
                other => panic!("{:?}", other),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn parses_negative_index_and_slice() {
        let node = parse("a[-1]; a[1:-1];");
        match &node.kind {
            NodeKind::Root(stmts) => {
                assert!(matches!(stmts[0].kind, NodeKind::Index { .. }));
                assert!(matches!(stmts[1].kind, NodeKind::Slice { .. }));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_struct_with_method() {
        let node = parse(
            "struct P { var x = 0; func set(v) { this.x = v; } func get() { return this.x; } }",
        );
        match &node.kind {
            NodeKind::Root(stmts) => match &stmts[0].kind {
                NodeKind::StructDeclaration { fields, methods, .. } => {
                    assert_eq!(fields.len(), 1);
                    assert_eq!(methods.len(), 2);
                }
                other => panic!("{:?}", other),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn parses_switch_with_fallthrough() {
        let node = parse(
            "switch(m) { case 3: season = \"Spring\"; case 6: season = \"Summer\"; break; }",
        );
        match &node.kind {
            NodeKind::Root(stmts) => match &stmts[0].kind {
                NodeKind::Switch { cases, default, .. } => {
                    assert_eq!(cases.len(), 2);
                    assert!(default.is_none());
                }
                other => panic!("{:?}", other),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn rejects_invalid_assignment_target() {
        let err = Parser::parse_program("1 = 2;").unwrap_err();
        assert!(matches!(err.info, ParseErrorInfo::InvalidAssignmentTarget));
    }
}
