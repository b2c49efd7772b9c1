// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! A single semantic-runtime error kind, sub-classified by message prefix
//! as `spec.md` §7 requires: all errors are non-fatal and never unwind
//! past the AST root.

use snafu::Snafu;

use crate::span::Pos;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum EvalErrorKind {
    #[snafu(display("identifier not found: {}", name))]
    NotFound { name: String },

    #[snafu(display("{} is already declared in this scope", name))]
    Redeclared { name: String },

    #[snafu(display("cannot assign to constant {}", name))]
    AssignToConst { name: String },

    #[snafu(display("cannot assign {} to {}, which was declared as {}", got, name, expected))]
    LetTypeMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[snafu(display("unsupported operator {} for {} and {}", op, left, right))]
    UnsupportedOperator {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    #[snafu(display("index out of bounds: index {}, length {}", index, len))]
    IndexOutOfBounds { index: i64, len: usize },

    #[snafu(display("wrong number of arguments: expected {}, got {}", expected, got))]
    ArityMismatch { expected: usize, got: usize },

    #[snafu(display("unknown field or method {} on {}", name, owner))]
    UnknownMember { owner: &'static str, name: String },

    #[snafu(display("condition did not evaluate to a boolean, got {}", got))]
    NonBooleanCondition { got: &'static str },

    #[snafu(display("{} is not iterable in foreach", got))]
    NonIterable { got: &'static str },

    #[snafu(display("division by zero"))]
    DivisionByZero,

    #[snafu(display("{} is not callable", value))]
    NotCallable { value: &'static str },

    #[snafu(display("duplicate method {} on struct {}", name, struct_name))]
    DuplicateMethod { struct_name: String, name: String },

    #[snafu(display("unknown type {}", name))]
    UnknownType { name: String },

    #[snafu(display("{}", message))]
    Custom { message: String },
}

/// A runtime error with an optional source position. Host-constructed
/// errors (e.g. raised by a builtin that never saw a token) may have no
/// position to attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub pos: Option<Pos>,
    pub kind: EvalErrorKind,
}

impl EvalError {
    pub fn at(pos: Pos, kind: EvalErrorKind) -> Self {
        Self {
            pos: Some(pos),
            kind,
        }
    }

    pub fn plain(kind: EvalErrorKind) -> Self {
        Self { pos: None, kind }
    }

    pub fn message(&self) -> String {
        match self.pos {
            Some(pos) => format!("[{}] {}", pos, self.kind),
            None => self.kind.to_string(),
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for EvalError {}
