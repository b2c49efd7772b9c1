// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! A tree-walking interpreter for Wick: lexer, parser, and the evaluator
//! that is this crate's reason for existing. The lexer/parser front end
//! exists so the evaluator has real `ast::Node` trees to walk; the
//! evaluator, value model, and scope chain are the subject this crate is
//! built to demonstrate.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod span;
pub mod value;
pub mod writer;

pub use error::{EvalError, EvalErrorKind};
pub use eval::Evaluator;
pub use parser::{ParseError, Parser};
pub use value::Value;
