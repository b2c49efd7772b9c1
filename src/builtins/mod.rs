// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Name-addressable native callables the evaluator can dispatch to:
//! free-standing builtins (`print`, `len`, ...) and package bundles
//! (`math`, `strings`) reachable through `import`.
//!
//! This is an illustrative standard library, not an exhaustive one --
//! `spec.md` explicitly scopes the full package surface out of the
//! evaluator's core; what's here exists so the import/package-call and
//! plain-builtin-call paths have something real to dispatch to.

mod math;
mod strings;

use indexmap::IndexMap;
use std::rc::Rc;

use crate::error::{EvalError, EvalErrorKind};
use crate::eval::Evaluator;
use crate::value::{Builtin, Package, Value};
use crate::writer::Writer;

/// A name -> `Value::Builtin`/`Value::Package` table, built once at
/// startup and read-only afterward (`spec.md` §5's "Shared resources").
pub struct Registry {
    entries: IndexMap<String, Value>,
}

impl Registry {
    pub fn new() -> Self {
        let mut reg = Self {
            entries: IndexMap::new(),
        };
        reg.register("print", print);
        reg.register("println", println);
        reg.register("len", len);
        reg.register("type_of", type_of);
        reg.register("push", push);
        reg.register("pop", pop);
        reg.register("keys", keys);
        reg.register("values", values);
        reg.register("str", to_str);
        reg.register("int", to_int);
        reg.register("float", to_float);
        reg.register("list", to_list);
        reg.register_package("math", math::package());
        reg.register_package("strings", strings::package());
        reg
    }

    fn register(&mut self, name: &str, func: crate::value::BuiltinFn) {
        self.entries.insert(
            name.to_owned(),
            Value::Builtin(Rc::new(Builtin {
                name: name.to_owned(),
                func,
            })),
        );
    }

    fn register_package(&mut self, name: &str, members: IndexMap<String, Value>) {
        self.entries.insert(
            name.to_owned(),
            Value::Package(Rc::new(Package {
                name: name.to_owned(),
                members,
            })),
        );
    }

    pub fn look_up(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn arity_error(_name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::plain(EvalErrorKind::ArityMismatch { expected, got })
}

fn print(_eval: &mut Evaluator, writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            writer.write_char(' ');
        }
        writer.write_str(&arg.display_string());
    }
    Ok(Value::Nil)
}

fn println(eval: &mut Evaluator, writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    print(eval, writer, args)?;
    writer.write_char('\n');
    Ok(Value::Nil)
}

fn len(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("len", 1, args.len()));
    }
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) | Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Map(map) => map.borrow().len(),
        Value::Set(set) => set.borrow().len(),
        Value::Range(start, end) => ((end - start).unsigned_abs() as usize) + 1,
        other => {
            return Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
                op: "len".to_owned(),
                left: other.type_tag(),
                right: other.type_tag(),
            }))
        }
    };
    Ok(Value::Integer(n as i64))
}

fn type_of(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("type_of", 1, args.len()));
    }
    Ok(Value::new_string(args[0].type_tag()))
}

fn push(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(arity_error("push", 2, args.len()));
    }
    match &args[0] {
        Value::Array(items) | Value::List(items) => {
            items.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        }
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: "push".to_owned(),
            left: other.type_tag(),
            right: args[1].type_tag(),
        })),
    }
}

fn pop(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("pop", 1, args.len()));
    }
    match &args[0] {
        Value::Array(items) | Value::List(items) => {
            Ok(items.borrow_mut().pop().unwrap_or(Value::Nil))
        }
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: "pop".to_owned(),
            left: other.type_tag(),
            right: other.type_tag(),
        })),
    }
}

fn keys(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("keys", 1, args.len()));
    }
    match &args[0] {
        Value::Map(map) => Ok(Value::new_array(
            map.borrow().keys().map(|k| Value::new_string(k.clone())).collect(),
        )),
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: "keys".to_owned(),
            left: other.type_tag(),
            right: other.type_tag(),
        })),
    }
}

fn values(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("values", 1, args.len()));
    }
    match &args[0] {
        Value::Map(map) => Ok(Value::new_array(map.borrow().values().cloned().collect())),
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: "values".to_owned(),
            left: other.type_tag(),
            right: other.type_tag(),
        })),
    }
}

fn to_str(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("str", 1, args.len()));
    }
    Ok(Value::new_string(args[0].display_string()))
}

fn to_int(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("int", 1, args.len()));
    }
    let result = match &args[0] {
        Value::Integer(i) => Some(*i),
        Value::Float(x) => Some(*x as i64),
        Value::Boolean(b) => Some(*b as i64),
        Value::String(s) => s.trim().parse().ok(),
        Value::Char(c) => c.to_digit(10).map(|d| d as i64),
        _ => None,
    };
    result.map(Value::Integer).ok_or_else(|| {
        EvalError::plain(EvalErrorKind::Custom {
            message: format!("cannot convert {} to INTEGER", args[0].type_tag()),
        })
    })
}

fn to_float(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(arity_error("float", 1, args.len()));
    }
    let result = match &args[0] {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    result.map(Value::Float).ok_or_else(|| {
        EvalError::plain(EvalErrorKind::Custom {
            message: format!("cannot convert {} to FLOAT", args[0].type_tag()),
        })
    })
}

/// Builds a `List` (distinct type tag from `Array`, same shape) from its
/// arguments. The language has no `List` literal syntax -- `spec.md`
/// §6.1's AST contract lists an `Array` node but no `List` node -- so
/// this builtin is the only way to produce one.
fn to_list(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::new_list(args.to_vec()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::writer::CollectingWriter;

    fn dummy_evaluator() -> Evaluator {
        Evaluator::new()
    }

    #[test]
    fn len_reports_collection_sizes() {
        let mut eval = dummy_evaluator();
        let mut w = CollectingWriter::new();
        let arr = Value::new_array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(len(&mut eval, &mut w, &[arr]).unwrap(), Value::Integer(2));
        assert_eq!(
            len(&mut eval, &mut w, &[Value::new_string("hi")]).unwrap(),
            Value::Integer(2)
        );
    }

    #[test]
    fn push_mutates_in_place() {
        let mut eval = dummy_evaluator();
        let mut w = CollectingWriter::new();
        let arr = Value::new_array(vec![Value::Integer(1)]);
        push(&mut eval, &mut w, &[arr.clone(), Value::Integer(2)]).unwrap();
        if let Value::Array(items) = &arr {
            assert_eq!(items.borrow().len(), 2);
        } else {
            panic!("expected array");
        }
    }

    #[test]
    fn print_writes_space_separated_without_newline() {
        let mut eval = dummy_evaluator();
        let mut w = CollectingWriter::new();
        print(&mut eval, &mut w, &[Value::Integer(1), Value::Integer(2)]).unwrap();
        assert_eq!(w.as_str(), "1 2");
    }

    #[test]
    fn list_builds_a_list_tagged_value() {
        let mut eval = dummy_evaluator();
        let mut w = CollectingWriter::new();
        let result = to_list(&mut eval, &mut w, &[Value::Integer(1), Value::Integer(2)]).unwrap();
        assert_eq!(result.type_tag(), "LIST");
    }
}
