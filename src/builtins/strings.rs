// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The `strings` package: `upper`, `lower`, `trim`, `split`, `join`.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{EvalError, EvalErrorKind};
use crate::eval::Evaluator;
use crate::value::{Builtin, Value};
use crate::writer::Writer;

pub fn package() -> IndexMap<String, Value> {
    let mut members = IndexMap::new();
    for (name, func) in [
        ("upper", upper as crate::value::BuiltinFn),
        ("lower", lower),
        ("trim", trim),
        ("split", split),
        ("join", join),
    ] {
        members.insert(
            name.to_owned(),
            Value::Builtin(Rc::new(Builtin {
                name: format!("strings.{}", name),
                func,
            })),
        );
    }
    members
}

fn expect_string<'a>(op: &str, v: &'a Value) -> Result<&'a str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: op.to_owned(),
            left: other.type_tag(),
            right: other.type_tag(),
        })),
    }
}

fn upper(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    let s = expect_string("strings.upper", args.first().unwrap_or(&Value::Nil))?;
    Ok(Value::new_string(s.to_uppercase()))
}

fn lower(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    let s = expect_string("strings.lower", args.first().unwrap_or(&Value::Nil))?;
    Ok(Value::new_string(s.to_lowercase()))
}

fn trim(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    let s = expect_string("strings.trim", args.first().unwrap_or(&Value::Nil))?;
    Ok(Value::new_string(s.trim()))
}

fn split(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::plain(EvalErrorKind::ArityMismatch {
            expected: 2,
            got: args.len(),
        }));
    }
    let s = expect_string("strings.split", &args[0])?;
    let sep = expect_string("strings.split", &args[1])?;
    let parts = if sep.is_empty() {
        s.chars().map(|c| Value::new_string(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::new_string).collect()
    };
    Ok(Value::new_array(parts))
}

fn join(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::plain(EvalErrorKind::ArityMismatch {
            expected: 2,
            got: args.len(),
        }));
    }
    let sep = expect_string("strings.join", &args[1])?;
    match &args[0] {
        Value::Array(items) | Value::List(items) => {
            let rendered: Vec<String> = items.borrow().iter().map(|v| v.display_string()).collect();
            Ok(Value::new_string(rendered.join(sep)))
        }
        other => Err(EvalError::plain(EvalErrorKind::UnsupportedOperator {
            op: "strings.join".to_owned(),
            left: other.type_tag(),
            right: other.type_tag(),
        })),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::writer::CollectingWriter;

    #[test]
    fn upper_and_lower_round_trip() {
        let mut eval = Evaluator::new();
        let mut w = CollectingWriter::new();
        assert_eq!(
            upper(&mut eval, &mut w, &[Value::new_string("abc")]).unwrap(),
            Value::new_string("ABC")
        );
        assert_eq!(
            lower(&mut eval, &mut w, &[Value::new_string("ABC")]).unwrap(),
            Value::new_string("abc")
        );
    }

    #[test]
    fn split_then_join_round_trips() {
        let mut eval = Evaluator::new();
        let mut w = CollectingWriter::new();
        let parts = split(
            &mut eval,
            &mut w,
            &[Value::new_string("a,b,c"), Value::new_string(",")],
        )
        .unwrap();
        let joined = join(&mut eval, &mut w, &[parts, Value::new_string(",")]).unwrap();
        assert_eq!(joined, Value::new_string("a,b,c"));
    }
}
