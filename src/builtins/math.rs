// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The `math` package: `abs`, `min`, `max`, `sqrt`, `pow`.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{EvalError, EvalErrorKind};
use crate::eval::Evaluator;
use crate::value::{Builtin, Value};
use crate::writer::Writer;

pub fn package() -> IndexMap<String, Value> {
    let mut members = IndexMap::new();
    for (name, func) in [
        ("abs", abs as crate::value::BuiltinFn),
        ("min", min),
        ("max", max),
        ("sqrt", sqrt),
        ("pow", pow),
    ] {
        members.insert(
            name.to_owned(),
            Value::Builtin(Rc::new(Builtin {
                name: format!("math.{}", name),
                func,
            })),
        );
    }
    members
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn type_error(op: &str, v: &Value) -> EvalError {
    EvalError::plain(EvalErrorKind::UnsupportedOperator {
        op: op.to_owned(),
        left: v.type_tag(),
        right: v.type_tag(),
    })
}

fn abs(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    match args.first() {
        Some(Value::Integer(i)) => Ok(Value::Integer(i.abs())),
        Some(Value::Float(x)) => Ok(Value::Float(x.abs())),
        Some(other) => Err(type_error("math.abs", other)),
        None => Err(EvalError::plain(EvalErrorKind::ArityMismatch {
            expected: 1,
            got: 0,
        })),
    }
}

fn min(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    fold_numeric("math.min", args, f64::min)
}

fn max(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    fold_numeric("math.max", args, f64::max)
}

fn fold_numeric(
    op: &str,
    args: &[Value],
    combine: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::plain(EvalErrorKind::ArityMismatch {
            expected: 1,
            got: 0,
        }));
    }
    let all_integers = args.iter().all(|v| matches!(v, Value::Integer(_)));
    let mut acc = as_f64(&args[0]).ok_or_else(|| type_error(op, &args[0]))?;
    for v in &args[1..] {
        let x = as_f64(v).ok_or_else(|| type_error(op, v))?;
        acc = combine(acc, x);
    }
    if all_integers {
        Ok(Value::Integer(acc as i64))
    } else {
        Ok(Value::Float(acc))
    }
}

fn sqrt(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    match args.first().and_then(as_f64) {
        Some(x) => Ok(Value::Float(x.sqrt())),
        None => Err(type_error(
            "math.sqrt",
            args.first().unwrap_or(&Value::Nil),
        )),
    }
}

fn pow(_eval: &mut Evaluator, _writer: &mut dyn Writer, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::plain(EvalErrorKind::ArityMismatch {
            expected: 2,
            got: args.len(),
        }));
    }
    match (&args[0], &args[1]) {
        (Value::Integer(base), Value::Integer(exp)) if *exp >= 0 => {
            Ok(Value::Integer(base.pow(*exp as u32)))
        }
        (a, b) => {
            let base = as_f64(a).ok_or_else(|| type_error("math.pow", a))?;
            let exp = as_f64(b).ok_or_else(|| type_error("math.pow", b))?;
            Ok(Value::Float(base.powf(exp)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::writer::CollectingWriter;

    #[test]
    fn abs_preserves_integer_tag() {
        let mut eval = Evaluator::new();
        let mut w = CollectingWriter::new();
        assert_eq!(
            abs(&mut eval, &mut w, &[Value::Integer(-3)]).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn pow_with_negative_exponent_promotes_to_float() {
        let mut eval = Evaluator::new();
        let mut w = CollectingWriter::new();
        let result = pow(&mut eval, &mut w, &[Value::Integer(2), Value::Integer(-1)]).unwrap();
        assert_eq!(result, Value::Float(0.5));
    }
}
