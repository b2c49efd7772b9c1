// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Unary, binary, and boolean operator semantics (`spec.md` §4.3).
//! Generalizes the teacher's `primops::arithmetic::widen` numeric-widening
//! helper from its 3-way Int/Ratio/Float widen down to Wick's 2-way
//! Int/Float widen, since Wick has no rational type.

use crate::ast::{BinaryOp, BoolOp, UnaryOp};
use crate::value::{loose_eq, strict_eq, Value};

/// Promote a pair of numeric values to a common representation: both
/// `Integer` if both started as `Integer`, otherwise both `Float`.
fn widen(a: Value, b: Value) -> Option<(Numeric, Numeric)> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some((Numeric::Int(x), Numeric::Int(y))),
        (Value::Integer(x), Value::Float(y)) => Some((Numeric::Float(x as f64), Numeric::Float(y))),
        (Value::Float(x), Value::Integer(y)) => Some((Numeric::Float(x), Numeric::Float(y as f64))),
        (Value::Float(x), Value::Float(y)) => Some((Numeric::Float(x), Numeric::Float(y))),
        _ => None,
    }
}

enum Numeric {
    Int(i64),
    Float(f64),
}

fn unsupported(op: &str, left: &Value, right: &Value) -> Value {
    Value::error(format!(
        "unsupported operator {} for {} and {}",
        op,
        left.type_tag(),
        right.type_tag()
    ))
}

pub fn unary(op: UnaryOp, right: Value) -> Value {
    if right.is_sentinel() {
        return right;
    }
    match (op, &right) {
        (UnaryOp::Not, Value::Boolean(b)) => Value::Boolean(!b),
        (UnaryOp::BitNot, Value::Integer(i)) => Value::Integer(!i),
        (UnaryOp::Neg, Value::Integer(i)) => Value::Integer(-i),
        (UnaryOp::Neg, Value::Float(x)) => Value::Float(-x),
        (UnaryOp::Plus, Value::Integer(_)) | (UnaryOp::Plus, Value::Float(_)) => right,
        _ => Value::error(format!("unsupported unary operator for {}", right.type_tag())),
    }
}

pub fn binary(op: BinaryOp, left: Value, right: Value) -> Value {
    if left.is_sentinel() {
        return left;
    }
    if right.is_sentinel() {
        return right;
    }

    if op == BinaryOp::Add {
        if let Value::String(_) = &left {
            return Value::new_string(format!("{}{}", left, right));
        }
        if let Value::String(_) = &right {
            return Value::new_string(format!("{}{}", left, right));
        }
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, left, right)
        }
        BinaryOp::Mod
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr => integer_only(op, left, right),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Value {
    let (left_tag, right_tag) = (left.type_tag(), right.type_tag());
    match widen(left, right) {
        Some((Numeric::Int(x), Numeric::Int(y))) => match op {
            BinaryOp::Add => Value::Integer(x.wrapping_add(y)),
            BinaryOp::Sub => Value::Integer(x.wrapping_sub(y)),
            BinaryOp::Mul => Value::Integer(x.wrapping_mul(y)),
            BinaryOp::Div => {
                if y == 0 {
                    Value::error("division by zero")
                } else {
                    Value::Integer(x / y)
                }
            }
            _ => unreachable!("arithmetic only handles Add/Sub/Mul/Div"),
        },
        Some((Numeric::Float(x), Numeric::Float(y))) => match op {
            BinaryOp::Add => Value::Float(x + y),
            BinaryOp::Sub => Value::Float(x - y),
            BinaryOp::Mul => Value::Float(x * y),
            BinaryOp::Div => Value::Float(x / y),
            _ => unreachable!("arithmetic only handles Add/Sub/Mul/Div"),
        },
        _ => Value::error(format!(
            "unsupported operator for {} and {}",
            left_tag, right_tag
        )),
    }
}

fn integer_only(op: BinaryOp, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(x), Value::Integer(y)) => match op {
            BinaryOp::Mod => {
                if *y == 0 {
                    Value::error("division by zero")
                } else {
                    Value::Integer(x % y)
                }
            }
            BinaryOp::BitAnd => Value::Integer(x & y),
            BinaryOp::BitOr => Value::Integer(x | y),
            BinaryOp::BitXor => Value::Integer(x ^ y),
            BinaryOp::Shl => Value::Integer(x.wrapping_shl(*y as u32)),
            BinaryOp::Shr => Value::Integer(x.wrapping_shr(*y as u32)),
            _ => unreachable!("integer_only only handles the bit/mod operators"),
        },
        _ => unsupported(op_name(op), &left, &right),
    }
}

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
    }
}

/// Non-short-circuiting boolean/comparison operators. `&&`/`||` are
/// special-cased by the caller (`eval/mod.rs`) since they must not
/// evaluate their right operand unconditionally.
pub fn compare(op: BoolOp, left: Value, right: Value) -> Value {
    if left.is_sentinel() {
        return left;
    }
    if right.is_sentinel() {
        return right;
    }
    match op {
        BoolOp::Eq => Value::Boolean(loose_eq(&left, &right)),
        BoolOp::NotEq => Value::Boolean(!loose_eq(&left, &right)),
        BoolOp::StrictEq => Value::Boolean(strict_eq(&left, &right)),
        BoolOp::StrictNotEq => Value::Boolean(!strict_eq(&left, &right)),
        BoolOp::Lt | BoolOp::Lte | BoolOp::Gt | BoolOp::Gte => ordered(op, left, right),
        BoolOp::And | BoolOp::Or => {
            unreachable!("&&/|| are short-circuited before reaching compare()")
        }
    }
}

fn ordered(op: BoolOp, left: Value, right: Value) -> Value {
    let (left_tag, right_tag) = (left.type_tag(), right.type_tag());
    match widen(left, right) {
        Some((Numeric::Int(x), Numeric::Int(y))) => Value::Boolean(match op {
            BoolOp::Lt => x < y,
            BoolOp::Lte => x <= y,
            BoolOp::Gt => x > y,
            BoolOp::Gte => x >= y,
            _ => unreachable!(),
        }),
        Some((Numeric::Float(x), Numeric::Float(y))) => Value::Boolean(match op {
            BoolOp::Lt => x < y,
            BoolOp::Lte => x <= y,
            BoolOp::Gt => x > y,
            BoolOp::Gte => x >= y,
            _ => unreachable!(),
        }),
        _ => Value::error(format!(
            "unsupported comparison between {} and {}",
            left_tag, right_tag
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integer_addition_stays_integer() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Integer(1), Value::Integer(2)),
            Value::Integer(3)
        );
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Integer(1), Value::Float(2.5)),
            Value::Float(3.5)
        );
    }

    #[test]
    fn string_concatenation_coerces_other_operand() {
        let result = binary(BinaryOp::Add, Value::new_string("n="), Value::Integer(3));
        assert_eq!(result, Value::new_string("n=3"));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let result = binary(BinaryOp::Div, Value::Integer(1), Value::Integer(0));
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn bitwise_rejects_float_operands() {
        let result = binary(BinaryOp::BitAnd, Value::Float(1.0), Value::Integer(2));
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn loose_eq_normalizes_numeric_types_for_comparison_operator() {
        assert_eq!(
            compare(BoolOp::Eq, Value::Integer(1), Value::Float(1.0)),
            Value::Boolean(true)
        );
    }
}
