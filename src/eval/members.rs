// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Member access, indexing, and slicing (`spec.md` §4.4). `resolve_member`
//! is the single routine both the binary-DOT expression path and the
//! call-expression path go through, per the "Duplicate member-access
//! paths" design note -- there is exactly one place that knows how a dot
//! resolves against each value tag.

use crate::value::Value;

/// Resolve `owner.name` as a non-call expression: field read, static
/// field read, package member lookup, or enum member lookup. Method
/// *calls* (`owner.name(args)`) are handled separately in `eval::call`,
/// which uses this function to get at the method `Function` value before
/// invoking it.
pub fn resolve_member(owner: &Value, name: &str) -> Value {
    match owner {
        Value::StructInstance(inst) => {
            let inst = inst.borrow();
            if let Some(v) = inst.fields.get(name) {
                return v.clone();
            }
            let def = inst.def.borrow();
            if let Some(v) = def.static_fields.get(name) {
                return v.clone();
            }
            if let Some(method) = def.methods.get(name) {
                return Value::Function(method.clone());
            }
            Value::error(format!("unknown field or method {} on {}", name, def.name))
        }
        Value::Struct(def) => {
            let def = def.borrow();
            def.static_fields
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::error(format!("unknown field {} on struct {}", name, def.name)))
        }
        Value::Package(pkg) => pkg
            .members
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::error(format!("unknown member {} in package {}", name, pkg.name))),
        Value::Enum(e) => e
            .members
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::error(format!("unknown member {} in enum {}", name, e.name))),
        other => Value::error(format!("{} has no member {}", other.type_tag(), name)),
    }
}

/// Resolve a non-negative, bounds-checked index (with Python-style
/// negative wraparound) against a sequence of the given length. Returns
/// `None` if the index is out of bounds after wraparound.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        index + len as i64
    } else {
        index
    };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

pub fn index(owner: Value, idx: Value) -> Value {
    if owner.is_sentinel() {
        return owner;
    }
    if idx.is_sentinel() {
        return idx;
    }
    match &owner {
        Value::Array(items) | Value::List(items) => {
            let i = match idx {
                Value::Integer(i) => i,
                other => return Value::error(format!("index must be an INTEGER, got {}", other.type_tag())),
            };
            let items = items.borrow();
            match resolve_index(i, items.len()) {
                Some(pos) => items[pos].clone(),
                None => Value::error(format!("index out of bounds: index {}, length {}", i, items.len())),
            }
        }
        Value::Tuple(items) => {
            let i = match idx {
                Value::Integer(i) => i,
                other => return Value::error(format!("index must be an INTEGER, got {}", other.type_tag())),
            };
            match resolve_index(i, items.len()) {
                Some(pos) => items[pos].clone(),
                None => Value::error(format!("index out of bounds: index {}, length {}", i, items.len())),
            }
        }
        Value::Map(map) => {
            let key = idx.display_string();
            map.borrow().get(&key).cloned().unwrap_or(Value::Nil)
        }
        Value::Range(start, end) => {
            let i = match idx {
                Value::Integer(i) => i,
                other => return Value::error(format!("index must be an INTEGER, got {}", other.type_tag())),
            };
            let len = (end - start).unsigned_abs() as i64 + 1;
            match resolve_index(i, len as usize) {
                Some(pos) => {
                    let step: i64 = if end >= start { 1 } else { -1 };
                    Value::Integer(start + step * pos as i64)
                }
                None => Value::error(format!("index out of bounds: index {}, length {}", i, len)),
            }
        }
        other => Value::error(format!("{} is not indexable", other.type_tag())),
    }
}

fn clamp_bound(raw: i64, len: usize) -> usize {
    let resolved = if raw < 0 { raw + len as i64 } else { raw };
    resolved.clamp(0, len as i64) as usize
}

/// Always returns an `Array`, even when `owner` was a `List` or `Tuple`
/// (`spec.md` §4.4).
pub fn slice(owner: Value, start: Option<Value>, end: Option<Value>) -> Value {
    if owner.is_sentinel() {
        return owner;
    }
    let items: Vec<Value> = match &owner {
        Value::Array(items) | Value::List(items) => items.borrow().clone(),
        Value::Tuple(items) => items.to_vec(),
        other => return Value::error(format!("{} is not sliceable", other.type_tag())),
    };

    let len = items.len();
    let start_idx = match start {
        None => 0,
        Some(Value::Integer(i)) => clamp_bound(i, len),
        Some(other) => {
            return Value::error(format!(
                "slice bound must be an INTEGER, got {}",
                other.type_tag()
            ))
        }
    };
    let end_idx = match end {
        None => len,
        Some(Value::Integer(i)) => clamp_bound(i, len),
        Some(other) => {
            return Value::error(format!(
                "slice bound must be an INTEGER, got {}",
                other.type_tag()
            ))
        }
    };

    if start_idx >= end_idx {
        Value::new_array(Vec::new())
    } else {
        Value::new_array(items[start_idx..end_idx].to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn negative_index_counts_from_the_end() {
        let arr = Value::new_array(vec![
            Value::Integer(10),
            Value::Integer(20),
            Value::Integer(30),
        ]);
        assert_eq!(index(arr, Value::Integer(-1)), Value::Integer(30));
    }

    #[test]
    fn index_out_of_bounds_is_an_error() {
        let arr = Value::new_array(vec![Value::Integer(1)]);
        assert!(matches!(index(arr, Value::Integer(5)), Value::Error(_)));
    }

    #[test]
    fn slice_clamps_and_always_returns_an_array() {
        let arr = Value::new_array(vec![
            Value::Integer(10),
            Value::Integer(20),
            Value::Integer(30),
            Value::Integer(40),
            Value::Integer(50),
        ]);
        let result = slice(arr, Some(Value::Integer(1)), Some(Value::Integer(-1)));
        match result {
            Value::Array(items) => {
                let items = items.borrow();
                assert_eq!(
                    &*items,
                    &vec![Value::Integer(20), Value::Integer(30), Value::Integer(40)]
                );
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn slice_out_of_range_bounds_never_errors() {
        let arr = Value::new_array(vec![Value::Integer(1), Value::Integer(2)]);
        let result = slice(arr, Some(Value::Integer(-100)), Some(Value::Integer(100)));
        match result {
            Value::Array(items) => assert_eq!(items.borrow().len(), 2),
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn map_index_missing_key_yields_nil() {
        let map = Value::Map(std::rc::Rc::new(std::cell::RefCell::new(indexmap::IndexMap::new())));
        assert_eq!(index(map, Value::new_string("missing")), Value::Nil);
    }
}
