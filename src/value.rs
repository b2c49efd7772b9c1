// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The closed set of runtime values the language manipulates.
//!
//! Reference-typed variants share storage through `Rc<RefCell<_>>` so that
//! aliasing a container through multiple bindings is observable, matching
//! the "Shared resources" guarantee in the language specification.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::ast::Node;
use crate::scope::ScopeRef;

pub type ArrayValue = Rc<RefCell<Vec<Value>>>;
pub type MapValue = Rc<RefCell<IndexMap<String, Value>>>;
pub type SetValue = Rc<RefCell<IndexSet<String>>>;

/// A value defined entirely by the interpreter itself, e.g. `print`.
pub type BuiltinFn = fn(
    &mut crate::eval::Evaluator,
    &mut dyn crate::writer::Writer,
    &[Value],
) -> Result<Value, crate::error::EvalError>;

#[derive(Clone)]
pub struct Builtin {
    pub name: String,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.func as usize == other.func as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

/// A user-defined function, a.k.a. a closure once its captured scope
/// outlives the frame it was defined in.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    /// Mutable so the evaluator can apply the copy-on-return policy
    /// (spec.md §3.3) after the fact.
    pub captured_scope: RefCell<ScopeRef>,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub field_order: Vec<String>,
    pub static_fields: IndexMap<String, Value>,
    pub const_fields: std::collections::HashSet<String>,
    pub let_fields: std::collections::HashSet<String>,
    pub let_field_types: std::collections::HashMap<String, &'static str>,
    pub methods: IndexMap<String, Rc<Function>>,
}

pub type StructDefRef = Rc<RefCell<StructDef>>;

#[derive(Debug, Clone, PartialEq)]
pub struct StructInstance {
    pub def: StructDefRef,
    pub fields: IndexMap<String, Value>,
}

pub type StructInstanceRef = Rc<RefCell<StructInstance>>;

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

/// Evaluating expressions results in values.
///
/// Values should be small enough to be cloned without a big performance
/// hit. Anything bigger is stored behind an `Rc`.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Char(char),
    String(Rc<str>),
    Nil,
    Array(ArrayValue),
    List(ArrayValue),
    Tuple(Rc<[Value]>),
    Map(MapValue),
    Set(SetValue),
    /// Inclusive `start..=end`. `start` may be greater than `end`, in which
    /// case the range counts down.
    Range(i64, i64),
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    Package(Rc<Package>),
    Struct(StructDefRef),
    StructInstance(StructInstanceRef),
    Enum(Rc<EnumDef>),
    Error(Rc<String>),

    /// Sentinel: a value wrapped by `return`. Never user-visible.
    ReturnValue(Rc<Value>),
    /// Sentinel: `break`.
    Break,
    /// Sentinel: `continue`.
    Continue,
}

impl Value {
    pub fn new_array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn new_string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into()))
    }

    /// The type tag retrievable for any value, used in error messages and
    /// by the `type_of` builtin.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Boolean(_) => "BOOLEAN",
            Value::Char(_) => "CHAR",
            Value::String(_) => "STRING",
            Value::Nil => "NIL",
            Value::Array(_) => "ARRAY",
            Value::List(_) => "LIST",
            Value::Tuple(_) => "TUPLE",
            Value::Map(_) => "MAP",
            Value::Set(_) => "SET",
            Value::Range(_, _) => "RANGE",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Package(_) => "PACKAGE",
            Value::Struct(_) => "STRUCT",
            Value::StructInstance(_) => "STRUCT_INSTANCE",
            Value::Enum(_) => "ENUM",
            Value::Error(_) => "ERROR",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Break => "BREAK",
            Value::Continue => "CONTINUE",
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Value::ReturnValue(_) | Value::Break | Value::Continue | Value::Error(_)
        )
    }

    pub fn is_truthy_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the value the way it would print, and the way it is collapsed
    /// into a Map/Set key.
    pub fn display_string(&self) -> String {
        format!("{}", self)
    }

    pub fn error(msg: impl Into<String>) -> Value {
        Value::Error(Rc::new(msg.into()))
    }
}

/// `PartialEq` is strict equality (`===`), matching Rust's usual
/// expectation that `==` is an equivalence relation; the language's own
/// loose `==` operator is `loose_eq`, not this impl.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_eq(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => {
                let s = format!("{}", x);
                if s.contains('.') || s.contains('e') || s.contains('E') || s.contains("inf") || s.contains("NaN") {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{}.0", s)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s),
            Value::Nil => write!(f, "nil"),
            Value::Array(items) | Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Set(set) => {
                write!(f, "{{")?;
                for (i, k) in set.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", k)?;
                }
                write!(f, "}}")
            }
            Value::Range(start, end) => write!(f, "{}...{}", start, end),
            Value::Function(fun) => write!(f, "<function {}>", fun.name.as_deref().unwrap_or("anonymous")),
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Package(p) => write!(f, "<package {}>", p.name),
            Value::Struct(s) => write!(f, "<struct {}>", s.borrow().name),
            Value::StructInstance(i) => write!(f, "<{} instance>", i.borrow().def.borrow().name),
            Value::Enum(e) => write!(f, "<enum {}>", e.name),
            Value::Error(msg) => write!(f, "error: {}", msg),
            Value::ReturnValue(v) => write!(f, "{}", v),
            Value::Break => write!(f, "<break>"),
            Value::Continue => write!(f, "<continue>"),
        }
    }
}

/// Loose equality (`==`/`!=`): numerically normalizes Integer/Float instead
/// of comparing stringified renderings, the recommended resolution of the
/// "Equality ambiguity" design note. Every other cross-type comparison is
/// `false`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Integer(x), Value::Float(y)) | (Value::Float(y), Value::Integer(x)) => {
            *x as f64 == *y
        }
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Tuple(x), Value::Tuple(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Array(x), Value::Array(y))
        | (Value::List(x), Value::List(y))
        | (Value::Array(x), Value::List(y))
        | (Value::List(x), Value::Array(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Range(sx, ex), Value::Range(sy, ey)) => sx == sy && ex == ey,
        _ => strict_eq(a, b),
    }
}

/// Strict equality (`===`/`!==`): same tag and same payload, falling back
/// to reference identity for reference-typed values.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Range(sx, ex), Value::Range(sy, ey)) => sx == sy && ex == ey,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Tuple(x), Value::Tuple(y)) => Rc::ptr_eq(x, y),
        (Value::Map(x), Value::Map(y)) => Rc::ptr_eq(x, y),
        (Value::Set(x), Value::Set(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => Rc::ptr_eq(x, y),
        (Value::Package(x), Value::Package(y)) => Rc::ptr_eq(x, y),
        (Value::Struct(x), Value::Struct(y)) => Rc::ptr_eq(x, y),
        (Value::StructInstance(x), Value::StructInstance(y)) => Rc::ptr_eq(x, y),
        (Value::Enum(x), Value::Enum(y)) => Rc::ptr_eq(x, y),
        (Value::Error(x), Value::Error(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loose_eq_normalizes_integer_float() {
        assert!(loose_eq(&Value::Integer(1), &Value::Float(1.0)));
        assert!(!loose_eq(&Value::Integer(1), &Value::Float(1.5)));
    }

    #[test]
    fn strict_eq_rejects_cross_type() {
        assert!(!strict_eq(&Value::Integer(1), &Value::Float(1.0)));
    }

    #[test]
    fn strict_eq_is_reference_identity_for_containers() {
        let a = Value::new_array(vec![Value::Integer(1)]);
        let b = Value::new_array(vec![Value::Integer(1)]);
        assert!(!strict_eq(&a, &b));
        assert!(loose_eq(&a, &b));
        let c = a.clone();
        assert!(strict_eq(&a, &c));
    }

    #[test]
    fn float_display_keeps_trailing_zero() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
    }
}
