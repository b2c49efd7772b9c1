// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The tree-walking evaluator (`spec.md` §4). `Evaluator::eval` is the
//! single recursive dispatch every node passes through; the heavier
//! families of node are split out into sibling modules the way the
//! teacher split `lang::interpreter` into topic files:
//!
//! - [`ops`] -- unary/binary/boolean operator semantics
//! - [`members`] -- member access, indexing, slicing
//! - [`call`] -- the three function-call paths and `invoke_function`
//! - [`decl`] -- declarations, assignment, struct/enum/`new`/`import`
//! - [`control`] -- `if`/`for`/`while`/`foreach`/`switch`

pub(crate) mod call;
pub(crate) mod control;
pub(crate) mod decl;
pub(crate) mod members;
pub(crate) mod ops;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::ast::{Node, NodeKind};
use crate::builtins::Registry;
use crate::scope::{Scope, ScopeRef};
use crate::value::StructDefRef;
use crate::value::Value;
use crate::writer::Writer;

/// Holds the two pieces of state that live for the whole run of a
/// program: the struct type table (`new T()` looks types up by name
/// here, not through the scope chain) and the builtin package registry.
pub struct Evaluator {
    pub(crate) types: HashMap<String, StructDefRef>,
    pub(crate) registry: Registry,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            registry: Registry::new(),
        }
    }

    /// Evaluate a whole program: create the global scope, run the root
    /// block, and unwrap a trailing `return` at the top level (a `return`
    /// outside any function just ends the program with that value).
    pub fn eval_program(&mut self, program: &Node, writer: &mut dyn Writer) -> Value {
        let global = Scope::new().into_ref();
        let result = self.eval(program, &global, writer);
        match result {
            Value::ReturnValue(v) => (*v).clone(),
            other => other,
        }
    }

    pub(crate) fn eval(&mut self, node: &Node, scope: &ScopeRef, writer: &mut dyn Writer) -> Value {
        match &node.kind {
            NodeKind::Root(stmts) => self.eval_block(stmts, scope, writer),
            NodeKind::Block(stmts) => self.eval_block(stmts, scope, writer),

            NodeKind::Integer(i) => Value::Integer(*i),
            NodeKind::Float(f) => Value::Float(*f),
            NodeKind::Str(s) => Value::new_string(s.clone()),
            NodeKind::Char(c) => Value::Char(*c),
            NodeKind::Boolean(b) => Value::Boolean(*b),
            NodeKind::Nil => Value::Nil,

            NodeKind::Identifier(name) => scope
                .borrow()
                .look_up(name)
                .unwrap_or_else(|| Value::error(format!("identifier not found: {}", name))),

            NodeKind::Unary { op, right } => {
                let r = self.eval(right, scope, writer);
                ops::unary(*op, r)
            }
            NodeKind::Binary { op, left, right } => {
                let l = self.eval(left, scope, writer);
                if l.is_sentinel() {
                    return l;
                }
                let r = self.eval(right, scope, writer);
                ops::binary(*op, l, r)
            }
            NodeKind::Bool { op, left, right } => self.eval_bool(*op, left, right, scope, writer),
            NodeKind::Parenthesized(inner) => self.eval(inner, scope, writer),

            NodeKind::If {
                condition,
                consequence,
                alternative,
            } => self.eval_if(
                condition,
                consequence,
                alternative.as_deref(),
                scope,
                writer,
            ),

            NodeKind::Declarative {
                keyword,
                name,
                value,
            } => self.eval_declarative(*keyword, name, value, scope, writer),

            NodeKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval(e, scope, writer),
                    None => Value::Nil,
                };
                if value.is_sentinel() {
                    return value;
                }
                Value::ReturnValue(Rc::new(value))
            }

            NodeKind::FunctionStatement { name, params, body } => {
                let function = Rc::new(crate::value::Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new((**body).clone()),
                    captured_scope: RefCell::new(scope.clone()),
                });
                let value = Value::Function(function);
                if let Some(name) = name {
                    if scope.borrow().defined_here(name) {
                        return Value::error(format!("{} is already declared in this scope", name));
                    }
                    scope.borrow_mut().bind(name.clone(), value.clone());
                }
                value
            }

            NodeKind::Call { function, args } => self.eval_call(function, args, scope, writer),

            NodeKind::Assignment { target, op, value } => {
                self.eval_assignment(target, *op, value, scope, writer)
            }

            NodeKind::ForLoop {
                init,
                condition,
                update,
                body,
            } => self.eval_for(
                init.as_deref(),
                condition.as_deref(),
                update.as_deref(),
                body,
                scope,
                writer,
            ),
            NodeKind::WhileLoop { conditions, body } => {
                self.eval_while(conditions, body, scope, writer)
            }
            NodeKind::ForeachLoop {
                iterator,
                iterable,
                body,
            } => self.eval_foreach(iterator, iterable, body, scope, writer),

            NodeKind::ArrayLit(elems) => {
                let items = self.eval_list(elems, scope, writer);
                match items {
                    Ok(items) => Value::new_array(items),
                    Err(sentinel) => sentinel,
                }
            }
            NodeKind::ListLit(elems) => {
                let items = self.eval_list(elems, scope, writer);
                match items {
                    Ok(items) => Value::new_list(items),
                    Err(sentinel) => sentinel,
                }
            }
            NodeKind::TupleLit(elems) => {
                let items = self.eval_list(elems, scope, writer);
                match items {
                    Ok(items) => Value::Tuple(Rc::from(items)),
                    Err(sentinel) => sentinel,
                }
            }
            NodeKind::SetLit(elems) => {
                let items = self.eval_list(elems, scope, writer);
                match items {
                    Ok(items) => {
                        let mut set = IndexSet::new();
                        for item in items {
                            set.insert(item.display_string());
                        }
                        Value::Set(Rc::new(RefCell::new(set)))
                    }
                    Err(sentinel) => sentinel,
                }
            }
            NodeKind::MapLit { keys, values } => {
                let mut map = IndexMap::new();
                for (k, v) in keys.iter().zip(values.iter()) {
                    let key = self.eval(k, scope, writer);
                    if key.is_sentinel() {
                        return key;
                    }
                    let value = self.eval(v, scope, writer);
                    if value.is_sentinel() {
                        return value;
                    }
                    map.insert(key.display_string(), value);
                }
                Value::Map(Rc::new(RefCell::new(map)))
            }

            NodeKind::Index { left, index } => {
                let owner = self.eval(left, scope, writer);
                if owner.is_sentinel() {
                    return owner;
                }
                let idx = self.eval(index, scope, writer);
                members::index(owner, idx)
            }
            NodeKind::Slice { left, start, end } => {
                let owner = self.eval(left, scope, writer);
                if owner.is_sentinel() {
                    return owner;
                }
                let start = match start {
                    Some(n) => Some(self.eval(n, scope, writer)),
                    None => None,
                };
                if let Some(s) = &start {
                    if s.is_sentinel() {
                        return s.clone();
                    }
                }
                let end = match end {
                    Some(n) => Some(self.eval(n, scope, writer)),
                    None => None,
                };
                if let Some(e) = &end {
                    if e.is_sentinel() {
                        return e.clone();
                    }
                }
                members::slice(owner, start, end)
            }
            NodeKind::RangeLit { start, end } => {
                let s = self.eval(start, scope, writer);
                if s.is_sentinel() {
                    return s;
                }
                let e = self.eval(end, scope, writer);
                if e.is_sentinel() {
                    return e;
                }
                match (s, e) {
                    (Value::Integer(s), Value::Integer(e)) => Value::Range(s, e),
                    (s, e) => Value::error(format!(
                        "range bounds must be INTEGER, got {} and {}",
                        s.type_tag(),
                        e.type_tag()
                    )),
                }
            }

            NodeKind::StructDeclaration {
                name,
                fields,
                methods,
            } => self.eval_struct_declaration(name, fields, methods, scope, writer),
            NodeKind::NewCallExpression { type_name, args } => {
                self.eval_new(type_name, args, scope, writer)
            }

            NodeKind::Break => Value::Break,
            NodeKind::Continue => Value::Continue,

            NodeKind::Import { name, alias } => self.eval_import(name, alias.as_deref(), scope),

            NodeKind::EnumDeclaration { name, members } => {
                self.eval_enum_declaration(name, members, scope, writer)
            }
            NodeKind::EnumAccess { enum_name, member } => {
                let owner = scope
                    .borrow()
                    .look_up(enum_name)
                    .unwrap_or_else(|| Value::error(format!("identifier not found: {}", enum_name)));
                if owner.is_sentinel() {
                    return owner;
                }
                members::resolve_member(&owner, member)
            }

            NodeKind::Switch {
                scrutinee,
                cases,
                default,
            } => self.eval_switch(scrutinee, cases, default.as_deref(), scope, writer),

            NodeKind::Dot { left, right } => {
                let owner = self.eval(left, scope, writer);
                if owner.is_sentinel() {
                    return owner;
                }
                members::resolve_member(&owner, right)
            }
        }
    }

    /// A sequence of statements: evaluate each in order, short-circuiting
    /// on the first sentinel (`return`/`break`/`continue`/error), and
    /// otherwise producing the value of the last statement (`spec.md`
    /// §4.1's "a block evaluates to the value of its last statement").
    fn eval_block(&mut self, stmts: &[Node], scope: &ScopeRef, writer: &mut dyn Writer) -> Value {
        let mut result = Value::Nil;
        for stmt in stmts {
            result = self.eval(stmt, scope, writer);
            if result.is_sentinel() {
                return result;
            }
        }
        result
    }

    fn eval_list(
        &mut self,
        elems: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Result<Vec<Value>, Value> {
        let mut items = Vec::with_capacity(elems.len());
        for elem in elems {
            let v = self.eval(elem, scope, writer);
            if v.is_sentinel() {
                return Err(v);
            }
            items.push(v);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::writer::CollectingWriter;

    fn run(src: &str) -> Value {
        let mut eval = Evaluator::new();
        let mut writer = CollectingWriter::new();
        let program = Parser::parse_program(src).expect("parse error");
        eval.eval_program(&program, &mut writer)
    }

    #[test]
    fn arithmetic_and_variables() {
        assert_eq!(run("var x = 1 + 2 * 3; x"), Value::Integer(7));
    }

    #[test]
    fn closure_counter_keeps_private_state() {
        let result = run(
            "func makeCounter() { var n = 0; func inc() { n = n + 1; return n; } return inc; } \
             var counter = makeCounter(); counter(); counter(); counter()",
        );
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn enum_values_support_arithmetic() {
        let result = run("enum Direction { North, East, South, West } Direction.South + 1");
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn method_with_this_mutates_instance_field() {
        let result = run(
            "struct P { var x = 0; func set(v) { this.x = v; } func get() { return this.x; } } \
             var p = new P(); p.set(42); p.get()",
        );
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn negative_slice_end_excludes_last_element() {
        let result = run("var a = [1, 2, 3, 4, 5]; a[1:-1]");
        match result {
            Value::Array(items) => assert_eq!(
                &*items.borrow(),
                &vec![Value::Integer(2), Value::Integer(3), Value::Integer(4)]
            ),
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn redeclaring_a_name_in_the_same_scope_is_an_error() {
        let result = run("var x = 1; var x = 2;");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn assigning_to_a_const_is_an_error() {
        let result = run("const PI = 3; PI = 4;");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn let_type_mismatch_on_reassignment_is_an_error() {
        let result = run("let n = 1; n = \"oops\";");
        assert!(matches!(result, Value::Error(_)));
    }
}
