// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Declarations, assignment targets, struct/enum declaration, `new`, and
//! `import` (`spec.md` §4.2, §4.7).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{AssignOp, DeclKeyword, EnumMember, FieldDecl, Node, NodeKind};
use crate::eval::Evaluator;
use crate::scope::ScopeRef;
use crate::value::{EnumDef, Function, StructDef, StructInstance, Value};
use crate::writer::Writer;

impl Evaluator {
    pub(crate) fn eval_declarative(
        &mut self,
        keyword: DeclKeyword,
        name: &str,
        value_node: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let value = self.eval(value_node, scope, writer);
        if value.is_sentinel() {
            return value;
        }
        if scope.borrow().defined_here(name) {
            return Value::error(format!("{} is already declared in this scope", name));
        }
        scope.borrow_mut().bind(name.to_owned(), value.clone());
        match keyword {
            DeclKeyword::Var => {}
            DeclKeyword::Const => scope.borrow_mut().mark_const(name),
            DeclKeyword::Let => scope.borrow_mut().mark_let(name, value.type_tag()),
        }
        value
    }

    pub(crate) fn eval_assignment(
        &mut self,
        target: &Node,
        op: AssignOp,
        value_node: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let rhs = self.eval(value_node, scope, writer);
        if rhs.is_sentinel() {
            return rhs;
        }

        let final_value = match op.as_binary_op() {
            None => rhs,
            Some(binary_op) => {
                let current = self.eval(target, scope, writer);
                if current.is_sentinel() {
                    return current;
                }
                crate::eval::ops::binary(binary_op, current, rhs)
            }
        };
        if final_value.is_sentinel() {
            return final_value;
        }

        self.assign_to_target(target, final_value, scope, writer)
    }

    fn assign_to_target(
        &mut self,
        target: &Node,
        value: Value,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        match &target.kind {
            NodeKind::Identifier(name) => self.assign_identifier(name, value, scope),
            NodeKind::Index { left, index } => self.assign_index(left, index, value, scope, writer),
            NodeKind::Dot { left, right } => self.assign_dot(left, right, value, scope, writer),
            other => Value::error(format!("{:?} is not a valid assignment target", other)),
        }
    }

    fn assign_identifier(&mut self, name: &str, value: Value, scope: &ScopeRef) -> Value {
        if scope.borrow().is_constant(name) {
            return Value::error(format!("cannot assign to constant {}", name));
        }
        if scope.borrow().is_let_variable(name) {
            let expected = scope.borrow().get_let_type(name).unwrap_or("");
            if value.type_tag() != expected {
                return Value::error(format!(
                    "cannot assign {} to {}, which was declared as {}",
                    value.type_tag(),
                    name,
                    expected
                ));
            }
        }
        if scope.borrow_mut().assign(name, value).is_err() {
            return Value::error(format!("identifier not found: {}", name));
        }
        scope.borrow().look_up(name).unwrap_or(Value::Nil)
    }

    fn assign_index(
        &mut self,
        left: &Node,
        index_node: &Node,
        value: Value,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let container = self.eval(left, scope, writer);
        if container.is_sentinel() {
            return container;
        }
        let idx = self.eval(index_node, scope, writer);
        if idx.is_sentinel() {
            return idx;
        }
        match &container {
            Value::Array(items) | Value::List(items) => {
                let i = match idx {
                    Value::Integer(i) => i,
                    other => {
                        return Value::error(format!(
                            "index must be an INTEGER, got {}",
                            other.type_tag()
                        ))
                    }
                };
                let mut items = items.borrow_mut();
                let len = items.len();
                let resolved = if i < 0 { i + len as i64 } else { i };
                if resolved < 0 || resolved as usize >= len {
                    return Value::error(format!("index out of bounds: index {}, length {}", i, len));
                }
                items[resolved as usize] = value.clone();
                value
            }
            Value::Map(map) => {
                let key = idx.display_string();
                map.borrow_mut().insert(key, value.clone());
                value
            }
            other => Value::error(format!("cannot assign into {}", other.type_tag())),
        }
    }

    fn assign_dot(
        &mut self,
        left: &Node,
        right: &str,
        value: Value,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let owner = self.eval(left, scope, writer);
        if owner.is_sentinel() {
            return owner;
        }
        match &owner {
            Value::Struct(def) => {
                let mut def = def.borrow_mut();
                if def.const_fields.contains(right) {
                    return Value::error(format!("cannot assign to constant {}", right));
                }
                if let Some(expected) = def.let_field_types.get(right) {
                    if value.type_tag() != *expected {
                        return Value::error(format!(
                            "cannot assign {} to {}, which was declared as {}",
                            value.type_tag(),
                            right,
                            expected
                        ));
                    }
                }
                def.static_fields.insert(right.to_owned(), value.clone());
                value
            }
            Value::StructInstance(inst) => {
                inst.borrow_mut().fields.insert(right.to_owned(), value.clone());
                value
            }
            other => Value::error(format!("{} has no assignable member {}", other.type_tag(), right)),
        }
    }

    pub(crate) fn eval_struct_declaration(
        &mut self,
        name: &str,
        fields: &[FieldDecl],
        methods: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let mut static_fields = IndexMap::new();
        let mut field_order = Vec::new();
        let mut const_fields = HashSet::new();
        let mut let_fields = HashSet::new();
        let mut let_field_types = HashMap::new();

        for field in fields {
            let value = self.eval(&field.value, scope, writer);
            if value.is_sentinel() {
                return value;
            }
            match field.keyword {
                DeclKeyword::Var => {}
                DeclKeyword::Const => {
                    const_fields.insert(field.name.clone());
                }
                DeclKeyword::Let => {
                    let_fields.insert(field.name.clone());
                    let_field_types.insert(field.name.clone(), value.type_tag());
                }
            }
            field_order.push(field.name.clone());
            static_fields.insert(field.name.clone(), value);
        }

        let mut method_map = IndexMap::new();
        for method_node in methods {
            if let NodeKind::FunctionStatement {
                name: method_name,
                params,
                body,
            } = &method_node.kind
            {
                let method_name = method_name.clone().unwrap_or_default();
                if method_map.contains_key(&method_name) {
                    return Value::error(format!("duplicate method {} on struct {}", method_name, name));
                }
                method_map.insert(
                    method_name.clone(),
                    Rc::new(Function {
                        name: Some(method_name),
                        params: params.clone(),
                        body: Rc::new((**body).clone()),
                        captured_scope: RefCell::new(scope.clone()),
                    }),
                );
            }
        }

        let def = Rc::new(RefCell::new(StructDef {
            name: name.to_owned(),
            field_order,
            static_fields,
            const_fields,
            let_fields,
            let_field_types,
            methods: method_map,
        }));
        self.types.insert(name.to_owned(), def.clone());
        let value = Value::Struct(def);
        if scope.borrow().defined_here(name) {
            return Value::error(format!("{} is already declared in this scope", name));
        }
        scope.borrow_mut().bind(name.to_owned(), value.clone());
        value
    }

    pub(crate) fn eval_new(
        &mut self,
        type_name: &str,
        arg_nodes: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let def = match self.types.get(type_name) {
            Some(def) => def.clone(),
            None => return Value::error(format!("unknown type {}", type_name)),
        };

        let fields = def.borrow().static_fields.clone();
        let instance = Rc::new(RefCell::new(StructInstance {
            def: def.clone(),
            fields,
        }));

        let init = def.borrow().methods.get("init").cloned();
        if let Some(init_fn) = init {
            let mut args = Vec::with_capacity(arg_nodes.len());
            for node in arg_nodes {
                let v = self.eval(node, scope, writer);
                if v.is_sentinel() {
                    return v;
                }
                args.push(v);
            }
            let result = self.invoke_function(
                &init_fn,
                args,
                Some(Value::StructInstance(instance.clone())),
                writer,
            );
            if matches!(result, Value::Error(_)) {
                return result;
            }
        }

        Value::StructInstance(instance)
    }

    pub(crate) fn eval_enum_declaration(
        &mut self,
        name: &str,
        members: &[EnumMember],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let mut map = IndexMap::new();
        for member in members {
            let value = self.eval(&member.value, scope, writer);
            if value.is_sentinel() {
                return value;
            }
            map.insert(member.name.clone(), value);
        }
        let value = Value::Enum(Rc::new(EnumDef {
            name: name.to_owned(),
            members: map,
        }));
        if scope.borrow().defined_here(name) {
            return Value::error(format!("{} is already declared in this scope", name));
        }
        scope.borrow_mut().bind(name.to_owned(), value.clone());
        value
    }

    pub(crate) fn eval_import(&mut self, name: &str, alias: Option<&str>, scope: &ScopeRef) -> Value {
        let value = match self.registry.look_up(name) {
            Some(v) => v,
            None => return Value::error(format!("identifier not found: {}", name)),
        };
        let bound_name = alias.unwrap_or(name);
        scope.borrow_mut().bind(bound_name.to_owned(), value.clone());
        value
    }
}
