// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The three function-call paths of `spec.md` §4.6: dotted package/method
//! calls, plain builtin calls, and user-defined function calls -- plus the
//! `invoke_function` helper they (and `new T(...)` in `eval::decl`) all
//! bottom out in.

use std::rc::Rc;

use crate::ast::{Node, NodeKind};
use crate::eval::members::resolve_member;
use crate::eval::Evaluator;
use crate::scope::{Scope, ScopeRef};
use crate::value::{Function, Value};
use crate::writer::Writer;

impl Evaluator {
    pub(crate) fn eval_call(
        &mut self,
        function: &Node,
        arg_nodes: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        if let NodeKind::Dot { left, right } = &function.kind {
            return self.eval_dotted_call(left, right, arg_nodes, scope, writer);
        }

        // Path 2 of §4.6: a bare name not bound in scope falls back to the
        // builtin registry before being reported as unresolved.
        if let NodeKind::Identifier(name) = &function.kind {
            if scope.borrow().look_up(name).is_none() {
                return match self.registry.look_up(name) {
                    Some(builtin) => self.invoke(builtin, arg_nodes, scope, writer, None),
                    None => Value::error(format!("identifier not found: {}", name)),
                };
            }
        }

        let callee = self.eval(function, scope, writer);
        if callee.is_sentinel() {
            return callee;
        }
        self.invoke(callee, arg_nodes, scope, writer, None)
    }

    /// Path 1 of §4.6: `a.b(args)` as a call-expression. `a` resolves to
    /// either a `Package` (invoke its registered function) or a
    /// `StructInstance` (method dispatch); anything else is an error.
    fn eval_dotted_call(
        &mut self,
        left: &Node,
        right: &str,
        arg_nodes: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let owner = self.eval(left, scope, writer);
        if owner.is_sentinel() {
            return owner;
        }
        match &owner {
            Value::Package(pkg) => match pkg.members.get(right) {
                Some(member) => self.invoke(member.clone(), arg_nodes, scope, writer, None),
                None => Value::error(format!("unknown member {} in package {}", right, pkg.name)),
            },
            Value::StructInstance(_) => {
                let method = resolve_member(&owner, right);
                if method.is_sentinel() {
                    return method;
                }
                self.invoke(method, arg_nodes, scope, writer, Some(owner))
            }
            other => Value::error(format!("{} is not callable", other.type_tag())),
        }
    }

    /// Paths 2 and 3 of §4.6: evaluate `arg_nodes` left-to-right, then
    /// dispatch on the callee's tag. `this` is pre-bound for method calls;
    /// `None` for plain builtin/function calls.
    pub(crate) fn invoke(
        &mut self,
        callee: Value,
        arg_nodes: &[Node],
        scope: &ScopeRef,
        writer: &mut dyn Writer,
        this: Option<Value>,
    ) -> Value {
        let mut args = Vec::with_capacity(arg_nodes.len());
        for node in arg_nodes {
            let v = self.eval(node, scope, writer);
            if v.is_sentinel() {
                return v;
            }
            args.push(v);
        }
        self.apply(callee, args, writer, this)
    }

    /// Dispatch an already-evaluated callee over an already-evaluated
    /// argument vector. Used directly by `invoke` above and by `new T(..)`
    /// in `eval::decl`, which evaluates constructor arguments itself.
    pub(crate) fn apply(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        writer: &mut dyn Writer,
        this: Option<Value>,
    ) -> Value {
        match callee {
            Value::Builtin(b) => match (b.func)(self, writer, &args) {
                Ok(v) => v,
                Err(e) => Value::error(e.to_string()),
            },
            Value::Function(f) => self.invoke_function(&f, args, this, writer),
            other => Value::error(format!("{} is not callable", other.type_tag())),
        }
    }

    /// Call a user-defined `Function`/method: arity check, fresh call-site
    /// scope parented at the captured scope, parameter binding, body
    /// evaluation, `ReturnValue` unwrapping, and the copy-on-return
    /// closure policy (`spec.md` §3.3, §4.6). A method's instance is bound
    /// under both `this` and `self` (`spec.md` §1/§3.2/§4.4).
    pub(crate) fn invoke_function(
        &mut self,
        f: &Rc<Function>,
        args: Vec<Value>,
        this: Option<Value>,
        writer: &mut dyn Writer,
    ) -> Value {
        if args.len() != f.params.len() {
            return Value::error(format!(
                "wrong number of arguments: expected {}, got {}",
                f.params.len(),
                args.len()
            ));
        }

        let captured = f.captured_scope.borrow().clone();
        let call_scope = Scope::nested(captured);
        if let Some(this_value) = this {
            call_scope.borrow_mut().bind("this".to_owned(), this_value.clone());
            call_scope.borrow_mut().bind("self".to_owned(), this_value);
        }
        for (param, value) in f.params.iter().zip(args.into_iter()) {
            call_scope.borrow_mut().bind(param.clone(), value);
        }

        let result = match self.eval(&f.body, &call_scope, writer) {
            Value::ReturnValue(v) => (*v).clone(),
            // `break`/`continue` reaching a function boundary have no loop
            // left to catch them; treat them (and a plain Error) as the
            // call's result so the caller sees the failure.
            other => other,
        };
        if matches!(result, Value::Break | Value::Continue | Value::Error(_)) {
            return result;
        }

        // Copy-on-return (`spec.md` §3.3, §4.6): if the call-site scope
        // contains more bindings than the returned function's captured
        // scope currently does, overwrite that captured scope with a copy
        // of the call-site scope, so the closure can still resolve names
        // added to this frame after it's gone.
        if let Value::Function(returned) = &result {
            let call_site_count = call_scope.borrow().binding_count();
            let captured_count = {
                let captured_ref = returned.captured_scope.borrow();
                captured_ref.borrow().binding_count()
            };
            if call_site_count > captured_count {
                *returned.captured_scope.borrow_mut() = call_scope.borrow().copy().into_ref();
            }
        }

        result
    }
}

#[cfg(test)]
mod test {
    use crate::parser::Parser;
    use crate::value::Value;
    use crate::writer::CollectingWriter;
    use crate::Evaluator;

    fn run(src: &str) -> Value {
        let mut eval = Evaluator::new();
        let mut writer = CollectingWriter::new();
        let program = Parser::parse_program(src).expect("parse error");
        eval.eval_program(&program, &mut writer)
    }

    #[test]
    fn methods_see_the_instance_under_both_this_and_self() {
        let result = run(
            "struct P { var x = 0; func set(v) { self.x = v; } func get() { return this.x; } } \
             var p = new P(); p.set(9); p.get()",
        );
        assert_eq!(result, Value::Integer(9));
    }

    #[test]
    fn bare_builtin_call_falls_back_to_the_registry() {
        let result = run("len([1, 2, 3])");
        assert_eq!(result, Value::Integer(3));
    }
}
