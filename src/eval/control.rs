// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! `if`, `for`, `while`, `foreach`, `switch` (`spec.md` §4.5). Only the
//! five constructs `spec.md` §3.2 actually names as scope-creating --
//! function call, loop, loop iteration, constructor call, method call --
//! push a fresh `Scope`; plain `if`/`switch` bodies run in the scope
//! they're found in.

use crate::ast::{BoolOp, Node, SwitchCase};
use crate::eval::Evaluator;
use crate::scope::{Scope, ScopeRef};
use crate::value::{loose_eq, Value};
use crate::writer::Writer;

impl Evaluator {
    pub(crate) fn eval_if(
        &mut self,
        condition: &Node,
        consequence: &Node,
        alternative: Option<&Node>,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let cond = self.eval(condition, scope, writer);
        if cond.is_sentinel() {
            return cond;
        }
        match cond {
            Value::Boolean(true) => self.eval(consequence, scope, writer),
            Value::Boolean(false) => match alternative {
                Some(alt) => self.eval(alt, scope, writer),
                None => Value::Nil,
            },
            other => Value::error(format!(
                "condition did not evaluate to a boolean, got {}",
                other.type_tag()
            )),
        }
    }

    pub(crate) fn eval_for(
        &mut self,
        init: Option<&Node>,
        condition: Option<&Node>,
        update: Option<&Node>,
        body: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let loop_scope = Scope::nested(scope.clone());
        if let Some(init) = init {
            let v = self.eval(init, &loop_scope, writer);
            if v.is_sentinel() {
                return v;
            }
        }

        let mut result = Value::Nil;
        loop {
            if let Some(condition) = condition {
                let cond = self.eval(condition, &loop_scope, writer);
                if cond.is_sentinel() {
                    return cond;
                }
                match cond {
                    Value::Boolean(true) => {}
                    Value::Boolean(false) => break,
                    other => {
                        return Value::error(format!(
                            "condition did not evaluate to a boolean, got {}",
                            other.type_tag()
                        ))
                    }
                }
            }

            let iteration_scope = Scope::nested(loop_scope.clone());
            let body_result = self.eval(body, &iteration_scope, writer);
            match body_result {
                Value::Break => return Value::Nil,
                Value::Continue => {}
                Value::ReturnValue(_) | Value::Error(_) => return body_result,
                other => result = other,
            }

            if let Some(update) = update {
                let v = self.eval(update, &loop_scope, writer);
                if v.is_sentinel() {
                    return v;
                }
            }
        }
        result
    }

    pub(crate) fn eval_while(
        &mut self,
        conditions: &[Node],
        body: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let loop_scope = Scope::nested(scope.clone());
        let mut result = Value::Nil;

        'outer: loop {
            for condition in conditions {
                let cond = self.eval(condition, &loop_scope, writer);
                if cond.is_sentinel() {
                    return cond;
                }
                match cond {
                    Value::Boolean(true) => {}
                    Value::Boolean(false) => break 'outer,
                    other => {
                        return Value::error(format!(
                            "condition did not evaluate to a boolean, got {}",
                            other.type_tag()
                        ))
                    }
                }
            }

            let iteration_scope = Scope::nested(loop_scope.clone());
            let body_result = self.eval(body, &iteration_scope, writer);
            match body_result {
                Value::Break => return Value::Nil,
                Value::Continue => continue,
                Value::ReturnValue(_) | Value::Error(_) => return body_result,
                other => result = other,
            }
        }
        result
    }

    pub(crate) fn eval_foreach(
        &mut self,
        iterator: &str,
        iterable: &Node,
        body: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let iterable_value = self.eval(iterable, scope, writer);
        if iterable_value.is_sentinel() {
            return iterable_value;
        }

        let elements: Vec<Value> = match &iterable_value {
            Value::Range(start, end) => {
                if end >= start {
                    (*start..=*end).map(Value::Integer).collect()
                } else {
                    let mut v: Vec<Value> = (*end..=*start).map(Value::Integer).collect();
                    v.reverse();
                    v
                }
            }
            Value::Array(items) | Value::List(items) => items.borrow().clone(),
            Value::Tuple(items) => items.to_vec(),
            other => {
                return Value::error(format!("{} is not iterable in foreach", other.type_tag()))
            }
        };

        let loop_scope = Scope::nested(scope.clone());
        let mut result = Value::Nil;
        for element in elements {
            let iteration_scope = Scope::nested(loop_scope.clone());
            iteration_scope.borrow_mut().bind(iterator.to_owned(), element);
            let body_result = self.eval(body, &iteration_scope, writer);
            match body_result {
                Value::Break => return Value::Nil,
                Value::Continue => continue,
                Value::ReturnValue(_) | Value::Error(_) => return body_result,
                other => result = other,
            }
        }
        result
    }

    pub(crate) fn eval_switch(
        &mut self,
        scrutinee: &Node,
        cases: &[SwitchCase],
        default: Option<&Node>,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        let scrutinee_value = self.eval(scrutinee, scope, writer);
        if scrutinee_value.is_sentinel() {
            return scrutinee_value;
        }

        let mut matched_index = None;
        for (i, case) in cases.iter().enumerate() {
            let case_value = self.eval(&case.value, scope, writer);
            if case_value.is_sentinel() {
                return case_value;
            }
            if loose_eq(&scrutinee_value, &case_value) {
                matched_index = Some(i);
                break;
            }
        }

        let mut ran_to_completion_without_break = false;
        if let Some(start) = matched_index {
            for case in &cases[start..] {
                let result = self.eval(&case.body, scope, writer);
                match result {
                    Value::Break => return Value::Nil,
                    Value::ReturnValue(_) | Value::Error(_) => return result,
                    _ => {}
                }
            }
            // Fell off the end of the last case without a `break`: fall
            // through into `default` too (spec.md §9's documented, if
            // unusual, fallthrough behavior).
            ran_to_completion_without_break = true;
        }

        if matched_index.is_none() || ran_to_completion_without_break {
            if let Some(default) = default {
                let result = self.eval(default, scope, writer);
                if matches!(result, Value::Break) {
                    return Value::Nil;
                }
                return result;
            }
        }

        Value::Nil
    }

    pub(crate) fn eval_bool(
        &mut self,
        op: BoolOp,
        left: &Node,
        right: &Node,
        scope: &ScopeRef,
        writer: &mut dyn Writer,
    ) -> Value {
        match op {
            BoolOp::And => {
                let l = self.eval(left, scope, writer);
                if l.is_sentinel() {
                    return l;
                }
                match l {
                    Value::Boolean(false) => Value::Boolean(false),
                    Value::Boolean(true) => {
                        let r = self.eval(right, scope, writer);
                        if r.is_sentinel() {
                            return r;
                        }
                        match r {
                            Value::Boolean(b) => Value::Boolean(b),
                            other => Value::error(format!(
                                "unsupported operator && for BOOLEAN and {}",
                                other.type_tag()
                            )),
                        }
                    }
                    other => Value::error(format!(
                        "unsupported operator && for {} and BOOLEAN",
                        other.type_tag()
                    )),
                }
            }
            BoolOp::Or => {
                let l = self.eval(left, scope, writer);
                if l.is_sentinel() {
                    return l;
                }
                match l {
                    Value::Boolean(true) => Value::Boolean(true),
                    Value::Boolean(false) => {
                        let r = self.eval(right, scope, writer);
                        if r.is_sentinel() {
                            return r;
                        }
                        match r {
                            Value::Boolean(b) => Value::Boolean(b),
                            other => Value::error(format!(
                                "unsupported operator || for BOOLEAN and {}",
                                other.type_tag()
                            )),
                        }
                    }
                    other => Value::error(format!(
                        "unsupported operator || for {} and BOOLEAN",
                        other.type_tag()
                    )),
                }
            }
            _ => {
                let l = self.eval(left, scope, writer);
                if l.is_sentinel() {
                    return l;
                }
                let r = self.eval(right, scope, writer);
                crate::eval::ops::compare(op, l, r)
            }
        }
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
    fn foreach_over_descending_range_sums_correctly() {
        let result = run("var s = 0; foreach (i in 5...1) { s = s + i; } s");
        assert_eq!(result, Value::Integer(15));
    }

    #[test]
    fn switch_fallthrough_into_break() {
        let result = run(
            "var m = 3; var season = \"\"; switch(m) { case 3: season = \"Spring\"; case 6: season = \"Summer\"; break; } season",
        );
        assert_eq!(result, Value::new_string("Summer"));
    }

    #[test]
    fn loop_scope_isolation() {
        let result = run("for (var i = 0; i < 3; i = i + 1) { var tmp = i; } tmp");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn short_circuit_and_does_not_evaluate_right_side_effect() {
        let result = run("var ran = false; func mark() { ran = true; return true; } false && mark(); ran");
        assert_eq!(result, Value::Boolean(false));
    }

    #[test]
    fn break_exits_a_for_loop_with_nil_not_the_last_body_value() {
        let result = run("for (var i = 0; i < 3; i = i + 1) { i; if (i == 1) { break; } }");
        assert_eq!(result, Value::Nil);
    }

    #[test]
    fn break_exits_a_while_loop_with_nil() {
        let result = run("var i = 0; while (i < 3) { i = i + 1; if (i == 1) { break; } i; }");
        assert_eq!(result, Value::Nil);
    }

    #[test]
    fn break_exits_a_foreach_loop_with_nil() {
        let result = run("foreach (i in 1...3) { i; if (i == 1) { break; } }");
        assert_eq!(result, Value::Nil);
    }
}
