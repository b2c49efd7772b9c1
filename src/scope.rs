// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! The lexical scope chain: name resolution, `const`/`let` constraints,
//! and closure capture.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::value::Value;

/// A reference to a shared scope.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// A binding scope for variables. Scopes are lexically nested; inner
/// scopes take precedence over outer ones.
#[derive(Debug, Clone)]
pub struct Scope {
    bindings: HashMap<String, Value>,
    consts: HashSet<String>,
    lets: HashSet<String>,
    let_types: HashMap<String, &'static str>,
    outer: Option<ScopeRef>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            consts: HashSet::new(),
            lets: HashSet::new(),
            let_types: HashMap::new(),
            outer: None,
        }
    }

    pub fn into_ref(self) -> ScopeRef {
        Rc::new(RefCell::new(self))
    }

    /// Create a nested scope inside the given outer scope.
    pub fn nested(outer: ScopeRef) -> ScopeRef {
        Self {
            bindings: HashMap::new(),
            consts: HashSet::new(),
            lets: HashSet::new(),
            let_types: HashMap::new(),
            outer: Some(outer),
        }
        .into_ref()
    }

    pub fn outer(&self) -> Option<ScopeRef> {
        self.outer.clone()
    }

    /// Search this scope, then its parents, for `name`.
    pub fn look_up(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.get(name) {
            Some(v.clone())
        } else if let Some(outer) = &self.outer {
            outer.borrow().look_up(name)
        } else {
            None
        }
    }

    /// Whether `name` is already bound in *this* scope specifically (used
    /// for redeclaration detection).
    pub fn defined_here(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Record `name` in the current scope, returning whether it was already
    /// present in the current scope.
    pub fn bind(&mut self, name: String, value: Value) -> bool {
        let existed = self.bindings.contains_key(&name);
        self.bindings.insert(name, value);
        existed
    }

    /// Find the scope where `name` is already bound (walking parents) and
    /// update it there. Essential for closures: an inner function
    /// reassigning an outer-scope name must mutate the enclosing scope
    /// rather than shadow it.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Value> {
        if self.bindings.contains_key(name) {
            self.bindings.insert(name.to_owned(), value);
            Ok(())
        } else if let Some(outer) = &self.outer {
            outer.borrow_mut().assign(name, value)
        } else {
            Err(value)
        }
    }

    pub fn mark_const(&mut self, name: &str) {
        self.consts.insert(name.to_owned());
    }

    pub fn mark_let(&mut self, name: &str, type_tag: &'static str) {
        self.lets.insert(name.to_owned());
        self.let_types.insert(name.to_owned(), type_tag);
    }

    pub fn is_constant(&self, name: &str) -> bool {
        if self.bindings.contains_key(name) {
            self.consts.contains(name)
        } else if let Some(outer) = &self.outer {
            outer.borrow().is_constant(name)
        } else {
            false
        }
    }

    pub fn is_let_variable(&self, name: &str) -> bool {
        if self.bindings.contains_key(name) {
            self.lets.contains(name)
        } else if let Some(outer) = &self.outer {
            outer.borrow().is_let_variable(name)
        } else {
            false
        }
    }

    pub fn get_let_type(&self, name: &str) -> Option<&'static str> {
        if self.bindings.contains_key(name) {
            self.let_types.get(name).copied()
        } else if let Some(outer) = &self.outer {
            outer.borrow().get_let_type(name)
        } else {
            None
        }
    }

    /// A shallow clone of this scope (not its parents), used when a
    /// function returned up the stack must capture variables added to the
    /// caller's frame (the copy-on-return closure policy).
    pub fn copy(&self) -> Scope {
        self.clone()
    }

    /// Number of names bound directly in this scope. Used to detect
    /// whether a call-site scope accumulated bindings beyond what a
    /// returned closure's captured scope already has.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_walks_parents() {
        let root = Scope::new().into_ref();
        root.borrow_mut().bind("x".into(), Value::Integer(1));
        let child = Scope::nested(root);
        assert_eq!(child.borrow().look_up("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn assign_mutates_defining_scope_not_the_shadow() {
        let root = Scope::new().into_ref();
        root.borrow_mut().bind("x".into(), Value::Integer(1));
        let child = Scope::nested(root.clone());
        child.borrow_mut().assign("x", Value::Integer(2)).unwrap();
        assert_eq!(root.borrow().look_up("x"), Some(Value::Integer(2)));

        // declaring a same-named variable in the inner scope shadows instead
        child.borrow_mut().bind("x".into(), Value::Integer(99));
        assert_eq!(child.borrow().look_up("x"), Some(Value::Integer(99)));
        assert_eq!(root.borrow().look_up("x"), Some(Value::Integer(2)));
    }

    #[test]
    fn const_and_let_constraints_walk_parents() {
        let root = Scope::new().into_ref();
        root.borrow_mut().bind("c".into(), Value::Integer(1));
        root.borrow_mut().mark_const("c");
        let child = Scope::nested(root);
        assert!(child.borrow().is_constant("c"));
    }

    #[test]
    fn bind_reports_redeclaration_in_current_scope_only() {
        let mut s = Scope::new();
        assert!(!s.bind("x".into(), Value::Integer(1)));
        assert!(s.bind("x".into(), Value::Integer(2)));
    }
}
