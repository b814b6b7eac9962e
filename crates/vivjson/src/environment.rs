//! Lexically nested scopes mapping names to values.
//!
//! # Design Rationale
//!
//! Scopes form a parent-linked chain of reference-counted cells; closures keep
//! their defining scope alive by holding the same handle. The grammar offers
//! no way to build reference cycles through the chain itself (a closure stored
//! in its own defining scope can cycle and is accepted as a leak for an
//! embedded scripting runtime).
//!
//! Scope kinds split into *frames* (the root, function calls, and block
//! literals) and plain control-flow scopes (`if`/`while`/`for`/`do` bodies).
//! Assignment resolves by walking the chain but never crosses a frame
//! boundary, which is what keeps captured variables immutable across closure
//! boundaries while letting control-flow bodies update outer variables. The
//! yield assignment `:=` targets the nearest enclosing frame.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{tokenize::is_internal_marker, value::Value};

/// What created a scope; determines assignment and yield behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    /// The distinguished top-level scope.
    Root,
    /// A function call frame (parent is the captured defining scope).
    Function,
    /// A block-literal evaluation frame.
    Block,
    /// An `if`/`while`/`for`/`do` body.
    Control,
}

#[derive(Debug)]
pub(crate) struct Environment {
    kind: ScopeKind,
    vars: RefCell<IndexMap<String, Value>>,
    /// Value designated by `:=`, if one executed in this frame.
    result: RefCell<Option<Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn root() -> Rc<Self> {
        Rc::new(Self {
            kind: ScopeKind::Root,
            vars: RefCell::new(IndexMap::new()),
            result: RefCell::new(None),
            parent: None,
        })
    }

    pub fn child(parent: &Rc<Self>, kind: ScopeKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            vars: RefCell::new(IndexMap::new()),
            result: RefCell::new(None),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Whether assignment resolution and `:=` stop at this scope.
    fn is_frame(&self) -> bool {
        matches!(self.kind, ScopeKind::Root | ScopeKind::Function | ScopeKind::Block)
    }

    /// Reads a name, walking the whole chain (reads do cross frame boundaries;
    /// that is what makes closures work).
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Binds a name in this scope, replacing any existing binding here.
    pub fn set_local(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_owned(), value);
    }

    /// Assigns a name: updates the owning binding if one is reachable without
    /// crossing a frame boundary, otherwise creates the binding here.
    pub fn assign(&self, name: &str, value: Value) {
        let mut scope = self;
        loop {
            if scope.vars.borrow().contains_key(name) {
                scope.vars.borrow_mut().insert(name.to_owned(), value);
                return;
            }
            if scope.is_frame() {
                break;
            }
            match &scope.parent {
                Some(parent) => scope = parent.as_ref(),
                None => break,
            }
        }
        self.set_local(name, value);
    }

    /// Removes the innermost binding of a name. Returns false when no scope in
    /// the chain owns it.
    pub fn remove(&self, name: &str) -> bool {
        if self.vars.borrow_mut().shift_remove(name).is_some() {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.remove(name),
            None => false,
        }
    }

    /// Walks to the nearest enclosing frame scope.
    fn frame(&self) -> &Self {
        let mut scope = self;
        while !scope.is_frame() {
            match &scope.parent {
                Some(parent) => scope = parent.as_ref(),
                None => break,
            }
        }
        scope
    }

    /// Records a `:=` yield on the nearest frame.
    pub fn set_yield(&self, value: Value) {
        *self.frame().result.borrow_mut() = Some(value);
    }

    /// The nearest frame's current yield value, if a `:=` executed.
    pub fn yield_value(&self) -> Option<Value> {
        self.frame().result.borrow().clone()
    }

    /// A deep copy of this scope's own variables, in insertion order.
    pub fn local_vars(&self) -> IndexMap<String, Value> {
        self.vars.borrow().clone()
    }

    /// The public key-value pairs visible from this scope: the chain up to and
    /// including the nearest frame, inner bindings shadowing outer, excluding
    /// private (`_`-prefixed) and internal marker names.
    pub fn public_pairs(&self) -> IndexMap<String, Value> {
        let mut scopes = vec![self];
        let mut scope = self;
        while !scope.is_frame() {
            match &scope.parent {
                Some(parent) => {
                    scopes.push(parent.as_ref());
                    scope = parent.as_ref();
                }
                None => break,
            }
        }
        let mut pairs = IndexMap::new();
        for scope in scopes.into_iter().rev() {
            for (name, value) in scope.vars.borrow().iter() {
                if name.starts_with('_') || is_internal_marker(name) {
                    continue;
                }
                pairs.insert(name.clone(), value.clone());
            }
        }
        pairs
    }
}
