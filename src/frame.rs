//! Frame stack (§4.6): lexically nested `identifier -> Variable` bindings.
//!
//! A frame owns its bindings and an optional link to the frame that opened
//! it. Lookup walks outward to the root; each block, branch, loop body,
//! match arm, and function call pushes one of these and drops it on exit.

use std::rc::Rc;
use std::cell::RefCell;

use indexmap::IndexMap;

use crate::ast::Location;
use crate::value::Value;

/// A single binding: whether it was declared `mut`, and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub mutable: bool,
    pub value: Value,
}

/// One lexical scope's bindings, linked to its enclosing frame.
///
/// Shared via `Rc<RefCell<_>>` because `set(chain=true)` must be able to
/// mutate a binding that lives in an ancestor frame while the evaluator
/// still holds the current (child) frame.
#[derive(Debug, Default)]
pub struct Frame {
    variables: IndexMap<String, (Variable, Location)>,
    parent: Option<Rc<RefCell<Frame>>>,
}

impl Frame {
    pub fn root() -> Rc<RefCell<Frame>> {
        Rc::new(RefCell::new(Frame::default()))
    }

    /// Pushes a new child frame onto `parent`.
    pub fn push(parent: &Rc<RefCell<Frame>>) -> Rc<RefCell<Frame>> {
        Rc::new(RefCell::new(Frame { variables: IndexMap::new(), parent: Some(parent.clone()) }))
    }

    /// Binds `name` to `variable` in this frame. An identifier may be
    /// declared at most once per frame (`set(chain=false)` in spec terms):
    /// if `name` is already bound here, returns the location of that first
    /// declaration instead of overwriting it.
    pub fn declare(&mut self, name: String, variable: Variable, location: Location) -> Result<(), Location> {
        if self.contains_local(&name) {
            let (_, existing) = &self.variables[&name];
            return Err(existing.clone());
        }
        self.variables.insert(name, (variable, location));
        Ok(())
    }

    /// Reads `name`, walking outward through parent frames.
    pub fn get(&self, name: &str) -> Option<Variable> {
        if let Some((variable, _)) = self.variables.get(name) {
            return Some(variable.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.borrow().get(name))
    }

    /// Writes `value` to the existing binding of `name`, walking outward
    /// through parent frames until it is found. Returns `false` if no
    /// frame in the chain declares `name`.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if let Some((variable, _)) = self.variables.get_mut(name) {
            variable.value = value;
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().set(name, value),
            None => false,
        }
    }

    /// True when `name` is declared directly in this frame (not an
    /// ancestor).
    pub fn contains_local(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::Position;

    use super::*;

    fn loc() -> Location {
        Location::new(Position::new(1, 1), Position::new(1, 1), 0..1).unwrap()
    }

    fn other_loc() -> Location {
        Location::new(Position::new(2, 1), Position::new(2, 1), 1..2).unwrap()
    }

    #[test]
    fn lookup_walks_outward_to_an_ancestor_frame() {
        let root = Frame::root();
        root.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(1) }, loc()).unwrap();
        let child = Frame::push(&root);
        assert_eq!(child.borrow().get("x"), Some(Variable { mutable: false, value: Value::i32(1) }));
    }

    #[test]
    fn redeclaration_in_the_same_frame_is_rejected() {
        let root = Frame::root();
        root.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(1) }, loc()).unwrap();
        let err = root.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(2) }, other_loc()).unwrap_err();
        assert_eq!(err, loc());
        assert_eq!(root.borrow().get("x"), Some(Variable { mutable: false, value: Value::i32(1) }));
    }

    #[test]
    fn inner_declaration_shadows_but_does_not_escape_its_scope() {
        let root = Frame::root();
        root.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(1) }, loc()).unwrap();
        let child = Frame::push(&root);
        child.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(2) }, loc()).unwrap();
        assert_eq!(child.borrow().get("x"), Some(Variable { mutable: false, value: Value::i32(2) }));
        assert_eq!(root.borrow().get("x"), Some(Variable { mutable: false, value: Value::i32(1) }));
    }

    #[test]
    fn set_writes_through_to_the_owning_frame() {
        let root = Frame::root();
        root.borrow_mut().declare("x".into(), Variable { mutable: true, value: Value::i32(1) }, loc()).unwrap();
        let child = Frame::push(&root);
        assert!(child.borrow_mut().set("x", Value::i32(9)));
        assert_eq!(root.borrow().get("x"), Some(Variable { mutable: true, value: Value::i32(9) }));
    }

    #[test]
    fn set_on_an_unbound_name_fails() {
        let root = Frame::root();
        assert!(!root.borrow_mut().set("ghost", Value::i32(0)));
    }

    #[test]
    fn contains_local_is_false_for_a_name_only_visible_through_the_parent() {
        let root = Frame::root();
        root.borrow_mut().declare("x".into(), Variable { mutable: false, value: Value::i32(1) }, loc()).unwrap();
        let child = Frame::push(&root);
        assert!(root.borrow().contains_local("x"));
        assert!(!child.borrow().contains_local("x"));
    }
}
