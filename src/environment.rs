use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    rc::Rc,
};

use crate::runtime::Value;

/// A frame in the scope chain: bindings plus an optional link to the
/// enclosing frame. Frames are reference-counted and shared: a closure
/// holds its captured frame alive, and extending a scope never copies the
/// parent.
#[derive(Clone)]
pub struct Env {
    frame: Rc<RefCell<Frame>>,
}

struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Env>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// A fresh child frame enclosing `self`.
    pub fn extend(&self) -> Env {
        Env {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Binds `name` in this frame only.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.frame.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Chain lookup to the root; never mutates.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.frame.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Some(value.clone());
        }
        frame.parent.as_ref().and_then(|parent| parent.get(name))
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

// Closures capture frames that may transitively contain themselves, so
// printing stays shallow.
impl Debug for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<env>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_lookup() {
        let root = Env::new();
        root.define("x", Value::Integer(1));

        let child = root.extend();
        child.define("y", Value::Integer(2));

        assert_eq!(child.get("x"), Some(Value::Integer(1)));
        assert_eq!(child.get("y"), Some(Value::Integer(2)));
        assert_eq!(root.get("y"), None);
        assert_eq!(child.get("z"), None);
    }

    #[test]
    fn test_shadowing_is_local_to_the_frame() {
        let root = Env::new();
        root.define("x", Value::Integer(1));

        let child = root.extend();
        child.define("x", Value::Integer(2));

        assert_eq!(child.get("x"), Some(Value::Integer(2)));
        assert_eq!(root.get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_shared_frame_sees_later_definitions() {
        // A capture taken before a define still observes it: frames are
        // shared, not snapshotted
        let root = Env::new();
        let capture = root.clone();
        root.define("late", Value::Boolean(true));

        assert_eq!(capture.get("late"), Some(Value::Boolean(true)));
    }
}
