//! Lexically chained environments with manager-owned lifetimes.
//!
//! A [`Closure`](crate::Closure) holds a strong reference to its
//! defining environment and a child environment holds a strong reference
//! to its parent, so values stored in frames can close a reference
//! cycle:
//!
//! ```text
//! Value -> Closure -> Environment -> Frame -> Value
//! ```
//!
//! Every environment is therefore registered (weakly) with the
//! [`EnvironmentManager`] that created it. Dropping the manager destroys
//! the environments that are still alive, clearing parent pointers and
//! frames and releasing all closure-captured state. No environment
//! obtained from a manager may outlive that manager.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Name-to-value bindings of a single scope.
pub struct Frame<E, C> {
    bindings: FxHashMap<String, Value<E, C>>,
}

impl<E, C> Default for Frame<E, C> {
    fn default() -> Self {
        Frame {
            bindings: FxHashMap::default(),
        }
    }
}

impl<E: Clone, C: Clone> Frame<E, C> {
    /// The value bound to `name` in this frame, if any.
    pub fn get(&self, name: &str) -> Option<Value<E, C>> {
        self.bindings.get(name).cloned()
    }
}

impl<E, C> Frame<E, C> {
    /// Insert-if-absent. Returns `false` when `name` is already bound in
    /// this frame; the caller treats that as a rebind error. Shadowing
    /// happens by binding under a new frame, never by rebinding.
    pub fn set(&mut self, name: impl Into<String>, value: Value<E, C>) -> bool {
        match self.bindings.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// One scope: an optional parent plus a local frame.
///
/// Constructed only through [`EnvironmentManager::new_env`].
pub struct Environment<E, C> {
    parent: Option<SharedEnv<E, C>>,
    frame: Frame<E, C>,
}

/// Shared handle to an [`Environment`].
///
/// Wraps `Rc<RefCell<...>>`; single-threaded on purpose. Construction
/// goes through the manager so every environment is registered for
/// teardown.
#[repr(transparent)]
pub struct SharedEnv<E, C>(Rc<RefCell<Environment<E, C>>>);

impl<E, C> Clone for SharedEnv<E, C> {
    fn clone(&self) -> Self {
        SharedEnv(Rc::clone(&self.0))
    }
}

impl<E, C> fmt::Debug for SharedEnv<E, C> {
    // Deliberately opaque: frames may hold closures that point back at
    // this environment, so a structural Debug impl would recurse forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEnv").finish_non_exhaustive()
    }
}

impl<E: Clone, C: Clone> SharedEnv<E, C> {
    /// Look `name` up in this scope, walking parent links to the root.
    pub fn get(&self, name: &str) -> Option<Value<E, C>> {
        let env = self.0.borrow();
        if let Some(value) = env.frame.get(name) {
            return Some(value);
        }
        env.parent.as_ref().and_then(|parent| parent.get(name))
    }
}

impl<E, C> SharedEnv<E, C> {
    /// Bind `name` in the local frame only. Insert-if-absent; `false`
    /// means the name was already bound here.
    pub fn set(&self, name: impl Into<String>, value: Value<E, C>) -> bool {
        self.0.borrow_mut().frame.set(name, value)
    }

    /// Weak observer handle, used by lifetime diagnostics and tests.
    pub fn downgrade(&self) -> Weak<RefCell<Environment<E, C>>> {
        Rc::downgrade(&self.0)
    }
}

/// Scoped owner of every environment created during one interpretation
/// job.
///
/// Holds weak references only. Dropping the manager walks the surviving
/// environments and destroys them, breaking closure-induced cycles.
pub struct EnvironmentManager<E, C> {
    environments: RefCell<Vec<Weak<RefCell<Environment<E, C>>>>>,
}

impl<E, C> EnvironmentManager<E, C> {
    pub fn new() -> Self {
        EnvironmentManager {
            environments: RefCell::new(Vec::new()),
        }
    }

    /// Create a new environment chained to `parent` and register it for
    /// teardown.
    pub fn new_env(&self, parent: Option<&SharedEnv<E, C>>) -> SharedEnv<E, C> {
        let env = SharedEnv(Rc::new(RefCell::new(Environment {
            parent: parent.cloned(),
            frame: Frame::default(),
        })));
        self.environments.borrow_mut().push(env.downgrade());
        env
    }
}

impl<E, C> Default for EnvironmentManager<E, C> {
    fn default() -> Self {
        EnvironmentManager::new()
    }
}

impl<E, C> Drop for EnvironmentManager<E, C> {
    fn drop(&mut self) {
        for weak in self.environments.get_mut().drain(..) {
            if let Some(env) = weak.upgrade() {
                let mut env = env.borrow_mut();
                env.parent = None;
                env.frame.clear();
            }
        }
    }
}
