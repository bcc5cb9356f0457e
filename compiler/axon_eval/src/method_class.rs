//! Attribute and operator binding for host foreign values.
//!
//! Hosts expose tensors, dispatch contexts, and similar objects to the
//! IR by registering a [`MethodClass`]: a table of attribute getters
//! plus optional unary and binary builtin-operator hooks. The
//! interpreter core never inspects a foreign value itself; it resolves
//! `value.attr` through this layer, and every getter either returns a
//! [`Value`] or a typed error.
//!
//! The concrete attribute sets (tensor shape, data pointer, dispatch
//! inputs and outputs, kernel launch hooks) are host-defined and live
//! with the host.

use rustc_hash::FxHashMap;

use crate::errors::{EvalError, EvalResult};
use crate::value::Value;

/// Attribute getter: receives the foreign value and the attribute name.
pub type AttrGetter<E, C> = fn(&C, &str) -> EvalResult<Value<E, C>>;

/// Unary builtin-operator hook.
pub type UnaryFunc<E, C> = fn(&Value<E, C>) -> EvalResult<Value<E, C>>;

/// Binary builtin-operator hook.
pub type BinaryFunc<E, C> = fn(&Value<E, C>, &Value<E, C>) -> EvalResult<Value<E, C>>;

/// Attribute and operator table for one host type.
pub struct MethodClass<E, C> {
    type_name: &'static str,
    attr_getters: FxHashMap<&'static str, AttrGetter<E, C>>,
    unary_ops: FxHashMap<&'static str, UnaryFunc<E, C>>,
    binary_ops: FxHashMap<&'static str, BinaryFunc<E, C>>,
}

impl<E, C> MethodClass<E, C> {
    pub fn new(type_name: &'static str) -> Self {
        MethodClass {
            type_name,
            attr_getters: FxHashMap::default(),
            unary_ops: FxHashMap::default(),
            binary_ops: FxHashMap::default(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn with_attr(mut self, name: &'static str, getter: AttrGetter<E, C>) -> Self {
        self.attr_getters.insert(name, getter);
        self
    }

    pub fn with_unary_op(mut self, op: &'static str, func: UnaryFunc<E, C>) -> Self {
        self.unary_ops.insert(op, func);
        self
    }

    pub fn with_binary_op(mut self, op: &'static str, func: BinaryFunc<E, C>) -> Self {
        self.binary_ops.insert(op, func);
        self
    }

    /// Resolve `attribute` on `receiver`.
    pub fn attr(&self, receiver: &C, attribute: &str) -> EvalResult<Value<E, C>> {
        match self.attr_getters.get(attribute) {
            Some(getter) => getter(receiver, attribute),
            None => Err(EvalError::attribute(self.type_name, attribute)),
        }
    }

    pub fn unary_op(&self, op: &str) -> Option<UnaryFunc<E, C>> {
        self.unary_ops.get(op).copied()
    }

    pub fn binary_op(&self, op: &str) -> Option<BinaryFunc<E, C>> {
        self.binary_ops.get(op).copied()
    }
}

/// Host type name to method class.
pub struct MethodClassRegistry<E, C> {
    classes: FxHashMap<&'static str, MethodClass<E, C>>,
}

impl<E, C> MethodClassRegistry<E, C> {
    pub fn new() -> Self {
        MethodClassRegistry {
            classes: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, class: MethodClass<E, C>) {
        self.classes.insert(class.type_name, class);
    }

    pub fn get(&self, type_name: &str) -> Option<&MethodClass<E, C>> {
        self.classes.get(type_name)
    }

    /// Resolve `attribute` on a foreign value claimed to be of
    /// `type_name`. Unregistered type names are a type error, unknown
    /// attributes an attribute error.
    pub fn attr(&self, type_name: &str, receiver: &C, attribute: &str) -> EvalResult<Value<E, C>> {
        match self.classes.get(type_name) {
            Some(class) => class.attr(receiver, attribute),
            None => Err(EvalError::type_mismatch(
                "a registered foreign type",
                type_name,
            )),
        }
    }
}

impl<E, C> Default for MethodClassRegistry<E, C> {
    fn default() -> Self {
        MethodClassRegistry::new()
    }
}
