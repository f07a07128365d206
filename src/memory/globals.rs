//! Global namespace
//!
//! Holds the predefined null constants, the builtins and every user
//! function. Because assignments to a variable always mirror into this
//! table, it also accumulates plain values at runtime.

use super::value::Value;
use crate::parser::ast::Builtin;
use rustc_hash::FxHashMap;

/// Names bound to the null pointer before the program starts
pub const NULL_CONSTANTS: [&str; 2] = ["NULL", "nullptr"];

#[derive(Debug, Clone, PartialEq)]
pub struct Globals {
    values: FxHashMap<String, Value>,
    insertion_order: Vec<String>,
}

impl Globals {
    /// Empty namespace, without the predefined names
    pub fn empty() -> Self {
        Globals {
            values: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    /// Namespace seeded with the null constants and the builtins
    pub fn new() -> Self {
        let mut globals = Self::empty();
        for name in NULL_CONSTANTS {
            globals.define(name, Value::Pointer(0));
        }
        for builtin in Builtin::ALL {
            globals.define(builtin.name(), Value::Builtin(builtin));
        }
        globals
    }

    /// Bind `name`, replacing any previous value in place
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.insertion_order.push(name.clone());
        }
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bindings in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self::new()
    }
}
