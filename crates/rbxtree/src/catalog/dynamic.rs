//! Values as seen by a host runtime.

use crate::model::{Ref, Value};

/// A value on the host side of the catalog boundary.
///
/// The host maps its own values to `Dynamic` and back; typed catalog values
/// travel as opaque [`Dynamic::Value`] payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    /// Array-like table.
    Table(Vec<Dynamic>),
    Instance(Ref),
    Value(Value),
}

impl Dynamic {
    /// Host-facing type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Nil => "nil",
            Dynamic::Bool(_) => "boolean",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::Table(_) => "table",
            Dynamic::Instance(_) => "Instance",
            Dynamic::Value(v) => v.type_name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Dynamic::Nil)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Dynamic::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Dynamic {
    fn from(v: Value) -> Self {
        Dynamic::Value(v)
    }
}

impl From<f64> for Dynamic {
    fn from(n: f64) -> Self {
        Dynamic::Number(n)
    }
}

impl From<f32> for Dynamic {
    fn from(n: f32) -> Self {
        Dynamic::Number(n as f64)
    }
}

impl From<i32> for Dynamic {
    fn from(n: i32) -> Self {
        Dynamic::Number(n as f64)
    }
}

impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Dynamic::Bool(b)
    }
}

impl From<&str> for Dynamic {
    fn from(s: &str) -> Self {
        Dynamic::String(s.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(s: String) -> Self {
        Dynamic::String(s)
    }
}
