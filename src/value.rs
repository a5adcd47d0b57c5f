//! Runtime values (§3): every expression evaluates to a `Value`, a
//! `type_name` paired with either a primitive payload or a struct
//! instance's field map.

use indexmap::IndexMap;

use crate::ast::TypeName;

/// The payload half of a [`Value`]: a primitive scalar or a struct
/// instance's fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    I32(i32),
    F32(f32),
    Bool(bool),
    Str(String),
    Struct(IndexMap<String, Value>),
}

/// A tagged runtime value: `{type_name, payload}`. Pass-by-copy semantics —
/// cloning a struct value clones its whole field map, never aliases it.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub type_name: TypeName,
    pub payload: Payload,
}

impl Value {
    pub fn i32(value: i32) -> Self {
        Value { type_name: TypeName::single("i32"), payload: Payload::I32(value) }
    }

    pub fn f32(value: f32) -> Self {
        Value { type_name: TypeName::single("f32"), payload: Payload::F32(value) }
    }

    pub fn bool(value: bool) -> Self {
        Value { type_name: TypeName::single("bool"), payload: Payload::Bool(value) }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value { type_name: TypeName::single("str"), payload: Payload::Str(value.into()) }
    }

    pub fn struct_(type_name: TypeName, fields: IndexMap<String, Value>) -> Self {
        Value { type_name, payload: Payload::Struct(fields) }
    }

    /// The value produced by a void function that falls off the end of its
    /// body without hitting a `return`. Modeled as an empty, nameless
    /// struct instance since the language has no dedicated unit type.
    pub fn unit() -> Self {
        Value { type_name: TypeName::single("()"), payload: Payload::Struct(IndexMap::new()) }
    }

    /// The zero value of a primitive type name, or `None` for a struct type
    /// (struct types have no default form; see §4.4 NewStructValidator).
    pub fn zero_of(type_name: &TypeName) -> Option<Self> {
        if type_name.segments().len() != 1 {
            return None;
        }
        match type_name.segments()[0].as_str() {
            "i32" => Some(Value::i32(0)),
            "f32" => Some(Value::f32(0.0)),
            "bool" => Some(Value::bool(false)),
            "str" => Some(Value::str(String::new())),
            _ => None,
        }
    }

    /// Truthiness used by strict `&&`/`||` evaluation and `if`/`while`
    /// conditions: booleans use their value directly; numerics are truthy
    /// when non-zero; strings are truthy when non-empty; struct instances
    /// are always truthy.
    pub fn truthy(&self) -> bool {
        match &self.payload {
            Payload::I32(n) => *n != 0,
            Payload::F32(f) => *f != 0.0,
            Payload::Bool(b) => *b,
            Payload::Str(s) => !s.is_empty(),
            Payload::Struct(_) => true,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match &self.payload {
            Payload::I32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match &self.payload {
            Payload::F32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.payload {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_struct_fields(&self) -> Option<&IndexMap<String, Value>> {
        match &self.payload {
            Payload::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}
