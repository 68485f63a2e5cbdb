//! Strings, numbers, booleans, tokens and instance references.
//!
//! These kinds map onto the host's own primitives instead of opaque typed
//! payloads. Byte-valued kinds stay typed so that non-UTF-8 content is not
//! lost on the way through the host.

use crate::catalog::{mismatch, Dynamic, Reflector};
use crate::error::ValueError;
use crate::model::{Value, ValueType};

pub(super) fn register(out: &mut Vec<Reflector>) {
    out.push(
        Reflector::new(ValueType::String)
            .with_pull(pull_string)
            .with_push(push_text),
    );
    out.push(Reflector::new(ValueType::BinaryString).with_pull(pull_binary_string));
    out.push(
        Reflector::new(ValueType::ProtectedString)
            .with_pull(pull_protected_string)
            .with_push(push_text),
    );
    out.push(
        Reflector::new(ValueType::Content)
            .with_pull(pull_content)
            .with_push(push_text),
    );
    out.push(Reflector::new(ValueType::SharedString).with_pull(pull_shared_string));
    out.push(
        Reflector::new(ValueType::Bool)
            .with_pull(pull_bool)
            .with_push(push_bool),
    );
    out.push(Reflector::new(ValueType::Int).with_pull(pull_int).with_push(push_int));
    out.push(
        Reflector::new(ValueType::Int64)
            .with_pull(pull_int64)
            .with_push(push_int64),
    );
    out.push(
        Reflector::new(ValueType::Float)
            .with_pull(pull_float)
            .with_push(push_float),
    );
    out.push(
        Reflector::new(ValueType::Double)
            .with_pull(pull_double)
            .with_push(push_double),
    );
    out.push(
        Reflector::new(ValueType::Token)
            .with_pull(pull_token)
            .with_push(push_token),
    );
    out.push(
        Reflector::new(ValueType::Instance)
            .with_pull(pull_instance)
            .with_push(push_instance),
    );
}

// =============================================================================
// STRINGS
// =============================================================================

macro_rules! text_kind {
    ($pull:ident, $variant:ident) => {
        fn $pull(d: &Dynamic) -> Result<Value, ValueError> {
            match d {
                Dynamic::String(s) => Ok(Value::$variant(s.clone())),
                Dynamic::Value(v @ Value::$variant(_)) => Ok(v.clone()),
                other => Err(mismatch(ValueType::$variant, other)),
            }
        }
    };
}

macro_rules! bytes_kind {
    ($pull:ident, $variant:ident) => {
        fn $pull(d: &Dynamic) -> Result<Value, ValueError> {
            match d {
                Dynamic::String(s) => Ok(Value::$variant(s.as_bytes().to_vec())),
                Dynamic::Value(v @ Value::$variant(_)) => Ok(v.clone()),
                other => Err(mismatch(ValueType::$variant, other)),
            }
        }
    };
}

text_kind!(pull_string, String);
text_kind!(pull_protected_string, ProtectedString);
text_kind!(pull_content, Content);
bytes_kind!(pull_binary_string, BinaryString);
bytes_kind!(pull_shared_string, SharedString);

fn push_text(v: Value) -> Dynamic {
    match v {
        Value::String(s) | Value::ProtectedString(s) | Value::Content(s) => Dynamic::String(s),
        other => Dynamic::Value(other),
    }
}

// =============================================================================
// NUMBERS
// =============================================================================

// Host numbers are f64; narrowing follows `as` semantics (truncating,
// saturating at the bounds, NaN to zero for integers).
macro_rules! number_kind {
    ($pull:ident, $push:ident, $variant:ident, $ty:ty) => {
        fn $pull(d: &Dynamic) -> Result<Value, ValueError> {
            match d {
                Dynamic::Number(n) => Ok(Value::$variant(*n as $ty)),
                Dynamic::Value(v @ Value::$variant(_)) => Ok(v.clone()),
                other => Err(mismatch(ValueType::$variant, other)),
            }
        }

        fn $push(v: Value) -> Dynamic {
            match v {
                Value::$variant(n) => Dynamic::Number(n as f64),
                other => Dynamic::Value(other),
            }
        }
    };
}

number_kind!(pull_int, push_int, Int, i32);
number_kind!(pull_int64, push_int64, Int64, i64);
number_kind!(pull_float, push_float, Float, f32);
number_kind!(pull_double, push_double, Double, f64);
number_kind!(pull_token, push_token, Token, u32);

// =============================================================================
// BOOL, INSTANCE
// =============================================================================

fn pull_bool(d: &Dynamic) -> Result<Value, ValueError> {
    match d {
        Dynamic::Bool(b) => Ok(Value::Bool(*b)),
        Dynamic::Value(v @ Value::Bool(_)) => Ok(v.clone()),
        other => Err(mismatch(ValueType::Bool, other)),
    }
}

fn push_bool(v: Value) -> Dynamic {
    match v {
        Value::Bool(b) => Dynamic::Bool(b),
        other => Dynamic::Value(other),
    }
}

fn pull_instance(d: &Dynamic) -> Result<Value, ValueError> {
    match d {
        Dynamic::Instance(r) => Ok(Value::Instance(*r)),
        Dynamic::Value(v @ Value::Instance(_)) => Ok(v.clone()),
        other => Err(mismatch(ValueType::Instance, other)),
    }
}

fn push_instance(v: Value) -> Dynamic {
    match v {
        Value::Instance(r) => Dynamic::Instance(r),
        other => Dynamic::Value(other),
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Dynamic, ReflectorRegistry};
    use crate::error::ValueError;
    use crate::model::{Value, ValueType};

    #[test]
    fn test_strings_push_as_host_strings() {
        let registry = ReflectorRegistry::new();
        let content = registry
            .pull(ValueType::Content, &Dynamic::String("rbxassetid://1".into()))
            .unwrap();
        assert_eq!(content, Value::Content("rbxassetid://1".into()));
        assert_eq!(registry.push(content), Dynamic::String("rbxassetid://1".into()));
    }

    #[test]
    fn test_binary_strings_stay_typed() {
        let registry = ReflectorRegistry::new();
        let v = Value::BinaryString(vec![0, 159, 146, 150]);
        assert_eq!(registry.push(v.clone()), Dynamic::Value(v));
    }

    #[test]
    fn test_token_saturates() {
        let registry = ReflectorRegistry::new();
        assert_eq!(
            registry.pull(ValueType::Token, &Dynamic::Number(-5.0)),
            Ok(Value::Token(0))
        );
        assert_eq!(registry.push(Value::Token(7)), Dynamic::Number(7.0));
    }

    #[test]
    fn test_bool_rejects_numbers() {
        let registry = ReflectorRegistry::new();
        assert!(matches!(
            registry.pull(ValueType::Bool, &Dynamic::Number(1.0)),
            Err(ValueError::TypeMismatch { expected: "bool", found: "number" })
        ));
    }
}
