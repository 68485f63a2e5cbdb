//! Conversion between catalog values and file-level property values.
//!
//! Each kind the file catalog recognizes has one entry in a conversion
//! table. Kinds without an entry (`Region3` and the keypoint kinds) cannot
//! be stored in a file. Instance references are resolved by the graph codec
//! and never go through this table.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::error::ValueError;
use crate::model::{
    BrickColor, Color3uint8, ColorSequence, NumberRange, NumberSequence, PropValue, Value,
    ValueType,
};

/// Decode and encode functions for one kind.
#[derive(Debug, Clone, Copy)]
pub struct KindCodec {
    pub decode: fn(PropValue) -> Result<Value, ValueError>,
    pub encode: fn(&Value) -> Result<PropValue, ValueError>,
}

fn mismatch(expected: ValueType, found: ValueType) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.name(),
        found: found.name(),
    }
}

// One-to-one kinds whose payload is stored unchanged.
macro_rules! direct {
    ($table:ident, $($variant:ident),+ $(,)?) => {
        $(
            $table.insert(
                ValueType::$variant,
                KindCodec {
                    decode: |p| match p {
                        PropValue::$variant(x) => Ok(Value::$variant(x)),
                        other => Err(mismatch(ValueType::$variant, other.value_type())),
                    },
                    encode: |v| match v {
                        Value::$variant(x) => Ok(PropValue::$variant(x.clone())),
                        other => Err(mismatch(ValueType::$variant, other.value_type())),
                    },
                },
            );
        )+
    };
}

fn build_table() -> FxHashMap<ValueType, KindCodec> {
    let mut table = FxHashMap::default();
    direct!(
        table,
        String,
        BinaryString,
        ProtectedString,
        Content,
        SharedString,
        Bool,
        Int,
        Int64,
        Float,
        Double,
        UDim,
        UDim2,
        Ray,
        Faces,
        Axes,
        Color3,
        Vector2,
        Vector3,
        Vector2int16,
        Vector3int16,
        CFrame,
        Token,
        Rect,
        PhysicalProperties,
    );

    table.insert(
        ValueType::BrickColor,
        KindCodec {
            decode: |p| match p {
                PropValue::BrickColor(n) => Ok(Value::BrickColor(BrickColor(n))),
                other => Err(mismatch(ValueType::BrickColor, other.value_type())),
            },
            encode: |v| match v {
                Value::BrickColor(b) => Ok(PropValue::BrickColor(b.number())),
                other => Err(mismatch(ValueType::BrickColor, other.value_type())),
            },
        },
    );
    table.insert(
        ValueType::Color3uint8,
        KindCodec {
            decode: |p| match p {
                PropValue::Color3uint8(bytes) => Ok(Value::Color3uint8(Color3uint8::from_bytes(bytes))),
                other => Err(mismatch(ValueType::Color3uint8, other.value_type())),
            },
            encode: |v| match v {
                Value::Color3uint8(c) => Ok(PropValue::Color3uint8(c.to_bytes())),
                other => Err(mismatch(ValueType::Color3uint8, other.value_type())),
            },
        },
    );
    table.insert(
        ValueType::NumberSequence,
        KindCodec {
            decode: |p| match p {
                PropValue::NumberSequence(k) => Ok(Value::NumberSequence(NumberSequence::new(k)?)),
                other => Err(mismatch(ValueType::NumberSequence, other.value_type())),
            },
            encode: |v| match v {
                Value::NumberSequence(s) => Ok(PropValue::NumberSequence(s.keypoints().to_vec())),
                other => Err(mismatch(ValueType::NumberSequence, other.value_type())),
            },
        },
    );
    table.insert(
        ValueType::ColorSequence,
        KindCodec {
            decode: |p| match p {
                PropValue::ColorSequence(k) => Ok(Value::ColorSequence(ColorSequence::new(k)?)),
                other => Err(mismatch(ValueType::ColorSequence, other.value_type())),
            },
            encode: |v| match v {
                Value::ColorSequence(s) => Ok(PropValue::ColorSequence(s.keypoints().to_vec())),
                other => Err(mismatch(ValueType::ColorSequence, other.value_type())),
            },
        },
    );
    table.insert(
        ValueType::NumberRange,
        KindCodec {
            decode: |p| match p {
                PropValue::NumberRange(min, max) => Ok(Value::NumberRange(NumberRange::new(min, max)?)),
                other => Err(mismatch(ValueType::NumberRange, other.value_type())),
            },
            encode: |v| match v {
                Value::NumberRange(r) => Ok(PropValue::NumberRange(r.min, r.max)),
                other => Err(mismatch(ValueType::NumberRange, other.value_type())),
            },
        },
    );
    table
}

lazy_static! {
    static ref KIND_TABLE: FxHashMap<ValueType, KindCodec> = build_table();
}

/// Returns the conversion entry for a kind, if files can store it.
pub fn kind_codec(ty: ValueType) -> Option<&'static KindCodec> {
    KIND_TABLE.get(&ty)
}

/// Whether values of this kind can be stored in a file.
pub fn is_encodable(ty: ValueType) -> bool {
    ty == ValueType::Instance || KIND_TABLE.contains_key(&ty)
}

/// Converts a file-level value into a catalog value, checking invariants.
pub fn decode_value(p: PropValue) -> Result<Value, ValueError> {
    let ty = p.value_type();
    match kind_codec(ty) {
        Some(codec) => (codec.decode)(p),
        None => Err(ValueError::Unencodable { kind: ty.name() }),
    }
}

/// Converts a catalog value into its file-level form.
pub fn encode_value(v: &Value) -> Result<PropValue, ValueError> {
    let ty = v.value_type();
    match kind_codec(ty) {
        Some(codec) => (codec.encode)(v),
        None => Err(ValueError::Unencodable { kind: ty.name() }),
    }
}
