//! The closed catalog of property value kinds.

use std::borrow::Cow;
use std::fmt;

use crate::model::{
    Axes, BrickColor, CFrame, Color3, Color3uint8, ColorSequence, ColorSequenceKeypoint, Faces,
    NumberRange, NumberSequence, NumberSequenceKeypoint, PhysicalProperties, Ray, Rect, Ref,
    Region3, UDim, UDim2, Vector2, Vector2int16, Vector3, Vector3int16,
};

/// Stable tag for every value kind. The discriminant is the binary wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ValueType {
    String = 1,
    BinaryString = 2,
    ProtectedString = 3,
    Content = 4,
    SharedString = 5,
    Bool = 6,
    Int = 7,
    Int64 = 8,
    Float = 9,
    Double = 10,
    UDim = 11,
    UDim2 = 12,
    Ray = 13,
    Faces = 14,
    Axes = 15,
    BrickColor = 16,
    Color3 = 17,
    Color3uint8 = 18,
    Vector2 = 19,
    Vector3 = 20,
    Vector2int16 = 21,
    Vector3int16 = 22,
    CFrame = 23,
    Token = 24,
    NumberSequence = 25,
    ColorSequence = 26,
    NumberRange = 27,
    Rect = 28,
    PhysicalProperties = 29,
    Instance = 30,
    Region3 = 31,
    NumberSequenceKeypoint = 32,
    ColorSequenceKeypoint = 33,
}

impl ValueType {
    /// Every kind, in tag order.
    pub const ALL: [ValueType; 33] = [
        ValueType::String,
        ValueType::BinaryString,
        ValueType::ProtectedString,
        ValueType::Content,
        ValueType::SharedString,
        ValueType::Bool,
        ValueType::Int,
        ValueType::Int64,
        ValueType::Float,
        ValueType::Double,
        ValueType::UDim,
        ValueType::UDim2,
        ValueType::Ray,
        ValueType::Faces,
        ValueType::Axes,
        ValueType::BrickColor,
        ValueType::Color3,
        ValueType::Color3uint8,
        ValueType::Vector2,
        ValueType::Vector3,
        ValueType::Vector2int16,
        ValueType::Vector3int16,
        ValueType::CFrame,
        ValueType::Token,
        ValueType::NumberSequence,
        ValueType::ColorSequence,
        ValueType::NumberRange,
        ValueType::Rect,
        ValueType::PhysicalProperties,
        ValueType::Instance,
        ValueType::Region3,
        ValueType::NumberSequenceKeypoint,
        ValueType::ColorSequenceKeypoint,
    ];

    /// Creates a ValueType from its wire tag.
    pub fn from_u8(v: u8) -> Option<ValueType> {
        match v {
            1..=33 => Some(Self::ALL[(v - 1) as usize]),
            _ => None,
        }
    }

    /// The kind's name as seen by scripts.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::BinaryString => "BinaryString",
            ValueType::ProtectedString => "ProtectedString",
            ValueType::Content => "Content",
            ValueType::SharedString => "SharedString",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Int64 => "int64",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::UDim => "UDim",
            ValueType::UDim2 => "UDim2",
            ValueType::Ray => "Ray",
            ValueType::Faces => "Faces",
            ValueType::Axes => "Axes",
            ValueType::BrickColor => "BrickColor",
            ValueType::Color3 => "Color3",
            ValueType::Color3uint8 => "Color3uint8",
            ValueType::Vector2 => "Vector2",
            ValueType::Vector3 => "Vector3",
            ValueType::Vector2int16 => "Vector2int16",
            ValueType::Vector3int16 => "Vector3int16",
            ValueType::CFrame => "CFrame",
            ValueType::Token => "token",
            ValueType::NumberSequence => "NumberSequence",
            ValueType::ColorSequence => "ColorSequence",
            ValueType::NumberRange => "NumberRange",
            ValueType::Rect => "Rect",
            ValueType::PhysicalProperties => "PhysicalProperties",
            ValueType::Instance => "Instance",
            ValueType::Region3 => "Region3",
            ValueType::NumberSequenceKeypoint => "NumberSequenceKeypoint",
            ValueType::ColorSequenceKeypoint => "ColorSequenceKeypoint",
        }
    }

    pub fn from_name(name: &str) -> Option<ValueType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    /// Arbitrary bytes, not necessarily UTF-8.
    BinaryString(Vec<u8>),
    ProtectedString(String),
    /// Asset URL.
    Content(String),
    /// Bytes deduplicated across the document on disk.
    SharedString(Vec<u8>),
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    UDim(UDim),
    UDim2(UDim2),
    Ray(Ray),
    Faces(Faces),
    Axes(Axes),
    BrickColor(BrickColor),
    Color3(Color3),
    Color3uint8(Color3uint8),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector2int16(Vector2int16),
    Vector3int16(Vector3int16),
    CFrame(CFrame),
    /// Opaque enum item value.
    Token(u32),
    NumberSequence(NumberSequence),
    ColorSequence(ColorSequence),
    NumberRange(NumberRange),
    Rect(Rect),
    PhysicalProperties(PhysicalProperties),
    /// Non-owning reference to another instance of the same DOM.
    Instance(Ref),
    Region3(Region3),
    NumberSequenceKeypoint(NumberSequenceKeypoint),
    ColorSequenceKeypoint(ColorSequenceKeypoint),
}

impl Value {
    /// Returns the kind of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::BinaryString(_) => ValueType::BinaryString,
            Value::ProtectedString(_) => ValueType::ProtectedString,
            Value::Content(_) => ValueType::Content,
            Value::SharedString(_) => ValueType::SharedString,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Int64(_) => ValueType::Int64,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::UDim(_) => ValueType::UDim,
            Value::UDim2(_) => ValueType::UDim2,
            Value::Ray(_) => ValueType::Ray,
            Value::Faces(_) => ValueType::Faces,
            Value::Axes(_) => ValueType::Axes,
            Value::BrickColor(_) => ValueType::BrickColor,
            Value::Color3(_) => ValueType::Color3,
            Value::Color3uint8(_) => ValueType::Color3uint8,
            Value::Vector2(_) => ValueType::Vector2,
            Value::Vector3(_) => ValueType::Vector3,
            Value::Vector2int16(_) => ValueType::Vector2int16,
            Value::Vector3int16(_) => ValueType::Vector3int16,
            Value::CFrame(_) => ValueType::CFrame,
            Value::Token(_) => ValueType::Token,
            Value::NumberSequence(_) => ValueType::NumberSequence,
            Value::ColorSequence(_) => ValueType::ColorSequence,
            Value::NumberRange(_) => ValueType::NumberRange,
            Value::Rect(_) => ValueType::Rect,
            Value::PhysicalProperties(_) => ValueType::PhysicalProperties,
            Value::Instance(_) => ValueType::Instance,
            Value::Region3(_) => ValueType::Region3,
            Value::NumberSequenceKeypoint(_) => ValueType::NumberSequenceKeypoint,
            Value::ColorSequenceKeypoint(_) => ValueType::ColorSequenceKeypoint,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Pure string coercion, defined only for the string-like kinds.
    ///
    /// Byte-valued kinds coerce only when they hold valid UTF-8.
    pub fn as_stringlike(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) | Value::ProtectedString(s) | Value::Content(s) => {
                Some(Cow::Borrowed(s.as_str()))
            }
            Value::BinaryString(b) | Value::SharedString(b) => {
                std::str::from_utf8(b).ok().map(Cow::Borrowed)
            }
            _ => None,
        }
    }

    /// Returns the referenced instance, if this is a reference.
    pub fn as_instance(&self) -> Option<Ref> {
        match self {
            Value::Instance(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::ProtectedString(s) | Value::Content(s) => f.write_str(s),
            Value::BinaryString(b) | Value::SharedString(b) => {
                f.write_str(&String::from_utf8_lossy(b))
            }
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::UDim(v) => write!(f, "{v}"),
            Value::UDim2(v) => write!(f, "{v}"),
            Value::Ray(v) => write!(f, "{v}"),
            Value::Faces(v) => write!(f, "{v}"),
            Value::Axes(v) => write!(f, "{v}"),
            Value::BrickColor(v) => write!(f, "{v}"),
            Value::Color3(v) => write!(f, "{v}"),
            Value::Color3uint8(v) => write!(f, "{v}"),
            Value::Vector2(v) => write!(f, "{v}"),
            Value::Vector3(v) => write!(f, "{v}"),
            Value::Vector2int16(v) => write!(f, "{v}"),
            Value::Vector3int16(v) => write!(f, "{v}"),
            Value::CFrame(v) => write!(f, "{v}"),
            Value::Token(v) => write!(f, "{v}"),
            Value::NumberSequence(v) => write!(f, "{v}"),
            Value::ColorSequence(v) => write!(f, "{v}"),
            Value::NumberRange(v) => write!(f, "{v}"),
            Value::Rect(v) => write!(f, "{v}"),
            Value::PhysicalProperties(v) => write!(f, "{v}"),
            Value::Instance(r) => write!(f, "Instance({r})"),
            Value::Region3(v) => write!(f, "{v}"),
            Value::NumberSequenceKeypoint(v) => write!(f, "{v}"),
            Value::ColorSequenceKeypoint(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_tags_are_stable() {
        for (i, ty) in ValueType::ALL.iter().enumerate() {
            assert_eq!(*ty as u8 as usize, i + 1);
            assert_eq!(ValueType::from_u8(*ty as u8), Some(*ty));
            assert_eq!(ValueType::from_name(ty.name()), Some(*ty));
        }
        assert_eq!(ValueType::from_u8(0), None);
        assert_eq!(ValueType::from_u8(34), None);
    }

    #[test]
    fn test_stringlike() {
        assert_eq!(Value::String("a".into()).as_stringlike().as_deref(), Some("a"));
        assert_eq!(Value::Content("rbxasset://x".into()).as_stringlike().as_deref(), Some("rbxasset://x"));
        assert_eq!(Value::BinaryString(b"ok".to_vec()).as_stringlike().as_deref(), Some("ok"));
        assert_eq!(Value::BinaryString(vec![0xff, 0xfe]).as_stringlike(), None);
        assert_eq!(Value::Int(3).as_stringlike(), None);
        assert_eq!(Value::Bool(true).as_stringlike(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Vector3(Vector3::new(1.0, 2.5, -3.0)).to_string(), "1, 2.5, -3");
        assert_eq!(Value::Color3uint8(Color3uint8::from_bytes([255, 128, 0])).to_string(), "255, 128, 0");
    }
}
