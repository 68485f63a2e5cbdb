//! Value catalog: the bridge between host values and typed property values.
//!
//! Each value kind has one [`Reflector`] describing how to pull it from a
//! [`Dynamic`], push it back, construct it, read its members, call its
//! methods and apply arithmetic operators. The [`ReflectorRegistry`] holds
//! one reflector per kind. It is built explicitly in a fixed order and is
//! immutable afterwards.
//!
//! ```rust
//! use rbxtree::catalog::{Dynamic, ReflectorRegistry};
//! use rbxtree::model::{Value, Vector3};
//!
//! let registry = ReflectorRegistry::new();
//! let v = registry
//!     .construct("Vector3", "new", &[Dynamic::Number(1.0), Dynamic::Number(2.0), Dynamic::Number(3.0)])
//!     .unwrap();
//! assert_eq!(v, Value::Vector3(Vector3::new(1.0, 2.0, 3.0)));
//! assert_eq!(registry.member(&v, "Y").unwrap(), Dynamic::Number(2.0));
//! ```

// Typed access to the receiver of a member, method or operator.
macro_rules! value_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(v: &Value) -> Result<$ty, ValueError> {
            match v {
                Value::$variant(x) => Ok(x.clone()),
                other => Err(ValueError::TypeMismatch {
                    expected: ValueType::$variant.name(),
                    found: other.type_name(),
                }),
            }
        }
    };
}

pub mod args;
pub mod dynamic;

mod color;
mod geometry;
mod scalar;
mod sequence;

use std::fmt;

use rustc_hash::FxHashMap;

pub use args::Args;
pub use dynamic::Dynamic;

use crate::error::ValueError;
use crate::model::{Properties, Value, ValueType};

// =============================================================================
// ARITY, OPERATORS
// =============================================================================

/// Argument counts a constructor or method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one of the listed counts.
    Counts(&'static [usize]),
    /// Any count from 0 up to the bound.
    AtMost(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Counts(counts) => counts.contains(&n),
            Arity::AtMost(max) => n <= max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::AtMost(max) => write!(f, "at most {max}"),
            Arity::Counts(counts) => {
                for (i, n) in counts.iter().enumerate() {
                    if i > 0 {
                        let sep = if i + 1 == counts.len() { " or " } else { ", " };
                        f.write_str(sep)?;
                    }
                    write!(f, "{n}")?;
                }
                Ok(())
            }
        }
    }
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Unary minus.
    Neg,
}

impl ArithOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Neg => "unm",
        }
    }
}

pub(crate) fn mismatch(expected: ValueType, found: &Dynamic) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.name(),
        found: found.type_name(),
    }
}

/// Error for an operator a kind does not define for the given operands.
pub(crate) fn arith_error(op: ArithOp, lhs: &Value, rhs: &Dynamic) -> ValueError {
    ValueError::Arithmetic {
        op: op.name(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

// =============================================================================
// REFLECTOR
// =============================================================================

pub type PullFn = fn(&Dynamic) -> Result<Value, ValueError>;
pub type PushFn = fn(Value) -> Dynamic;
pub type CallFn = fn(&Args) -> Result<Value, ValueError>;
pub type MemberFn = fn(&Value, &str) -> Option<Dynamic>;
pub type MethodFn = fn(&Value, &Args) -> Result<Dynamic, ValueError>;
pub type ArithFn = fn(ArithOp, &Value, &Dynamic) -> Result<Value, ValueError>;

/// A named constructor overloaded by argument count.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: &'static str,
    pub arity: Arity,
    call: CallFn,
}

/// A named method called on a value.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: &'static str,
    pub arity: Arity,
    call: MethodFn,
}

/// Everything the catalog knows about one value kind.
#[derive(Debug, Clone)]
pub struct Reflector {
    value_type: ValueType,
    pull: Option<PullFn>,
    push: Option<PushFn>,
    constructors: Vec<Constructor>,
    member: Option<MemberFn>,
    methods: Vec<Method>,
    arith: Option<ArithFn>,
}

impl Reflector {
    /// Creates a reflector that pulls and pushes values of `value_type` as
    /// opaque typed payloads.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            pull: None,
            push: None,
            constructors: Vec::new(),
            member: None,
            methods: Vec::new(),
            arith: None,
        }
    }

    pub fn with_pull(mut self, pull: PullFn) -> Self {
        self.pull = Some(pull);
        self
    }

    pub fn with_push(mut self, push: PushFn) -> Self {
        self.push = Some(push);
        self
    }

    pub fn constructor(mut self, name: &'static str, arity: Arity, call: CallFn) -> Self {
        self.constructors.push(Constructor { name, arity, call });
        self
    }

    pub fn with_member(mut self, member: MemberFn) -> Self {
        self.member = Some(member);
        self
    }

    pub fn method(mut self, name: &'static str, arity: Arity, call: MethodFn) -> Self {
        self.methods.push(Method { name, arity, call });
        self
    }

    pub fn with_arith(mut self, arith: ArithFn) -> Self {
        self.arith = Some(arith);
        self
    }

    pub fn name(&self) -> &'static str {
        self.value_type.name()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Converts a host value into this kind.
    pub fn pull(&self, d: &Dynamic) -> Result<Value, ValueError> {
        if let Some(pull) = self.pull {
            return pull(d);
        }
        match d {
            Dynamic::Value(v) if v.value_type() == self.value_type => Ok(v.clone()),
            other => Err(ValueError::TypeMismatch {
                expected: self.name(),
                found: other.type_name(),
            }),
        }
    }

    /// Converts a value of this kind into a host value.
    pub fn push(&self, v: Value) -> Dynamic {
        match self.push {
            Some(push) => push(v),
            None => Dynamic::Value(v),
        }
    }

    /// Calls the named constructor after checking the argument count.
    pub fn construct(&self, name: &str, args: &[Dynamic]) -> Result<Value, ValueError> {
        let ctor = self
            .constructors
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ValueError::UnknownMember {
                kind: self.name(),
                member: name.to_string(),
            })?;
        let args = Args::new(self.name(), ctor.name, ctor.arity, args);
        if !ctor.arity.accepts(args.len()) {
            return Err(args.unsupported());
        }
        (ctor.call)(&args)
    }

    pub fn member(&self, v: &Value, name: &str) -> Result<Dynamic, ValueError> {
        self.member
            .and_then(|m| m(v, name))
            .ok_or_else(|| ValueError::UnknownMember {
                kind: self.name(),
                member: name.to_string(),
            })
    }

    pub fn call_method(&self, v: &Value, name: &str, args: &[Dynamic]) -> Result<Dynamic, ValueError> {
        let method = self
            .methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ValueError::UnknownMember {
                kind: self.name(),
                member: name.to_string(),
            })?;
        let args = Args::new(self.name(), method.name, method.arity, args);
        if !method.arity.accepts(args.len()) {
            return Err(args.unsupported());
        }
        (method.call)(v, &args)
    }

    pub fn arith(&self, op: ArithOp, lhs: &Value, rhs: &Dynamic) -> Result<Value, ValueError> {
        match self.arith {
            Some(arith) => arith(op, lhs, rhs),
            None => Err(arith_error(op, lhs, rhs)),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Immutable table of reflectors, one per value kind.
#[derive(Debug, Clone)]
pub struct ReflectorRegistry {
    reflectors: Vec<Reflector>,
    by_name: FxHashMap<&'static str, usize>,
    by_type: FxHashMap<ValueType, usize>,
}

impl Default for ReflectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflectorRegistry {
    /// Builds the registry with every catalog kind.
    pub fn new() -> Self {
        let mut reflectors = Vec::new();
        scalar::register(&mut reflectors);
        geometry::register(&mut reflectors);
        color::register(&mut reflectors);
        sequence::register(&mut reflectors);

        let by_name = reflectors
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name(), i))
            .collect();
        let by_type = reflectors
            .iter()
            .enumerate()
            .map(|(i, r)| (r.value_type(), i))
            .collect();
        Self {
            reflectors,
            by_name,
            by_type,
        }
    }

    pub fn len(&self) -> usize {
        self.reflectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflectors.is_empty()
    }

    /// Reflectors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Reflector> {
        self.reflectors.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Reflector> {
        self.by_name.get(name).map(|i| &self.reflectors[*i])
    }

    pub fn by_type(&self, ty: ValueType) -> Option<&Reflector> {
        self.by_type.get(&ty).map(|i| &self.reflectors[*i])
    }

    fn lookup(&self, name: &str) -> Result<&Reflector, ValueError> {
        self.get(name).ok_or_else(|| ValueError::UnknownType {
            name: name.to_string(),
        })
    }

    fn for_value(&self, v: &Value) -> Result<&Reflector, ValueError> {
        self.by_type(v.value_type())
            .ok_or_else(|| ValueError::UnknownType {
                name: v.type_name().to_string(),
            })
    }

    /// Calls `kind.constructor(args...)`.
    pub fn construct(&self, kind: &str, constructor: &str, args: &[Dynamic]) -> Result<Value, ValueError> {
        self.lookup(kind)?.construct(constructor, args)
    }

    /// Converts a host value into the named kind.
    pub fn pull(&self, kind: ValueType, d: &Dynamic) -> Result<Value, ValueError> {
        self.by_type(kind)
            .ok_or_else(|| ValueError::UnknownType {
                name: kind.name().to_string(),
            })?
            .pull(d)
    }

    /// Converts a value into a host value. Never fails: `new` registers a
    /// reflector for every [`ValueType`], so the fallback only wraps the value.
    pub fn push(&self, v: Value) -> Dynamic {
        match self.by_type(v.value_type()) {
            Some(r) => r.push(v),
            None => Dynamic::Value(v),
        }
    }

    /// Converts any host value into its most natural kind: numbers become
    /// `double`, strings become `string`, typed values stay as they are.
    pub fn pull_variant(&self, d: &Dynamic) -> Result<Value, ValueError> {
        match d {
            Dynamic::Bool(b) => Ok(Value::Bool(*b)),
            Dynamic::Number(n) => Ok(Value::Double(*n)),
            Dynamic::String(s) => Ok(Value::String(s.clone())),
            Dynamic::Instance(r) => Ok(Value::Instance(*r)),
            Dynamic::Value(v) => Ok(v.clone()),
            Dynamic::Nil | Dynamic::Table(_) => Err(ValueError::TypeMismatch {
                expected: "value",
                found: d.type_name(),
            }),
        }
    }

    /// Inverse of [`pull_variant`](Self::pull_variant).
    pub fn push_variant(&self, v: Value) -> Dynamic {
        self.push(v)
    }

    pub fn member(&self, v: &Value, name: &str) -> Result<Dynamic, ValueError> {
        self.for_value(v)?.member(v, name)
    }

    pub fn call_method(&self, v: &Value, name: &str, args: &[Dynamic]) -> Result<Dynamic, ValueError> {
        self.for_value(v)?.call_method(v, name, args)
    }

    /// Applies `op` to host operands. A number on the left of `*` is
    /// commuted onto the typed operand.
    pub fn arith(&self, op: ArithOp, lhs: &Dynamic, rhs: &Dynamic) -> Result<Dynamic, ValueError> {
        let result = match (lhs, rhs) {
            (Dynamic::Value(l), _) => self.for_value(l)?.arith(op, l, rhs)?,
            (Dynamic::Number(_), Dynamic::Value(r)) if op == ArithOp::Mul => {
                self.for_value(r)?.arith(op, r, lhs)?
            }
            _ => {
                return Err(ValueError::Arithmetic {
                    op: op.name(),
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                });
            }
        };
        Ok(self.push(result))
    }

    /// Assigns a host value to a property of the given kind. Assigning nil
    /// removes the property.
    pub fn assign(
        &self,
        properties: &mut Properties,
        name: &str,
        kind: ValueType,
        d: &Dynamic,
    ) -> Result<(), ValueError> {
        if d.is_nil() {
            properties.remove(name);
            return Ok(());
        }
        let value = self.pull(kind, d)?;
        properties.set(name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color3uint8, NumberSequence, Region3, Vector3};

    fn n(v: f64) -> Dynamic {
        Dynamic::Number(v)
    }

    #[test]
    fn test_registry_covers_every_kind() {
        let registry = ReflectorRegistry::new();
        assert_eq!(registry.len(), ValueType::ALL.len());
        for ty in ValueType::ALL {
            let r = registry.by_type(ty).unwrap();
            assert_eq!(registry.get(ty.name()).unwrap().value_type(), r.value_type());
        }

        // Kinds files cannot carry still cross the host boundary.
        let region = Value::Region3(Region3::new(Vector3::default(), Vector3::new(1.0, 2.0, 3.0)));
        let pushed = registry.push(region.clone());
        assert_eq!(registry.pull(ValueType::Region3, &pushed).unwrap(), region);
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::Counts(&[2]).to_string(), "2");
        assert_eq!(Arity::Counts(&[0, 3]).to_string(), "0 or 3");
        assert_eq!(Arity::Counts(&[0, 1, 3, 7, 12]).to_string(), "0, 1, 3, 7 or 12");
        assert_eq!(Arity::AtMost(6).to_string(), "at most 6");
    }

    #[test]
    fn test_arity_error_names_accepted_counts() {
        let registry = ReflectorRegistry::new();
        let err = registry
            .construct("Vector3int16", "new", &[n(1.0), n(2.0)])
            .unwrap_err();
        assert_eq!(
            err,
            ValueError::Arity {
                kind: "Vector3int16",
                constructor: "new",
                accepted: Arity::Counts(&[0, 3]),
                got: 2,
            }
        );
        assert_eq!(err.to_string(), "Vector3int16.new: expected 0 or 3 arguments, got 2");

        let err = registry
            .construct("PhysicalProperties", "new", &vec![n(1.0); 4])
            .unwrap_err();
        assert!(err.to_string().contains("3 or 5"));
    }

    #[test]
    fn test_number_sequence_constructor() {
        let registry = ReflectorRegistry::new();
        let kp = |t: f64, v: f64| {
            registry
                .construct("NumberSequenceKeypoint", "new", &[n(t), n(v)])
                .map(Dynamic::Value)
                .unwrap()
        };

        let ok = registry
            .construct(
                "NumberSequence",
                "new",
                &[Dynamic::Table(vec![kp(0.0, 5.0), kp(0.5, 2.0), kp(1.0, 5.0)])],
            )
            .unwrap();
        let Value::NumberSequence(seq) = &ok else {
            panic!("expected NumberSequence, got {ok:?}");
        };
        assert_eq!(seq.keypoints().len(), 3);

        let err = registry
            .construct(
                "NumberSequence",
                "new",
                &[Dynamic::Table(vec![kp(0.1, 5.0), kp(1.0, 2.0)])],
            )
            .unwrap_err();
        assert!(err.is_validation());

        let constant = registry.construct("NumberSequence", "new", &[n(3.0)]).unwrap();
        assert_eq!(constant, Value::NumberSequence(NumberSequence::constant(3.0)));
    }

    #[test]
    fn test_color3uint8_from_rgb_rounds_trip() {
        let registry = ReflectorRegistry::new();
        let c = registry
            .construct("Color3uint8", "fromRGB", &[n(255.0), n(128.0), n(0.0)])
            .unwrap();
        assert_eq!(c, Value::Color3uint8(Color3uint8::from_bytes([255, 128, 0])));
        assert_eq!(registry.member(&c, "G").unwrap(), Dynamic::Number((128.0f32 / 255.0) as f64));
    }

    #[test]
    fn test_pull_type_mismatch() {
        let registry = ReflectorRegistry::new();
        assert!(matches!(
            registry.pull(ValueType::Vector3, &Dynamic::String("x".into())),
            Err(ValueError::TypeMismatch { expected: "Vector3", found: "string" })
        ));
        assert_eq!(registry.pull(ValueType::Int, &n(4.7)), Ok(Value::Int(4)));
        assert_eq!(registry.pull(ValueType::Float, &n(0.5)), Ok(Value::Float(0.5)));
    }

    #[test]
    fn test_variant_round_trip() {
        let registry = ReflectorRegistry::new();
        for d in [
            Dynamic::Bool(true),
            n(2.5),
            Dynamic::String("hi".into()),
            Dynamic::Value(Value::Vector3(Vector3::new(1.0, 2.0, 3.0))),
        ] {
            let v = registry.pull_variant(&d).unwrap();
            assert_eq!(registry.push_variant(v), d);
        }
        assert!(registry.pull_variant(&Dynamic::Nil).is_err());
    }

    #[test]
    fn test_arith_commutes_number_product() {
        let registry = ReflectorRegistry::new();
        let v = Dynamic::Value(Value::Vector3(Vector3::new(1.0, 2.0, 3.0)));
        let expected = Dynamic::Value(Value::Vector3(Vector3::new(2.0, 4.0, 6.0)));
        assert_eq!(registry.arith(ArithOp::Mul, &v, &n(2.0)).unwrap(), expected);
        assert_eq!(registry.arith(ArithOp::Mul, &n(2.0), &v).unwrap(), expected);
        assert!(matches!(
            registry.arith(ArithOp::Add, &v, &n(1.0)),
            Err(ValueError::Arithmetic { op: "add", .. })
        ));
    }

    #[test]
    fn test_assign_nil_removes_property() {
        let registry = ReflectorRegistry::new();
        let mut props = Properties::new();
        registry
            .assign(&mut props, "Size", ValueType::Vector3, &Dynamic::Value(Value::Vector3(Vector3::default())))
            .unwrap();
        assert!(props.contains("Size"));
        registry.assign(&mut props, "Size", ValueType::Vector3, &Dynamic::Nil).unwrap();
        assert!(!props.contains("Size"));
    }

    #[test]
    fn test_region3_constructor_and_members() {
        let registry = ReflectorRegistry::new();
        let a = Dynamic::Value(Value::Vector3(Vector3::new(0.0, 0.0, 0.0)));
        let b = Dynamic::Value(Value::Vector3(Vector3::new(2.0, 2.0, 2.0)));
        let region = registry.construct("Region3", "new", &[a, b]).unwrap();
        assert_eq!(
            region,
            Value::Region3(Region3::new(Vector3::default(), Vector3::new(2.0, 2.0, 2.0)))
        );
        assert_eq!(
            registry.member(&region, "Size").unwrap(),
            Dynamic::Value(Value::Vector3(Vector3::new(2.0, 2.0, 2.0)))
        );
    }
}
