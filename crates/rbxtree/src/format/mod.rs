//! Format adapters: bytes to instance graphs and back.
//!
//! A [`Format`] pairs a byte-level [`Serializer`] with a root shape. Places
//! decode to a single `DataModel`; models decode to a flat list of top-level
//! instances. Both go through the same graph codec, so every format accepts
//! the same inputs on encode: a bare instance, a list of instances or a
//! `DataModel`.
//!
//! # Example
//!
//! ```rust
//! use rbxtree::format::{FormatRegistry, Target};
//! use rbxtree::model::{Dom, Instance, Value};
//!
//! let mut dom = Dom::new();
//! let part = dom.insert(
//!     Instance::new("Part").with_property("Name", Value::String("Brick".into())),
//! );
//!
//! let registry = FormatRegistry::standard();
//! let rbxm = registry.get("rbxm").unwrap();
//! let bytes = rbxm.encode(&dom, &Target::Instance(part)).unwrap();
//! let doc = rbxm.decode(&bytes).unwrap();
//! assert!(matches!(doc.target, Target::Objects(ref objects) if objects.len() == 1));
//! ```

pub mod binary;
pub mod markup;
pub mod registry;
pub mod source;

use std::fmt;

use tracing::debug;

use crate::catalog::Dynamic;
use crate::codec::{decode_root, encode_root};
use crate::error::{DecodeError, EncodeError, FormatError};
use crate::model::{Dom, Ref, Root};

pub use crate::codec::Target;
pub use binary::BinarySerializer;
pub use markup::MarkupSerializer;
pub use registry::{FormatRegistry, FormatRegistryBuilder, DIRECTORY};

/// Byte-level serialization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Binary,
    Markup,
}

/// What a decoded document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RootShape {
    /// A whole place: decodes to its `DataModel`.
    Place = 0,
    /// A model: decodes to the list of top-level instances.
    Model = 1,
}

impl RootShape {
    pub fn from_u8(v: u8) -> Option<RootShape> {
        match v {
            0 => Some(RootShape::Place),
            1 => Some(RootShape::Model),
            _ => None,
        }
    }
}

/// Options for encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// zstd level for binary bodies. `None` writes the body uncompressed.
    pub compression: Option<i32>,
    /// Indent markup output.
    pub pretty: bool,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, level: i32) -> Self {
        self.compression = Some(level);
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Converts external trees to bytes and back.
pub trait Serializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<Root, DecodeError>;
    fn serialize(&self, root: &Root, options: &FormatOptions) -> Result<Vec<u8>, EncodeError>;
}

/// A decoded document: the graph and what the caller should look at.
#[derive(Debug, Clone)]
pub struct Document {
    pub dom: Dom,
    pub target: Target,
}

impl Document {
    /// Top-level instances of the document.
    pub fn objects(&self) -> Vec<Ref> {
        match &self.target {
            Target::Instance(r) => vec![*r],
            Target::Objects(objects) => objects.clone(),
        }
    }
}

/// A named file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub name: String,
    pub method: Method,
    pub shape: RootShape,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Format {
    pub fn new(name: impl Into<String>, method: Method, shape: RootShape) -> Self {
        Self {
            name: name.into(),
            method,
            shape,
        }
    }

    fn serializer(&self) -> Box<dyn Serializer> {
        match self.method {
            Method::Binary => Box::new(BinarySerializer::new(self.shape)),
            Method::Markup => Box::new(MarkupSerializer),
        }
    }

    fn decode_error(&self, source: DecodeError) -> FormatError {
        FormatError::Decode {
            format: self.name.clone(),
            source,
        }
    }

    fn encode_error(&self, source: EncodeError) -> FormatError {
        FormatError::Encode {
            format: self.name.clone(),
            source,
        }
    }

    /// Decodes a document.
    pub fn decode(&self, bytes: &[u8]) -> Result<Document, FormatError> {
        let root = self
            .serializer()
            .deserialize(bytes)
            .map_err(|e| self.decode_error(e))?;
        let (mut dom, top) = decode_root(&root).map_err(|e| self.decode_error(e))?;

        let target = match self.shape {
            RootShape::Place => Target::Instance(top),
            RootShape::Model => {
                let objects = dom
                    .detach_children(top)
                    .map_err(|_| self.decode_error(DecodeError::InvalidParent { index: top.index() }))?;
                // The synthetic root only carried metadata.
                dom.remove(top)
                    .map_err(|_| self.decode_error(DecodeError::InvalidParent { index: top.index() }))?;
                Target::Objects(objects)
            }
        };
        debug!(format = %self.name, instances = dom.len(), "decoded document");
        Ok(Document { dom, target })
    }

    /// Encodes with default options.
    pub fn encode(&self, dom: &Dom, target: &Target) -> Result<Vec<u8>, FormatError> {
        self.encode_with_options(dom, target, &FormatOptions::default())
    }

    pub fn encode_with_options(
        &self,
        dom: &Dom,
        target: &Target,
        options: &FormatOptions,
    ) -> Result<Vec<u8>, FormatError> {
        let root = encode_root(dom, target).map_err(|e| self.encode_error(e))?;
        let bytes = self
            .serializer()
            .serialize(&root, options)
            .map_err(|e| self.encode_error(e))?;
        debug!(format = %self.name, bytes = bytes.len(), "encoded document");
        Ok(bytes)
    }

    /// Whether a host value can be encoded: an instance or a table whose
    /// entries are all instances.
    pub fn can_encode(&self, value: &Dynamic) -> bool {
        dynamic_target(value).is_some()
    }

    pub fn encode_dynamic(&self, dom: &Dom, value: &Dynamic) -> Result<Vec<u8>, FormatError> {
        self.encode_dynamic_with_options(dom, value, &FormatOptions::default())
    }

    pub fn encode_dynamic_with_options(
        &self,
        dom: &Dom,
        value: &Dynamic,
        options: &FormatOptions,
    ) -> Result<Vec<u8>, FormatError> {
        let target = dynamic_target(value).ok_or_else(|| FormatError::CannotEncode {
            format: self.name.clone(),
            found: value.type_name(),
        })?;
        self.encode_with_options(dom, &target, options)
    }
}

fn dynamic_target(value: &Dynamic) -> Option<Target> {
    match value {
        Dynamic::Instance(r) => Some(Target::Instance(*r)),
        Dynamic::Table(entries) => entries
            .iter()
            .map(|entry| match entry {
                Dynamic::Instance(r) => Some(*r),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Target::Objects),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instance, Value, Vector3, DATA_MODEL};

    fn formats() -> Vec<Format> {
        FormatRegistry::standard().iter().cloned().collect()
    }

    fn part(dom: &mut Dom, name: &str) -> Ref {
        dom.insert(
            Instance::new("Part")
                .with_property("Name", Value::String(name.into()))
                .with_property("Size", Value::Vector3(Vector3::new(4.0, 1.0, 2.0))),
        )
    }

    #[test]
    fn test_bare_instance_equals_single_element_list() {
        let mut dom = Dom::new();
        let brick = part(&mut dom, "Brick");
        for format in formats() {
            let single = format.encode(&dom, &Target::Instance(brick)).unwrap();
            let list = format.encode(&dom, &Target::Objects(vec![brick])).unwrap();
            assert_eq!(single, list, "{format}");
        }
    }

    #[test]
    fn test_place_decodes_to_data_model() {
        let mut dom = Dom::new();
        let game = dom.insert(
            Instance::new(DATA_MODEL).with_property("PlaceName", Value::String("Obby".into())),
        );
        let workspace = dom
            .insert_child(game, Instance::new("Workspace").with_service(true))
            .unwrap();
        let rbxl = Format::new("rbxl", Method::Binary, RootShape::Place);
        let bytes = rbxl.encode(&dom, &Target::Instance(game)).unwrap();
        let doc = rbxl.decode(&bytes).unwrap();

        let Target::Instance(top) = doc.target else {
            panic!("expected a single root");
        };
        let root = doc.dom.get(top).unwrap();
        assert!(root.is_data_model());
        assert_eq!(root.properties.get("PlaceName"), Some(&Value::String("Obby".into())));
        let decoded_workspace = doc.dom.children(top)[0];
        assert!(crate::model::structurally_equal(&dom, workspace, &doc.dom, decoded_workspace));
    }

    #[test]
    fn test_model_detaches_objects() {
        let mut dom = Dom::new();
        let a = part(&mut dom, "A");
        let b = part(&mut dom, "B");
        let rbxmx = Format::new("rbxmx", Method::Markup, RootShape::Model);
        let bytes = rbxmx.encode(&dom, &Target::Objects(vec![a, b])).unwrap();
        let doc = rbxmx.decode(&bytes).unwrap();

        let objects = doc.objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(doc.dom.len(), 2);
        for object in objects {
            assert_eq!(doc.dom.get(object).unwrap().parent(), None);
        }
    }

    #[test]
    fn test_wide_model_keeps_object_order() {
        let mut dom = Dom::new();
        let parts: Vec<Ref> = (0..5_000).map(|i| part(&mut dom, &format!("P{i}"))).collect();
        let rbxm = Format::new("rbxm", Method::Binary, RootShape::Model);
        let bytes = rbxm.encode(&dom, &Target::Objects(parts)).unwrap();
        let doc = rbxm.decode(&bytes).unwrap();

        let objects = doc.objects();
        assert_eq!(objects.len(), 5_000);
        assert_eq!(doc.dom.len(), 5_000);
        for (i, object) in objects.iter().enumerate() {
            let inst = doc.dom.get(*object).unwrap();
            assert_eq!(inst.parent(), None);
            assert_eq!(inst.name(), format!("P{i}"));
        }
    }

    #[test]
    fn test_can_encode_dynamic() {
        let mut dom = Dom::new();
        let brick = part(&mut dom, "Brick");
        let rbxm = Format::new("rbxm", Method::Binary, RootShape::Model);

        assert!(rbxm.can_encode(&Dynamic::Instance(brick)));
        assert!(rbxm.can_encode(&Dynamic::Table(vec![Dynamic::Instance(brick)])));
        assert!(!rbxm.can_encode(&Dynamic::Table(vec![Dynamic::Number(1.0)])));
        assert!(!rbxm.can_encode(&Dynamic::String("Brick".into())));

        let err = rbxm.encode_dynamic(&dom, &Dynamic::Number(3.0)).unwrap_err();
        assert_eq!(
            err,
            FormatError::CannotEncode {
                format: "rbxm".into(),
                found: "number",
            }
        );
        let from_dynamic = rbxm.encode_dynamic(&dom, &Dynamic::Instance(brick)).unwrap();
        assert_eq!(from_dynamic, rbxm.encode(&dom, &Target::Instance(brick)).unwrap());
    }

    #[test]
    fn test_errors_carry_format_name() {
        let rbxl = Format::new("rbxl", Method::Binary, RootShape::Place);
        let err = rbxl.decode(b"not a place").unwrap_err();
        assert!(matches!(
            &err,
            FormatError::Decode { format, source: DecodeError::InvalidMagic { .. } } if format == "rbxl"
        ));
        assert_eq!(err.format_name(), Some("rbxl"));

        let mut dom = Dom::new();
        let gone = part(&mut dom, "Gone");
        dom.remove(gone).unwrap();
        let err = rbxl.encode(&dom, &Target::Objects(vec![gone])).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Encode { source: EncodeError::MissingInstance { .. }, .. }
        ));
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use proptest::sample::Index;

    use super::*;
    use crate::model::{
        structurally_equal, Axes, BrickColor, CFrame, Color3, Color3uint8, ColorSequence, Faces,
        Instance, NumberRange, NumberSequence, PhysicalProperties, Ray, Rect, UDim, UDim2, Value,
        Vector2, Vector2int16, Vector3, Vector3int16,
    };

    fn vector2() -> impl Strategy<Value = Vector2> {
        (-1.0e6f32..1.0e6, -1.0e6f32..1.0e6).prop_map(|(x, y)| Vector2::new(x, y))
    }

    fn vector3() -> impl Strategy<Value = Vector3> {
        (-1.0e6f32..1.0e6, -1.0e6f32..1.0e6, -1.0e6f32..1.0e6).prop_map(|(x, y, z)| Vector3::new(x, y, z))
    }

    fn udim() -> impl Strategy<Value = UDim> {
        (-10.0f32..10.0, any::<i32>()).prop_map(|(scale, offset)| UDim::new(scale, offset))
    }

    fn color3() -> impl Strategy<Value = Color3> {
        (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0).prop_map(|(r, g, b)| Color3::new(r, g, b))
    }

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[a-zA-Z0-9 <>&\"']{0,16}".prop_map(Value::String),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::BinaryString),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::SharedString),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(Value::Int64),
            (-1.0e6f32..1.0e6).prop_map(Value::Float),
            (-1.0e12f64..1.0e12).prop_map(Value::Double),
            any::<u32>().prop_map(Value::Token),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::ProtectedString),
            "rbxasset://[a-z/]{0,12}".prop_map(Value::Content),
            vector2().prop_map(Value::Vector2),
            vector3().prop_map(Value::Vector3),
            any::<(i16, i16)>().prop_map(|(x, y)| Value::Vector2int16(Vector2int16::new(x, y))),
            any::<(i16, i16, i16)>().prop_map(|(x, y, z)| Value::Vector3int16(Vector3int16::new(x, y, z))),
            udim().prop_map(Value::UDim),
            (udim(), udim()).prop_map(|(x, y)| Value::UDim2(UDim2::new(x, y))),
            (vector3(), vector3()).prop_map(|(o, d)| Value::Ray(Ray::new(o, d))),
            (vector2(), vector2()).prop_map(|(min, max)| Value::Rect(Rect::new(min, max))),
            (0u8..64).prop_map(|bits| Value::Faces(Faces::from_bits(bits))),
            (0u8..8).prop_map(|bits| Value::Axes(Axes::from_bits(bits))),
            any::<u32>().prop_map(|n| Value::BrickColor(BrickColor(n))),
            color3().prop_map(Value::Color3),
            prop::array::uniform3(any::<u8>()).prop_map(|b| Value::Color3uint8(Color3uint8::from_bytes(b))),
            (0.0f32..10.0, 0.0f32..10.0).prop_map(|(a, b)| Value::NumberSequence(NumberSequence::between(a, b))),
            (color3(), color3()).prop_map(|(a, b)| Value::ColorSequence(ColorSequence::between(a, b))),
            (-100.0f32..100.0, 0.0f32..100.0)
                .prop_filter_map("ordered range", |(min, span)| NumberRange::new(min, min + span).ok().map(Value::NumberRange)),
            (any::<bool>(), 0.01f32..100.0, 0.0f32..2.0, 0.0f32..1.0, 0.0f32..100.0, 0.0f32..100.0).prop_map(
                |(custom, density, friction, elasticity, fw, ew)| {
                    let mut p = PhysicalProperties::with_weights(density, friction, elasticity, fw, ew);
                    p.custom = custom;
                    Value::PhysicalProperties(p)
                }
            ),
            (-3.0f32..3.0, -3.0f32..3.0, -3.0f32..3.0)
                .prop_map(|(x, y, z)| Value::CFrame(CFrame::from_euler_angles_xyz(x, y, z))),
        ]
    }

    #[derive(Debug, Clone)]
    struct NodeSpec {
        parent: Index,
        class: String,
        properties: Vec<(String, Value)>,
        references: Vec<(String, Index)>,
    }

    fn node() -> impl Strategy<Value = NodeSpec> {
        (
            any::<Index>(),
            "Cls[a-zA-Z]{0,6}",
            prop::collection::vec(("[A-Z][a-z]{0,6}", value()), 0..6),
            prop::collection::vec(("Ref[A-Z][a-z]{0,4}", any::<Index>()), 0..2),
        )
            .prop_map(|(parent, class, properties, references)| NodeSpec {
                parent,
                class,
                properties,
                references,
            })
    }

    /// Builds one subtree rooted at the first node; references stay inside it.
    fn build(specs: &[NodeSpec]) -> (Dom, Ref) {
        let mut dom = Dom::new();
        let mut refs: Vec<Ref> = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let mut inst = Instance::new(spec.class.clone());
            for (name, value) in &spec.properties {
                inst.properties.set(name.clone(), value.clone());
            }
            let r = match i {
                0 => dom.insert(inst),
                _ => dom.insert_child(refs[spec.parent.index(i)], inst).unwrap(),
            };
            refs.push(r);
        }
        for (spec, owner) in specs.iter().zip(&refs) {
            for (name, target) in &spec.references {
                let target = refs[target.index(refs.len())];
                dom.get_mut(*owner)
                    .unwrap()
                    .properties
                    .set(name.clone(), Value::Instance(target));
            }
        }
        (dom, refs[0])
    }

    proptest! {
        #[test]
        fn test_every_format_round_trips(specs in prop::collection::vec(node(), 1..12), compress in any::<bool>()) {
            let (dom, top) = build(&specs);
            let options = FormatOptions::new().pretty(compress);
            let options = if compress { options.with_compression(1) } else { options };

            for format in FormatRegistry::standard().iter() {
                let bytes = format.encode_with_options(&dom, &Target::Instance(top), &options).unwrap();
                let doc = format.decode(&bytes).unwrap();
                let decoded = match (&doc.target, format.shape) {
                    (Target::Instance(root), RootShape::Place) => doc.dom.children(*root).to_vec(),
                    (Target::Objects(objects), RootShape::Model) => objects.clone(),
                    (target, shape) => panic!("{format}: {target:?} for {shape:?}"),
                };
                prop_assert_eq!(decoded.len(), 1);
                prop_assert!(structurally_equal(&dom, top, &doc.dom, decoded[0]), "{}", format);
            }
        }
    }
}
