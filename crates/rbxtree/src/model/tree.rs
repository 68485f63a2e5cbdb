//! The generic parsed tree exchanged with byte-level serializers.
//!
//! A [`Root`] is what a serializer produces from bytes and consumes to
//! produce bytes. It knows nothing about the instance arena: nodes live in
//! their own arena and are addressed by [`NodeId`], and reference properties
//! point at other nodes of the same root.

use crate::model::{
    Axes, CFrame, Color3, ColorSequenceKeypoint, Faces, NumberSequenceKeypoint,
    PhysicalProperties, Ray, Rect, UDim, UDim2, ValueType, Vector2, Vector2int16, Vector3,
    Vector3int16,
};

/// Index of a node in a [`Root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A property value as stored in a file.
///
/// Sequences and ranges are kept raw here; their invariants are checked when
/// they are converted to catalog values.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    String(String),
    BinaryString(Vec<u8>),
    ProtectedString(String),
    Content(String),
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
    BrickColor(u32),
    Color3(Color3),
    Color3uint8([u8; 3]),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector2int16(Vector2int16),
    Vector3int16(Vector3int16),
    CFrame(CFrame),
    Token(u32),
    NumberSequence(Vec<NumberSequenceKeypoint>),
    ColorSequence(Vec<ColorSequenceKeypoint>),
    NumberRange(f32, f32),
    Rect(Rect),
    PhysicalProperties(PhysicalProperties),
    /// Reference to another node; `None` is a null reference.
    Reference(Option<NodeId>),
}

impl PropValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PropValue::String(_) => ValueType::String,
            PropValue::BinaryString(_) => ValueType::BinaryString,
            PropValue::ProtectedString(_) => ValueType::ProtectedString,
            PropValue::Content(_) => ValueType::Content,
            PropValue::SharedString(_) => ValueType::SharedString,
            PropValue::Bool(_) => ValueType::Bool,
            PropValue::Int(_) => ValueType::Int,
            PropValue::Int64(_) => ValueType::Int64,
            PropValue::Float(_) => ValueType::Float,
            PropValue::Double(_) => ValueType::Double,
            PropValue::UDim(_) => ValueType::UDim,
            PropValue::UDim2(_) => ValueType::UDim2,
            PropValue::Ray(_) => ValueType::Ray,
            PropValue::Faces(_) => ValueType::Faces,
            PropValue::Axes(_) => ValueType::Axes,
            PropValue::BrickColor(_) => ValueType::BrickColor,
            PropValue::Color3(_) => ValueType::Color3,
            PropValue::Color3uint8(_) => ValueType::Color3uint8,
            PropValue::Vector2(_) => ValueType::Vector2,
            PropValue::Vector3(_) => ValueType::Vector3,
            PropValue::Vector2int16(_) => ValueType::Vector2int16,
            PropValue::Vector3int16(_) => ValueType::Vector3int16,
            PropValue::CFrame(_) => ValueType::CFrame,
            PropValue::Token(_) => ValueType::Token,
            PropValue::NumberSequence(_) => ValueType::NumberSequence,
            PropValue::ColorSequence(_) => ValueType::ColorSequence,
            PropValue::NumberRange(..) => ValueType::NumberRange,
            PropValue::Rect(_) => ValueType::Rect,
            PropValue::PhysicalProperties(_) => ValueType::PhysicalProperties,
            PropValue::Reference(_) => ValueType::Instance,
        }
    }
}

/// One node of the external tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub class: String,
    pub is_service: bool,
    pub reference: String,
    pub properties: Vec<(String, PropValue)>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            is_service: false,
            reference: String::new(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropValue> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Root container: node arena, ordered top-level nodes and metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub nodes: Vec<Node>,
    /// Top-level nodes in document order.
    pub instances: Vec<NodeId>,
    /// Insertion-ordered metadata; names are unique.
    pub metadata: Vec<(String, String)>,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the arena without attaching it anywhere.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn metadata(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a metadata entry, replacing an existing one in place.
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.metadata.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.metadata.push((name, value)),
        }
    }

    /// Nodes reachable from the top level, in pre-order.
    ///
    /// Each node is yielded once even if a malformed tree lists it more than
    /// once; ids outside the arena are skipped.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.instances.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            match seen.get_mut(id.index()) {
                Some(flag) if !*flag => *flag = true,
                _ => continue,
            }
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }
}
