//! XML markup for external trees.
//!
//! ```text
//! <roblox version="4">
//!   <Meta name="ExplicitAutoJoints">true</Meta>
//!   <SharedStrings>
//!     <SharedString hash="9f86d0...">AQID</SharedString>
//!   </SharedStrings>
//!   <Item class="Part" referent="RBX0">
//!     <Properties>
//!       <string name="Name">Brick</string>
//!       <Vector3 name="Size"><X>4</X><Y>1</Y><Z>2</Z></Vector3>
//!       <Ref name="Target">null</Ref>
//!     </Properties>
//!   </Item>
//! </roblox>
//! ```
//!
//! Each property element is named after its kind. Binary payloads are
//! base64. Shared strings are stored once, keyed by the hex SHA-256 of their
//! content. References name the `referent` of their target; targets without
//! a usable referent get a fresh one on write.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use rustc_hash::{FxHashMap, FxHashSet};
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::{DecodeError, EncodeError};
use crate::format::{FormatOptions, Serializer};
use crate::limits::{MARKUP_VERSION, MAX_DOCUMENT_SIZE, MAX_KEYPOINTS, MAX_TREE_DEPTH};
use crate::model::{
    Axes, CFrame, Color3, ColorSequenceKeypoint, Faces, Node, NodeId, NumberSequenceKeypoint,
    PhysicalProperties, PropValue, Ray, Rect, Root, UDim, UDim2, ValueType, Vector2,
    Vector2int16, Vector3, Vector3int16,
};

const REF_TAG: &str = "Ref";
const NULL_REF: &str = "null";

/// Markup serializer. Places and models share the same markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupSerializer;

impl Serializer for MarkupSerializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<Root, DecodeError> {
        if bytes.len() > MAX_DOCUMENT_SIZE {
            return Err(DecodeError::LengthExceedsLimit {
                field: "document",
                len: bytes.len(),
                max: MAX_DOCUMENT_SIZE,
            });
        }
        let document = parse_elements(bytes)?;
        read_document(&document)
    }

    fn serialize(&self, root: &Root, options: &FormatOptions) -> Result<Vec<u8>, EncodeError> {
        write_document(root, options)
    }
}

fn tag_for(ty: ValueType) -> &'static str {
    match ty {
        ValueType::Instance => REF_TAG,
        other => other.name(),
    }
}

fn type_for(tag: &str) -> Option<ValueType> {
    match tag {
        REF_TAG => Some(ValueType::Instance),
        other => ValueType::from_name(other),
    }
}

fn hash_key(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

// =============================================================================
// ELEMENT TREE
// =============================================================================

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn markup_err(e: impl std::fmt::Display) -> DecodeError {
    DecodeError::Markup(e.to_string())
}

fn open(e: &BytesStart<'_>) -> Result<Element, DecodeError> {
    let mut element = Element {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(markup_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(markup_err)?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

/// Reads the whole document into a tree of elements.
fn parse_elements(bytes: &[u8]) -> Result<Element, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field: "markup" })?;
    let mut reader = quick_xml::Reader::from_str(text);
    // One level per item plus its Properties block, and a few for composite values.
    let max_depth = MAX_TREE_DEPTH * 2 + 8;
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event().map_err(markup_err)? {
            Event::Start(e) => {
                if stack.len() > max_depth {
                    return Err(DecodeError::DepthExceeded { max: MAX_TREE_DEPTH });
                }
                stack.push(open(&e)?);
            }
            Event::Empty(e) => {
                let element = open(&e)?;
                if let Some(top) = stack.last_mut() {
                    top.children.push(element);
                }
            }
            Event::End(_) => {
                let element = match stack.pop() {
                    Some(element) if !stack.is_empty() => element,
                    _ => return Err(markup_err("unbalanced end tag")),
                };
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::Text(t) => {
                let content = t.unescape().map_err(markup_err)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&content);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(document), true) => Ok(document),
        _ => Err(markup_err("unexpected end of document")),
    }
}

// =============================================================================
// DECODING
// =============================================================================

struct ReadState<'a> {
    root: Root,
    shared: FxHashMap<&'a str, Vec<u8>>,
    referents: FxHashMap<&'a str, NodeId>,
    pending: Vec<(NodeId, usize, &'a str)>,
}

fn read_document(document: &Element) -> Result<Root, DecodeError> {
    let roblox = document
        .child("roblox")
        .ok_or_else(|| markup_err("missing roblox element"))?;
    if let Some(version) = roblox.attr("version") {
        trace!(version, "reading markup document");
    }

    let mut state = ReadState {
        root: Root::new(),
        shared: FxHashMap::default(),
        referents: FxHashMap::default(),
        pending: Vec::new(),
    };

    for table in roblox.children.iter().filter(|c| c.name == "SharedStrings") {
        for entry in table.children.iter().filter(|c| c.name == "SharedString") {
            let key = entry
                .attr("hash")
                .ok_or_else(|| markup_err("SharedString without hash"))?;
            let bytes = STANDARD.decode(entry.text.trim()).map_err(markup_err)?;
            state.shared.insert(key, bytes);
        }
    }

    for child in &roblox.children {
        match child.name.as_str() {
            "Meta" => {
                let name = child.attr("name").ok_or_else(|| markup_err("Meta without name"))?;
                state.root.set_metadata(name, child.text.as_str());
            }
            "Item" => read_item(child, None, 1, &mut state)?,
            "SharedStrings" => {}
            other => debug!(element = other, "ignoring unknown element"),
        }
    }

    let mut dangling = 0;
    for (owner, slot, referent) in std::mem::take(&mut state.pending) {
        let target = state.referents.get(referent).copied();
        if target.is_none() {
            dangling += 1;
        }
        if let Some((_, value)) = state
            .root
            .node_mut(owner)
            .and_then(|node| node.properties.get_mut(slot))
        {
            *value = PropValue::Reference(target);
        }
    }
    debug!(
        nodes = state.root.nodes.len(),
        shared = state.shared.len(),
        dangling,
        "read markup document"
    );
    Ok(state.root)
}

fn read_item<'a>(
    item: &'a Element,
    parent: Option<NodeId>,
    depth: usize,
    state: &mut ReadState<'a>,
) -> Result<(), DecodeError> {
    if depth > MAX_TREE_DEPTH {
        return Err(DecodeError::DepthExceeded { max: MAX_TREE_DEPTH });
    }
    let class = item.attr("class").ok_or_else(|| markup_err("Item without class"))?;
    let mut node = Node::new(class);
    node.is_service = item.attr("service") == Some("true");
    if let Some(referent) = item.attr("referent") {
        node.reference = referent.to_string();
    }

    let id = NodeId(state.root.nodes.len() as u32);
    if let Some(referent) = item.attr("referent") {
        if state.referents.insert(referent, id).is_some() {
            warn!(referent, "duplicate referent, later item wins");
        }
    }

    for prop in item.children.iter().filter(|c| c.name == "Properties").flat_map(|p| &p.children) {
        let name = prop.attr("name").ok_or_else(|| markup_err("property without name"))?;
        let Some(ty) = type_for(&prop.name) else {
            debug!(class, property = name, tag = %prop.name, "skipping property of unknown kind");
            continue;
        };
        let value = match ty {
            ValueType::Instance => {
                let referent = prop.text.trim();
                if referent != NULL_REF && !referent.is_empty() {
                    state.pending.push((id, node.properties.len(), referent));
                }
                PropValue::Reference(None)
            }
            ValueType::SharedString => {
                let key = prop.text.trim();
                let bytes = state
                    .shared
                    .get(key)
                    .ok_or_else(|| markup_err(format!("unknown shared string {key}")))?;
                PropValue::SharedString(bytes.clone())
            }
            other => read_value(other, prop)?,
        };
        node.properties.push((name.to_string(), value));
    }

    state.root.add_node(node);
    match parent.and_then(|p| state.root.node_mut(p)) {
        Some(p) => p.children.push(id),
        None => state.root.instances.push(id),
    }
    for child in item.children.iter().filter(|c| c.name == "Item") {
        read_item(child, Some(id), depth + 1, state)?;
    }
    Ok(())
}

fn parse<T: FromStr>(text: &str, what: &str) -> Result<T, DecodeError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| markup_err(format!("invalid {what} {text:?}")))
}

fn field<T: FromStr>(el: &Element, name: &str) -> Result<T, DecodeError> {
    let child = el
        .child(name)
        .ok_or_else(|| markup_err(format!("{} missing <{name}>", el.name)))?;
    parse(&child.text, name)
}

fn numbers(text: &str, what: &str) -> Result<Vec<f32>, DecodeError> {
    text.split_whitespace().map(|n| parse(n, what)).collect()
}

fn read_vector2(el: &Element) -> Result<Vector2, DecodeError> {
    Ok(Vector2::new(field(el, "X")?, field(el, "Y")?))
}

fn read_vector3(el: &Element) -> Result<Vector3, DecodeError> {
    Ok(Vector3::new(field(el, "X")?, field(el, "Y")?, field(el, "Z")?))
}

fn nested<'e>(el: &'e Element, name: &str) -> Result<&'e Element, DecodeError> {
    el.child(name)
        .ok_or_else(|| markup_err(format!("{} missing <{name}>", el.name)))
}

fn read_value(ty: ValueType, el: &Element) -> Result<PropValue, DecodeError> {
    let text = el.text.as_str();
    let value = match ty {
        ValueType::String => PropValue::String(text.to_string()),
        ValueType::ProtectedString => PropValue::ProtectedString(text.to_string()),
        ValueType::Content => PropValue::Content(text.to_string()),
        ValueType::BinaryString => {
            PropValue::BinaryString(STANDARD.decode(text.trim()).map_err(markup_err)?)
        }
        ValueType::Bool => PropValue::Bool(parse(text, "bool")?),
        ValueType::Int => PropValue::Int(parse(text, "int")?),
        ValueType::Int64 => PropValue::Int64(parse(text, "int64")?),
        ValueType::Float => PropValue::Float(parse(text, "float")?),
        ValueType::Double => PropValue::Double(parse(text, "double")?),
        ValueType::Token => PropValue::Token(parse(text, "token")?),
        ValueType::BrickColor => PropValue::BrickColor(parse(text, "BrickColor")?),
        ValueType::Faces => PropValue::Faces(Faces::from_bits(parse(text, "Faces")?)),
        ValueType::Axes => PropValue::Axes(Axes::from_bits(parse(text, "Axes")?)),
        ValueType::UDim => PropValue::UDim(UDim::new(field(el, "S")?, field(el, "O")?)),
        ValueType::UDim2 => PropValue::UDim2(UDim2::new(
            UDim::new(field(el, "XS")?, field(el, "XO")?),
            UDim::new(field(el, "YS")?, field(el, "YO")?),
        )),
        ValueType::Ray => PropValue::Ray(Ray::new(
            read_vector3(nested(el, "origin")?)?,
            read_vector3(nested(el, "direction")?)?,
        )),
        ValueType::Color3 => {
            PropValue::Color3(Color3::new(field(el, "R")?, field(el, "G")?, field(el, "B")?))
        }
        ValueType::Color3uint8 => {
            let packed: u32 = parse(text, "Color3uint8")?;
            let [_, r, g, b] = packed.to_be_bytes();
            PropValue::Color3uint8([r, g, b])
        }
        ValueType::Vector2 => PropValue::Vector2(read_vector2(el)?),
        ValueType::Vector3 => PropValue::Vector3(read_vector3(el)?),
        ValueType::Vector2int16 => {
            PropValue::Vector2int16(Vector2int16::new(field(el, "X")?, field(el, "Y")?))
        }
        ValueType::Vector3int16 => PropValue::Vector3int16(Vector3int16::new(
            field(el, "X")?,
            field(el, "Y")?,
            field(el, "Z")?,
        )),
        ValueType::CFrame => {
            let mut c = [0f32; 12];
            for (slot, name) in c.iter_mut().zip(CFRAME_FIELDS) {
                *slot = field(el, name)?;
            }
            PropValue::CFrame(CFrame::from_components(c))
        }
        ValueType::Rect => PropValue::Rect(Rect::new(
            read_vector2(nested(el, "min")?)?,
            read_vector2(nested(el, "max")?)?,
        )),
        ValueType::NumberRange => match numbers(text, "NumberRange")?.as_slice() {
            [min, max] => PropValue::NumberRange(*min, *max),
            _ => return Err(markup_err(format!("invalid NumberRange {text:?}"))),
        },
        ValueType::NumberSequence => {
            let n = numbers(text, "NumberSequence")?;
            if n.len() % 3 != 0 || n.len() / 3 > MAX_KEYPOINTS {
                return Err(markup_err(format!("invalid NumberSequence {text:?}")));
            }
            PropValue::NumberSequence(
                n.chunks_exact(3)
                    .map(|k| NumberSequenceKeypoint::new(k[0], k[1], k[2]))
                    .collect(),
            )
        }
        ValueType::ColorSequence => {
            let n = numbers(text, "ColorSequence")?;
            if n.len() % 5 != 0 || n.len() / 5 > MAX_KEYPOINTS {
                return Err(markup_err(format!("invalid ColorSequence {text:?}")));
            }
            PropValue::ColorSequence(
                n.chunks_exact(5)
                    .map(|k| ColorSequenceKeypoint::new(k[0], Color3::new(k[1], k[2], k[3]), k[4]))
                    .collect(),
            )
        }
        ValueType::PhysicalProperties => PropValue::PhysicalProperties(PhysicalProperties {
            custom: field(el, "CustomPhysics")?,
            density: field(el, "Density")?,
            friction: field(el, "Friction")?,
            elasticity: field(el, "Elasticity")?,
            friction_weight: field(el, "FrictionWeight")?,
            elasticity_weight: field(el, "ElasticityWeight")?,
        }),
        ValueType::SharedString
        | ValueType::Instance
        | ValueType::Region3
        | ValueType::NumberSequenceKeypoint
        | ValueType::ColorSequenceKeypoint => {
            return Err(markup_err(format!("unexpected {} property", el.name)));
        }
    };
    Ok(value)
}

const CFRAME_FIELDS: [&str; 12] = [
    "X", "Y", "Z", "R00", "R01", "R02", "R10", "R11", "R12", "R20", "R21", "R22",
];

// =============================================================================
// ENCODING
// =============================================================================

struct Out {
    writer: quick_xml::Writer<Vec<u8>>,
}

fn write_err(e: impl std::fmt::Display) -> EncodeError {
    EncodeError::Markup(e.to_string())
}

impl Out {
    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EncodeError> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(start)).map_err(write_err)
    }

    fn end(&mut self, name: &str) -> Result<(), EncodeError> {
        self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)
    }

    fn text(&mut self, text: &str) -> Result<(), EncodeError> {
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(write_err)
    }

    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), EncodeError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    fn fields(&mut self, fields: &[(&str, String)]) -> Result<(), EncodeError> {
        for (name, value) in fields {
            self.leaf(name, &[], value)?;
        }
        Ok(())
    }
}

fn vector2_fields(v: Vector2) -> [(&'static str, String); 2] {
    [("X", v.x.to_string()), ("Y", v.y.to_string())]
}

fn vector3_fields(v: Vector3) -> [(&'static str, String); 3] {
    [("X", v.x.to_string()), ("Y", v.y.to_string()), ("Z", v.z.to_string())]
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Picks the referent written for each node.
///
/// Nodes keep their own reference when it is present, unique, free of
/// surrounding whitespace and not the null marker. A node
/// that is the target of some reference and has no usable referent gets a
/// generated one; other nodes are written without a referent.
fn assign_referents(root: &Root, order: &[NodeId]) -> FxHashMap<NodeId, String> {
    let targets: FxHashSet<NodeId> = order
        .iter()
        .filter_map(|id| root.node(*id))
        .flat_map(|node| &node.properties)
        .filter_map(|(_, value)| match value {
            PropValue::Reference(Some(target)) => Some(*target),
            _ => None,
        })
        .collect();

    let mut used: FxHashSet<&str> = FxHashSet::default();
    let mut out = FxHashMap::default();
    for id in order {
        let Some(node) = root.node(*id) else { continue };
        let own = node.reference.as_str();
        let usable = !own.is_empty() && own != NULL_REF && own == own.trim();
        if usable && used.insert(own) {
            out.insert(*id, own.to_string());
            continue;
        }
        if !own.is_empty() {
            warn!(referent = own, class = %node.class, "unusable referent regenerated");
        }
        if !own.is_empty() || targets.contains(id) {
            out.insert(*id, format!("RBX{}", Uuid::new_v4().simple()).to_uppercase());
        }
    }
    out
}

fn write_document(root: &Root, options: &FormatOptions) -> Result<Vec<u8>, EncodeError> {
    let writer = if options.pretty {
        quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        quick_xml::Writer::new(Vec::new())
    };
    let mut out = Out { writer };

    let order = root.walk();
    let referents = assign_referents(root, &order);

    let mut shared: Vec<(String, &[u8])> = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for (_, value) in order.iter().filter_map(|id| root.node(*id)).flat_map(|n| &n.properties) {
        if let PropValue::SharedString(bytes) = value {
            let key = hash_key(bytes);
            if seen.insert(key.clone()) {
                shared.push((key, bytes));
            }
        }
    }

    out.start("roblox", &[("version", MARKUP_VERSION)])?;
    for (name, value) in &root.metadata {
        out.leaf("Meta", &[("name", name)], value)?;
    }
    if !shared.is_empty() {
        out.start("SharedStrings", &[])?;
        for (key, bytes) in &shared {
            out.leaf("SharedString", &[("hash", key)], &STANDARD.encode(bytes))?;
        }
        out.end("SharedStrings")?;
    }

    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    for id in &root.instances {
        write_item(&mut out, root, *id, &referents, &mut visited, 1)?;
    }
    out.end("roblox")?;

    debug!(nodes = visited.len(), shared = shared.len(), "wrote markup document");
    Ok(out.writer.into_inner())
}

fn write_item(
    out: &mut Out,
    root: &Root,
    id: NodeId,
    referents: &FxHashMap<NodeId, String>,
    visited: &mut FxHashSet<NodeId>,
    depth: usize,
) -> Result<(), EncodeError> {
    if depth > MAX_TREE_DEPTH {
        return Err(EncodeError::DepthExceeded { max: MAX_TREE_DEPTH });
    }
    let Some(node) = root.node(id) else { return Ok(()) };
    if !visited.insert(id) {
        return Ok(());
    }

    let mut attrs: Vec<(&str, &str)> = vec![("class", node.class.as_str())];
    if let Some(referent) = referents.get(&id) {
        attrs.push(("referent", referent.as_str()));
    }
    if node.is_service {
        attrs.push(("service", "true"));
    }
    out.start("Item", &attrs)?;

    out.start("Properties", &[])?;
    for (name, value) in &node.properties {
        write_value(out, name, value, referents)?;
    }
    out.end("Properties")?;

    for child in &node.children {
        write_item(out, root, *child, referents, visited, depth + 1)?;
    }
    out.end("Item")
}

fn write_value(
    out: &mut Out,
    name: &str,
    value: &PropValue,
    referents: &FxHashMap<NodeId, String>,
) -> Result<(), EncodeError> {
    let tag = tag_for(value.value_type());
    let attrs = [("name", name)];
    match value {
        PropValue::String(s) | PropValue::ProtectedString(s) | PropValue::Content(s) => {
            out.leaf(tag, &attrs, s)
        }
        PropValue::BinaryString(b) => out.leaf(tag, &attrs, &STANDARD.encode(b)),
        PropValue::SharedString(b) => out.leaf(tag, &attrs, &hash_key(b)),
        PropValue::Bool(b) => out.leaf(tag, &attrs, &b.to_string()),
        PropValue::Int(n) => out.leaf(tag, &attrs, &n.to_string()),
        PropValue::Int64(n) => out.leaf(tag, &attrs, &n.to_string()),
        PropValue::Float(f) => out.leaf(tag, &attrs, &f.to_string()),
        PropValue::Double(f) => out.leaf(tag, &attrs, &f.to_string()),
        PropValue::Token(n) | PropValue::BrickColor(n) => out.leaf(tag, &attrs, &n.to_string()),
        PropValue::Faces(f) => out.leaf(tag, &attrs, &f.bits().to_string()),
        PropValue::Axes(a) => out.leaf(tag, &attrs, &a.bits().to_string()),
        PropValue::Color3uint8([r, g, b]) => {
            let packed = u32::from_be_bytes([0xff, *r, *g, *b]);
            out.leaf(tag, &attrs, &packed.to_string())
        }
        PropValue::NumberRange(min, max) => out.leaf(tag, &attrs, &join([min, max])),
        PropValue::NumberSequence(keypoints) => out.leaf(
            tag,
            &attrs,
            &join(keypoints.iter().flat_map(|k| [k.time, k.value, k.envelope])),
        ),
        PropValue::ColorSequence(keypoints) => out.leaf(
            tag,
            &attrs,
            &join(
                keypoints
                    .iter()
                    .flat_map(|k| [k.time, k.value.r, k.value.g, k.value.b, k.envelope]),
            ),
        ),
        PropValue::Reference(target) => {
            let referent = target
                .and_then(|t| referents.get(&t))
                .map_or(NULL_REF, |r| r.as_str());
            out.leaf(tag, &attrs, referent)
        }
        composite => {
            out.start(tag, &attrs)?;
            write_composite(out, composite)?;
            out.end(tag)
        }
    }
}

fn write_composite(out: &mut Out, value: &PropValue) -> Result<(), EncodeError> {
    match value {
        PropValue::UDim(u) => out.fields(&[("S", u.scale.to_string()), ("O", u.offset.to_string())]),
        PropValue::UDim2(u) => out.fields(&[
            ("XS", u.x.scale.to_string()),
            ("XO", u.x.offset.to_string()),
            ("YS", u.y.scale.to_string()),
            ("YO", u.y.offset.to_string()),
        ]),
        PropValue::Ray(r) => {
            out.start("origin", &[])?;
            out.fields(&vector3_fields(r.origin))?;
            out.end("origin")?;
            out.start("direction", &[])?;
            out.fields(&vector3_fields(r.direction))?;
            out.end("direction")
        }
        PropValue::Color3(c) => out.fields(&[
            ("R", c.r.to_string()),
            ("G", c.g.to_string()),
            ("B", c.b.to_string()),
        ]),
        PropValue::Vector2(v) => out.fields(&vector2_fields(*v)),
        PropValue::Vector3(v) => out.fields(&vector3_fields(*v)),
        PropValue::Vector2int16(v) => out.fields(&[("X", v.x.to_string()), ("Y", v.y.to_string())]),
        PropValue::Vector3int16(v) => out.fields(&[
            ("X", v.x.to_string()),
            ("Y", v.y.to_string()),
            ("Z", v.z.to_string()),
        ]),
        PropValue::CFrame(cf) => {
            let fields: Vec<(&str, String)> = CFRAME_FIELDS
                .iter()
                .zip(cf.components())
                .map(|(name, c)| (*name, c.to_string()))
                .collect();
            out.fields(&fields)
        }
        PropValue::Rect(r) => {
            out.start("min", &[])?;
            out.fields(&vector2_fields(r.min))?;
            out.end("min")?;
            out.start("max", &[])?;
            out.fields(&vector2_fields(r.max))?;
            out.end("max")
        }
        PropValue::PhysicalProperties(p) => out.fields(&[
            ("CustomPhysics", p.custom.to_string()),
            ("Density", p.density.to_string()),
            ("Friction", p.friction.to_string()),
            ("Elasticity", p.elasticity.to_string()),
            ("FrictionWeight", p.friction_weight.to_string()),
            ("ElasticityWeight", p.elasticity_weight.to_string()),
        ]),
        other => Err(write_err(format!("{} is not a composite kind", other.value_type()))),
    }
}
