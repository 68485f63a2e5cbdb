//! Binary container for external trees.
//!
//! Layout:
//!
//! ```text
//! magic "<roblox!" | shape u8 | version u8 | flags u8 | body
//! ```
//!
//! Flag bit 0 marks a zstd-compressed body, prefixed by its uncompressed size
//! as a varint. The body holds the metadata, a shared-string table
//! deduplicated by SHA-256, and the nodes in pre-order. Each node records the
//! pre-order index of its parent plus one (0 for top-level nodes).
//! References use the same numbering and may point forward.

use std::io::Read;

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::codec::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::format::{FormatOptions, RootShape, Serializer};
use crate::limits::{
    FORMAT_VERSION, MAGIC, MAX_BYTES_LEN, MAX_DOCUMENT_SIZE, MAX_KEYPOINTS, MAX_METADATA,
    MAX_NODES, MAX_PROPERTIES, MAX_SHARED_STRINGS, MAX_STRING_LEN,
};
use crate::model::{
    Axes, CFrame, Color3, ColorSequenceKeypoint, Faces, Node, NodeId, NumberSequenceKeypoint,
    PhysicalProperties, PropValue, Ray, Rect, Root, UDim, UDim2, ValueType, Vector2,
    Vector2int16, Vector3, Vector3int16,
};

const FLAG_COMPRESSED: u8 = 0x01;

/// Binary serializer for one root shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySerializer {
    pub shape: RootShape,
}

impl BinarySerializer {
    pub fn new(shape: RootShape) -> Self {
        Self { shape }
    }
}

impl Serializer for BinarySerializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<Root, DecodeError> {
        decode_document(bytes, self.shape)
    }

    fn serialize(&self, root: &Root, options: &FormatOptions) -> Result<Vec<u8>, EncodeError> {
        encode_document(root, self.shape, options)
    }
}

// =============================================================================
// DECODING
// =============================================================================

fn decode_document(input: &[u8], expected: RootShape) -> Result<Root, DecodeError> {
    if input.len() > MAX_DOCUMENT_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "document",
            len: input.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }
    let mut reader = Reader::new(input);
    let magic = reader
        .read_bytes(MAGIC.len(), "magic")
        .map_err(|_| DecodeError::InvalidMagic {
            found: input.iter().take(MAGIC.len()).copied().collect(),
        })?;
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic {
            found: magic.to_vec(),
        });
    }

    let shape_byte = reader.read_byte("shape")?;
    let shape = RootShape::from_u8(shape_byte).ok_or(DecodeError::InvalidShape { shape: shape_byte })?;
    if shape != expected {
        debug!(?shape, ?expected, "root shape differs from format");
    }
    let version = reader.read_byte("version")?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion { version });
    }
    let flags = reader.read_byte("flags")?;

    if flags & FLAG_COMPRESSED != 0 {
        let body = decompress_zstd(reader.remaining())?;
        decode_body(&mut Reader::new(&body))
    } else {
        decode_body(&mut reader)
    }
}

fn decompress_zstd(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(compressed);
    let declared = reader.read_len(MAX_DOCUMENT_SIZE, "uncompressed_size")?;

    let mut decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
    let mut body = Vec::with_capacity(declared);
    decoder
        .by_ref()
        .take(declared as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if body.len() != declared {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared,
            actual: body.len(),
        });
    }
    Ok(body)
}

fn decode_body(reader: &mut Reader<'_>) -> Result<Root, DecodeError> {
    let mut root = Root::new();

    let metadata_count = reader.read_len(MAX_METADATA, "metadata")?;
    for _ in 0..metadata_count {
        let name = reader.read_string(MAX_STRING_LEN, "metadata_name")?;
        let value = reader.read_string(MAX_STRING_LEN, "metadata_value")?;
        root.set_metadata(name, value);
    }

    let shared_count = reader.read_len(MAX_SHARED_STRINGS, "shared_strings")?;
    let mut shared = Vec::with_capacity(shared_count.min(1024));
    for _ in 0..shared_count {
        shared.push(reader.read_bytes_prefixed(MAX_BYTES_LEN, "shared_string")?);
    }

    let node_count = reader.read_len(MAX_NODES, "nodes")?;
    root.nodes.reserve(node_count.min(1024));
    for index in 0..node_count {
        let mut node = Node::new(reader.read_string(MAX_STRING_LEN, "class")?);
        node.is_service = reader.read_bool("service")?;
        node.reference = reader.read_string(MAX_STRING_LEN, "reference")?;
        let parent = reader.read_len(MAX_NODES, "parent")?;

        let property_count = reader.read_len(MAX_PROPERTIES, "properties")?;
        node.properties.reserve(property_count);
        for _ in 0..property_count {
            let name = reader.read_string(MAX_STRING_LEN, "property_name")?;
            let value = read_value(reader, &shared, node_count)?;
            node.properties.push((name, value));
        }
        trace!(index, class = %node.class, "read node");

        let id = root.add_node(node);
        match parent {
            0 => root.instances.push(id),
            p if p <= index => root.nodes[p - 1].children.push(id),
            _ => return Err(DecodeError::InvalidParent { index }),
        }
    }

    debug!(
        nodes = root.nodes.len(),
        shared = shared.len(),
        metadata = root.metadata.len(),
        "read binary body"
    );
    Ok(root)
}

fn read_vector2(reader: &mut Reader<'_>) -> Result<Vector2, DecodeError> {
    Ok(Vector2::new(reader.read_f32("vector")?, reader.read_f32("vector")?))
}

fn read_vector3(reader: &mut Reader<'_>) -> Result<Vector3, DecodeError> {
    Ok(Vector3::new(
        reader.read_f32("vector")?,
        reader.read_f32("vector")?,
        reader.read_f32("vector")?,
    ))
}

fn read_color3(reader: &mut Reader<'_>) -> Result<Color3, DecodeError> {
    Ok(Color3::new(
        reader.read_f32("color")?,
        reader.read_f32("color")?,
        reader.read_f32("color")?,
    ))
}

fn read_udim(reader: &mut Reader<'_>) -> Result<UDim, DecodeError> {
    Ok(UDim::new(reader.read_f32("udim")?, reader.read_i32("udim")?))
}

fn read_value(
    reader: &mut Reader<'_>,
    shared: &[Vec<u8>],
    node_count: usize,
) -> Result<PropValue, DecodeError> {
    let tag = reader.read_byte("value_type")?;
    let ty = ValueType::from_u8(tag).ok_or(DecodeError::InvalidValueType { tag })?;
    let value = match ty {
        ValueType::String => PropValue::String(reader.read_string(MAX_STRING_LEN, "string")?),
        ValueType::ProtectedString => {
            PropValue::ProtectedString(reader.read_string(MAX_STRING_LEN, "protected_string")?)
        }
        ValueType::Content => PropValue::Content(reader.read_string(MAX_STRING_LEN, "content")?),
        ValueType::BinaryString => {
            PropValue::BinaryString(reader.read_bytes_prefixed(MAX_BYTES_LEN, "binary_string")?)
        }
        ValueType::SharedString => {
            let index = reader.read_len(MAX_SHARED_STRINGS, "shared_string_index")?;
            let bytes = shared.get(index).ok_or(DecodeError::IndexOutOfBounds {
                table: "shared_strings",
                index,
                size: shared.len(),
            })?;
            PropValue::SharedString(bytes.clone())
        }
        ValueType::Bool => PropValue::Bool(reader.read_bool("bool")?),
        ValueType::Int => PropValue::Int(reader.read_i32("int")?),
        ValueType::Int64 => PropValue::Int64(reader.read_signed_varint("int64")?),
        ValueType::Float => PropValue::Float(reader.read_f32("float")?),
        ValueType::Double => PropValue::Double(reader.read_f64("double")?),
        ValueType::Token => PropValue::Token(reader.read_u32("token")?),
        ValueType::BrickColor => PropValue::BrickColor(reader.read_u32("brick_color")?),
        ValueType::UDim => PropValue::UDim(read_udim(reader)?),
        ValueType::UDim2 => PropValue::UDim2(UDim2::new(read_udim(reader)?, read_udim(reader)?)),
        ValueType::Ray => PropValue::Ray(Ray::new(read_vector3(reader)?, read_vector3(reader)?)),
        ValueType::Faces => PropValue::Faces(Faces::from_bits(reader.read_byte("faces")?)),
        ValueType::Axes => PropValue::Axes(Axes::from_bits(reader.read_byte("axes")?)),
        ValueType::Color3 => PropValue::Color3(read_color3(reader)?),
        ValueType::Color3uint8 => PropValue::Color3uint8(reader.read_array("color3uint8")?),
        ValueType::Vector2 => PropValue::Vector2(read_vector2(reader)?),
        ValueType::Vector3 => PropValue::Vector3(read_vector3(reader)?),
        ValueType::Vector2int16 => PropValue::Vector2int16(Vector2int16::new(
            reader.read_i16("vector2int16")?,
            reader.read_i16("vector2int16")?,
        )),
        ValueType::Vector3int16 => PropValue::Vector3int16(Vector3int16::new(
            reader.read_i16("vector3int16")?,
            reader.read_i16("vector3int16")?,
            reader.read_i16("vector3int16")?,
        )),
        ValueType::CFrame => {
            let mut c = [0f32; 12];
            for slot in &mut c {
                *slot = reader.read_f32("cframe")?;
            }
            PropValue::CFrame(CFrame::from_components(c))
        }
        ValueType::Rect => PropValue::Rect(Rect::new(read_vector2(reader)?, read_vector2(reader)?)),
        ValueType::NumberRange => {
            PropValue::NumberRange(reader.read_f32("number_range")?, reader.read_f32("number_range")?)
        }
        ValueType::NumberSequence => {
            let count = reader.read_len(MAX_KEYPOINTS, "keypoints")?;
            let mut keypoints = Vec::with_capacity(count);
            for _ in 0..count {
                keypoints.push(NumberSequenceKeypoint::new(
                    reader.read_f32("keypoint")?,
                    reader.read_f32("keypoint")?,
                    reader.read_f32("keypoint")?,
                ));
            }
            PropValue::NumberSequence(keypoints)
        }
        ValueType::ColorSequence => {
            let count = reader.read_len(MAX_KEYPOINTS, "keypoints")?;
            let mut keypoints = Vec::with_capacity(count);
            for _ in 0..count {
                let time = reader.read_f32("keypoint")?;
                let value = read_color3(reader)?;
                let envelope = reader.read_f32("keypoint")?;
                keypoints.push(ColorSequenceKeypoint::new(time, value, envelope));
            }
            PropValue::ColorSequence(keypoints)
        }
        ValueType::PhysicalProperties => PropValue::PhysicalProperties(PhysicalProperties {
            custom: reader.read_bool("physical_properties")?,
            density: reader.read_f32("physical_properties")?,
            friction: reader.read_f32("physical_properties")?,
            elasticity: reader.read_f32("physical_properties")?,
            friction_weight: reader.read_f32("physical_properties")?,
            elasticity_weight: reader.read_f32("physical_properties")?,
        }),
        ValueType::Instance => match reader.read_len(MAX_NODES, "reference")? {
            0 => PropValue::Reference(None),
            n if n <= node_count => PropValue::Reference(Some(NodeId((n - 1) as u32))),
            n => {
                return Err(DecodeError::IndexOutOfBounds {
                    table: "nodes",
                    index: n - 1,
                    size: node_count,
                });
            }
        },
        ValueType::Region3 | ValueType::NumberSequenceKeypoint | ValueType::ColorSequenceKeypoint => {
            return Err(DecodeError::InvalidValueType { tag });
        }
    };
    Ok(value)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Shared-string table keyed by content hash.
#[derive(Default)]
struct SharedTable {
    entries: Vec<Vec<u8>>,
    index: FxHashMap<[u8; 32], usize>,
}

impl SharedTable {
    fn intern(&mut self, bytes: &[u8]) -> usize {
        let digest: [u8; 32] = Sha256::digest(bytes).into();
        *self.index.entry(digest).or_insert_with(|| {
            self.entries.push(bytes.to_vec());
            self.entries.len() - 1
        })
    }
}

fn encode_document(root: &Root, shape: RootShape, options: &FormatOptions) -> Result<Vec<u8>, EncodeError> {
    let body = encode_body(root)?;

    let mut writer = Writer::with_capacity(MAGIC.len() + 3 + body.len());
    writer.write_bytes(MAGIC);
    writer.write_byte(shape as u8);
    writer.write_byte(FORMAT_VERSION);
    match options.compression {
        Some(level) => {
            let compressed = zstd::encode_all(body.as_slice(), level)
                .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
            writer.write_byte(FLAG_COMPRESSED);
            writer.write_varint(body.len() as u64);
            writer.write_bytes(&compressed);
        }
        None => {
            writer.write_byte(0);
            writer.write_bytes(&body);
        }
    }
    Ok(writer.into_bytes())
}

fn encode_body(root: &Root) -> Result<Vec<u8>, EncodeError> {
    // Pre-order numbering with each node's parent position.
    let mut order: Vec<(NodeId, usize)> = Vec::with_capacity(root.nodes.len());
    let mut positions: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut stack: Vec<(NodeId, usize)> = root.instances.iter().rev().map(|id| (*id, 0)).collect();
    while let Some((id, parent)) = stack.pop() {
        let Some(node) = root.node(id) else { continue };
        if positions.contains_key(&id) {
            continue;
        }
        positions.insert(id, order.len());
        order.push((id, parent));
        let own = order.len();
        stack.extend(node.children.iter().rev().map(|c| (*c, own)));
    }
    if order.len() > MAX_NODES {
        return Err(EncodeError::LengthExceedsLimit {
            field: "nodes",
            len: order.len(),
            max: MAX_NODES,
        });
    }

    let mut shared = SharedTable::default();
    let mut nodes = Writer::new();
    for (id, parent) in &order {
        let Some(node) = root.node(*id) else { continue };
        nodes.write_string(&node.class);
        nodes.write_bool(node.is_service);
        nodes.write_string(&node.reference);
        nodes.write_varint(*parent as u64);
        nodes.write_varint(node.properties.len() as u64);
        for (name, value) in &node.properties {
            nodes.write_string(name);
            write_value(&mut nodes, value, &mut shared, &positions);
        }
    }

    let mut writer = Writer::with_capacity(nodes.len() + 64);
    writer.write_varint(root.metadata.len() as u64);
    for (name, value) in &root.metadata {
        writer.write_string(name);
        writer.write_string(value);
    }
    writer.write_varint(shared.entries.len() as u64);
    for entry in &shared.entries {
        writer.write_bytes_prefixed(entry);
    }
    writer.write_varint(order.len() as u64);
    writer.write_bytes(nodes.as_bytes());

    debug!(
        nodes = order.len(),
        shared = shared.entries.len(),
        bytes = writer.len(),
        "wrote binary body"
    );
    Ok(writer.into_bytes())
}

fn write_vector2(w: &mut Writer, v: Vector2) {
    w.write_f32(v.x);
    w.write_f32(v.y);
}

fn write_vector3(w: &mut Writer, v: Vector3) {
    w.write_f32(v.x);
    w.write_f32(v.y);
    w.write_f32(v.z);
}

fn write_color3(w: &mut Writer, c: Color3) {
    w.write_f32(c.r);
    w.write_f32(c.g);
    w.write_f32(c.b);
}

fn write_udim(w: &mut Writer, u: UDim) {
    w.write_f32(u.scale);
    w.write_signed_varint(u.offset as i64);
}

fn write_value(
    w: &mut Writer,
    value: &PropValue,
    shared: &mut SharedTable,
    positions: &FxHashMap<NodeId, usize>,
) {
    w.write_byte(value.value_type() as u8);
    match value {
        PropValue::String(s) | PropValue::ProtectedString(s) | PropValue::Content(s) => {
            w.write_string(s)
        }
        PropValue::BinaryString(b) => w.write_bytes_prefixed(b),
        PropValue::SharedString(b) => w.write_varint(shared.intern(b) as u64),
        PropValue::Bool(b) => w.write_bool(*b),
        PropValue::Int(n) => w.write_signed_varint(*n as i64),
        PropValue::Int64(n) => w.write_signed_varint(*n),
        PropValue::Float(f) => w.write_f32(*f),
        PropValue::Double(f) => w.write_f64(*f),
        PropValue::Token(n) | PropValue::BrickColor(n) => w.write_varint(*n as u64),
        PropValue::UDim(u) => write_udim(w, *u),
        PropValue::UDim2(u) => {
            write_udim(w, u.x);
            write_udim(w, u.y);
        }
        PropValue::Ray(r) => {
            write_vector3(w, r.origin);
            write_vector3(w, r.direction);
        }
        PropValue::Faces(f) => w.write_byte(f.bits()),
        PropValue::Axes(a) => w.write_byte(a.bits()),
        PropValue::Color3(c) => write_color3(w, *c),
        PropValue::Color3uint8(bytes) => w.write_bytes(bytes),
        PropValue::Vector2(v) => write_vector2(w, *v),
        PropValue::Vector3(v) => write_vector3(w, *v),
        PropValue::Vector2int16(v) => {
            w.write_signed_varint(v.x as i64);
            w.write_signed_varint(v.y as i64);
        }
        PropValue::Vector3int16(v) => {
            w.write_signed_varint(v.x as i64);
            w.write_signed_varint(v.y as i64);
            w.write_signed_varint(v.z as i64);
        }
        PropValue::CFrame(cf) => {
            for c in cf.components() {
                w.write_f32(c);
            }
        }
        PropValue::Rect(r) => {
            write_vector2(w, r.min);
            write_vector2(w, r.max);
        }
        PropValue::NumberRange(min, max) => {
            w.write_f32(*min);
            w.write_f32(*max);
        }
        PropValue::NumberSequence(keypoints) => {
            w.write_varint(keypoints.len() as u64);
            for k in keypoints {
                w.write_f32(k.time);
                w.write_f32(k.value);
                w.write_f32(k.envelope);
            }
        }
        PropValue::ColorSequence(keypoints) => {
            w.write_varint(keypoints.len() as u64);
            for k in keypoints {
                w.write_f32(k.time);
                write_color3(w, k.value);
                w.write_f32(k.envelope);
            }
        }
        PropValue::PhysicalProperties(p) => {
            w.write_bool(p.custom);
            w.write_f32(p.density);
            w.write_f32(p.friction);
            w.write_f32(p.elasticity);
            w.write_f32(p.friction_weight);
            w.write_f32(p.elasticity_weight);
        }
        PropValue::Reference(target) => {
            let index = target.and_then(|t| positions.get(&t)).map_or(0, |p| p + 1);
            w.write_varint(index as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_root() -> Root {
        let mut root = Root::new();
        root.set_metadata("ExplicitAutoJoints", "true");
        let mut model = Node::new("Model");
        model.reference = "RBX0".into();
        model.properties.push(("Name".into(), PropValue::String("Car".into())));
        model.properties.push(("PrimaryPart".into(), PropValue::Reference(Some(NodeId(1)))));
        let model = root.add_node(model);

        let mut part = Node::new("Part");
        part.properties.push(("Mesh".into(), PropValue::SharedString(vec![1, 2, 3])));
        part.properties.push(("Mesh2".into(), PropValue::SharedString(vec![1, 2, 3])));
        part.properties.push(("Color".into(), PropValue::Color3uint8([255, 128, 0])));
        part.properties.push(("Offset".into(), PropValue::Vector3int16(Vector3int16::new(-1, 0, 300))));
        part.properties.push((
            "CFrame".into(),
            PropValue::CFrame(CFrame::from_position(Vector3::new(1.0, 2.0, 3.0))),
        ));
        let part = root.add_node(part);
        root.nodes[model.index()].children.push(part);
        root.instances.push(model);
        root
    }

    #[test]
    fn test_round_trip() {
        let root = sample_root();
        let serializer = BinarySerializer::new(RootShape::Model);
        let bytes = serializer.serialize(&root, &FormatOptions::default()).unwrap();
        assert_eq!(&bytes[..8], MAGIC);
        assert_eq!(bytes[8], RootShape::Model as u8);
        assert_eq!(serializer.deserialize(&bytes).unwrap(), root);
    }

    #[test]
    fn test_compressed_round_trip() {
        let root = sample_root();
        let serializer = BinarySerializer::new(RootShape::Place);
        let options = FormatOptions::new().with_compression(3);
        let bytes = serializer.serialize(&root, &options).unwrap();
        assert_eq!(bytes[10] & FLAG_COMPRESSED, FLAG_COMPRESSED);
        assert_eq!(serializer.deserialize(&bytes).unwrap(), root);
    }

    #[test]
    fn test_shared_strings_deduplicated() {
        let root = sample_root();
        let body = encode_body(&root).unwrap();
        let mut reader = Reader::new(&body);
        let metadata = reader.read_len(MAX_METADATA, "metadata").unwrap();
        for _ in 0..metadata * 2 {
            reader.read_string(MAX_STRING_LEN, "metadata").unwrap();
        }
        assert_eq!(reader.read_len(MAX_SHARED_STRINGS, "shared").unwrap(), 1);
    }

    #[test]
    fn test_rejects_bad_header() {
        let serializer = BinarySerializer::new(RootShape::Place);
        assert!(matches!(
            serializer.deserialize(b"<roblox"),
            Err(DecodeError::InvalidMagic { .. })
        ));

        let mut bytes = serializer.serialize(&Root::new(), &FormatOptions::default()).unwrap();
        bytes[9] = 9;
        assert!(matches!(
            serializer.deserialize(&bytes),
            Err(DecodeError::UnsupportedVersion { version: 9 })
        ));
        bytes[8] = 7;
        assert!(matches!(
            serializer.deserialize(&bytes),
            Err(DecodeError::InvalidShape { shape: 7 })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_reference() {
        let mut root = Root::new();
        let mut node = Node::new("ObjectValue");
        node.properties.push(("Value".into(), PropValue::Reference(Some(NodeId(0)))));
        let id = root.add_node(node);
        root.instances.push(id);
        let serializer = BinarySerializer::new(RootShape::Model);
        let mut bytes = serializer.serialize(&root, &FormatOptions::default()).unwrap();

        // The reference index is the last byte of the document.
        let last = bytes.len() - 1;
        assert_eq!(bytes[last], 1);
        bytes[last] = 5;
        assert!(matches!(
            serializer.deserialize(&bytes),
            Err(DecodeError::IndexOutOfBounds { table: "nodes", index: 4, size: 1 })
        ));
    }

    #[test]
    fn test_truncated_input() {
        let serializer = BinarySerializer::new(RootShape::Model);
        let bytes = serializer.serialize(&sample_root(), &FormatOptions::default()).unwrap();
        let err = serializer.deserialize(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { .. }));
    }
}
