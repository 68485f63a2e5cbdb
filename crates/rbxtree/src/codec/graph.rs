//! Two-pass conversion between instance graphs and external trees.
//!
//! Both directions walk the tree depth-first, building one output node per
//! input node and recording the pairing in an identity map that lives only
//! for the duration of the call. Reference properties cannot be converted
//! during the walk because their target may not exist yet (forward and
//! cyclic references), so they are deferred and replayed once the walk is
//! complete. A reference whose target was never visited is dropped.

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::codec::value::{decode_value, encode_value};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_METADATA, MAX_NODES, MAX_PROPERTIES, MAX_TREE_DEPTH};
use crate::model::{Dom, Instance, Node, NodeId, PropValue, Ref, Root, Value, DATA_MODEL};

/// What to encode out of a [`Dom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single instance. A `DataModel` is encoded as a document root whose
    /// children become the top level; anything else is encoded like a
    /// one-element list.
    Instance(Ref),
    /// A flat list of top-level instances.
    Objects(Vec<Ref>),
}

fn node_name(node: &Node) -> &str {
    match node.property("Name") {
        Some(PropValue::String(name)) => name,
        _ => &node.class,
    }
}

fn child_path(dom: &Dom, parent: Ref, name: &str) -> String {
    match dom.get(parent) {
        Some(p) if !p.is_data_model() => format!("{}.{}", dom.full_name(parent), name),
        _ => name.to_string(),
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Builds an instance graph from an external tree.
///
/// Returns the DOM and its synthetic `DataModel` root. The root's children
/// are the top-level nodes in order; metadata entries become `String`
/// properties of the root. Reference properties are set after all other
/// properties of their owner.
pub fn decode_root(root: &Root) -> Result<(Dom, Ref), DecodeError> {
    if root.nodes.len() > MAX_NODES {
        return Err(DecodeError::LengthExceedsLimit {
            field: "nodes",
            len: root.nodes.len(),
            max: MAX_NODES,
        });
    }
    if root.metadata.len() > MAX_METADATA {
        return Err(DecodeError::LengthExceedsLimit {
            field: "metadata",
            len: root.metadata.len(),
            max: MAX_METADATA,
        });
    }

    let mut dom = Dom::new();
    let mut data_model = Instance::new(DATA_MODEL);
    for (name, value) in &root.metadata {
        data_model.properties.set(name.clone(), Value::String(value.clone()));
    }
    let top = dom.insert(data_model);

    let mut identity: FxHashMap<NodeId, Ref> = FxHashMap::default();
    let mut deferred: Vec<(Ref, String, Option<NodeId>)> = Vec::new();
    let mut stack: Vec<(NodeId, Ref, usize)> =
        root.instances.iter().rev().map(|id| (*id, top, 1)).collect();

    while let Some((id, parent, depth)) = stack.pop() {
        if identity.contains_key(&id) {
            warn!(node = id.index(), "node visited twice, skipping");
            continue;
        }
        if depth > MAX_TREE_DEPTH {
            return Err(DecodeError::DepthExceeded { max: MAX_TREE_DEPTH });
        }
        let node = root.node(id).ok_or(DecodeError::IndexOutOfBounds {
            table: "nodes",
            index: id.index(),
            size: root.nodes.len(),
        })?;
        if node.properties.len() > MAX_PROPERTIES {
            return Err(DecodeError::LengthExceedsLimit {
                field: "properties",
                len: node.properties.len(),
                max: MAX_PROPERTIES,
            });
        }
        trace!(node = id.index(), class = %node.class, depth, "decoding node");

        let mut inst = Instance::new(node.class.clone())
            .with_service(node.is_service)
            .with_reference(node.reference.clone());
        let mut refs = Vec::new();
        for (name, value) in &node.properties {
            match value {
                PropValue::Reference(target) => refs.push((name.clone(), *target)),
                other => {
                    let value = decode_value(other.clone()).map_err(|source| DecodeError::Property {
                        path: child_path(&dom, parent, node_name(node)),
                        property: name.clone(),
                        source,
                    })?;
                    inst.properties.set(name.clone(), value);
                }
            }
        }

        let r = dom
            .insert_child(parent, inst)
            .map_err(|_| DecodeError::InvalidParent { index: id.index() })?;
        identity.insert(id, r);
        deferred.extend(refs.into_iter().map(|(name, target)| (r, name, target)));
        stack.extend(node.children.iter().rev().map(|c| (*c, r, depth + 1)));
    }

    let total = deferred.len();
    let mut dropped = 0;
    for (owner, name, target) in deferred {
        match target.and_then(|t| identity.get(&t)) {
            Some(resolved) => {
                if let Some(inst) = dom.get_mut(owner) {
                    inst.properties.set(name, Value::Instance(*resolved));
                }
            }
            None => {
                dropped += 1;
                debug!(owner = %owner, property = %name, "dropping unresolved reference");
            }
        }
    }

    debug!(
        instances = identity.len(),
        references = total,
        dropped,
        "decoded instance graph"
    );
    Ok((dom, top))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Builds an external tree from an instance graph.
///
/// References to instances outside the encoded subtrees are dropped. For a
/// `DataModel` target, metadata is taken from the root's string-like
/// properties; its other properties are not exported.
pub fn encode_root(dom: &Dom, target: &Target) -> Result<Root, EncodeError> {
    let mut root = Root::new();
    let top: Vec<Ref> = match target {
        Target::Instance(r) => {
            let inst = dom.get(*r).ok_or_else(|| EncodeError::MissingInstance {
                path: r.to_string(),
            })?;
            if inst.is_data_model() {
                for (name, value) in inst.properties.iter() {
                    match value.as_stringlike() {
                        Some(s) => root.set_metadata(name, s),
                        None => trace!(property = name, "skipping non-string root property"),
                    }
                }
                inst.children().to_vec()
            } else {
                vec![*r]
            }
        }
        Target::Objects(list) => list.clone(),
    };

    let mut identity: FxHashMap<Ref, NodeId> = FxHashMap::default();
    let mut deferred: Vec<(NodeId, String, Ref)> = Vec::new();
    let mut stack: Vec<(Ref, Option<NodeId>, usize)> =
        top.iter().rev().map(|r| (*r, None, 1)).collect();

    while let Some((r, parent, depth)) = stack.pop() {
        if identity.contains_key(&r) {
            warn!(instance = %r, "instance visited twice, skipping");
            continue;
        }
        if depth > MAX_TREE_DEPTH {
            return Err(EncodeError::DepthExceeded { max: MAX_TREE_DEPTH });
        }
        let inst = dom.get(r).ok_or_else(|| EncodeError::MissingInstance {
            path: r.to_string(),
        })?;
        trace!(instance = %r, class = %inst.class_name, depth, "encoding instance");

        let mut node = Node::new(inst.class_name.clone());
        node.is_service = inst.is_service;
        node.reference = inst.reference.clone();
        for (name, value) in inst.properties.iter() {
            let prop = match value {
                Value::Instance(target) => {
                    deferred.push((NodeId(root.nodes.len() as u32), name.to_string(), *target));
                    PropValue::Reference(None)
                }
                other => encode_value(other).map_err(|source| EncodeError::Property {
                    path: dom.full_name(r),
                    property: name.to_string(),
                    source,
                })?,
            };
            node.properties.push((name.to_string(), prop));
        }

        let id = root.add_node(node);
        match parent.and_then(|p| root.node_mut(p)) {
            Some(p) => p.children.push(id),
            None => root.instances.push(id),
        }
        identity.insert(r, id);
        stack.extend(inst.children().iter().rev().map(|c| (*c, Some(id), depth + 1)));
    }

    let total = deferred.len();
    let mut dropped = 0;
    for (owner, name, target) in deferred {
        let resolved = identity.get(&target).copied();
        let Some(node) = root.node_mut(owner) else { continue };
        match resolved {
            Some(id) => {
                if let Some(slot) = node.properties.iter_mut().find(|(n, _)| *n == name) {
                    slot.1 = PropValue::Reference(Some(id));
                }
            }
            None => {
                dropped += 1;
                node.properties.retain(|(n, _)| *n != name);
                debug!(target = %target, property = %name, "dropping reference leaving the subtree");
            }
        }
    }

    debug!(
        nodes = root.nodes.len(),
        references = total,
        dropped,
        "encoded instance graph"
    );
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::model::{structurally_equal, NumberSequenceKeypoint, Vector3};

    fn named(class: &str, name: &str) -> Node {
        let mut node = Node::new(class);
        node.properties.push(("Name".into(), PropValue::String(name.into())));
        node
    }

    fn link(root: &mut Root, parent: NodeId, child: NodeId) {
        root.nodes[parent.index()].children.push(child);
    }

    #[test]
    fn test_decode_metadata_becomes_root_properties() {
        let mut root = Root::new();
        root.set_metadata("ExplicitAutoJoints", "true");
        let (dom, top) = decode_root(&root).unwrap();
        let data_model = dom.get(top).unwrap();
        assert!(data_model.is_data_model());
        assert_eq!(
            data_model.properties.get("ExplicitAutoJoints"),
            Some(&Value::String("true".into()))
        );
    }

    #[test]
    fn test_decode_forward_reference() {
        let mut root = Root::new();
        let mut model = named("Model", "Car");
        model.properties.push(("PrimaryPart".into(), PropValue::Reference(Some(NodeId(1)))));
        let model = root.add_node(model);
        let part = root.add_node(named("Part", "Body"));
        link(&mut root, model, part);
        root.instances.push(model);

        let (dom, top) = decode_root(&root).unwrap();
        let model = dom.children(top)[0];
        let part = dom.children(model)[0];
        assert_eq!(
            dom.get(model).unwrap().properties.get("PrimaryPart"),
            Some(&Value::Instance(part))
        );
    }

    #[test]
    fn test_decode_cyclic_references() {
        let mut root = Root::new();
        let mut a = named("ObjectValue", "A");
        a.properties.push(("Value".into(), PropValue::Reference(Some(NodeId(1)))));
        let mut b = named("ObjectValue", "B");
        b.properties.push(("Value".into(), PropValue::Reference(Some(NodeId(0)))));
        let a = root.add_node(a);
        let b = root.add_node(b);
        root.instances = vec![a, b];

        let (dom, top) = decode_root(&root).unwrap();
        let [ra, rb] = [dom.children(top)[0], dom.children(top)[1]];
        assert_eq!(dom.get(ra).unwrap().properties.get("Value"), Some(&Value::Instance(rb)));
        assert_eq!(dom.get(rb).unwrap().properties.get("Value"), Some(&Value::Instance(ra)));
    }

    #[test]
    fn test_decode_drops_null_and_unvisited_references() {
        let mut root = Root::new();
        let mut node = named("ObjectValue", "A");
        node.properties.push(("Null".into(), PropValue::Reference(None)));
        node.properties.push(("Orphan".into(), PropValue::Reference(Some(NodeId(1)))));
        let a = root.add_node(node);
        root.add_node(named("Part", "NotInTree"));
        root.instances.push(a);

        let (dom, top) = decode_root(&root).unwrap();
        let props = &dom.get(dom.children(top)[0]).unwrap().properties;
        assert!(!props.contains("Null"));
        assert!(!props.contains("Orphan"));
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn test_decode_skips_revisited_node() {
        let mut root = Root::new();
        let a = root.add_node(named("Folder", "A"));
        let b = root.add_node(named("Folder", "B"));
        link(&mut root, a, b);
        link(&mut root, b, a);
        root.instances = vec![a, a];

        let (dom, top) = decode_root(&root).unwrap();
        assert_eq!(dom.len(), 3);
        assert_eq!(dom.children(top).len(), 1);
    }

    #[test]
    fn test_decode_error_names_path_and_property() {
        let mut root = Root::new();
        let model = root.add_node(named("Model", "Fx"));
        let mut emitter = named("ParticleEmitter", "Sparks");
        emitter.properties.push((
            "Size".into(),
            PropValue::NumberSequence(vec![
                NumberSequenceKeypoint::new(0.1, 5.0, 0.0),
                NumberSequenceKeypoint::new(1.0, 2.0, 0.0),
            ]),
        ));
        let emitter = root.add_node(emitter);
        link(&mut root, model, emitter);
        root.instances.push(model);

        let err = decode_root(&root).unwrap_err();
        assert!(matches!(
            &err,
            DecodeError::Property { path, property, source: ValueError::Validation { .. } }
                if path == "Fx.Sparks" && property == "Size"
        ));
    }

    #[test]
    fn test_decode_rejects_missing_node() {
        let mut root = Root::new();
        root.instances.push(NodeId(3));
        assert!(matches!(
            decode_root(&root),
            Err(DecodeError::IndexOutOfBounds { table: "nodes", index: 3, size: 0 })
        ));
    }

    fn sample_dom() -> (Dom, Ref, Ref, Ref) {
        let mut dom = Dom::new();
        let game = dom.insert(
            Instance::new(DATA_MODEL)
                .with_property("PlaceName", Value::String("Test".into()))
                .with_property("Binary", Value::BinaryString(vec![0xff]))
                .with_property("Version", Value::Int(3)),
        );
        let workspace = dom
            .insert_child(game, Instance::new("Workspace").with_service(true))
            .unwrap();
        let part = dom
            .insert_child(
                workspace,
                Instance::new("Part")
                    .with_property("Name", Value::String("Brick".into()))
                    .with_property("Size", Value::Vector3(Vector3::new(4.0, 1.0, 2.0))),
            )
            .unwrap();
        dom.get_mut(workspace)
            .unwrap()
            .properties
            .set("Current", Value::Instance(part));
        (dom, game, workspace, part)
    }

    #[test]
    fn test_encode_data_model_metadata() {
        let (dom, game, _, _) = sample_dom();
        let root = encode_root(&dom, &Target::Instance(game)).unwrap();
        assert_eq!(root.metadata, vec![("PlaceName".to_string(), "Test".to_string())]);
        assert_eq!(root.instances.len(), 1);
        assert_eq!(root.node(root.instances[0]).unwrap().class, "Workspace");
    }

    #[test]
    fn test_encode_drops_references_leaving_subtree() {
        let (mut dom, _, workspace, part) = sample_dom();
        dom.get_mut(part)
            .unwrap()
            .properties
            .set("Owner", Value::Instance(workspace));
        let root = encode_root(&dom, &Target::Instance(part)).unwrap();
        let node = root.node(root.instances[0]).unwrap();
        assert!(node.property("Owner").is_none());
        assert!(node.property("Size").is_some());
    }

    #[test]
    fn test_bare_instance_encodes_like_single_element_list() {
        let (dom, _, workspace, _) = sample_dom();
        let single = encode_root(&dom, &Target::Instance(workspace)).unwrap();
        let list = encode_root(&dom, &Target::Objects(vec![workspace])).unwrap();
        assert_eq!(single, list);
    }

    #[test]
    fn test_encode_unencodable_names_property() {
        let (mut dom, _, _, part) = sample_dom();
        dom.get_mut(part).unwrap().properties.set(
            "Bounds",
            Value::Region3(crate::model::Region3::new(Vector3::default(), Vector3::default())),
        );
        let err = encode_root(&dom, &Target::Instance(part)).unwrap_err();
        assert_eq!(
            err,
            EncodeError::Property {
                path: "Workspace.Brick".into(),
                property: "Bounds".into(),
                source: ValueError::Unencodable { kind: "Region3" },
            }
        );
    }

    #[test]
    fn test_graph_round_trip() {
        let (dom, game, workspace, _) = sample_dom();
        let root = encode_root(&dom, &Target::Instance(game)).unwrap();
        let (decoded, top) = decode_root(&root).unwrap();
        let decoded_workspace = decoded.children(top)[0];
        assert!(structurally_equal(&dom, workspace, &decoded, decoded_workspace));
    }
}
