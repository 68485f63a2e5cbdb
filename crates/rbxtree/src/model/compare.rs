//! Structural equality of instance subtrees, possibly across two DOMs.

use rustc_hash::FxHashMap;

use crate::model::{Dom, Ref, Value};

/// Compares the subtree at `a` in `a_dom` with the subtree at `b` in `b_dom`.
///
/// Two subtrees are equal when their shapes match child by child and every
/// pair of corresponding instances has the same class, service flag and
/// property set. Reference ids are ignored. Non-reference values compare
/// with catalog equality; a reference property matches when both sides
/// point at corresponding instances, or both point outside their subtree
/// at the same handle.
pub fn structurally_equal(a_dom: &Dom, a: Ref, b_dom: &Dom, b: Ref) -> bool {
    let mut map: FxHashMap<Ref, Ref> = FxHashMap::default();
    if !pair_shapes(a_dom, a, b_dom, b, &mut map) {
        return false;
    }
    let reverse: FxHashMap<Ref, Ref> = map.iter().map(|(k, v)| (*v, *k)).collect();

    map.iter().all(|(ra, rb)| {
        let (Some(ia), Some(ib)) = (a_dom.get(*ra), b_dom.get(*rb)) else {
            return false;
        };
        if ia.properties.len() != ib.properties.len() {
            return false;
        }
        ia.properties.iter().all(|(name, va)| {
            let Some(vb) = ib.properties.get(name) else {
                return false;
            };
            match (va, vb) {
                (Value::Instance(ta), Value::Instance(tb)) => match map.get(ta) {
                    Some(mapped) => mapped == tb,
                    None => !reverse.contains_key(tb) && ta == tb,
                },
                _ => va == vb,
            }
        })
    })
}

fn pair_shapes(a_dom: &Dom, a: Ref, b_dom: &Dom, b: Ref, map: &mut FxHashMap<Ref, Ref>) -> bool {
    let mut stack = vec![(a, b)];
    while let Some((ra, rb)) = stack.pop() {
        let (Some(ia), Some(ib)) = (a_dom.get(ra), b_dom.get(rb)) else {
            return false;
        };
        if ia.class_name != ib.class_name
            || ia.is_service != ib.is_service
            || ia.children().len() != ib.children().len()
        {
            return false;
        }
        if map.insert(ra, rb).is_some() {
            return false;
        }
        stack.extend(ia.children().iter().copied().zip(ib.children().iter().copied()));
    }
    true
}
