//! Data model types.
//!
//! This module contains the in-memory object model:
//! - Value kinds (geometry, colors, sequences) and the closed [`Value`] enum
//! - Instances and the [`Dom`] arena that owns them
//! - The generic external tree exchanged with serializers
//! - Structural comparison of subtrees

pub mod color;
pub mod compare;
pub mod instance;
pub mod sequence;
pub mod tree;
pub mod types;
pub mod value;

pub use color::{BrickColor, Color3, Color3uint8};
pub use compare::structurally_equal;
pub use instance::{Dom, Instance, Properties, Ref, DATA_MODEL};
pub use sequence::{ColorSequence, ColorSequenceKeypoint, NumberSequence, NumberSequenceKeypoint};
pub use tree::{Node, NodeId, PropValue, Root};
pub use types::{
    Axes, CFrame, Faces, NumberRange, PhysicalProperties, Ray, Rect, Region3, UDim, UDim2,
    Vector2, Vector2int16, Vector3, Vector3int16, AXIS_NAMES, FACE_NAMES,
};
pub use value::{Value, ValueType};
