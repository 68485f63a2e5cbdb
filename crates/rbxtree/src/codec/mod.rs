//! Conversion between instance graphs and external trees.
//!
//! [`graph`] maps a [`Dom`](crate::model::Dom) to a [`Root`](crate::model::Root)
//! and back, [`value`] converts individual property values, and
//! [`primitives`] holds the varint reader and writer used by the binary
//! serializer.

pub mod graph;
pub mod primitives;
pub mod value;

pub use graph::{decode_root, encode_root, Target};
pub use primitives::{Reader, Writer, zigzag_decode, zigzag_encode};
pub use value::{decode_value, encode_value, is_encodable};
