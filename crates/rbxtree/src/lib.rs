//! rbxtree: instance trees for place and model files.
//!
//! This crate converts between in-memory instance graphs and the byte-level
//! formats used for places and models, and exposes a typed value catalog
//! that a scripting host can bind to.
//!
//! # Overview
//!
//! - **Value catalog**: a closed set of property value kinds (vectors,
//!   frames, colors, sequences, ...) with constructors, members, methods and
//!   arithmetic, reachable by name through a [`ReflectorRegistry`].
//! - **Graph codec**: two-pass conversion between a [`Dom`] and an external
//!   tree, resolving forward and cyclic references after the walk.
//! - **Formats**: binary and markup serializers for both places and models,
//!   looked up by name or guessed from a path.
//!
//! # Quick Start
//!
//! ```rust
//! use rbxtree::format::{FormatRegistry, Target};
//! use rbxtree::model::{Dom, Instance, Value, Vector3, DATA_MODEL};
//!
//! let mut dom = Dom::new();
//! let game = dom.insert(
//!     Instance::new(DATA_MODEL).with_property("PlaceName", Value::String("Obby".into())),
//! );
//! let workspace = dom
//!     .insert_child(game, Instance::new("Workspace").with_service(true))
//!     .unwrap();
//! let part = dom
//!     .insert_child(
//!         workspace,
//!         Instance::new("Part").with_property("Size", Value::Vector3(Vector3::new(4.0, 1.0, 2.0))),
//!     )
//!     .unwrap();
//! dom.get_mut(workspace)
//!     .unwrap()
//!     .properties
//!     .set("PrimaryPart", Value::Instance(part));
//!
//! let registry = FormatRegistry::standard();
//! let rbxl = registry.get("rbxl").unwrap();
//! let bytes = rbxl.encode(&dom, &Target::Instance(game)).unwrap();
//!
//! let doc = rbxl.decode(&bytes).unwrap();
//! let Target::Instance(root) = doc.target else { unreachable!() };
//! let workspace = doc.dom.children(root)[0];
//! let part = doc.dom.children(workspace)[0];
//! assert_eq!(
//!     doc.dom.get(workspace).unwrap().properties.get("PrimaryPart"),
//!     Some(&Value::Instance(part)),
//! );
//! ```
//!
//! # Modules
//!
//! - [`model`]: value kinds, instances, the [`Dom`] arena and external trees
//! - [`catalog`]: dynamic host values and the reflector registry
//! - [`codec`]: graph codec, per-kind value conversion, binary primitives
//! - [`format`]: format adapters, serializers, registry and file access
//! - [`error`]: error types
//! - [`limits`]: hard limits for decoding untrusted input
//!
//! # Security
//!
//! Decoders bound every count, length and nesting depth by the constants in
//! [`limits`], and reject malformed input with descriptive errors. Dangling
//! references are dropped rather than reported.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod format;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use catalog::{Dynamic, ReflectorRegistry};
pub use codec::{decode_root, encode_root, Target};
pub use error::{DecodeError, DomError, EncodeError, FormatError, ValueError};
pub use format::{Document, Format, FormatOptions, FormatRegistry, Method, RootShape};
pub use model::{Dom, Instance, Ref, Value, ValueType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
