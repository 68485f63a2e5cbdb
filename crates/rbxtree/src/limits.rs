//! Hard limits applied while decoding untrusted documents.

/// Maximum bytes in a varint (64-bit value).
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum length of a string property, class name or metadata entry.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Maximum length of a binary property payload.
pub const MAX_BYTES_LEN: usize = 64 * 1024 * 1024;

/// Maximum number of instances in one document.
pub const MAX_NODES: usize = 4_000_000;

/// Maximum number of properties on one instance.
pub const MAX_PROPERTIES: usize = 4096;

/// Maximum number of metadata entries in one document.
pub const MAX_METADATA: usize = 4096;

/// Maximum number of entries in the shared string table.
pub const MAX_SHARED_STRINGS: usize = 1_000_000;

/// Maximum number of keypoints in a number or color sequence.
pub const MAX_KEYPOINTS: usize = 1024;

/// Maximum nesting depth of the instance tree.
pub const MAX_TREE_DEPTH: usize = 1024;

/// Maximum size of a (decompressed) binary document.
pub const MAX_DOCUMENT_SIZE: usize = 512 * 1024 * 1024;

/// Binary container magic.
pub const MAGIC: &[u8; 8] = b"<roblox!";

/// Current binary container version.
pub const FORMAT_VERSION: u8 = 1;

/// Markup document version attribute written on output.
pub const MARKUP_VERSION: &str = "4";
