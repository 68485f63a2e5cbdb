//! Error types for the value catalog, the graph codec and the format layer.

use thiserror::Error;

use crate::catalog::Arity;
use crate::model::Ref;

/// Error raised by the value catalog: conversions from dynamic values,
/// constructors, validation and file encoding of a single value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("{expected} expected, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("bad argument #{index} to {kind}.{constructor}: {expected} expected, got {found}")]
    BadArgument {
        kind: &'static str,
        constructor: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{kind}.{constructor}: expected {accepted} arguments, got {got}")]
    Arity {
        kind: &'static str,
        constructor: &'static str,
        accepted: Arity,
        got: usize,
    },

    #[error("invalid {kind}: {reason}")]
    Validation {
        kind: &'static str,
        reason: &'static str,
    },

    #[error("cannot encode value of type {kind}")]
    Unencodable { kind: &'static str },

    #[error("{kind} has no member {member:?}")]
    UnknownMember { kind: &'static str, member: String },

    #[error("attempt to perform arithmetic ({op}) on {lhs} and {rhs}")]
    Arithmetic {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("unknown type {name:?}")]
    UnknownType { name: String },
}

impl ValueError {
    /// Returns true for the error kinds that signal a malformed value rather
    /// than a wrong call shape.
    pub fn is_validation(&self) -> bool {
        matches!(self, ValueError::Validation { .. })
    }
}

/// Error from structural edits of a [`Dom`](crate::model::Dom).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomError {
    #[error("instance {0} is not part of the DOM")]
    Missing(Ref),

    #[error("cannot parent {child} to {parent}: would create a cycle")]
    Cycle { child: Ref, parent: Ref },
}

/// Error while turning bytes into an instance graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid magic bytes: found {found:?}")]
    InvalidMagic { found: Vec<u8> },

    #[error("unsupported version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("invalid root shape: {shape}")]
    InvalidShape { shape: u8 },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("invalid value type tag: {tag}")]
    InvalidValueType { tag: u8 },

    #[error("{table} index {index} out of bounds (size: {size})")]
    IndexOutOfBounds {
        table: &'static str,
        index: usize,
        size: usize,
    },

    #[error("node {index} is listed under more than one parent")]
    InvalidParent { index: usize },

    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },

    #[error("tree depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("{path}.{property}: {source}")]
    Property {
        path: String,
        property: String,
        source: ValueError,
    },
}

/// Error while turning an instance graph into bytes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{path}.{property}: {source}")]
    Property {
        path: String,
        property: String,
        source: ValueError,
    },

    #[error("instance {path} is not part of the DOM")]
    MissingInstance { path: String },

    #[error("tree depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),

    #[error("markup writer failed: {0}")]
    Markup(String),
}

/// Error from the format adapters, the registry and the file source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("format {name:?} is not registered")]
    NotRegistered { name: String },

    #[error("cannot guess format from {path:?}")]
    CannotGuess { path: String },

    #[error("{format}: cannot encode value of type {found}")]
    CannotEncode { format: String, found: &'static str },

    #[error("{format}: {source}")]
    Decode { format: String, source: DecodeError },

    #[error("{format}: {source}")]
    Encode { format: String, source: EncodeError },

    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

impl FormatError {
    /// Returns the name of the format the error is attributed to, if any.
    pub fn format_name(&self) -> Option<&str> {
        match self {
            FormatError::CannotEncode { format, .. }
            | FormatError::Decode { format, .. }
            | FormatError::Encode { format, .. } => Some(format),
            FormatError::NotRegistered { name } => Some(name),
            FormatError::CannotGuess { .. } | FormatError::Io { .. } => None,
        }
    }
}
