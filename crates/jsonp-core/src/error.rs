use thiserror::Error;

use crate::Value;

/// Errors that can occur while canonicalizing external data into [`Value`].
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no JSON counterpart.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Errors raised while resolving pointers or editing a document.
///
/// Every variant that can occur mid-traversal carries `at`, the encoded
/// pointer of the deepest prefix that was successfully traversed.
///
/// ```
/// # use jsonp_core::{edit, Path, PatchError, Value};
/// let mut doc = Value::from_json_str("{\"a\":1}")?;
/// let err = edit::add(&mut doc, &Path::parse("/a/b")?, Value::null()).unwrap_err();
/// assert_eq!(err.to_string(), "node '/a' is not an array or object");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    /// The wire pointer is neither empty nor starts with `/`.
    #[error("invalid JSON Pointer: {pointer:?}")]
    InvalidPointer {
        /// The rejected pointer text.
        pointer: String,
    },
    /// An array token was neither `-` nor a base-10 non-negative integer.
    #[error("bad format index '{token}' at '{at}'")]
    BadIndex {
        /// The offending token.
        token: String,
        /// Pointer of the array being indexed.
        at: String,
    },
    /// An array index fell outside the permitted bound.
    #[error("index '{index}' out of range '{len}' at '{at}'")]
    IndexOutOfRange {
        /// The index as written in the pointer.
        index: String,
        /// Length of the array being indexed.
        len: usize,
        /// Pointer of the array being indexed.
        at: String,
    },
    /// Navigation continued past a scalar.
    #[error("node '{at}' is not an array or object")]
    NotContainer {
        /// Pointer of the scalar node.
        at: String,
    },
    /// A required object key was absent.
    #[error("key '{key}' not found in object at '{at}'")]
    KeyNotFound {
        /// The missing key.
        key: String,
        /// Pointer of the object that lacks the key.
        at: String,
    },
    /// A `test` operation found a different value.
    #[error("test failed at '{at}': found {actual}, expected {expected}")]
    TestFailed {
        /// Pointer that was tested.
        at: String,
        /// The value found in the document.
        actual: Box<Value>,
        /// The value the operation expected.
        expected: Box<Value>,
    },
    /// A `move` tried to relocate a node into one of its own descendants.
    #[error("cannot move '{from}' into its own descendant '{path}'")]
    CyclicMove {
        /// Source pointer.
        from: String,
        /// Destination pointer.
        path: String,
    },
    /// A recognized operation lacks a field it requires.
    #[error("'{op}' operation requires a '{field}' field")]
    MissingField {
        /// The operation name.
        op: String,
        /// The missing field name.
        field: &'static str,
    },
    /// The operation name is not one of the six RFC 6902 operations.
    #[error("unknown operation '{op}'")]
    UnknownOp {
        /// The unrecognized operation name.
        op: String,
    },
    /// A decoded path exceeds the configured depth limit.
    #[error("pointer '{pointer}' has depth {depth}, exceeding the limit of {max}")]
    PathTooDeep {
        /// The offending pointer.
        pointer: String,
        /// Number of tokens in the pointer.
        depth: usize,
        /// The configured limit.
        max: usize,
    },
}

/// A patch failed part-way through.
///
/// Operations before `index` have already been applied to the target.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("operation {index} ({op}) failed")]
pub struct ApplyError {
    /// Zero-based position of the failing operation within the patch.
    pub index: usize,
    /// The `op` field of the failing operation.
    pub op: String,
    /// The underlying failure.
    #[source]
    pub source: PatchError,
}

/// Errors emitted when constructing [`PatchOptions`](crate::PatchOptions).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// A depth limit of zero would reject every pointer except the root.
    #[error("max path depth must be at least 1")]
    ZeroMaxDepth,
}
