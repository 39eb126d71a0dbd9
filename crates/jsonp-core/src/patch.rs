//! RFC 6902 patch documents and their sequential application.
//!
//! Operations are applied one after another to the same tree; each sees the
//! effects of its predecessors. The first failure stops the patch and is
//! reported with the index of the offending operation. Nothing is rolled back.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{
    edit, ApplyError, CanonicalizeError, PatchError, PatchOptions, Path, UnknownOpPolicy, Value,
};

/// One entry of a patch document, exactly as it appears on the wire.
///
/// Unknown members are ignored. A `value` of JSON `null` counts as present.
///
/// ```
/// # use jsonp_core::PatchOperation;
/// let op: PatchOperation = serde_json::from_str(r#"{"op":"add","path":"/a","value":null,"xyz":1}"#)?;
/// assert_eq!(op, PatchOperation::add("/a", jsonp_core::Value::null()));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation name: `add`, `remove`, `replace`, `move`, `copy` or `test`.
    pub op: String,
    /// Target pointer.
    pub path: String,
    /// Operand of `add`, `replace` and `test`.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Source pointer of `move` and `copy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    fn new(op: &str, path: impl Into<String>, value: Option<Value>, from: Option<String>) -> Self {
        Self { op: op.to_owned(), path: path.into(), value, from }
    }

    /// An `add` operation.
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::new("add", path, Some(value), None)
    }

    /// A `remove` operation.
    pub fn remove(path: impl Into<String>) -> Self {
        Self::new("remove", path, None, None)
    }

    /// A `replace` operation.
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::new("replace", path, Some(value), None)
    }

    /// A `move` operation.
    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new("move", path, None, Some(from.into()))
    }

    /// A `copy` operation.
    pub fn copy_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new("copy", path, None, Some(from.into()))
    }

    /// A `test` operation.
    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::new("test", path, Some(value), None)
    }

    /// Validates the wire form and decodes its pointers.
    ///
    /// Returns `Ok(None)` when `op` is not one of the six known names.
    ///
    /// ```
    /// # use jsonp_core::{Operation, PatchError, PatchOperation};
    /// let op = PatchOperation::move_from("/a", "/b").decode()?;
    /// assert!(matches!(op, Some(Operation::Move { .. })));
    /// let unknown = PatchOperation { op: "merge".into(), path: "".into(), value: None, from: None };
    /// assert_eq!(unknown.decode()?, None);
    /// # Ok::<(), PatchError>(())
    /// ```
    pub fn decode(&self) -> Result<Option<Operation>, PatchError> {
        let operation = match self.op.as_str() {
            "add" => Operation::Add { path: self.path()?, value: self.value()? },
            "remove" => Operation::Remove { path: self.path()? },
            "replace" => Operation::Replace { path: self.path()?, value: self.value()? },
            "move" => Operation::Move { from: self.from_path()?, path: self.path()? },
            "copy" => Operation::Copy { from: self.from_path()?, path: self.path()? },
            "test" => Operation::Test { path: self.path()?, value: self.value()? },
            _ => return Ok(None),
        };
        Ok(Some(operation))
    }

    fn path(&self) -> Result<Path, PatchError> {
        Path::parse(&self.path)
    }

    fn value(&self) -> Result<Value, PatchError> {
        self.value
            .as_ref()
            .map(Value::duplicate)
            .ok_or_else(|| PatchError::MissingField { op: self.op.clone(), field: "value" })
    }

    fn from_path(&self) -> Result<Path, PatchError> {
        let from = self
            .from
            .as_deref()
            .ok_or_else(|| PatchError::MissingField { op: self.op.clone(), field: "from" })?;
        Path::parse(from)
    }
}

/// A decoded, validated operation ready to run against a tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Insert `value` at `path`.
    Add {
        /// Target.
        path: Path,
        /// Inserted value.
        value: Value,
    },
    /// Remove the node at `path`.
    Remove {
        /// Target.
        path: Path,
    },
    /// Replace the node at `path` with `value`.
    Replace {
        /// Target.
        path: Path,
        /// Replacement value.
        value: Value,
    },
    /// Relocate the node at `from` to `path`.
    Move {
        /// Source.
        from: Path,
        /// Destination.
        path: Path,
    },
    /// Insert a copy of the node at `from` at `path`.
    Copy {
        /// Source.
        from: Path,
        /// Destination.
        path: Path,
    },
    /// Check that the node at `path` equals `value`.
    Test {
        /// Target.
        path: Path,
        /// Expected value.
        value: Value,
    },
}

impl Operation {
    /// The wire name of this operation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
            Self::Move { .. } => "move",
            Self::Copy { .. } => "copy",
            Self::Test { .. } => "test",
        }
    }

    fn paths(&self) -> impl Iterator<Item = &Path> {
        let (path, from) = match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Test { path, .. } => (path, None),
            Self::Move { from, path } | Self::Copy { from, path } => (path, Some(from)),
        };
        std::iter::once(path).chain(from)
    }

    /// Runs this operation against `root`.
    pub fn apply(self, root: &mut Value) -> Result<(), PatchError> {
        match self {
            Self::Add { path, value } => edit::add(root, &path, value),
            Self::Remove { path } => edit::remove(root, &path).map(drop),
            Self::Replace { path, value } => edit::replace(root, &path, value).map(drop),
            Self::Move { from, path } => edit::move_value(root, &from, &path),
            Self::Copy { from, path } => edit::copy(root, &from, &path),
            Self::Test { path, value } => edit::test(root, &path, &value),
        }
    }
}

/// An ordered list of operations. Serializes as a plain JSON array.
///
/// ```
/// # use jsonp_core::{Patch, PatchOperation, Value};
/// let mut patch = Patch::new();
/// patch.push(PatchOperation::add("/a", Value::from(true)));
/// patch.push(PatchOperation::remove("/b"));
/// assert_eq!(
///     patch.to_json_string()?,
///     r#"[{"op":"add","path":"/a","value":true},{"op":"remove","path":"/b"}]"#
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Vec<PatchOperation>);

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a patch from operations in application order.
    pub fn from_operations<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = PatchOperation>,
    {
        Self(operations.into_iter().collect())
    }

    /// Parses a JSON patch document.
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses a patch document written in YAML.
    ///
    /// ```
    /// # use jsonp_core::Patch;
    /// let patch = Patch::from_yaml_str("- op: remove\n  path: /a\n")?;
    /// assert_eq!(patch.len(), 1);
    /// # Ok::<(), jsonp_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: PatchOperation) {
        self.0.push(operation);
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the patch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.0.iter()
    }

    /// Serializes the patch as compact JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(value: Vec<PatchOperation>) -> Self {
        Self(value)
    }
}

impl FromIterator<PatchOperation> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self::from_operations(iter)
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub(crate) fn apply_patch(
    root: &mut Value,
    patch: &Patch,
    options: &PatchOptions,
) -> Result<(), ApplyError> {
    for (index, operation) in patch.iter().enumerate() {
        let fail = |source: PatchError| ApplyError { index, op: operation.op.clone(), source };
        let Some(decoded) = operation.decode().map_err(fail)? else {
            if options.unknown_ops() == UnknownOpPolicy::Reject {
                return Err(fail(PatchError::UnknownOp { op: operation.op.clone() }));
            }
            debug!(target: "jsonp", index, op = %operation.op, "skipping unknown operation");
            continue;
        };
        if let Some(max) = options.max_path_depth() {
            check_depth(&decoded, max).map_err(fail)?;
        }
        debug!(target: "jsonp", index, op = decoded.name(), path = %operation.path, "applying operation");
        decoded.apply(root).map_err(fail)?;
    }
    Ok(())
}

fn check_depth(operation: &Operation, max: usize) -> Result<(), PatchError> {
    match operation.paths().find(|path| path.len() > max) {
        Some(path) => {
            Err(PatchError::PathTooDeep { pointer: path.to_pointer(), depth: path.len(), max })
        }
        None => Ok(()),
    }
}
