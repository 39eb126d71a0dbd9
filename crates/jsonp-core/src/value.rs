use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{
    navigate, patch, ApplyError, CanonicalizeError, Number, Patch, PatchError, PatchOptions, Path,
};

/// A leaf value. The engine never looks inside scalars; it only compares them.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number represented as IEEE-754 double precision.
    Number(Number),
    /// JSON string.
    String(String),
}

/// The three node shapes a document tree is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A string-keyed mapping.
    Object,
    /// An ordered sequence.
    Array,
    /// Any leaf.
    Scalar,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Array => f.write_str("array"),
            Self::Scalar => f.write_str("scalar"),
        }
    }
}

/// A JSON document tree.
///
/// Objects keep their keys sorted so output is deterministic; equality is
/// structural and ignores the order in which keys were inserted.
///
/// ```
/// # use jsonp_core::{Kind, Value};
/// let doc = Value::from_json_str("{\"b\":[1,2],\"a\":null}")?;
/// assert_eq!(doc.kind(), Kind::Object);
/// assert_eq!(doc.to_string(), "{\"a\":null,\"b\":[1,2]}");
/// # Ok::<(), jsonp_core::CanonicalizeError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum Value {
    /// JSON object.
    Object(BTreeMap<String, Value>),
    /// JSON array.
    Array(Vec<Value>),
    /// Any non-container value.
    Scalar(Scalar),
}

impl Value {
    /// Creates an empty object.
    #[must_use]
    pub fn object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Creates an empty array.
    #[must_use]
    pub fn array() -> Self {
        Self::Array(Vec::new())
    }

    /// Creates JSON `null`.
    #[must_use]
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Returns the shape of this node.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Object(_) => Kind::Object,
            Self::Array(_) => Kind::Array,
            Self::Scalar(_) => Kind::Scalar,
        }
    }

    /// Indicates whether this node is an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Indicates whether this node is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Indicates whether this node is a scalar.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns the entries of an object node.
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the elements of an array node.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the leaf of a scalar node.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Produces a deep copy that shares nothing with `self`.
    ///
    /// ```
    /// # use jsonp_core::{edit, Path, Value};
    /// let original = Value::from_json_str("{\"list\":[1]}")?;
    /// let mut copy = original.duplicate();
    /// edit::add(&mut copy, &Path::parse("/list/-")?, Value::null())?;
    /// assert_eq!(original.to_string(), "{\"list\":[1]}");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::Object(map) => {
                Self::Object(map.iter().map(|(k, v)| (k.clone(), v.duplicate())).collect())
            }
            Self::Array(items) => Self::Array(items.iter().map(Self::duplicate).collect()),
            Self::Scalar(scalar) => Self::Scalar(scalar.clone()),
        }
    }

    /// Parses a JSON string into a document tree.
    ///
    /// ```
    /// # use jsonp_core::Value;
    /// let doc = Value::from_json_str("{\"hello\":\"world\"}")?;
    /// assert!(doc.is_object());
    /// # Ok::<(), jsonp_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Parses a YAML string into a document tree.
    ///
    /// ```
    /// # use jsonp_core::Value;
    /// let doc = Value::from_yaml_str("---\nanswer: 42\n")?;
    /// assert!(doc.is_object());
    /// # Ok::<(), jsonp_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value into a [`Value`].
    pub fn from_json_value(value: JsonValue) -> Result<Self, CanonicalizeError> {
        match value {
            JsonValue::Null => Ok(Self::null()),
            JsonValue::Bool(v) => Ok(Self::Scalar(Scalar::Bool(v))),
            JsonValue::Number(num) => Ok(Self::Scalar(Scalar::Number(Number::from_json_number(&num)?))),
            JsonValue::String(s) => Ok(Self::Scalar(Scalar::String(s))),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = BTreeMap::new();
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, CanonicalizeError> {
        match value {
            YamlValue::Null => Ok(Self::null()),
            YamlValue::Bool(v) => Ok(Self::Scalar(Scalar::Bool(v))),
            YamlValue::Number(num) => {
                if let Some(f) = num.as_f64() {
                    return Ok(Self::Scalar(Scalar::Number(Number::new(f)?)));
                }
                Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() })
            }
            YamlValue::String(s) => Ok(Self::Scalar(Scalar::String(s))),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Array(items))
            }
            YamlValue::Mapping(map) => {
                let mut object = BTreeMap::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(CanonicalizeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::Object(object))
            }
            YamlValue::Tagged(tagged) => {
                Err(CanonicalizeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Converts the tree into a serde JSON value.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Scalar(Scalar::Null) => JsonValue::Null,
            Self::Scalar(Scalar::Bool(v)) => JsonValue::Bool(*v),
            Self::Scalar(Scalar::Number(n)) => JsonValue::Number(n.to_json_number()),
            Self::Scalar(Scalar::String(s)) => JsonValue::String(s.clone()),
            Self::Array(values) => JsonValue::Array(values.iter().map(Self::to_json_value).collect()),
            Self::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json_value());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Resolves `path`, returning `None` when only the final object key is absent.
    pub fn get(&self, path: &Path) -> Result<Option<&Value>, PatchError> {
        navigate::resolve(self, path)
    }

    /// Resolves an RFC 6901 pointer against this tree.
    ///
    /// ```
    /// # use jsonp_core::Value;
    /// let doc = Value::from_json_str("{\"a/b\":[10,20]}")?;
    /// let found = doc.get_by_pointer("/a~1b/1")?.expect("present");
    /// assert_eq!(found.to_string(), "20");
    /// assert!(doc.get_by_pointer("/missing")?.is_none());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_by_pointer(&self, pointer: &str) -> Result<Option<&Value>, PatchError> {
        let path = Path::parse(pointer)?;
        navigate::resolve(self, &path)
    }

    /// Visits every node in pre-order. See [`navigate::walk`].
    pub fn walk<F>(&self, f: F)
    where
        F: FnMut(&Path, &Value),
    {
        navigate::walk(self, f);
    }

    /// Applies a patch to a duplicate of this tree using default options.
    ///
    /// The receiver is never modified, so a failed patch leaves it intact.
    ///
    /// ```
    /// # use jsonp_core::{Patch, Value};
    /// let doc = Value::from_json_str("{\"foo\":\"bar\"}")?;
    /// let patch = Patch::from_json_str("[{\"op\":\"add\",\"path\":\"/baz\",\"value\":\"qux\"}]")?;
    /// let patched = doc.apply_patch(&patch)?;
    /// assert_eq!(patched.to_string(), "{\"baz\":\"qux\",\"foo\":\"bar\"}");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_patch(&self, patch: &Patch) -> Result<Self, ApplyError> {
        self.apply_patch_with(patch, &PatchOptions::default())
    }

    /// Applies a patch to a duplicate of this tree using the given options.
    ///
    /// Options are validated on construction, so a depth limit here is
    /// always at least 1.
    pub fn apply_patch_with(&self, patch: &Patch, options: &PatchOptions) -> Result<Self, ApplyError> {
        let mut target = self.duplicate();
        patch::apply_patch(&mut target, patch, options)?;
        Ok(target)
    }

    /// Applies a patch directly to this tree.
    ///
    /// On failure the operations preceding the failing one stay applied.
    pub fn apply_patch_in_place(&mut self, patch: &Patch, options: &PatchOptions) -> Result<(), ApplyError> {
        patch::apply_patch(self, patch, options)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_value())
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = CanonicalizeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        value.to_json_value()
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Scalar(Scalar::Number(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_owned()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Object(value)
    }
}
