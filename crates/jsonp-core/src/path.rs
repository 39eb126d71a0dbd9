//! Paths and their RFC 6901 JSON Pointer encoding.
//!
//! A [`Path`] holds raw, unescaped tokens. Its wire form is a pointer string
//! where every token is prefixed with `/`, `~` is written as `~0` and `/` as
//! `~1`. The empty path is the document root and encodes to `""`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PatchError;

/// Escapes a single token for use inside a pointer.
///
/// `~` must be replaced before `/`, otherwise the `~` introduced by `~1`
/// would be escaped a second time.
///
/// ```
/// # use jsonp_core::escape_token;
/// assert_eq!(escape_token("a/b~c"), "a~1b~0c");
/// ```
#[must_use]
pub fn escape_token(token: &str) -> String {
    if !token.contains(['~', '/']) {
        return token.to_owned();
    }
    token.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_token`].
///
/// ```
/// # use jsonp_core::unescape_token;
/// assert_eq!(unescape_token("~01"), "~1");
/// assert_eq!(unescape_token("a~1b"), "a/b");
/// ```
#[must_use]
pub fn unescape_token(fragment: &str) -> String {
    if !fragment.contains('~') {
        return fragment.to_owned();
    }
    fragment.replace("~1", "/").replace("~0", "~")
}

/// Encodes raw tokens as a JSON Pointer.
///
/// ```
/// # use jsonp_core::to_pointer;
/// assert_eq!(to_pointer::<&str>(&[]), "");
/// assert_eq!(to_pointer(&["foo".to_string(), "".to_string()]), "/foo/");
/// ```
#[must_use]
pub fn to_pointer<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut pointer = String::new();
    for token in tokens {
        pointer.push('/');
        pointer.push_str(&escape_token(token.as_ref()));
    }
    pointer
}

/// Decodes a JSON Pointer into a [`Path`].
///
/// ```
/// # use jsonp_core::{to_path, PatchError};
/// assert!(to_path("")?.is_empty());
/// assert_eq!(to_path("/a~1b/0")?.tokens(), ["a/b", "0"]);
/// assert!(matches!(to_path("a"), Err(PatchError::InvalidPointer { .. })));
/// # Ok::<(), PatchError>(())
/// ```
pub fn to_path(pointer: &str) -> Result<Path, PatchError> {
    if pointer.is_empty() {
        return Ok(Path::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer { pointer: pointer.to_owned() });
    };
    Ok(Path(rest.split('/').map(unescape_token).collect()))
}

/// An ordered sequence of raw tokens describing a descent from the root.
///
/// ```
/// # use jsonp_core::Path;
/// let path = Path::new().with_token("foo").with_token("0");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_pointer(), "/foo/0");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The path of the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses an RFC 6901 pointer. Equivalent to [`to_path`].
    pub fn parse(pointer: &str) -> Result<Self, PatchError> {
        to_path(pointer)
    }

    /// Appends a token, returning the extended path.
    #[must_use]
    pub fn with_token<S>(mut self, token: S) -> Self
    where
        S: Into<String>,
    {
        self.0.push(token.into());
        self
    }

    /// Returns the raw tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the final token, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns the path without its final token, or `None` for the root.
    ///
    /// ```
    /// # use jsonp_core::Path;
    /// let path = Path::parse("/a/b")?;
    /// assert_eq!(path.parent().unwrap().to_pointer(), "/a");
    /// assert!(Path::root().parent().is_none());
    /// # Ok::<(), jsonp_core::PatchError>(())
    /// ```
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Indicates whether `self` is a strict ancestor of `other`.
    ///
    /// ```
    /// # use jsonp_core::Path;
    /// let a = Path::parse("/a")?;
    /// assert!(a.is_prefix_of(&Path::parse("/a/b")?));
    /// assert!(!a.is_prefix_of(&a));
    /// assert!(!a.is_prefix_of(&Path::parse("/ab")?));
    /// # Ok::<(), jsonp_core::PatchError>(())
    /// ```
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.len() < other.len() && other.0.starts_with(&self.0)
    }

    /// Encodes this path as a pointer string.
    #[must_use]
    pub fn to_pointer(&self) -> String {
        to_pointer(&self.0)
    }

    /// Consumes the path and returns the owned tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<String> {
        self.0
    }

    /// Pushes a token in-place.
    pub fn push<S>(&mut self, token: S)
    where
        S: Into<String>,
    {
        self.0.push(token.into());
    }

    /// Pops the last token off the path.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }
}

/// Pointer of the first `depth` tokens of `tokens`, used for error context.
pub(crate) fn prefix_pointer(tokens: &[String], depth: usize) -> String {
    to_pointer(&tokens[..depth.min(tokens.len())])
}

impl From<Vec<String>> for Path {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<S> FromIterator<S> for Path
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl FromStr for Path {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_path(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_str("/")?;
            f.write_str(&escape_token(token))?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_pointer())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = Path;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON Pointer string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                to_path(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Path {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, prelude::*};

    #[test]
    fn root_pointer_is_empty_string() {
        assert_eq!(Path::root().to_pointer(), "");
        assert_eq!(to_path("").unwrap(), Path::root());
    }

    #[test]
    fn slash_alone_is_single_empty_token() {
        assert_eq!(to_path("/").unwrap().tokens(), [""]);
        assert_eq!(to_path("//").unwrap().tokens(), ["", ""]);
    }

    #[test]
    fn rejects_pointer_without_leading_slash() {
        let err = to_path("foo/bar").unwrap_err();
        assert_eq!(err, PatchError::InvalidPointer { pointer: "foo/bar".into() });
        assert_eq!(err.to_string(), "invalid JSON Pointer: \"foo/bar\"");
    }

    #[test]
    fn unescape_order_avoids_double_decoding() {
        assert_eq!(to_path("/~01").unwrap().tokens(), ["~1"]);
        assert_eq!(to_path("/~10").unwrap().tokens(), ["/0"]);
        assert_eq!(to_pointer(&["~1"]), "/~01");
    }

    #[test]
    fn display_matches_pointer() {
        let path: Path = ["m~n", "a/b", "0"].into_iter().collect();
        assert_eq!(path.to_string(), "/m~0n/a~1b/0");
        assert_eq!(path.to_string(), path.to_pointer());
    }

    #[test]
    fn serde_uses_pointer_strings() {
        let path = Path::new().with_token("foo").with_token("a/b");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/foo/a~1b\"");
        let decoded: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, path);
        assert!(serde_json::from_str::<Path>("\"nope\"").is_err());
    }

    proptest! {
        #[test]
        fn pointer_roundtrip(tokens in vec("[a-z~/0-9]{0,6}", 0..5)) {
            let path = Path::from(tokens.clone());
            let decoded = to_path(&path.to_pointer()).unwrap();
            prop_assert_eq!(decoded.into_tokens(), tokens);
        }
    }
}
