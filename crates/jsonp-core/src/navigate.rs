//! Read-only resolution of paths against a document tree.

use tracing::trace;

use crate::{path::prefix_pointer, to_pointer, PatchError, Path, Value};

/// Resolves `path` against `root`.
///
/// A missing object key at the final step yields `Ok(None)`, mirroring map
/// lookup. A missing key with tokens still to go is [`PatchError::KeyNotFound`].
///
/// ```
/// # use jsonp_core::{navigate, Path, Value};
/// let doc = Value::from_json_str("{\"foo\":[\"bar\",\"baz\"]}")?;
/// let found = navigate::resolve(&doc, &Path::parse("/foo/1")?)?;
/// assert_eq!(found.map(ToString::to_string).as_deref(), Some("\"baz\""));
/// assert!(navigate::resolve(&doc, &Path::parse("/nope")?)?.is_none());
/// assert!(navigate::resolve(&doc, &Path::parse("/nope/deeper")?).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Result<Option<&'a Value>, PatchError> {
    let tokens = path.tokens();
    let mut current = root;
    for (depth, token) in tokens.iter().enumerate() {
        let is_last = depth + 1 == tokens.len();
        current = match current {
            Value::Object(map) => match map.get(token) {
                Some(child) => child,
                None if is_last => return Ok(None),
                None => {
                    return Err(PatchError::KeyNotFound {
                        key: token.clone(),
                        at: prefix_pointer(tokens, depth),
                    });
                }
            },
            Value::Array(items) => {
                let index = array_index(items.len(), tokens, depth, false)?;
                &items[index]
            }
            Value::Scalar(_) => {
                return Err(PatchError::NotContainer { at: prefix_pointer(tokens, depth) });
            }
        };
    }
    Ok(Some(current))
}

/// Resolves `path`, treating an absent final key as [`PatchError::KeyNotFound`].
pub fn get<'a>(root: &'a Value, path: &Path) -> Result<&'a Value, PatchError> {
    resolve(root, path)?.ok_or_else(|| {
        let tokens = path.tokens();
        PatchError::KeyNotFound {
            key: path.last().unwrap_or_default().to_owned(),
            at: prefix_pointer(tokens, tokens.len().saturating_sub(1)),
        }
    })
}

/// Interprets `token` as a position within `array`.
///
/// `-` denotes the append position and, like an index equal to the length,
/// is only accepted when `allow_append` is set. Errors returned from here have
/// an empty `at`; callers that know where the array lives fill it in.
///
/// ```
/// # use jsonp_core::{navigate::parse_array_index, PatchError, Value};
/// let items = vec![Value::null(), Value::null()];
/// assert_eq!(parse_array_index(&items, "1", false)?, 1);
/// assert_eq!(parse_array_index(&items, "-", true)?, 2);
/// assert!(matches!(parse_array_index(&items, "2", false), Err(PatchError::IndexOutOfRange { .. })));
/// assert!(matches!(parse_array_index(&items, "x", true), Err(PatchError::BadIndex { .. })));
/// # Ok::<(), PatchError>(())
/// ```
pub fn parse_array_index(
    array: &[Value],
    token: &str,
    allow_append: bool,
) -> Result<usize, PatchError> {
    parse_index(array.len(), token, allow_append, String::new)
}

pub(crate) fn array_index(
    len: usize,
    tokens: &[String],
    depth: usize,
    allow_append: bool,
) -> Result<usize, PatchError> {
    parse_index(len, &tokens[depth], allow_append, || prefix_pointer(tokens, depth))
}

fn parse_index<F>(len: usize, token: &str, allow_append: bool, at: F) -> Result<usize, PatchError>
where
    F: Fn() -> String,
{
    let out_of_range = || PatchError::IndexOutOfRange { index: token.to_owned(), len, at: at() };
    if token == "-" {
        return if allow_append { Ok(len) } else { Err(out_of_range()) };
    }
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PatchError::BadIndex { token: token.to_owned(), at: at() });
    }
    if negative {
        return Err(out_of_range());
    }
    // Digit strings too large for usize are necessarily past the end.
    let index = digits.parse::<usize>().map_err(|_| out_of_range())?;
    if index < len || (index == len && allow_append) {
        Ok(index)
    } else {
        Err(out_of_range())
    }
}

/// Visits every node of `root` in pre-order together with its path.
///
/// Object members are visited in key order, array elements by ascending index.
///
/// ```
/// # use jsonp_core::{navigate, Value};
/// let doc = Value::from_json_str("{\"a\":[true]}")?;
/// let mut seen = Vec::new();
/// navigate::walk(&doc, |path, _| seen.push(path.to_pointer()));
/// assert_eq!(seen, ["", "/a", "/a/0"]);
/// # Ok::<(), jsonp_core::CanonicalizeError>(())
/// ```
pub fn walk<F>(root: &Value, mut f: F)
where
    F: FnMut(&Path, &Value),
{
    let mut path = Path::new();
    walk_recursive(root, &mut path, &mut f);
}

fn walk_recursive<F>(node: &Value, path: &mut Path, f: &mut F)
where
    F: FnMut(&Path, &Value),
{
    f(path, node);
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.as_str());
                walk_recursive(child, path, f);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_recursive(child, path, f);
                path.pop();
            }
        }
        Value::Scalar(_) => {}
    }
}

/// Like [`walk`], but hands the callback the encoded pointer of each node.
pub fn walk_pointers<F>(root: &Value, mut f: F)
where
    F: FnMut(&str, &Value),
{
    walk(root, |path, node| {
        let pointer = to_pointer(path.tokens());
        trace!(target: "jsonp", pointer = %pointer, "visit");
        f(&pointer, node);
    });
}
