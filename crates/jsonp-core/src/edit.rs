//! Structural edits on a document tree.
//!
//! Everything here is built from two recursive primitives, `insert` and
//! `delete`, that walk a uniquely borrowed tree one token at a time and
//! mutate it in place: object members are inserted or removed from the map,
//! array elements are spliced in or out (shifting their successors).
//!
//! The derived operations follow RFC 6902 semantics. None of them roll back:
//! if a multi-step operation such as [`move_value`] fails half way the tree
//! keeps whatever already happened.

use tracing::trace;

use crate::{
    navigate::{self, array_index},
    path::prefix_pointer,
    PatchError, Path, Value,
};

/// Outcome of [`delete`] at one level of the recursion.
enum Deleted {
    /// The path ended at this node; the caller owns the slot and must remove it.
    Slot,
    /// The node was removed further down and is carried back up.
    Value(Value),
}

fn key_not_found(tokens: &[String], depth: usize) -> PatchError {
    PatchError::KeyNotFound { key: tokens[depth].clone(), at: prefix_pointer(tokens, depth) }
}

fn insert(node: &mut Value, tokens: &[String], depth: usize, value: Value) -> Result<(), PatchError> {
    if depth == tokens.len() {
        *node = value;
        return Ok(());
    }
    let is_last = depth + 1 == tokens.len();
    match node {
        Value::Object(map) => {
            if is_last {
                map.insert(tokens[depth].clone(), value);
                return Ok(());
            }
            let child = map.get_mut(&tokens[depth]).ok_or_else(|| key_not_found(tokens, depth))?;
            insert(child, tokens, depth + 1, value)
        }
        Value::Array(items) => {
            let index = array_index(items.len(), tokens, depth, is_last)?;
            if is_last {
                items.insert(index, value);
                return Ok(());
            }
            insert(&mut items[index], tokens, depth + 1, value)
        }
        Value::Scalar(_) => Err(PatchError::NotContainer { at: prefix_pointer(tokens, depth) }),
    }
}

fn delete(node: &mut Value, tokens: &[String], depth: usize) -> Result<Deleted, PatchError> {
    if depth == tokens.len() {
        return Ok(Deleted::Slot);
    }
    match node {
        Value::Object(map) => {
            let child = map.get_mut(&tokens[depth]).ok_or_else(|| key_not_found(tokens, depth))?;
            match delete(child, tokens, depth + 1)? {
                Deleted::Slot => map
                    .remove(&tokens[depth])
                    .map(Deleted::Value)
                    .ok_or_else(|| key_not_found(tokens, depth)),
                removed => Ok(removed),
            }
        }
        Value::Array(items) => {
            let index = array_index(items.len(), tokens, depth, false)?;
            match delete(&mut items[index], tokens, depth + 1)? {
                Deleted::Slot => Ok(Deleted::Value(items.remove(index))),
                removed => Ok(removed),
            }
        }
        Value::Scalar(_) => Err(PatchError::NotContainer { at: prefix_pointer(tokens, depth) }),
    }
}

/// Inserts `value` at `path`.
///
/// An object member is created or overwritten. An array index shifts the
/// existing element and its successors right; `-` or the array length
/// appends. The empty path replaces the whole document.
///
/// ```
/// # use jsonp_core::{edit, Path, Value};
/// let mut doc = Value::from_json_str("{\"foo\":[\"bar\",\"baz\"]}")?;
/// edit::add(&mut doc, &Path::parse("/foo/1")?, "qux".into())?;
/// assert_eq!(doc.to_string(), "{\"foo\":[\"bar\",\"qux\",\"baz\"]}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn add(root: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    trace!(target: "jsonp", path = %path, "add");
    insert(root, path.tokens(), 0, value)
}

/// Removes the node at `path` and returns it.
///
/// Removing the root leaves `null` behind.
///
/// ```
/// # use jsonp_core::{edit, Path, Value};
/// let mut doc = Value::from_json_str("{\"foo\":[\"bar\",\"baz\"]}")?;
/// let removed = edit::remove(&mut doc, &Path::parse("/foo/0")?)?;
/// assert_eq!(removed.to_string(), "\"bar\"");
/// assert_eq!(doc.to_string(), "{\"foo\":[\"baz\"]}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn remove(root: &mut Value, path: &Path) -> Result<Value, PatchError> {
    trace!(target: "jsonp", path = %path, "remove");
    match delete(root, path.tokens(), 0)? {
        Deleted::Slot => Ok(std::mem::take(root)),
        Deleted::Value(removed) => Ok(removed),
    }
}

/// Replaces the node at `path`, returning the previous one.
///
/// This is a removal followed by an insertion at the same path, so the path
/// must already resolve.
pub fn replace(root: &mut Value, path: &Path, value: Value) -> Result<Value, PatchError> {
    let previous = remove(root, path)?;
    add(root, path, value)?;
    Ok(previous)
}

/// Moves the node at `from` to `path`.
///
/// The destination is interpreted against the document as it is after the
/// removal; array indices in `path` are not adjusted for the shift.
///
/// ```
/// # use jsonp_core::{edit, Path, Value};
/// let mut doc = Value::from_json_str("{\"foo\":[\"all\",\"grass\",\"cows\",\"eat\"]}")?;
/// edit::move_value(&mut doc, &Path::parse("/foo/1")?, &Path::parse("/foo/3")?)?;
/// assert_eq!(doc.to_string(), "{\"foo\":[\"all\",\"cows\",\"eat\",\"grass\"]}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn move_value(root: &mut Value, from: &Path, path: &Path) -> Result<(), PatchError> {
    if from.is_prefix_of(path) {
        return Err(PatchError::CyclicMove { from: from.to_pointer(), path: path.to_pointer() });
    }
    let moved = remove(root, from)?;
    add(root, path, moved)
}

/// Inserts a deep copy of the node at `from` at `path`.
pub fn copy(root: &mut Value, from: &Path, path: &Path) -> Result<(), PatchError> {
    let copied = navigate::get(root, from)?.duplicate();
    add(root, path, copied)
}

/// Checks that the node at `path` equals `expected`. Never modifies `root`.
///
/// ```
/// # use jsonp_core::{edit, Path, PatchError, Value};
/// let doc = Value::from_json_str("{\"/\":9,\"~1\":10}")?;
/// edit::test(&doc, &Path::parse("/~01")?, &Value::from_json_str("10")?)?;
/// let err = edit::test(&doc, &Path::parse("/~01")?, &"10".into()).unwrap_err();
/// assert!(matches!(err, PatchError::TestFailed { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn test(root: &Value, path: &Path, expected: &Value) -> Result<(), PatchError> {
    let actual = navigate::get(root, path)?;
    if actual == expected {
        return Ok(());
    }
    Err(PatchError::TestFailed {
        at: path.to_pointer(),
        actual: Box::new(actual.duplicate()),
        expected: Box::new(expected.duplicate()),
    })
}

/// [`add`] addressed by an RFC 6901 pointer.
pub fn add_by_pointer(root: &mut Value, pointer: &str, value: Value) -> Result<(), PatchError> {
    add(root, &Path::parse(pointer)?, value)
}

/// [`remove`] addressed by an RFC 6901 pointer.
pub fn remove_by_pointer(root: &mut Value, pointer: &str) -> Result<Value, PatchError> {
    remove(root, &Path::parse(pointer)?)
}

/// [`replace`] addressed by an RFC 6901 pointer.
pub fn replace_by_pointer(root: &mut Value, pointer: &str, value: Value) -> Result<Value, PatchError> {
    replace(root, &Path::parse(pointer)?, value)
}

/// [`move_value`] addressed by RFC 6901 pointers.
pub fn move_by_pointer(root: &mut Value, from: &str, path: &str) -> Result<(), PatchError> {
    let from = Path::parse(from)?;
    let path = Path::parse(path)?;
    move_value(root, &from, &path)
}

/// [`copy`] addressed by RFC 6901 pointers.
pub fn copy_by_pointer(root: &mut Value, from: &str, path: &str) -> Result<(), PatchError> {
    let from = Path::parse(from)?;
    let path = Path::parse(path)?;
    copy(root, &from, &path)
}

/// [`test`] addressed by an RFC 6901 pointer.
pub fn test_by_pointer(root: &Value, pointer: &str, expected: &Value) -> Result<(), PatchError> {
    test(root, &Path::parse(pointer)?, expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Value {
        Value::from_json_str(json).unwrap()
    }

    fn path(pointer: &str) -> Path {
        Path::parse(pointer).unwrap()
    }

    #[test]
    fn add_to_empty_path_replaces_document() {
        let mut root = doc("{\"a\":1}");
        add(&mut root, &Path::root(), doc("[1]")).unwrap();
        assert_eq!(root, doc("[1]"));
    }

    #[test]
    fn add_overwrites_existing_member() {
        let mut root = doc("{\"a\":1}");
        add(&mut root, &path("/a"), doc("2")).unwrap();
        assert_eq!(root, doc("{\"a\":2}"));
    }

    #[test]
    fn add_appends_with_dash_and_length() {
        let mut root = doc("[1]");
        add(&mut root, &path("/-"), doc("2")).unwrap();
        add(&mut root, &path("/2"), doc("3")).unwrap();
        assert_eq!(root, doc("[1,2,3]"));
        let err = add(&mut root, &path("/4"), doc("5")).unwrap_err();
        assert_eq!(err, PatchError::IndexOutOfRange { index: "4".into(), len: 3, at: "".into() });
    }

    #[test]
    fn add_under_missing_parent_fails() {
        let mut root = doc("{\"foo\":\"bar\"}");
        let err = add(&mut root, &path("/baz/bat"), doc("\"qux\"")).unwrap_err();
        assert_eq!(err, PatchError::KeyNotFound { key: "baz".into(), at: "".into() });
        assert_eq!(root, doc("{\"foo\":\"bar\"}"));
    }

    #[test]
    fn dash_is_not_an_intermediate_position() {
        let mut root = doc("[[1]]");
        let err = add(&mut root, &path("/-/0"), doc("2")).unwrap_err();
        assert!(matches!(err, PatchError::IndexOutOfRange { .. }));
    }

    #[test]
    fn remove_returns_removed_value_from_nested_array() {
        let mut root = doc("{\"a\":[{\"b\":[1,2,3]}]}");
        let removed = remove(&mut root, &path("/a/0/b/1")).unwrap();
        assert_eq!(removed, doc("2"));
        assert_eq!(root, doc("{\"a\":[{\"b\":[1,3]}]}"));
    }

    #[test]
    fn remove_missing_member_fails() {
        let mut root = doc("{\"a\":{}}");
        let err = remove(&mut root, &path("/a/b")).unwrap_err();
        assert_eq!(err, PatchError::KeyNotFound { key: "b".into(), at: "/a".into() });
    }

    #[test]
    fn remove_rejects_append_position() {
        let mut root = doc("[1]");
        assert!(remove(&mut root, &path("/-")).is_err());
        assert!(remove(&mut root, &path("/1")).is_err());
        assert_eq!(root, doc("[1]"));
    }

    #[test]
    fn remove_root_leaves_null() {
        let mut root = doc("{\"a\":1}");
        let removed = remove(&mut root, &Path::root()).unwrap();
        assert_eq!(removed, doc("{\"a\":1}"));
        assert_eq!(root, Value::null());
    }

    #[test]
    fn remove_through_scalar_reports_prefix() {
        let mut root = doc("{\"a\":\"text\"}");
        let err = remove(&mut root, &path("/a/0")).unwrap_err();
        assert_eq!(err.to_string(), "node '/a' is not an array or object");
    }

    #[test]
    fn replace_requires_existing_target() {
        let mut root = doc("{\"baz\":\"qux\",\"foo\":\"bar\"}");
        let previous = replace(&mut root, &path("/baz"), doc("\"boo\"")).unwrap();
        assert_eq!(previous, doc("\"qux\""));
        assert_eq!(root, doc("{\"baz\":\"boo\",\"foo\":\"bar\"}"));
        assert!(replace(&mut root, &path("/nope"), doc("1")).is_err());
    }

    #[test]
    fn replace_last_array_element_stays_in_place() {
        let mut root = doc("[1,2,3]");
        replace(&mut root, &path("/2"), doc("4")).unwrap();
        assert_eq!(root, doc("[1,2,4]"));
    }

    #[test]
    fn move_between_objects() {
        let mut root =
            doc("{\"foo\":{\"bar\":\"baz\",\"waldo\":\"fred\"},\"qux\":{\"corge\":\"grault\"}}");
        move_value(&mut root, &path("/foo/waldo"), &path("/qux/thud")).unwrap();
        assert_eq!(
            root,
            doc("{\"foo\":{\"bar\":\"baz\"},\"qux\":{\"corge\":\"grault\",\"thud\":\"fred\"}}")
        );
    }

    #[test]
    fn move_into_own_descendant_is_rejected_before_mutation() {
        let mut root = doc("{\"a\":{\"b\":{}}}");
        let err = move_value(&mut root, &path("/a"), &path("/a/b/c")).unwrap_err();
        assert_eq!(err, PatchError::CyclicMove { from: "/a".into(), path: "/a/b/c".into() });
        assert_eq!(root, doc("{\"a\":{\"b\":{}}}"));
    }

    #[test]
    fn move_onto_itself_is_a_no_op() {
        let mut root = doc("{\"a\":[1,2]}");
        move_value(&mut root, &path("/a/1"), &path("/a/1")).unwrap();
        assert_eq!(root, doc("{\"a\":[1,2]}"));
    }

    #[test]
    fn copied_subtree_is_independent() {
        let mut root = doc("{\"src\":{\"list\":[1]}}");
        copy(&mut root, &path("/src"), &path("/dst")).unwrap();
        add(&mut root, &path("/dst/list/-"), doc("2")).unwrap();
        assert_eq!(root, doc("{\"src\":{\"list\":[1]},\"dst\":{\"list\":[1,2]}}"));
    }

    #[test]
    fn copy_from_missing_source_fails() {
        let mut root = doc("{}");
        assert!(matches!(
            copy(&mut root, &path("/nope"), &path("/x")),
            Err(PatchError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_reports_actual_and_expected() {
        let root = doc("{\"baz\":\"qux\"}");
        let err = test(&root, &path("/baz"), &doc("\"bar\"")).unwrap_err();
        assert_eq!(err.to_string(), "test failed at '/baz': found \"qux\", expected \"bar\"");
    }

    #[test]
    fn by_pointer_variants_decode_first() {
        let mut root = doc("{}");
        add_by_pointer(&mut root, "/a", doc("[]")).unwrap();
        add_by_pointer(&mut root, "/a/-", doc("1")).unwrap();
        copy_by_pointer(&mut root, "/a", "/b").unwrap();
        move_by_pointer(&mut root, "/b/0", "/c").unwrap();
        replace_by_pointer(&mut root, "/c", doc("2")).unwrap();
        test_by_pointer(&root, "/c", &doc("2")).unwrap();
        assert_eq!(remove_by_pointer(&mut root, "/a").unwrap(), doc("[1]"));
        assert_eq!(root, doc("{\"b\":[],\"c\":2}"));
        assert!(matches!(
            add_by_pointer(&mut root, "a", doc("1")),
            Err(PatchError::InvalidPointer { .. })
        ));
    }
}
