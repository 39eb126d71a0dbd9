//! Fuzzing harnesses for the `jsonp` pointer codec and patch executor.
//!
//! The helpers are shared between the `cargo fuzz` targets and the unit tests
//! below. Each public function accepts raw bytes, builds documents and patches
//! from them, and panics only when a library invariant is violated; ordinary
//! errors are swallowed so the fuzzer can keep exploring.
//!
//! # Examples
//!
//! Decode arbitrary bytes as a pointer and walk a generated document:
//!
//! ```
//! jsonp_fuzz::fuzz_pointer(b"/a~1b/0");
//! ```
//!
//! Apply a generated patch to a generated document:
//!
//! ```
//! jsonp_fuzz::fuzz_patch(b"patch fuzz");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use jsonp_core::{navigate, to_path, to_pointer, Patch, PatchOperation, Path, Value};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 6;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 12;
const MAX_OPERATIONS: u8 = 8;

/// Checks the pointer round-trip law on raw bytes and on every node of a
/// generated document.
///
/// ```
/// jsonp_fuzz::fuzz_pointer(b"~01//x");
/// ```
pub fn fuzz_pointer(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(path) = to_path(text) {
            assert_eq!(to_path(&path.to_pointer()).ok(), Some(path));
        }
    }

    let mut unstructured = Unstructured::new(data);
    let Some(document) = random_document(&mut unstructured) else {
        return;
    };
    navigate::walk(&document, |path, node| {
        let pointer = to_pointer(path.tokens());
        assert_eq!(to_path(&pointer).as_ref(), Ok(path));
        assert_eq!(document.get_by_pointer(&pointer), Ok(Some(node)));
    });
}

/// Applies generated and deserialized patches to a generated document.
///
/// Patches are built mostly from pointers that exist in the document so the
/// executor gets past decoding. The receiver of [`Value::apply_patch`] must
/// never change, whatever the outcome.
///
/// ```
/// jsonp_fuzz::fuzz_patch(&[7, 1, 3, 3, 0, 255, 42]);
/// ```
pub fn fuzz_patch(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    if let Some(document) = random_document(&mut unstructured) {
        let snapshot = document.duplicate();
        if let Ok(patch) = random_patch(&mut unstructured, &document) {
            let _ = document.apply_patch(&patch);
            assert_eq!(document, snapshot);
        }
    }

    if let Ok(patch) = serde_json::from_slice::<Patch>(data) {
        let mut unstructured = Unstructured::new(data);
        if let Some(mut seed) = random_document(&mut unstructured) {
            let _ = seed.apply_patch_in_place(&patch, &Default::default());
        }
    }
}

fn random_document(unstructured: &mut Unstructured<'_>) -> Option<Value> {
    random_value(unstructured, 0).ok()
}

fn random_value(unstructured: &mut Unstructured<'_>, depth: usize) -> Result<Value, arbitrary::Error> {
    let json = json_value_from_unstructured(unstructured, depth)?;
    Value::from_json_value(json).map_err(|_| arbitrary::Error::IncorrectFormat)
}

fn random_patch(unstructured: &mut Unstructured<'_>, document: &Value) -> Result<Patch, arbitrary::Error> {
    let mut pointers = Vec::new();
    navigate::walk(document, |path, _| pointers.push(path.clone()));

    let len = unstructured.int_in_range::<u8>(1..=MAX_OPERATIONS)?;
    let mut patch = Patch::new();
    for _ in 0..len {
        patch.push(random_operation(unstructured, &pointers)?);
    }
    Ok(patch)
}

fn random_operation(
    unstructured: &mut Unstructured<'_>,
    pointers: &[Path],
) -> Result<PatchOperation, arbitrary::Error> {
    let path = random_pointer(unstructured, pointers)?;
    let operation = match unstructured.int_in_range::<u8>(0..=6)? {
        0 => PatchOperation::add(path, random_value(unstructured, MAX_DEPTH - 1)?),
        1 => PatchOperation::remove(path),
        2 => PatchOperation::replace(path, random_value(unstructured, MAX_DEPTH - 1)?),
        3 => PatchOperation::move_from(random_pointer(unstructured, pointers)?, path),
        4 => PatchOperation::copy_from(random_pointer(unstructured, pointers)?, path),
        5 => PatchOperation::test(path, random_value(unstructured, MAX_DEPTH)?),
        _ => PatchOperation { op: random_string(unstructured)?, path, value: None, from: None },
    };
    Ok(operation)
}

fn random_pointer(unstructured: &mut Unstructured<'_>, pointers: &[Path]) -> Result<String, arbitrary::Error> {
    if pointers.is_empty() || unstructured.ratio(1, 8)? {
        return random_string(unstructured);
    }
    let mut path = unstructured.choose(pointers)?.clone();
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => path.push("-"),
        1 => path.push(unstructured.int_in_range::<u8>(0..=3)?.to_string()),
        2 => path.push(random_string(unstructured)?),
        _ => {}
    }
    Ok(path.to_pointer())
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    let choice = unstructured.int_in_range::<u8>(0..=5)?;
    match choice {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        3 => Ok(JsonValue::String(random_string(unstructured)?)),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_string(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    // Small integers keep equal values equal after the f64 round trip.
    let int = unstructured.int_in_range::<i32>(-1000..=1000)?;
    Ok(JsonNumber::from(int))
}

/// Printable ASCII, biased towards the characters pointers treat specially.
fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let ch = match unstructured.int_in_range::<u8>(0..=9)? {
            0 => '/',
            1 => '~',
            2 => char::from(unstructured.int_in_range::<u8>(b'0'..=b'9')?),
            _ => char::from(unstructured.int_in_range::<u8>(0x20..=0x7e)?),
        };
        string.push(ch);
    }
    Ok(string)
}
