//! Synthetic corpora for the `jsonp` Criterion benchmarks.
//!
//! Every corpus pairs a generated document with a patch that applies cleanly
//! to it, so the benchmarks can measure the happy path of the executor as well
//! as raw pointer resolution.
//!
//! # Examples
//!
//! ```
//! let corpus = jsonp_benches::available_corpora()
//!     .into_iter()
//!     .find(|corpus| corpus.name() == "wide-object")
//!     .expect("registered corpus");
//! assert!(corpus.document().apply_patch(corpus.patch()).is_ok());
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;

use jsonp_core::{navigate, Number, Patch, PatchOperation, Value};

const WIDTH: u32 = 1_000;
const DEPTH: u32 = 64;

/// A benchmark input: a document and a patch valid against it.
#[derive(Clone, Debug)]
pub struct Corpus {
    name: &'static str,
    document: Value,
    patch: Patch,
}

impl Corpus {
    /// Short identifier used as the Criterion benchmark id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The unpatched document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// A patch that applies cleanly to [`Corpus::document`].
    #[must_use]
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Every pointer in the document, in walk order.
    #[must_use]
    pub fn pointers(&self) -> Vec<String> {
        let mut pointers = Vec::new();
        navigate::walk_pointers(&self.document, |pointer, _| pointers.push(pointer.to_owned()));
        pointers
    }
}

/// Returns the registered corpora.
#[must_use]
pub fn available_corpora() -> Vec<Corpus> {
    vec![wide_object(), long_array(), deep_nesting()]
}

fn number(n: u32) -> Value {
    Value::from(Number::from(n))
}

/// One object with many scalar members; patch touches a slice of them.
fn wide_object() -> Corpus {
    let document: BTreeMap<String, Value> =
        (0..WIDTH).map(|i| (format!("key/{i}"), number(i))).collect();
    let mut patch = Patch::new();
    for i in (0..WIDTH).step_by(10) {
        let pointer = format!("/key~1{i}");
        patch.push(PatchOperation::test(pointer.clone(), number(i)));
        patch.push(PatchOperation::replace(pointer, number(i + 1)));
    }
    patch.push(PatchOperation::copy_from("/key~10", "/copied"));
    patch.push(PatchOperation::remove("/key~11"));
    Corpus { name: "wide-object", document: Value::from(document), patch }
}

/// A long array; inserts at the front shift every successor.
fn long_array() -> Corpus {
    let document: Vec<Value> = (0..WIDTH).map(number).collect();
    let mut patch = Patch::new();
    for i in 0..50 {
        patch.push(PatchOperation::add("/0", number(i)));
        patch.push(PatchOperation::add("/-", number(i)));
    }
    patch.push(PatchOperation::move_from("/0", "/-"));
    patch.push(PatchOperation::remove("/500"));
    Corpus { name: "long-array", document: Value::from(document), patch }
}

/// A chain of single-member objects; every edit traverses the full depth.
fn deep_nesting() -> Corpus {
    let mut document = Value::from("leaf");
    for _ in 0..DEPTH {
        let mut map = BTreeMap::new();
        map.insert("n".to_owned(), document);
        document = Value::from(map);
    }
    let leaf = "/n".repeat(DEPTH as usize);
    let parent = "/n".repeat(DEPTH as usize - 1);
    let mut patch = Patch::new();
    for i in 0..20 {
        patch.push(PatchOperation::add(format!("{parent}/sibling{i}"), number(i)));
    }
    patch.push(PatchOperation::test(leaf.clone(), Value::from("leaf")));
    patch.push(PatchOperation::replace(leaf, Value::from("changed")));
    Corpus { name: "deep-nesting", document, patch }
}
