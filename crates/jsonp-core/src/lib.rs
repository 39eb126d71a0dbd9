//! JSON Pointer (RFC 6901) and JSON Patch (RFC 6902) over an in-memory tree.
//!
//! `jsonp-core` decodes pointers into [`Path`]s, resolves them against a
//! [`Value`], edits the tree in place through the [`edit`] module, and runs
//! whole [`Patch`] documents with [`Value::apply_patch`] and friends.
//!
//! ```
//! use jsonp_core::{Patch, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let doc = Value::from_json_str("{\"foo\":[\"bar\",\"baz\"]}")?;
//!     let patch = Patch::from_json_str(
//!         r#"[{"op":"add","path":"/foo/1","value":"qux"},{"op":"test","path":"/foo/2","value":"baz"}]"#,
//!     )?;
//!
//!     let patched = doc.apply_patch(&patch)?;
//!     assert_eq!(patched.to_string(), "{\"foo\":[\"bar\",\"qux\",\"baz\"]}");
//!     assert_eq!(patched.get_by_pointer("/foo/1")?, Some(&Value::from("qux")));
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod edit;
mod error;
pub mod navigate;
mod number;
mod options;
mod patch;
mod path;
mod value;

pub use error::{ApplyError, CanonicalizeError, OptionsError, PatchError};
pub use number::Number;
pub use options::{PatchOptions, UnknownOpPolicy};
pub use patch::{Operation, Patch, PatchOperation};
pub use path::{escape_token, to_path, to_pointer, unescape_token, Path};
pub use value::{Kind, Scalar, Value};

/// Returns the semantic version of the `jsonp-core` crate.
///
/// ```
/// assert!(!jsonp_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
