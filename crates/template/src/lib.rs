//! Template-tree binding resolution.
//!
//! Report templates are arbitrary JSON trees whose string properties may
//! embed `{{ ... }}` binding expressions. This crate walks such a tree and
//! substitutes every expression against a data context, with well-defined
//! fallback behavior for unresolvable bindings and hard bounds on recursion.

pub mod error;
pub mod walker;

pub use error::TemplateError;
pub use walker::{MAX_DEPTH, resolve_bindings, resolve_bindings_json};
