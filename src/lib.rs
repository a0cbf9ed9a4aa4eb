//! Binding expression engine for block-based report templates.
//!
//! Report layouts are JSON trees of visual blocks whose textual and numeric
//! properties may embed `{{ ... }}` placeholder expressions. At render time
//! those placeholders are substituted with values drawn from a runtime data
//! context: paths into nested data, formatting function calls, and
//! left-to-right pipe chains.
//!
//! The editor preview layer and the document render pipeline both go through
//! [`resolve_bindings`]; editor tooling classifies partial input through
//! [`parse`] and [`resolve_expression`].
//!
//! ```
//! use serde_json::json;
//!
//! let template = json!({
//!     "title": "Order {{order.id}}",
//!     "total": "{{order.total | currency:\"USD\"}}",
//!     "rows": "{{order.items}}"
//! });
//! let data = json!({
//!     "order": { "id": "A-17", "total": 1234.56, "items": ["a", "b"] }
//! });
//!
//! let resolved = bindery::resolve_bindings(&template, &data);
//! assert_eq!(resolved["title"], json!("Order A-17"));
//! assert_eq!(resolved["total"], json!("$1,234.56"));
//! assert_eq!(resolved["rows"], json!(["a", "b"]));
//! ```

pub use bindery_expr::{
    AstNode, BLOCKED_PROPERTIES, BindingFunction, EvaluationContext, ExprError, Expression,
    FunctionArg, FunctionRegistry, PathSegment, PipeArg, PipeCall, parse, parse_expression,
    parse_expression_strict, resolve_expression, resolve_path, value_to_string,
};
pub use bindery_template::{MAX_DEPTH, TemplateError, resolve_bindings, resolve_bindings_json};
