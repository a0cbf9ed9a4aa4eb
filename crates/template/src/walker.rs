//! Recursive traversal of a template document, substituting every embedded
//! binding expression.

use crate::error::TemplateError;
use bindery_expr::{
    AstNode, EvaluationContext, FunctionRegistry, parse, resolve_expression, value_to_string,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum recursion depth for one `resolve_bindings` call. Subtrees past
/// the cap are returned unresolved rather than failing the render.
pub const MAX_DEPTH: usize = 50;

static FUNCTIONS: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::default);

/// Resolves every `{{ ... }}` binding found anywhere inside `template`
/// against `data`, returning the substituted tree.
///
/// Scalars pass through unchanged. A string that is exactly one expression
/// yields the raw resolved value, so `"{{items}}"` binds a list as a list;
/// when that sole expression is absent the original placeholder text comes
/// back instead, keeping unbound fields visible in previews. Strings mixing
/// literal text and expressions concatenate, with each absent expression
/// restored as its original substring. Arrays and objects recurse with a
/// depth cap and per-call revisit detection on container identity.
pub fn resolve_bindings(template: &Value, data: &Value) -> Value {
    let e_ctx = EvaluationContext {
        data,
        functions: &FUNCTIONS,
    };
    let mut visited = HashSet::new();
    resolve_node(template, &e_ctx, 0, &mut visited)
}

/// Boundary convenience for callers holding JSON source text, e.g. the
/// render pipeline receiving a request payload.
pub fn resolve_bindings_json(
    template_source: &str,
    data_source: &str,
) -> Result<Value, TemplateError> {
    let template: Value = serde_json::from_str(template_source)?;
    let data: Value = serde_json::from_str(data_source)?;
    Ok(resolve_bindings(&template, &data))
}

fn resolve_node(
    node: &Value,
    e_ctx: &EvaluationContext,
    depth: usize,
    visited: &mut HashSet<usize>,
) -> Value {
    if depth > MAX_DEPTH {
        log::debug!("depth cap reached, returning subtree unresolved");
        return node.clone();
    }
    match node {
        Value::Null | Value::Bool(_) | Value::Number(_) => node.clone(),
        Value::String(text) => resolve_string(text, e_ctx),
        Value::Array(items) => {
            if !visited.insert(container_id(node)) {
                log::debug!("container revisited, returning it unresolved");
                return node.clone();
            }
            Value::Array(
                items
                    .iter()
                    .map(|item| resolve_node(item, e_ctx, depth + 1, visited))
                    .collect(),
            )
        }
        Value::Object(members) => {
            if !visited.insert(container_id(node)) {
                log::debug!("container revisited, returning it unresolved");
                return node.clone();
            }
            Value::Object(
                members
                    .iter()
                    .map(|(key, value)| (key.clone(), resolve_node(value, e_ctx, depth + 1, visited)))
                    .collect(),
            )
        }
    }
}

fn resolve_string(text: &str, e_ctx: &EvaluationContext) -> Value {
    let nodes = parse(text);
    if nodes.is_empty() {
        return Value::String(String::new());
    }
    // A sole-expression string yields the raw resolved value, original type
    // preserved, or the placeholder text itself when absent.
    if let [AstNode::Expression {
        expression,
        original_text,
    }] = nodes.as_slice()
    {
        return match resolve_expression(expression, e_ctx) {
            Some(value) => value,
            None => Value::String(original_text.clone()),
        };
    }
    let mut out = String::new();
    for node in &nodes {
        match node {
            AstNode::Literal(text) => out.push_str(text),
            AstNode::Expression {
                expression,
                original_text,
            } => match resolve_expression(expression, e_ctx) {
                Some(value) => out.push_str(&value_to_string(&value)),
                None => out.push_str(original_text),
            },
        }
    }
    Value::String(out)
}

/// Identity of a container for revisit detection, valid for the lifetime of
/// one top-level call while the template borrow is held.
fn container_id(node: &Value) -> usize {
    node as *const Value as usize
}
