//! Resolution of parsed expressions against a JSON data context.

use crate::ast::{Expression, FunctionArg, PathSegment, PipeArg};
use crate::functions::FunctionRegistry;
use serde_json::Value;

/// Property names that never resolve, at any path depth. The data context can
/// originate from user-edited sample data or request payloads, so traversal
/// must not be able to reach host object internals.
pub const BLOCKED_PROPERTIES: &[&str] = &["__proto__", "prototype", "constructor"];

/// A container for all state needed during expression resolution.
#[derive(Clone)]
pub struct EvaluationContext<'a> {
    pub data: &'a Value,
    pub functions: &'a FunctionRegistry,
}

/// Walks a path through the data context. `None` is the "absent" outcome:
/// missing members, out-of-bounds indices, lookups on scalars and blocked
/// property names all land there. An explicit JSON null in the data resolves
/// to `Some(Null)`, which is distinct from absent.
pub fn resolve_path<'a>(segments: &[PathSegment], data: &'a Value) -> Option<&'a Value> {
    let mut current = data;
    for segment in segments {
        if current.is_null() {
            return None;
        }
        current = match segment {
            PathSegment::Property(name) => {
                if BLOCKED_PROPERTIES.contains(&name.as_str()) {
                    log::debug!("refused lookup of blocked property '{name}'");
                    return None;
                }
                match current {
                    Value::Object(map) => map.get(name)?,
                    _ => return None,
                }
            }
            PathSegment::Index(i) => match current {
                Value::Array(items) => items.get(*i)?,
                _ => return None,
            },
        };
    }
    Some(current)
}

/// Resolves an expression to an owned value. `None` is absent: the template
/// walker turns it back into the original placeholder text.
pub fn resolve_expression(expr: &Expression, e_ctx: &EvaluationContext) -> Option<Value> {
    match expr {
        Expression::Path(segments) => {
            if segments.is_empty() {
                return None;
            }
            resolve_path(segments, e_ctx.data).cloned()
        }
        Expression::FunctionCall { name, args } => {
            let Some(function) = e_ctx.functions.get(name) else {
                log::debug!("unknown function '{name}'");
                return None;
            };
            let evaluated: Vec<Value> = args.iter().map(|arg| evaluate_arg(arg, e_ctx)).collect();
            Some(function(&evaluated))
        }
        Expression::PipeChain { source, stages } => {
            let mut value = resolve_expression(source, e_ctx)?;
            for stage in stages {
                let Some(function) = e_ctx.functions.get(&stage.name) else {
                    log::debug!("unknown pipe function '{}'", stage.name);
                    return None;
                };
                let mut call_args = Vec::with_capacity(stage.args.len() + 1);
                call_args.push(value);
                call_args.extend(stage.args.iter().map(pipe_arg_value));
                value = function(&call_args);
            }
            Some(value)
        }
    }
}

/// Coerces a resolved value to display text for mixed-content substitution.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn evaluate_arg(arg: &FunctionArg, e_ctx: &EvaluationContext) -> Value {
    match arg {
        FunctionArg::String(s) => Value::String(s.clone()),
        FunctionArg::Number(n) => number_value(*n),
        FunctionArg::Path(segments) if segments.is_empty() => Value::Null,
        FunctionArg::Path(segments) => resolve_path(segments, e_ctx.data)
            .cloned()
            .unwrap_or(Value::Null),
    }
}

fn pipe_arg_value(arg: &PipeArg) -> Value {
    match arg {
        PipeArg::String(s) => Value::String(s.clone()),
        PipeArg::Number(n) => number_value(*n),
    }
}

/// Builds a JSON number, degrading to null for non-finite values. Whole
/// numbers come out as integers so they stringify without a decimal point.
pub(crate) fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
