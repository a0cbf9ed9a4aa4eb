//! A small, self-contained binding expression language.
//!
//! This crate owns the `{{ ... }}` placeholder syntax embedded in report
//! templates: it tokenizes template text into literal and expression nodes,
//! parses expression bodies into an AST (paths, function calls, pipe chains),
//! resolves the AST against a JSON data context with property-name
//! sandboxing, and carries the catalog of pure formatting functions shared by
//! both calling conventions. It is used by the template walker and by
//! editor-side tooling.

pub mod ast;
pub mod engine;
pub mod error;
pub mod functions;
mod parser;

// --- Public API ---
pub use ast::{AstNode, Expression, FunctionArg, PathSegment, PipeArg, PipeCall};
pub use engine::{
    BLOCKED_PROPERTIES, EvaluationContext, resolve_expression, resolve_path, value_to_string,
};
pub use error::ExprError;
pub use functions::{BindingFunction, FunctionRegistry};
pub use parser::{parse, parse_expression, parse_expression_strict};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(body: &str, data: &serde_json::Value) -> Option<serde_json::Value> {
        let expr = parse_expression(body).expect("non-empty expression");
        let funcs = FunctionRegistry::default();
        let e_ctx = EvaluationContext {
            data,
            functions: &funcs,
        };
        resolve_expression(&expr, &e_ctx)
    }

    #[test]
    fn parse_and_resolve_simple_path() {
        let data = json!({ "customer": { "name": "ACME" } });
        assert_eq!(resolve("customer.name", &data), Some(json!("ACME")));
    }

    #[test]
    fn parse_and_resolve_path_with_index() {
        let data = json!({ "orders": [ { "id": "A" }, { "id": "B" } ] });
        assert_eq!(resolve("orders[1].id", &data), Some(json!("B")));
        assert_eq!(resolve(" orders[0] . id ", &data), Some(json!("A")));
    }

    #[test]
    fn parse_and_resolve_function_call() {
        let data = json!({ "status": "due" });
        assert_eq!(resolve("uppercase(status)", &data), Some(json!("DUE")));
        assert_eq!(
            resolve("if(status, 'has status', 'none')", &data),
            Some(json!("has status"))
        );
    }

    #[test]
    fn parse_and_resolve_pipe_chain() {
        let data = json!({ "value": -0.567 });
        assert_eq!(resolve("value | abs | percent:0", &data), Some(json!("57%")));
    }

    #[test]
    fn pipe_source_may_be_function_call() {
        let data = json!({ "a": "x", "b": "" });
        assert_eq!(
            resolve("ifEmpty(b, 'fallback') | uppercase", &data),
            Some(json!("FALLBACK"))
        );
    }

    #[test]
    fn absent_outcomes() {
        let data = json!({ "user": { "name": "Ana" } });
        assert_eq!(resolve("user.age", &data), None);
        assert_eq!(resolve("user.name[0]", &data), None);
        assert_eq!(resolve("user | frobnicate", &data), None);
        assert_eq!(resolve("frobnicate(user)", &data), None);
    }

    #[test]
    fn explicit_null_is_not_absent() {
        let data = json!({ "note": null });
        assert_eq!(resolve("note", &data), Some(json!(null)));
    }

    #[test]
    fn sandbox_blocks_prototype_names_at_any_depth() {
        let data = json!({
            "__proto__": { "polluted": true },
            "user": { "constructor": "x", "name": "Ana" }
        });
        assert_eq!(resolve("__proto__", &data), None);
        assert_eq!(resolve("__proto__.polluted", &data), None);
        assert_eq!(resolve("prototype", &data), None);
        assert_eq!(resolve("user.constructor", &data), None);
        // The block-list is case-sensitive; other names resolve normally.
        assert_eq!(resolve("user.name", &data), Some(json!("Ana")));
    }

    #[test]
    fn template_scanning_mixes_literals_and_expressions() {
        let nodes = parse("Total: {{total}} ({{currency}})");
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0], AstNode::Literal("Total: ".to_string()));
        assert!(matches!(
            &nodes[1],
            AstNode::Expression { original_text, .. } if original_text.as_str() == "{{total}}"
        ));
        assert_eq!(nodes[2], AstNode::Literal(" (".to_string()));
    }

    #[test]
    fn unmatched_open_marker_stays_literal() {
        // Text ahead of the unmatched `{{` is still its own literal node;
        // the remainder, open marker included, trails as one literal.
        let nodes = parse("before {{oops");
        assert_eq!(nodes, vec![
            AstNode::Literal("before ".to_string()),
            AstNode::Literal("{{oops".to_string()),
        ]);
        assert_eq!(parse("{{oops"), vec![AstNode::Literal("{{oops".to_string())]);
        assert_eq!(
            parse("a {{x}} b {{oops"),
            vec![
                AstNode::Literal("a ".to_string()),
                AstNode::Expression {
                    expression: Expression::Path(vec![PathSegment::Property("x".to_string())]),
                    original_text: "{{x}}".to_string(),
                },
                AstNode::Literal(" b ".to_string()),
                AstNode::Literal("{{oops".to_string()),
            ]
        );
    }

    #[test]
    fn empty_body_produces_no_node() {
        assert_eq!(parse("{{}}"), Vec::new());
        assert_eq!(parse("a{{  }}b"), vec![
            AstNode::Literal("a".to_string()),
            AstNode::Literal("b".to_string()),
        ]);
    }

    #[test]
    fn quoted_arguments_support_escapes_and_delimiters() {
        let expr = parse_expression(r#"join(items, 'a | b')"#).unwrap();
        let Expression::FunctionCall { name, args } = expr else {
            panic!("expected function call");
        };
        assert_eq!(name, "join");
        assert_eq!(args[1], FunctionArg::String("a | b".to_string()));

        let expr = parse_expression(r#"ifEmpty(note, "she said \"hi\"")"#).unwrap();
        let Expression::FunctionCall { args, .. } = expr else {
            panic!("expected function call");
        };
        assert_eq!(args[1], FunctionArg::String(r#"she said "hi""#.to_string()));
    }

    #[test]
    fn scientific_notation_is_a_bare_string() {
        let expr = parse_expression("value | number:1e5").unwrap();
        let Expression::PipeChain { stages, .. } = expr else {
            panic!("expected pipe chain");
        };
        assert_eq!(stages[0].args[0], PipeArg::String("1e5".to_string()));

        let expr = parse_expression("multiply(value, -2.5)").unwrap();
        let Expression::FunctionCall { args, .. } = expr else {
            panic!("expected function call");
        };
        assert_eq!(args[1], FunctionArg::Number(-2.5));
    }

    #[test]
    fn non_integer_index_content_is_dropped() {
        let expr = parse_expression("items[x].name").unwrap();
        assert_eq!(
            expr,
            Expression::Path(vec![
                PathSegment::Property("items".to_string()),
                PathSegment::Property("name".to_string()),
            ])
        );
    }

    #[test]
    fn strict_parse_surfaces_failures() {
        assert!(parse_expression_strict("customer.name").is_ok());
        assert!(parse_expression_strict("   ").is_err());
        assert!(parse_expression_strict("...").is_err());
    }
}
