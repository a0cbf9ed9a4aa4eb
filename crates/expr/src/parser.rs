//! Parsers for template text and the binding expression language.
//!
//! Template scanning is deliberately forgiving: input that cannot be
//! classified degrades to literal text or to a path that resolves to absent,
//! so a malformed placeholder never aborts a render. `nom` combinators handle
//! the token-level grammar (identifiers, quoted strings, numbers); the
//! literal/placeholder interleave and the top-level splits are simple scans.

use crate::ast::{AstNode, Expression, FunctionArg, PathSegment, PipeArg, PipeCall};
use crate::error::ExprError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while},
    character::complete::{alpha1, char, digit1},
    combinator::{all_consuming, map_res, opt, recognize, success, value},
    sequence::{delimited, pair},
};

// --- Template scanning ---

/// Splits a template string into literal and expression nodes.
///
/// Scans for `{{`, emitting preceding text as a literal, then forward-searches
/// for the next `}}` (no balanced-brace matching). An unmatched `{{` turns the
/// remainder of the string into one trailing literal. Empty or whitespace-only
/// expression bodies produce no node.
pub fn parse(template: &str) -> Vec<AstNode> {
    let mut nodes = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            nodes.push(AstNode::Literal(rest[..open].to_string()));
            rest = &rest[open..];
        }
        let Some(close) = rest[2..].find("}}") else {
            break; // Unmatched `{{`: the remainder stays literal.
        };
        let body = &rest[2..2 + close];
        let original = &rest[..2 + close + 2];
        if let Some(expression) = parse_expression(body) {
            nodes.push(AstNode::Expression {
                expression,
                original_text: original.to_string(),
            });
        }
        rest = &rest[2 + close + 2..];
    }
    if !rest.is_empty() {
        nodes.push(AstNode::Literal(rest.to_string()));
    }
    nodes
}

/// Classifies one expression body. Returns `None` only for empty bodies.
///
/// Classification order: a top-level `|` makes a pipe chain, an
/// `identifier(...)` spanning the whole body makes a function call, and
/// everything else is read as a path.
pub fn parse_expression(body: &str) -> Option<Expression> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let parts = split_top_level(body, '|');
    if parts.len() > 1 {
        return Some(parse_pipe_chain(&parts));
    }
    if let Some(call) = parse_function_call(body) {
        return Some(call);
    }
    Some(Expression::Path(parse_path_segments(body)))
}

/// Strict variant for editor-side tooling that wants failures surfaced
/// instead of degraded: rejects bodies that classify to nothing usable.
pub fn parse_expression_strict(input: &str) -> Result<Expression, ExprError> {
    match parse_expression(input) {
        Some(Expression::Path(segments)) if segments.is_empty() => Err(ExprError::ExpressionParse(
            input.to_string(),
            "no path segments".to_string(),
        )),
        Some(expr) => Ok(expr),
        None => Err(ExprError::ExpressionParse(
            input.to_string(),
            "empty expression body".to_string(),
        )),
    }
}

// --- Pipe chains ---

fn parse_pipe_chain(parts: &[&str]) -> Expression {
    let head = parts[0].trim();
    let source =
        parse_function_call(head).unwrap_or_else(|| Expression::Path(parse_path_segments(head)));
    let stages = parts[1..].iter().map(|stage| parse_pipe_call(stage)).collect();
    Expression::PipeChain {
        source: Box::new(source),
        stages,
    }
}

/// Parses a `name:arg1:arg2` pipe stage. A malformed stage keeps its raw text
/// as the name, which resolves to absent through the registry.
fn parse_pipe_call(stage: &str) -> PipeCall {
    let tokens = split_top_level(stage, ':');
    let name = tokens[0].trim().to_string();
    let args = tokens[1..]
        .iter()
        .map(|token| {
            let token = token.trim();
            if let Some(text) = parse_string_literal(token) {
                PipeArg::String(text)
            } else if let Some(n) = parse_number_literal(token) {
                PipeArg::Number(n)
            } else {
                // Anything else, scientific notation included, is a bare string.
                PipeArg::String(token.to_string())
            }
        })
        .collect();
    PipeCall { name, args }
}

// --- Function calls ---

/// Parses `name(arg, ...)` when the body starts with an identifier and the
/// balanced close of its argument list ends the body.
fn parse_function_call(body: &str) -> Option<Expression> {
    let (rest, name) = identifier(body).ok()?;
    let inner = rest.trim_start().strip_prefix('(')?;
    let close = matching_paren(inner)?;
    if !inner[close + 1..].trim().is_empty() {
        return None;
    }
    let args_src = &inner[..close];
    let args = if args_src.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(args_src, ',')
            .iter()
            .map(|token| parse_function_arg(token))
            .collect()
    };
    Some(Expression::FunctionCall {
        name: name.to_string(),
        args,
    })
}

fn parse_function_arg(token: &str) -> FunctionArg {
    let token = token.trim();
    if let Some(text) = parse_string_literal(token) {
        FunctionArg::String(text)
    } else if let Some(n) = parse_number_literal(token) {
        FunctionArg::Number(n)
    } else {
        FunctionArg::Path(parse_path_segments(token))
    }
}

// --- Paths ---

/// Lenient path parse: splits on `.`, peeling `[n]` index suffixes off each
/// component. Whitespace is insignificant and non-integer index content is
/// dropped silently.
fn parse_path_segments(input: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for component in input.split('.') {
        let component = component.trim();
        if component.is_empty() {
            continue;
        }
        let (name, indices) = split_indices(component);
        let name = name.trim();
        if !name.is_empty() {
            segments.push(PathSegment::Property(name.to_string()));
        }
        for index in indices {
            if let Ok(i) = index.trim().parse::<usize>() {
                segments.push(PathSegment::Index(i));
            }
        }
    }
    segments
}

/// Splits `items[0][2]` into the leading name and its bracketed indices.
fn split_indices(component: &str) -> (&str, Vec<&str>) {
    let Some(pos) = component.find('[') else {
        return (component, Vec::new());
    };
    let name = &component[..pos];
    let mut indices = Vec::new();
    let mut rest = &component[pos..];
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open + 1..].find(']') else {
            break;
        };
        indices.push(&rest[open + 1..open + 1 + close]);
        rest = &rest[open + 1 + close + 1..];
    }
    (name, indices)
}

// --- Scanning helpers ---

/// Splits on occurrences of `delim` that sit outside quoted strings and
/// parentheses. A backslash escapes the active quote character.
fn split_top_level(input: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == delim && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Index of the `)` that closes an argument list opened just before `input`,
/// skipping quoted strings and nested parentheses.
fn matching_paren(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

// --- Token parsers (nom) ---

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Single- or double-quoted string with backslash escapes of the matching
/// quote character.
fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('\''),
            alt((
                escaped_transform(is_not("\\'"), '\\', value("'", char('\''))),
                success(String::new()),
            )),
            char('\''),
        ),
        delimited(
            char('"'),
            alt((
                escaped_transform(is_not("\\\""), '\\', value("\"", char('"'))),
                success(String::new()),
            )),
            char('"'),
        ),
    ))
    .parse(input)
}

/// Strict numeric literal: `-?digits(.digits)?`. Scientific notation and
/// other spellings deliberately do not match, so template authors get
/// predictable string treatment for them.
fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((opt(char('-')), digit1, opt(pair(char('.'), digit1)))),
        str::parse::<f64>,
    )
    .parse(input)
}

fn parse_string_literal(token: &str) -> Option<String> {
    all_consuming(string_literal)
        .parse(token)
        .map(|(_, s)| s)
        .ok()
}

fn parse_number_literal(token: &str) -> Option<f64> {
    all_consuming(number_literal)
        .parse(token)
        .map(|(_, n)| n)
        .ok()
}
