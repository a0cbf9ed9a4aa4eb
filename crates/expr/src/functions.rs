//! The registry and built-in implementations of formatting functions.
//!
//! Every function is pure and total: invalid input degrades to a best-effort
//! string, never a panic and never an error. Null input yields an empty
//! string unless a function documents otherwise. The same implementations
//! back both calling conventions; in pipe syntax the piped value arrives as
//! the first positional argument.

use crate::engine::{number_value, value_to_string};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use serde_json::Value;
use std::collections::HashMap;

/// The signature for a binding function.
pub type BindingFunction = fn(args: &[Value]) -> Value;

/// A registry holding all functions available to expression resolution.
pub struct FunctionRegistry {
    functions: HashMap<String, BindingFunction>,
}

impl FunctionRegistry {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers a function. Names are case-insensitive.
    pub fn register(&mut self, name: &str, func: BindingFunction) {
        self.functions.insert(name.to_lowercase(), func);
    }

    /// Finds a function by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&BindingFunction> {
        self.functions.get(&name.to_lowercase())
    }
}

impl Default for FunctionRegistry {
    /// Creates a registry populated with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("formatCurrency", format_currency);
        registry.register("formatDate", format_date);
        registry.register("formatNumber", format_number);
        registry.register("if", if_then_else);
        registry.register("uppercase", uppercase);
        registry.register("lowercase", lowercase);
        registry.register("join", join);
        registry.register("currency", format_currency);
        registry.register("percent", percent);
        registry.register("abs", abs);
        registry.register("date", date);
        registry.register("number", format_number);
        registry.register("cpf", cpf);
        registry.register("sign", sign);
        registry.register("ifEmpty", if_empty);
        registry.register("multiply", multiply);
        registry
    }
}

// --- Coercion helpers ---

const NULL: Value = Value::Null;

fn arg<'a>(args: &'a [Value], i: usize) -> &'a Value {
    args.get(i).unwrap_or(&NULL)
}

/// Numeric reading of a value: numbers directly, strings via parse.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Upper bound on requested decimal places, so an adversarial template
/// cannot demand pathologically long number renderings.
const MAX_DECIMALS: usize = 100;

fn decimals_arg(args: &[Value], i: usize, default: usize) -> usize {
    numeric(arg(args, i))
        .map(|d| (d.max(0.0) as usize).min(MAX_DECIMALS))
        .unwrap_or(default)
}

/// Fixed-point rendering with thousands grouping, e.g. `-1234.5` with pt-BR
/// separators comes out as `-1.234,50`.
fn format_grouped(n: f64, decimals: usize, decimal_sep: char, group_sep: char) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(group_sep);
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}

// --- Built-in function implementations ---

/// `formatCurrency(value, code)` / `value | currency:"USD"`.
///
/// BRL, USD, EUR and GBP render with their conventional symbol and separator
/// locale; unknown codes fall back to `CODE <2-decimal number>`. The code
/// defaults to BRL. Non-numeric values pass through as their string form.
fn format_currency(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(n) = numeric(value) else {
        return Value::String(value_to_string(value));
    };
    let code = match arg(args, 1) {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_uppercase(),
        _ => "BRL".to_string(),
    };
    let sign = if n < 0.0 { "-" } else { "" };
    let magnitude = n.abs();
    let text = match code.as_str() {
        "BRL" => format!("{sign}R$ {}", format_grouped(magnitude, 2, ',', '.')),
        "USD" => format!("{sign}${}", format_grouped(magnitude, 2, '.', ',')),
        "GBP" => format!("{sign}£{}", format_grouped(magnitude, 2, '.', ',')),
        "EUR" => format!("{sign}{} €", format_grouped(magnitude, 2, ',', '.')),
        _ => format!("{sign}{code} {magnitude:.2}"),
    };
    Value::String(text)
}

/// Reads a date out of a JSON value: epoch milliseconds for numbers, ISO
/// spellings for strings.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()? as i64;
            Some(DateTime::<Utc>::from_timestamp_millis(millis)?.date_naive())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.date_naive());
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(d);
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        }
        _ => None,
    }
}

/// Maps a locale tag to its conventional short date order.
fn locale_date_format(tag: &str) -> &'static str {
    let tag = tag.trim();
    if tag.eq_ignore_ascii_case("en-US") || tag.eq_ignore_ascii_case("en") {
        "%m/%d/%Y"
    } else if tag.len() >= 2 && tag[..2].eq_ignore_ascii_case("de") {
        "%d.%m.%Y"
    } else if ["pt", "es", "fr", "it"]
        .iter()
        .any(|p| tag.len() >= 2 && tag[..2].eq_ignore_ascii_case(p))
        || tag.eq_ignore_ascii_case("en-GB")
    {
        "%d/%m/%Y"
    } else {
        "%Y-%m-%d"
    }
}

/// `formatDate(value, pattern-or-locale)`. The second argument is one of the
/// literal patterns `YYYY-MM-DD`, `MM/DD/YYYY`, `DD/MM/YYYY`, or a locale
/// tag. Values that do not read as dates pass through unchanged.
fn format_date(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(d) = parse_date(value) else {
        return Value::String(value_to_string(value));
    };
    let pattern = match arg(args, 1) {
        Value::String(s) => s.trim(),
        _ => "",
    };
    let strftime = match pattern {
        "YYYY-MM-DD" => "%Y-%m-%d",
        "MM/DD/YYYY" => "%m/%d/%Y",
        "DD/MM/YYYY" => "%d/%m/%Y",
        other => locale_date_format(other),
    };
    Value::String(d.format(strftime).to_string())
}

/// `value | date:"MM/YYYY"`. The pipe alias allows the three literal
/// patterns plus the `MM/YYYY` and `YYYY` shorthands, defaulting to
/// `DD/MM/YYYY` for anything else.
fn date(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(d) = parse_date(value) else {
        return Value::String(value_to_string(value));
    };
    let pattern = match arg(args, 1) {
        Value::String(s) => s.trim(),
        _ => "DD/MM/YYYY",
    };
    let strftime = match pattern {
        "YYYY-MM-DD" => "%Y-%m-%d",
        "MM/DD/YYYY" => "%m/%d/%Y",
        "MM/YYYY" => "%m/%Y",
        "YYYY" => "%Y",
        _ => "%d/%m/%Y",
    };
    Value::String(d.format(strftime).to_string())
}

/// `formatNumber(value, decimals)` / `value | number:1`. Grouped decimal
/// formatting with pt-BR separators. Non-numeric values pass through.
fn format_number(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(n) = numeric(value) else {
        return Value::String(value_to_string(value));
    };
    let decimals = decimals_arg(args, 1, 2);
    Value::String(format_grouped(n, decimals, ',', '.'))
}

/// Truthiness: null, false, 0 and the empty string are falsy; everything
/// else, arrays and objects included, is truthy.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `if(condition, thenValue, elseValue)`. Returns the chosen branch as a raw
/// value, not a string.
fn if_then_else(args: &[Value]) -> Value {
    if truthy(arg(args, 0)) {
        arg(args, 1).clone()
    } else {
        arg(args, 2).clone()
    }
}

fn uppercase(args: &[Value]) -> Value {
    Value::String(value_to_string(arg(args, 0)).to_uppercase())
}

fn lowercase(args: &[Value]) -> Value {
    Value::String(value_to_string(arg(args, 0)).to_lowercase())
}

/// `join(array, separator)`. Elements stringify individually, null elements
/// becoming empty segments. Non-array input is stringified as-is.
fn join(args: &[Value]) -> Value {
    let separator = match arg(args, 1) {
        Value::Null => ",".to_string(),
        other => value_to_string(other),
    };
    match arg(args, 0) {
        Value::Array(items) => Value::String(items.iter().map(value_to_string).join(&separator)),
        other => Value::String(value_to_string(other)),
    }
}

/// `value | percent:0`. Multiplies by 100 and renders with a decimal comma
/// and a trailing percent sign.
fn percent(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(n) = numeric(value) else {
        return Value::String(value_to_string(value));
    };
    let decimals = decimals_arg(args, 1, 2);
    let mut text = format!("{:.*}", decimals, n * 100.0).replace('.', ",");
    text.push('%');
    Value::String(text)
}

/// `value | abs`. Absolute value of the numeric reading; non-numeric input
/// passes through untouched.
fn abs(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    match numeric(value) {
        Some(n) => number_value(n.abs()),
        None => value.clone(),
    }
}

/// `value | cpf`. Formats an 11-digit identifier as `###.###.###-##`; any
/// other digit count passes through.
fn cpf(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let text = value_to_string(value);
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return Value::String(text);
    }
    Value::String(format!(
        "{}.{}.{}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..]
    ))
}

/// `value | sign`. Prefixes positive numbers with `+`, keeps the `-` of
/// negative ones and renders zero as the literal `0`.
fn sign(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(n) = numeric(value) else {
        return Value::String(value_to_string(value));
    };
    let text = if n == 0.0 {
        "0".to_string()
    } else if n > 0.0 {
        format!("+{n}")
    } else {
        n.to_string()
    };
    Value::String(text)
}

/// `ifEmpty(value, fallback)`. Null and the empty string take the fallback;
/// zero is a value, not an absence.
fn if_empty(args: &[Value]) -> Value {
    let value = arg(args, 0);
    let empty = matches!(value, Value::Null) || matches!(value, Value::String(s) if s.is_empty());
    if empty {
        arg(args, 1).clone()
    } else {
        value.clone()
    }
}

/// `value | multiply:100`. Numeric multiplication with a factor defaulting
/// to 1; non-numeric values pass through.
fn multiply(args: &[Value]) -> Value {
    let value = arg(args, 0);
    if value.is_null() {
        return Value::String(String::new());
    }
    let Some(n) = numeric(value) else {
        return value.clone();
    };
    let factor = numeric(arg(args, 1)).unwrap_or(1.0);
    number_value(n * factor)
}
