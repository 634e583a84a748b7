//! SQL literal rendering for diagnostics.
//!
//! Statements are always executed with bound parameters. These helpers only
//! produce a human-readable, fully escaped rendering of a statement for
//! trace-level logs.

use std::fmt::Write;

use crate::value::{TIMESTAMP_TEXT_FORMAT, Value};

/// Quote a string as a PostgreSQL literal.
///
/// Plain strings use the standard form with `'` doubled. Strings containing a
/// backslash or control characters use the `E'...'` escape form.
pub fn quote_literal(s: &str) -> String {
    let needs_escape_form = s.chars().any(|c| c == '\\' || c.is_control());
    let mut out = String::with_capacity(s.len() + 3);

    if !needs_escape_form {
        out.push('\'');
        out.push_str(&s.replace('\'', "''"));
        out.push('\'');
        return out;
    }

    out.push_str("E'");
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render a value as an inline SQL literal.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Text(s) => quote_literal(s),
        Value::Int(n) => n.to_string(),
        Value::Float(x) if x.is_nan() => "'NaN'".to_string(),
        Value::Float(x) if x.is_infinite() => {
            if x.is_sign_positive() {
                "'Infinity'".to_string()
            } else {
                "'-Infinity'".to_string()
            }
        }
        Value::Float(x) => x.to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Timestamp(ts) => format!("'{}'", ts.format(TIMESTAMP_TEXT_FORMAT)),
        Value::Null => "NULL".to_string(),
    }
}
