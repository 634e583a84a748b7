//! Table and column name validation.
//!
//! Identifiers cannot be bound as parameters, so every table and column name
//! that reaches SQL text goes through [`Ident::parse`] first.
//!
//! - Bare segments must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted segments (`"Name"`) allow anything but NUL; `""` escapes a quote
//! - Segments are joined with `.` (`public.customers`)

use std::fmt;

use crate::error::{RowgateError, RowgateResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Bare(String),
    Quoted(String),
}

/// A validated SQL identifier (table or column, optionally schema-qualified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    segments: Vec<Segment>,
}

impl Ident {
    /// Parse and validate an identifier.
    pub fn parse(input: &str) -> RowgateResult<Self> {
        if input.is_empty() {
            return Err(RowgateError::validation("identifier cannot be empty"));
        }
        if input.contains('\0') {
            return Err(RowgateError::validation(
                "identifier cannot contain a NUL character",
            ));
        }

        let mut segments = Vec::new();
        let mut rest = input;
        loop {
            let (segment, tail) = if let Some(quoted) = rest.strip_prefix('"') {
                parse_quoted(quoted)?
            } else {
                parse_bare(rest)?
            };
            segments.push(segment);

            match tail.strip_prefix('.') {
                Some("") => {
                    return Err(RowgateError::validation(format!(
                        "trailing '.' in identifier {input:?}"
                    )));
                }
                Some(next) => rest = next,
                None if tail.is_empty() => break,
                None => {
                    return Err(RowgateError::validation(format!(
                        "unexpected {:?} in identifier {input:?}",
                        tail.chars().next().unwrap_or_default()
                    )));
                }
            }
        }

        Ok(Self { segments })
    }

    /// Render as SQL text.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match segment {
                Segment::Bare(name) => out.push_str(name),
                Segment::Quoted(name) => {
                    out.push('"');
                    out.push_str(&name.replace('"', "\"\""));
                    out.push('"');
                }
            }
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Parse a quoted segment; `input` starts right after the opening quote.
fn parse_quoted(input: &str) -> RowgateResult<(Segment, &str)> {
    let mut name = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if input[i + 1..].starts_with('"') {
            chars.next();
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(RowgateError::validation("empty quoted identifier"));
        }
        return Ok((Segment::Quoted(name), &input[i + 1..]));
    }
    Err(RowgateError::validation("unclosed quoted identifier"))
}

fn parse_bare(input: &str) -> RowgateResult<(Segment, &str)> {
    let end = input
        .char_indices()
        .find(|&(i, c)| {
            let valid = if i == 0 {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c == '$' || c.is_ascii_alphanumeric()
            };
            !valid
        })
        .map_or(input.len(), |(i, _)| i);

    if end == 0 {
        return Err(match input.chars().next() {
            Some(c) => RowgateError::validation(format!("invalid identifier start character {c:?}")),
            None => RowgateError::validation("empty identifier segment"),
        });
    }
    Ok((Segment::Bare(input[..end].to_string()), &input[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_dotted() {
        assert_eq!(Ident::parse("customers").unwrap().to_sql(), "customers");
        assert_eq!(
            Ident::parse("public.customers").unwrap().to_sql(),
            "public.customers"
        );
        assert_eq!(Ident::parse("col$1").unwrap().to_sql(), "col$1");
    }

    #[test]
    fn quoted_segments_round_trip() {
        assert_eq!(
            Ident::parse(r#"public."Customer List".id"#).unwrap().to_sql(),
            r#"public."Customer List".id"#
        );
        assert_eq!(
            Ident::parse(r#""say ""hi""""#).unwrap().to_sql(),
            r#""say ""hi""""#
        );
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(Ident::parse("customers; DROP TABLE customers").is_err());
        assert!(Ident::parse("id = 1 OR 1").is_err());
        assert!(Ident::parse("name--").is_err());
    }

    #[test]
    fn rejects_malformed() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1customers").is_err());
        assert!(Ident::parse("public..customers").is_err());
        assert!(Ident::parse("public.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
        assert!(Ident::parse(r#""""#).is_err());
    }
}
