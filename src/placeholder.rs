//! Typed placeholder expansion.
//!
//! Templates contain the tokens `?`, `?p`, `?a`, `?k` and `?v`; each token
//! consumes the next unused argument, left to right. A `?` not followed by
//! one of `p`/`a`/`k`/`v` is a plain scalar token. Expansion is pure text
//! transformation over a [`ValueQuoter`]; no I/O happens here.

use crate::error::SqlAdapterError;
use crate::quoting::ValueQuoter;
use crate::types::{SqlParam, SqlValue};

/// One placeholder token recognized in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `?`: quote the scalar argument as a literal value.
    Scalar,
    /// `?p`: emit the argument verbatim; the caller asserts it is safe SQL.
    RawPassthrough,
    /// `?a`: mapping rendered as `key=value` assignment pairs.
    AssignmentList,
    /// `?k`: mapping rendered as a list of quoted key identifiers.
    KeyList,
    /// `?v`: mapping or sequence rendered as a list of quoted values.
    ValueList,
}

/// Expand `template`, pulling one argument per token.
///
/// # Errors
/// Returns `SqlAdapterError::ParameterError` when a token has no remaining
/// argument or its argument has the wrong shape, and propagates quoting
/// failures from the driver.
pub fn expand_placeholders(
    template: &str,
    args: &[SqlParam],
    quoter: &dyn ValueQuoter,
) -> Result<String, SqlAdapterError> {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut next_arg = 0;
    let mut seg_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'?' {
            idx += 1;
            continue;
        }
        out.push_str(&template[seg_start..idx]);

        let (token, width) = match bytes.get(idx + 1) {
            Some(b'p') => (Token::RawPassthrough, 2),
            Some(b'a') => (Token::AssignmentList, 2),
            Some(b'k') => (Token::KeyList, 2),
            Some(b'v') => (Token::ValueList, 2),
            _ => (Token::Scalar, 1),
        };

        let arg = args.get(next_arg).ok_or_else(|| {
            SqlAdapterError::ParameterError(format!(
                "template has more placeholder tokens than arguments ({} supplied)",
                args.len()
            ))
        })?;
        next_arg += 1;

        render_token(token, arg, quoter, &mut out)?;
        idx += width;
        seg_start = idx;
    }
    out.push_str(&template[seg_start..]);
    Ok(out)
}

fn render_token(
    token: Token,
    arg: &SqlParam,
    quoter: &dyn ValueQuoter,
    out: &mut String,
) -> Result<(), SqlAdapterError> {
    match token {
        Token::Scalar => match arg {
            SqlParam::Value(value) => out.push_str(&quoter.quote(value)?),
            // A raw fragment handed to a quoting token gets quoted; raw
            // passthrough has to be asked for with `?p`.
            SqlParam::Raw(fragment) => {
                out.push_str(&quoter.quote(&SqlValue::Text(fragment.clone()))?);
            }
            SqlParam::Map(_) | SqlParam::List(_) => {
                return Err(shape_error("?", "a scalar"));
            }
        },
        Token::RawPassthrough => match arg {
            SqlParam::Raw(fragment) => out.push_str(fragment),
            SqlParam::Value(value) => out.push_str(&value.plain_text()),
            SqlParam::Map(_) | SqlParam::List(_) => {
                return Err(shape_error("?p", "a scalar or raw fragment"));
            }
        },
        Token::AssignmentList => match arg {
            SqlParam::Map(pairs) => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quoter.quote_identifier(key));
                    out.push('=');
                    out.push_str(&quoter.quote(value)?);
                }
            }
            _ => return Err(shape_error("?a", "a mapping")),
        },
        Token::KeyList => match arg {
            SqlParam::Map(pairs) => {
                for (i, (key, _)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quoter.quote_identifier(key));
                }
            }
            _ => return Err(shape_error("?k", "a mapping")),
        },
        Token::ValueList => match arg {
            SqlParam::Map(pairs) => {
                for (i, (_, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quoter.quote(value)?);
                }
            }
            SqlParam::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quoter.quote(value)?);
                }
            }
            _ => return Err(shape_error("?v", "a mapping or sequence")),
        },
    }
    Ok(())
}

fn shape_error(token: &str, expected: &str) -> SqlAdapterError {
    SqlAdapterError::ParameterError(format!("{token} placeholder requires {expected}"))
}
