use std::collections::HashMap;

mod scanner;

use scanner::{State, scan_index_token, step};

use crate::error::DataAccessError;
use crate::types::{DbValue, PlaceholderStyle};

/// Parameterised SQL produced from an interpolation template.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedSql {
    pub sql: String,
    pub params: Vec<DbValue>,
}

/// Replace `{i}` tokens in `template` with driver placeholders bound to `args[i]`.
///
/// Numbered styles reuse one placeholder per distinct index; the positional
/// style repeats the value so positions line up. Placeholders are numbered in
/// order of first appearance, so arguments the template never mentions are not
/// bound. `{{` / `}}` produce literal braces; tokens inside quoted strings,
/// quoted or bracketed identifiers and comments are copied untouched.
///
/// ```rust
/// use sql_access::prelude::*;
///
/// let built = build_interpolated_sql(
///     "SELECT * FROM orders WHERE customer = {0} AND status <> {1}",
///     &[DbValue::Int(7), DbValue::Text("void".into())],
///     PlaceholderStyle::AtNumbered,
/// )?;
/// assert_eq!(built.sql, "SELECT * FROM orders WHERE customer = @P1 AND status <> @P2");
/// # Ok::<(), DataAccessError>(())
/// ```
///
/// # Errors
/// Returns `DataAccessError::ParameterError` when a token refers past the end of `args`.
pub fn build_interpolated_sql(
    template: &str,
    args: &[DbValue],
    style: PlaceholderStyle,
) -> Result<InterpolatedSql, DataAccessError> {
    let bytes = template.as_bytes();
    let mut sql = String::with_capacity(template.len() + 8);
    let mut params = Vec::with_capacity(args.len());
    let mut numbering: HashMap<usize, usize> = HashMap::new();
    let mut state = State::Normal;
    let mut flushed = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if state == State::Normal {
            let b = bytes[idx];
            let doubled = bytes.get(idx + 1) == Some(&b);
            if (b == b'{' || b == b'}') && doubled {
                sql.push_str(&template[flushed..idx]);
                sql.push(b as char);
                idx += 2;
                flushed = idx;
                continue;
            }
            if b == b'{'
                && let Some((end, arg_index)) = scan_index_token(bytes, idx)
            {
                let value = args.get(arg_index).ok_or_else(|| {
                    DataAccessError::ParameterError(format!(
                        "template refers to argument {{{arg_index}}} but only {} were supplied",
                        args.len()
                    ))
                })?;
                sql.push_str(&template[flushed..idx]);
                if style.is_positional() {
                    params.push(value.clone());
                    sql.push_str(&style.placeholder(params.len()));
                } else {
                    let number = *numbering.entry(arg_index).or_insert_with(|| {
                        params.push(value.clone());
                        params.len()
                    });
                    sql.push_str(&style.placeholder(number));
                }
                idx = end;
                flushed = idx;
                continue;
            }
        }
        idx += 1 + step(&mut state, bytes, idx);
    }

    sql.push_str(&template[flushed.min(template.len())..]);
    Ok(InterpolatedSql { sql, params })
}

/// Split a batch on `;` terminators that sit outside literals and comments.
///
/// Empty statements are dropped.
#[must_use]
#[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
pub(crate) fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut state = State::Normal;
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if state == State::Normal && bytes[idx] == b';' {
            statements.push(&sql[start..idx]);
            idx += 1;
            start = idx;
            continue;
        }
        idx += 1 + step(&mut state, bytes, idx);
    }
    if start < sql.len() {
        statements.push(&sql[start..]);
    }

    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
