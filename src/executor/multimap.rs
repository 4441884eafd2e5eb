use std::ops::Range;

use super::SqlExecutor;
use crate::error::DataAccessError;
use crate::results::{DbRow, FromRow};
use crate::types::DbValue;

/// Column ranges for `parts` objects, cut at the `split_on` columns.
///
/// `split_on` is a comma separated list; a single name is reused for every
/// boundary. Each boundary is searched case-insensitively, left to right,
/// starting one column after the previous boundary.
fn split_ranges(
    column_names: &[String],
    split_on: &str,
    parts: usize,
) -> Result<Vec<Range<usize>>, DataAccessError> {
    let names: Vec<&str> = split_on
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return Err(DataAccessError::MappingError(
            "split_on must name at least one column".into(),
        ));
    }
    let boundaries = parts - 1;
    if names.len() != 1 && names.len() != boundaries {
        return Err(DataAccessError::MappingError(format!(
            "split_on lists {} columns but {boundaries} are needed",
            names.len()
        )));
    }

    let mut starts = vec![0];
    for i in 0..boundaries {
        let name = names[i.min(names.len() - 1)];
        let from = starts[i] + 1;
        let found = column_names
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, column)| column.eq_ignore_ascii_case(name))
            .map(|(idx, _)| idx)
            .ok_or_else(|| {
                DataAccessError::MappingError(format!(
                    "split column '{name}' not found after column {from}"
                ))
            })?;
        starts.push(found);
    }
    starts.push(column_names.len());

    Ok(starts.windows(2).map(|w| w[0]..w[1]).collect())
}

fn decode_parts<const N: usize>(row: &DbRow, ranges: &[Range<usize>]) -> [DbRow; N] {
    std::array::from_fn(|i| row.slice(ranges[i].clone()))
}

/// Decode each row into two objects split at `split_on` and combine them.
///
/// ```text
/// SELECT o.id, o.total, c.id, c.name FROM orders o JOIN customers c ON ...
///        |---- Order ----|---- Customer ----|   split_on = "id"
/// ```
///
/// # Errors
/// Returns `DataAccessError::MappingError` if a split column is missing or a part
/// does not decode, otherwise the execution error.
pub async fn query_map2<A, B, R, E, F>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
    split_on: &str,
    mut combine: F,
) -> Result<Vec<R>, DataAccessError>
where
    A: FromRow,
    B: FromRow,
    E: SqlExecutor + ?Sized,
    F: FnMut(A, B) -> R,
{
    let result_set = exec.execute_select(sql, params).await?;
    let Some(names) = result_set.get_column_names() else {
        return Ok(Vec::new());
    };
    let ranges = split_ranges(names, split_on, 2)?;

    result_set
        .iter()
        .map(|row| {
            let [a, b] = decode_parts::<2>(row, &ranges);
            Ok(combine(A::from_row(&a)?, B::from_row(&b)?))
        })
        .collect()
}

/// Three-way variant of [`query_map2`].
///
/// # Errors
/// As [`query_map2`].
pub async fn query_map3<A, B, C, R, E, F>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
    split_on: &str,
    mut combine: F,
) -> Result<Vec<R>, DataAccessError>
where
    A: FromRow,
    B: FromRow,
    C: FromRow,
    E: SqlExecutor + ?Sized,
    F: FnMut(A, B, C) -> R,
{
    let result_set = exec.execute_select(sql, params).await?;
    let Some(names) = result_set.get_column_names() else {
        return Ok(Vec::new());
    };
    let ranges = split_ranges(names, split_on, 3)?;

    result_set
        .iter()
        .map(|row| {
            let [a, b, c] = decode_parts::<3>(row, &ranges);
            Ok(combine(
                A::from_row(&a)?,
                B::from_row(&b)?,
                C::from_row(&c)?,
            ))
        })
        .collect()
}
