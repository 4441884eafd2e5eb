use tiberius::Query;

use crate::types::DbValue;

/// Bind parameters in order onto a tiberius query; placeholders are `@P1..@Pn`.
pub fn bind_query_params<'a>(query: &'a str, params: &[DbValue]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            DbValue::Int(i) => query_builder.bind(*i),
            DbValue::Float(f) => query_builder.bind(*f),
            DbValue::Text(s) => query_builder.bind(s.clone()),
            DbValue::Bool(b) => query_builder.bind(*b),
            DbValue::Timestamp(dt) => query_builder.bind(*dt),
            DbValue::Null => query_builder.bind(Option::<String>::None),
            DbValue::Json(jsval) => query_builder.bind(jsval.to_string()),
            DbValue::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
