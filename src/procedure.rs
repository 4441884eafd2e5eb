//! Stored procedure calls with typed output parameters.
//!
//! A call is sent as one T-SQL batch, which SQL Server and ASE both accept:
//!
//! ```sql
//! SET NOCOUNT ON
//! DECLARE @__rv int
//! DECLARE @__o_total money
//! SELECT @__o_total = @P1
//! EXEC @__rv = dbo.place_order @customer = @P2, @total = @__o_total OUTPUT
//! SELECT @__rv AS __return_value, @__o_total AS total
//! SET NOCOUNT OFF
//! ```
//!
//! The trailing `SELECT` is removed from the returned result sets and decoded
//! into [`ProcedureResult::outputs`] and [`ProcedureResult::return_value`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::DataAccessError;
use crate::executor::SqlExecutor;
use crate::results::{FromDbValue, ResultSet};
use crate::types::{DbValue, Provider, SqlDialect};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static QUALIFIED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*){0,2}$")
        .expect("valid qualified identifier regex")
});

const RETURN_VALUE_COLUMN: &str = "__return_value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    Input,
    Output,
    InputOutput,
}

impl ParamDirection {
    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(self, ParamDirection::Output | ParamDirection::InputOutput)
    }
}

/// Server type used to declare an output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Bit,
    Float,
    Money,
    Decimal { precision: u8, scale: u8 },
    /// `None` is the widest the server allows.
    VarChar(Option<u32>),
    NVarChar(Option<u32>),
    Char(u32),
    DateTime,
    Date,
    VarBinary(Option<u32>),
}

// ASE has no (max); 16384 is the largest column on a 16K page server
const SYBASE_MAX_VARCHAR: u32 = 16384;

impl SqlType {
    fn declaration(self, provider: Provider) -> String {
        let width = |len: Option<u32>| match (len, provider) {
            (Some(n), _) => n.to_string(),
            (None, Provider::Sybase) => SYBASE_MAX_VARCHAR.to_string(),
            (None, _) => "max".to_string(),
        };
        match self {
            SqlType::TinyInt => "tinyint".into(),
            SqlType::SmallInt => "smallint".into(),
            SqlType::Int => "int".into(),
            SqlType::BigInt => "bigint".into(),
            SqlType::Bit => "bit".into(),
            SqlType::Float => "float".into(),
            SqlType::Money => "money".into(),
            SqlType::Decimal { precision, scale } => format!("decimal({precision},{scale})"),
            SqlType::VarChar(len) => format!("varchar({})", width(len)),
            SqlType::NVarChar(len) => format!("nvarchar({})", width(len)),
            SqlType::Char(len) => format!("char({len})"),
            SqlType::DateTime => "datetime".into(),
            SqlType::Date => "date".into(),
            SqlType::VarBinary(len) => format!("varbinary({})", width(len)),
        }
    }
}

/// One procedure argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParam {
    /// Parameter name without the leading `@`.
    pub name: String,
    pub direction: ParamDirection,
    /// Required for output directions.
    pub sql_type: Option<SqlType>,
    pub value: DbValue,
}

fn strip_at(name: &str) -> String {
    name.trim().trim_start_matches('@').to_string()
}

impl ProcedureParam {
    #[must_use]
    pub fn input(name: &str, value: impl Into<DbValue>) -> Self {
        Self {
            name: strip_at(name),
            direction: ParamDirection::Input,
            sql_type: None,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn output(name: &str, sql_type: SqlType) -> Self {
        Self {
            name: strip_at(name),
            direction: ParamDirection::Output,
            sql_type: Some(sql_type),
            value: DbValue::Null,
        }
    }

    #[must_use]
    pub fn input_output(name: &str, sql_type: SqlType, value: impl Into<DbValue>) -> Self {
        Self {
            name: strip_at(name),
            direction: ParamDirection::InputOutput,
            sql_type: Some(sql_type),
            value: value.into(),
        }
    }
}

/// A named procedure and its arguments, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub name: String,
    pub params: Vec<ProcedureParam>,
}

impl ProcedureCall {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: ProcedureParam) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn input(self, name: &str, value: impl Into<DbValue>) -> Self {
        self.param(ProcedureParam::input(name, value))
    }

    #[must_use]
    pub fn output(self, name: &str, sql_type: SqlType) -> Self {
        self.param(ProcedureParam::output(name, sql_type))
    }

    #[must_use]
    pub fn input_output(self, name: &str, sql_type: SqlType, value: impl Into<DbValue>) -> Self {
        self.param(ProcedureParam::input_output(name, sql_type, value))
    }
}

/// Value of an output parameter after the call, tagged with its declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParam {
    pub direction: ParamDirection,
    pub sql_type: SqlType,
    pub value: DbValue,
}

#[derive(Debug, Clone, Default)]
pub struct ProcedureResult {
    /// Result sets the procedure selected, in order.
    pub result_sets: Vec<ResultSet>,
    /// Output and in-out parameters keyed by name (no `@`).
    pub outputs: BTreeMap<String, OutputParam>,
    /// The procedure's `RETURN` status.
    pub return_value: Option<i64>,
}

impl ProcedureResult {
    /// Value of an output parameter; a leading `@` and ASCII case are ignored.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&DbValue> {
        let name = strip_at(name);
        self.outputs
            .get(&name)
            .or_else(|| {
                self.outputs
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(&name))
                    .map(|(_, param)| param)
            })
            .map(|p| &p.value)
    }

    /// Decode an output parameter.
    ///
    /// # Errors
    /// Returns `DataAccessError::MappingError` if the parameter is unknown or does not
    /// decode as `T`.
    pub fn output_as<T: FromDbValue>(&self, name: &str) -> Result<T, DataAccessError> {
        let value = self.output(name).ok_or_else(|| {
            DataAccessError::MappingError(format!("no output parameter named '{name}'"))
        })?;
        T::from_db_value(value)
            .map_err(|reason| DataAccessError::MappingError(format!("output '{name}': {reason}")))
    }
}

struct ProcedureBatch {
    sql: String,
    params: Vec<DbValue>,
    outputs: Vec<(String, ParamDirection, SqlType)>,
}

fn output_variable(name: &str) -> String {
    format!("@__o_{name}")
}

fn build_batch(
    call: &ProcedureCall,
    dialect: SqlDialect,
) -> Result<ProcedureBatch, DataAccessError> {
    let proc_name = call.name.trim();
    if !QUALIFIED_IDENTIFIER.is_match(proc_name) {
        return Err(DataAccessError::ParameterError(format!(
            "invalid procedure name '{proc_name}'"
        )));
    }

    let mut declares = String::from("SET NOCOUNT ON\nDECLARE @__rv int\n");
    let mut seeds = String::new();
    let mut params = Vec::new();
    let mut outputs = Vec::new();

    for param in &call.params {
        if !IDENTIFIER.is_match(&param.name) {
            return Err(DataAccessError::ParameterError(format!(
                "invalid parameter name '{}' for procedure '{proc_name}'",
                param.name
            )));
        }
        let uses = call
            .params
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(&param.name))
            .count();
        if uses > 1 {
            return Err(DataAccessError::ParameterError(format!(
                "parameter '{}' given more than once",
                param.name
            )));
        }
        if !param.direction.is_output() {
            continue;
        }

        let sql_type = param.sql_type.ok_or_else(|| {
            DataAccessError::ParameterError(format!(
                "output parameter '{}' needs a declared type",
                param.name
            ))
        })?;
        let variable = output_variable(&param.name);
        let _ = writeln!(
            declares,
            "DECLARE {variable} {}",
            sql_type.declaration(dialect.provider)
        );
        // seeds come before the EXEC line, so they take the first markers
        if param.direction == ParamDirection::InputOutput {
            params.push(param.value.clone());
            let placeholder = dialect.placeholders.placeholder(params.len());
            let _ = writeln!(seeds, "SELECT {variable} = {placeholder}");
        }
        outputs.push((param.name.clone(), param.direction, sql_type));
    }

    let mut arguments = Vec::with_capacity(call.params.len());
    for param in &call.params {
        if param.direction.is_output() {
            arguments.push(format!(
                "@{} = {} OUTPUT",
                param.name,
                output_variable(&param.name)
            ));
        } else {
            params.push(param.value.clone());
            let placeholder = dialect.placeholders.placeholder(params.len());
            arguments.push(format!("@{} = {placeholder}", param.name));
        }
    }

    let mut sql = declares;
    sql.push_str(&seeds);
    sql.push_str("EXEC @__rv = ");
    sql.push_str(proc_name);
    if !arguments.is_empty() {
        sql.push(' ');
        sql.push_str(&arguments.join(", "));
    }
    let _ = write!(sql, "\nSELECT @__rv AS {RETURN_VALUE_COLUMN}");
    for (name, _, _) in &outputs {
        let _ = write!(sql, ", {} AS __o_{name}", output_variable(name));
    }
    sql.push_str("\nSET NOCOUNT OFF");

    Ok(ProcedureBatch {
        sql,
        params,
        outputs,
    })
}

fn decode_status(
    status: Option<ResultSet>,
    outputs: Vec<(String, ParamDirection, SqlType)>,
) -> Result<(Option<i64>, BTreeMap<String, OutputParam>), DataAccessError> {
    let row = status
        .as_ref()
        .and_then(ResultSet::first)
        .filter(|row| {
            row.column_names()
                .first()
                .is_some_and(|c| c.eq_ignore_ascii_case(RETURN_VALUE_COLUMN))
        })
        .ok_or_else(|| {
            DataAccessError::ExecutionError(
                "procedure batch did not return its status row".into(),
            )
        })?;

    let return_value = row.get_by_index(0).and_then(DbValue::as_int);
    let outputs = outputs
        .into_iter()
        .enumerate()
        .map(|(i, (name, direction, sql_type))| {
            let value = row.get_by_index(i + 1).cloned().unwrap_or(DbValue::Null);
            (
                name,
                OutputParam {
                    direction,
                    sql_type,
                    value,
                },
            )
        })
        .collect();
    Ok((return_value, outputs))
}

/// Call a stored procedure and collect its result sets, outputs and return status.
///
/// ```rust,no_run
/// # use sql_access::prelude::*;
/// # async fn demo(factory: &ConnectionFactory) -> Result<(), DataAccessError> {
/// let mut conn = factory.open("orders").await?;
/// let call = ProcedureCall::new("dbo.place_order")
///     .input("customer", 42)
///     .output("order_id", SqlType::Int);
/// let result = execute_procedure(&mut conn, &call).await?;
/// let order_id: i64 = result.output_as("order_id")?;
/// # let _ = order_id;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns `DataAccessError::Unimplemented` on providers without stored
/// procedures, `DataAccessError::ParameterError` for invalid names or missing
/// output types, otherwise the execution error.
pub async fn execute_procedure<E>(
    exec: &mut E,
    call: &ProcedureCall,
) -> Result<ProcedureResult, DataAccessError>
where
    E: SqlExecutor + ?Sized,
{
    let dialect = exec.dialect();
    if !dialect.supports_procedures() {
        return Err(DataAccessError::Unimplemented(format!(
            "stored procedures are not supported by {}",
            dialect.provider
        )));
    }

    let batch = build_batch(call, dialect)?;
    debug!(procedure = %call.name, params = batch.params.len(), "execute_procedure");
    let mut result_sets = exec.execute_multiple(&batch.sql, &batch.params).await?;
    let status = result_sets.pop();
    let (return_value, outputs) = decode_status(status, batch.outputs)?;

    Ok(ProcedureResult {
        result_sets,
        outputs,
        return_value,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn builds_sql_server_batch() {
        let call = ProcedureCall::new("dbo.place_order")
            .input("@customer", 42)
            .input_output("total", SqlType::Money, 10.5)
            .output("order_id", SqlType::Int);
        let batch = build_batch(&call, Provider::Mssql.dialect()).unwrap();
        assert_eq!(
            batch.sql,
            "SET NOCOUNT ON\n\
             DECLARE @__rv int\n\
             DECLARE @__o_total money\n\
             DECLARE @__o_order_id int\n\
             SELECT @__o_total = @P1\n\
             EXEC @__rv = dbo.place_order @customer = @P2, @total = @__o_total OUTPUT, @order_id = @__o_order_id OUTPUT\n\
             SELECT @__rv AS __return_value, @__o_total AS __o_total, @__o_order_id AS __o_order_id\n\
             SET NOCOUNT OFF"
        );
        assert_eq!(batch.params, vec![DbValue::Float(10.5), DbValue::Int(42)]);
        assert_eq!(batch.outputs.len(), 2);
    }

    #[test]
    fn sybase_batch_uses_positional_markers_and_bounded_varchar() {
        let call = ProcedureCall::new("sp_lookup")
            .input("code", "A1")
            .output("label", SqlType::VarChar(None));
        let batch = build_batch(&call, Provider::Sybase.dialect()).unwrap();
        assert!(batch.sql.contains("DECLARE @__o_label varchar(16384)"));
        assert!(batch.sql.contains("EXEC @__rv = sp_lookup @code = ?, @label = @__o_label OUTPUT"));
    }

    #[test]
    fn reserved_word_outputs_get_prefixed_aliases() {
        let call = ProcedureCall::new("p")
            .output("order", SqlType::Int)
            .output("key", SqlType::VarChar(Some(20)));
        let batch = build_batch(&call, Provider::Mssql.dialect()).unwrap();
        assert!(batch.sql.ends_with(
            "SELECT @__rv AS __return_value, @__o_order AS __o_order, @__o_key AS __o_key\n\
             SET NOCOUNT OFF"
        ));
        assert!(!batch.sql.contains(" AS order"));
    }

    #[test]
    fn call_without_params_has_bare_exec() {
        let batch = build_batch(&ProcedureCall::new("refresh"), Provider::Mssql.dialect()).unwrap();
        assert!(batch.sql.contains("EXEC @__rv = refresh\n"));
        assert!(batch.params.is_empty());
    }

    #[test]
    fn rejects_injected_names() {
        let bad_proc = ProcedureCall::new("p; drop table t");
        assert!(matches!(
            build_batch(&bad_proc, Provider::Mssql.dialect()),
            Err(DataAccessError::ParameterError(_))
        ));
        let bad_param = ProcedureCall::new("p").input("a = 1 --", 1);
        assert!(build_batch(&bad_param, Provider::Mssql.dialect()).is_err());
        let dup = ProcedureCall::new("p").input("a", 1).output("A", SqlType::Int);
        assert!(build_batch(&dup, Provider::Mssql.dialect()).is_err());
    }

    #[test]
    fn output_without_type_is_rejected() {
        let call = ProcedureCall::new("p").param(ProcedureParam {
            name: "o".into(),
            direction: ParamDirection::Output,
            sql_type: None,
            value: DbValue::Null,
        });
        assert!(build_batch(&call, Provider::Mssql.dialect()).is_err());
    }

    #[test]
    fn decodes_status_row_into_outputs() {
        let mut status = ResultSet::with_capacity(1);
        status.set_column_names(Arc::new(vec![
            RETURN_VALUE_COLUMN.to_string(),
            "order_id".to_string(),
        ]));
        status.add_row_values(vec![DbValue::Int(0), DbValue::Int(981)]);
        let (rv, outputs) = decode_status(
            Some(status),
            vec![("order_id".into(), ParamDirection::Output, SqlType::Int)],
        )
        .unwrap();
        assert_eq!(rv, Some(0));
        let result = ProcedureResult {
            result_sets: Vec::new(),
            outputs,
            return_value: rv,
        };
        assert_eq!(result.output_as::<i64>("@order_id").unwrap(), 981);
        assert_eq!(result.outputs["order_id"].sql_type, SqlType::Int);
        assert_eq!(result.output_as::<i64>("Order_ID").unwrap(), 981);
        assert!(result.output("order").is_none());
    }

    #[test]
    fn missing_status_row_is_an_error() {
        let mut other = ResultSet::with_capacity(1);
        other.set_column_names(Arc::new(vec!["x".to_string()]));
        other.add_row_values(vec![DbValue::Int(1)]);
        assert!(decode_status(Some(other), Vec::new()).is_err());
        assert!(decode_status(None, Vec::new()).is_err());
    }
}
