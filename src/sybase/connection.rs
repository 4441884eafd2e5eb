use std::sync::{Arc, OnceLock};

use odbc_api::{Connection, ConnectionOptions, Environment};
use tokio::sync::Mutex;

use crate::config::ConnectionSettings;
use crate::error::DataAccessError;

static ODBC_ENV: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, DataAccessError> {
    if let Some(env) = ODBC_ENV.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    // a racing initialiser may have won; either environment is equivalent
    let _ = ODBC_ENV.set(env);
    ODBC_ENV
        .get()
        .ok_or_else(|| DataAccessError::ConnectionError("ODBC environment unavailable".into()))
}

pub(crate) type SharedOdbcConnection = Arc<Mutex<Connection<'static>>>;

/// One ODBC session against an ASE server.
///
/// ASE has no pool here; each checkout opens a session and closing happens on drop.
pub struct SybaseConnection {
    pub(crate) conn: SharedOdbcConnection,
}

impl std::fmt::Debug for SybaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SybaseConnection")
            .field("conn", &"<OdbcConnection>")
            .finish()
    }
}

impl SybaseConnection {
    /// Open a session using the alias' ODBC connection string.
    ///
    /// # Errors
    /// Returns `DataAccessError::OdbcError` if the driver rejects the connection.
    pub async fn open(settings: &ConnectionSettings) -> Result<Self, DataAccessError> {
        let connection_string = settings.connection_string.clone();
        let timeout_secs = u32::try_from(settings.connect_timeout_or_default().as_secs()).ok();
        let conn = tokio::task::spawn_blocking(move || {
            let env = environment()?;
            let options = ConnectionOptions {
                login_timeout_sec: timeout_secs,
                ..ConnectionOptions::default()
            };
            Ok::<_, DataAccessError>(
                env.connect_with_connection_string(&connection_string, options)?,
            )
        })
        .await
        .map_err(|e| DataAccessError::ConnectionError(format!("ODBC connect join error: {e}")))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Run synchronous ODBC work off the async runtime.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedOdbcConnection,
    func: F,
) -> Result<R, DataAccessError>
where
    F: FnOnce(&mut Connection<'static>) -> Result<R, DataAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| DataAccessError::ExecutionError(format!("ODBC spawn_blocking join error: {e}")))?
}
