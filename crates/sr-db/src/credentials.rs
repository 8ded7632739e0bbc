//! Connection credentials and endpoint selection

use std::fmt;
use std::path::PathBuf;

/// Directory under which Cloud SQL exposes instance sockets
const CLOUD_SQL_SOCKET_DIR: &str = "/cloudsql";

/// Credentials for a PostgreSQL server
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DbCredentials {
    /// TCP host name, or an absolute Unix-socket directory starting with `/`
    pub host: String,

    /// TCP port; ignored for Unix sockets
    pub port: u16,

    pub user: String,

    pub password: String,

    /// Database name
    pub database: String,

    /// Cloud SQL instance connection name (`project:region:instance`).
    ///
    /// When set, the connection goes through `/cloudsql/<instance>` and
    /// `host` is ignored.
    pub cloud_sql_instance: Option<String>,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("cloud_sql_instance", &self.cloud_sql_instance)
            .finish()
    }
}

/// Where a connection is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix-domain socket directory
    Unix { path: PathBuf },

    /// TCP host and port
    Tcp { host: String, port: u16 },
}

impl Endpoint {
    /// Network name: `unix` or `tcp`
    pub fn network(&self) -> &'static str {
        match self {
            Endpoint::Unix { .. } => "unix",
            Endpoint::Tcp { .. } => "tcp",
        }
    }

    /// Dial address: the socket path, or `host:port`
    pub fn address(&self) -> String {
        match self {
            Endpoint::Unix { path } => path.display().to_string(),
            Endpoint::Tcp { host, port } => format!("{host}:{port}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.network(), self.address())
    }
}

impl DbCredentials {
    /// Host actually dialled, after applying `cloud_sql_instance`
    pub fn effective_host(&self) -> String {
        match self.cloud_sql_instance.as_deref() {
            Some(instance) if !instance.is_empty() => {
                format!("{CLOUD_SQL_SOCKET_DIR}/{instance}")
            }
            _ => self.host.clone(),
        }
    }

    /// Select the endpoint: a host starting with `/` is a Unix socket and the
    /// port is not used; anything else is TCP on `host:port`.
    pub fn endpoint(&self) -> Endpoint {
        let host = self.effective_host();
        if host.starts_with('/') {
            Endpoint::Unix {
                path: PathBuf::from(host),
            }
        } else {
            Endpoint::Tcp {
                host,
                port: self.port,
            }
        }
    }
}
