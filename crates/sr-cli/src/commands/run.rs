//! Run command implementation

use anyhow::{bail, Context, Result};
use sr_core::{bucket_name, compute_checksum, is_gs_path};
use sr_db::{transaction_body, Database, DbCredentials, DbError, DbOptions, PgGateway};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{build_forest, discover_scripts};

/// Execute the default command: apply every script under the scripts directory
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let config = RunConfig::from_args(args, global)?;
    let run_id = Uuid::new_v4();
    log::info!(
        "Run {run_id}: applying scripts from {} to {}",
        config.scripts_dir.display(),
        config.credentials.endpoint()
    );

    let db = PgGateway::connect_with_options(&config.credentials, config.db_options())
        .await
        .context("failed to connect to database")?;

    let result = apply(&db, &config).await;
    db.close().await;

    let applied = result?;
    log::info!("Run {run_id}: applied {applied} sql file(s)");
    Ok(())
}

async fn apply(db: &dyn Database, config: &RunConfig) -> Result<usize> {
    let scripts = resolve_scripts(config)?;
    apply_scripts(db, &scripts, config.mode()).await
}

/// Validated runner configuration
#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    pub(crate) credentials: DbCredentials,
    pub(crate) scripts_dir: PathBuf,
    pub(crate) timeout: Option<Duration>,
    pub(crate) relations: Option<PathBuf>,
    pub(crate) single_transaction: bool,
    pub(crate) debug: bool,
}

impl RunConfig {
    /// Check the required values and reject unsupported scripts locations.
    ///
    /// Runs before any connection attempt.
    pub(crate) fn from_args(args: &RunArgs, global: &GlobalArgs) -> Result<Self> {
        let scripts_dir = required(&args.scripts_dir, "INPUT_SCRIPTS_DIR")?;
        if is_gs_path(&scripts_dir) {
            let (bucket, _) = bucket_name(&scripts_dir)?;
            bail!(
                "scripts directory {scripts_dir} is in Cloud Storage bucket '{bucket}'; only local directories are supported"
            );
        }

        let timeout = match args.timeout {
            Some(0) => bail!("INPUT_DB_TIMEOUT must be greater than zero"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let credentials = DbCredentials {
            host: required(&args.db_host, "INPUT_DB_HOST")?,
            port: args
                .db_port
                .context("missing required configuration: INPUT_DB_PORT")?,
            user: required(&args.db_user, "INPUT_DB_USER")?,
            password: required(&args.db_password, "INPUT_DB_PASSWORD")?,
            database: required(&args.db_name, "INPUT_DB")?,
            cloud_sql_instance: args
                .cloud_sql_instance
                .clone()
                .filter(|instance| !instance.is_empty()),
        };

        Ok(Self {
            credentials,
            scripts_dir: PathBuf::from(scripts_dir),
            timeout,
            relations: args
                .relations
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            single_transaction: args.single_transaction,
            debug: global.debug,
        })
    }

    fn db_options(&self) -> DbOptions {
        let options = DbOptions::from_env();
        match self.timeout {
            Some(timeout) => options.with_timeout(timeout),
            None => options,
        }
    }

    fn mode(&self) -> ApplyMode {
        ApplyMode {
            debug: self.debug,
            single_transaction: self.single_transaction,
        }
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => bail!("missing required configuration: {name}"),
    }
}

/// A script scheduled for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Script {
    /// Planner id, or the path itself for walked files
    pub(crate) name: String,
    /// Path on disk; empty for a planned dependency that was never found
    pub(crate) path: PathBuf,
}

impl Script {
    pub(crate) fn from_path(path: PathBuf) -> Self {
        Self {
            name: path.display().to_string(),
            path,
        }
    }

    fn is_resolved(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_resolved() {
            write!(f, "{}", self.path.display())
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// How scripts are submitted
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ApplyMode {
    pub(crate) debug: bool,
    pub(crate) single_transaction: bool,
}

/// Scripts to run, in execution order.
///
/// Lexicographic path order by default; dependency order when a relations
/// manifest is configured.
pub(crate) fn resolve_scripts(config: &RunConfig) -> Result<Vec<Script>> {
    match &config.relations {
        Some(relations) => {
            let forest = build_forest(relations, &config.scripts_dir)?;
            Ok(forest
                .execution_order()
                .into_iter()
                .map(|node| Script {
                    name: node.id().to_string(),
                    path: node.file_path().to_path_buf(),
                })
                .collect())
        }
        None => Ok(discover_scripts(&config.scripts_dir)?
            .into_iter()
            .map(Script::from_path)
            .collect()),
    }
}

/// Submit each script to `db`, stopping at the first failure.
///
/// Returns the number of scripts applied.
pub(crate) async fn apply_scripts(
    db: &dyn Database,
    scripts: &[Script],
    mode: ApplyMode,
) -> Result<usize> {
    log::info!("Applying {} sql file(s) to {}", scripts.len(), db.db_type());
    if mode.single_transaction {
        return apply_in_transaction(db, scripts, mode.debug).await;
    }

    for script in scripts {
        let sql = read_script(script, mode.debug)?;
        db.execute(&sql)
            .await
            .with_context(|| format!("failed to execute sql file: {script}"))?;
    }
    Ok(scripts.len())
}

async fn apply_in_transaction(db: &dyn Database, scripts: &[Script], debug: bool) -> Result<usize> {
    let owned = scripts.to_vec();
    let count = owned.len();

    db.run_in_transaction(transaction_body(move |tx| {
        Box::pin(async move {
            for script in &owned {
                let sql = read_script(script, debug).map_err(|e| DbError::body(format!("{e:#}")))?;
                tx.execute(&sql).await.map_err(|e| {
                    DbError::body(format!("failed to execute sql file: {script}: {e}"))
                })?;
            }
            Ok(())
        })
    }))
    .await
    .context("single-transaction run failed; no sql file was committed")?;

    Ok(count)
}

/// Read a script's contents verbatim.
fn read_script(script: &Script, debug: bool) -> Result<String> {
    if debug {
        log::info!("executing sql file: {script}");
    }
    if !script.is_resolved() {
        bail!(
            "failed to read file: {} (no matching sql file under the scripts directory)",
            script.name
        );
    }

    let bytes = read_bytes(&script.path)?;
    if debug {
        log::info!("sha256 {} {script}", compute_checksum(&bytes));
    }
    String::from_utf8(bytes)
        .with_context(|| format!("failed to read file: {script} (not valid UTF-8)"))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
