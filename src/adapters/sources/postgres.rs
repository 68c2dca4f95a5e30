//! PostgreSQL source
//!
//! Handles:
//! - Connectivity probe with `pg_isready`
//! - Custom-format dumps with `pg_dump -F c`
//! - Restores with `pg_restore --clean --if-exists`
//!
//! The password is passed to child processes through `PGPASSWORD` and is
//! never placed on the command line or in logs.

use crate::adapters::{timestamped_name, SourceAdapter};
use crate::utils::executor::{CommandExecutor, RealExecutor};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Payload accepted by the `postgres` adapter type
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    /// Where dumps are written; defaults to the staging directory
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    /// Per-command timeout for the pg_* tools
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"*****")
            .field("dbname", &self.dbname)
            .field("backup_dir", &self.backup_dir)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 5432 }

pub struct PostgresSource {
    config: PostgresConfig,
    backup_dir: PathBuf,
    executor: Arc<dyn CommandExecutor>,
}

impl PostgresSource {
    /// Parse a `postgres` payload; dumps go to `staging_dir` unless
    /// `backup_dir` is set
    pub fn from_config(payload: &Value, staging_dir: &Path) -> Result<Self> {
        Self::with_executor(payload, staging_dir, Arc::new(RealExecutor::new()))
    }

    /// Same as [`Self::from_config`] with an injected command executor
    pub fn with_executor(
        payload: &Value,
        staging_dir: &Path,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<Self> {
        let config: PostgresConfig = serde_json::from_value(payload.clone())
            .context("Invalid postgres config")?;

        if config.user.trim().is_empty() {
            anyhow::bail!("Invalid postgres config: 'user' must not be empty");
        }
        if config.dbname.trim().is_empty() {
            anyhow::bail!("Invalid postgres config: 'dbname' must not be empty");
        }

        let backup_dir = config
            .backup_dir
            .clone()
            .unwrap_or_else(|| staging_dir.to_path_buf());

        Ok(Self {
            config,
            backup_dir,
            executor,
        })
    }

    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.timeout_seconds.map(Duration::from_secs)
    }

    fn password_env(&self) -> Vec<(String, String)> {
        if self.config.password.is_empty() {
            Vec::new()
        } else {
            vec![("PGPASSWORD".to_string(), self.config.password.clone())]
        }
    }

    /// `-h <host> -p <port> -U <user>`
    fn connection_args(&self) -> Vec<String> {
        vec![
            "-h".to_string(),
            self.config.host.clone(),
            "-p".to_string(),
            self.config.port.to_string(),
            "-U".to_string(),
            self.config.user.clone(),
        ]
    }

    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor
            .run_command(program, &args, &self.password_env(), self.timeout())?;
        Ok(())
    }
}

impl SourceAdapter for PostgresSource {
    fn validate(&self) -> Result<()> {
        let mut args = self.connection_args();
        args.extend(["-d".to_string(), self.config.dbname.clone()]);

        self.run("pg_isready", &args).with_context(|| {
            format!(
                "PostgreSQL at {}:{} is not accepting connections",
                self.config.host, self.config.port
            )
        })
    }

    fn backup(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir).with_context(|| {
            format!("Failed to create backup directory: {:?}", self.backup_dir)
        })?;

        let backup_file = self.backup_dir.join(timestamped_name("dump"));
        info!(
            "Dumping database '{}' to {:?}",
            self.config.dbname, backup_file
        );

        let mut args = self.connection_args();
        args.extend([
            "-F".to_string(),
            "c".to_string(),
            "-f".to_string(),
            backup_file.to_string_lossy().to_string(),
            self.config.dbname.clone(),
        ]);

        self.run("pg_dump", &args).context("pg_dump failed")?;
        Ok(backup_file)
    }

    fn restore(&self, artifact: &Path) -> Result<()> {
        if !artifact.is_file() {
            anyhow::bail!("Dump file not found: {:?}", artifact);
        }

        info!(
            "Restoring database '{}' from {:?}",
            self.config.dbname, artifact
        );

        let mut args = self.connection_args();
        args.extend([
            "-d".to_string(),
            self.config.dbname.clone(),
            "--clean".to_string(),
            "--if-exists".to_string(),
            artifact.to_string_lossy().to_string(),
        ]);

        self.run("pg_restore", &args).context("pg_restore failed")
    }
}
