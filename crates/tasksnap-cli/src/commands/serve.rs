//! Serve command

use anyhow::Context;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tasksnap_api::{CorsPolicy, SaveResponseMode, ServerConfig};
use tasksnap_core::DEFAULT_USER_ID;
use tasksnap_store::PoolOptions;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "TASKSNAP_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file
    #[arg(long, env = "TASKSNAP_DB", default_value = "snapshots.db")]
    pub db: PathBuf,

    /// User id recorded on every revision
    #[arg(long, env = "TASKSNAP_USER_ID", default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    /// Number of pooled database connections
    #[arg(long, env = "TASKSNAP_MAX_CONNECTIONS", default_value_t = 4)]
    pub max_connections: usize,

    /// How long a request waits for a free connection
    #[arg(long, env = "TASKSNAP_ACQUIRE_TIMEOUT_MS", default_value_t = 5000)]
    pub acquire_timeout_ms: u64,

    /// Upper bound on handling one request
    #[arg(long, env = "TASKSNAP_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Largest accepted request body
    #[arg(long, env = "TASKSNAP_BODY_LIMIT_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub body_limit_bytes: usize,

    /// What POST /save returns: echo or revision
    #[arg(long, env = "TASKSNAP_SAVE_RESPONSE", default_value = "echo")]
    pub save_response: SaveResponseMode,

    /// Allowed CORS origin; repeat or comma-separate, `*` allows any
    #[arg(long = "cors-origin", env = "TASKSNAP_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl ServeArgs {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let cors = CorsPolicy::from_origins(self.cors_origins.as_slice())?;
        let pool = PoolOptions {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            ..PoolOptions::default()
        };

        Ok(ServerConfig {
            bind: self.bind,
            db_path: self.db,
            user_id: self.user_id,
            pool,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            body_limit_bytes: self.body_limit_bytes,
            save_response: self.save_response,
            cors,
        })
    }
}

pub fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(tasksnap_api::serve(config))?;
    Ok(())
}
