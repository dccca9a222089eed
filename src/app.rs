use crate::{
    cli,
    context::{self, Context},
    rest,
    storage::{self, Storage},
};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Server process state. The store is built once at startup and handed to the
/// REST layer; it lives as long as the `App`.
pub struct App {
    config: context::Context,
    storage: Arc<dyn Storage + Send + Sync>,
    shutdown: CancellationToken,
}

impl App {
    /// Opens (and migrates) the store described by `config`.
    pub fn from_context(config: Context) -> Result<Self> {
        log_startup_info(&config);
        let storage = init_storage(&config.data_dir, &config.db_path(), config.reset)?;
        Ok(Self::new(config, storage))
    }

    /// Dependencies are injected here, so tests can pass any `Storage`.
    pub fn new(config: context::Context, storage: Arc<dyn Storage + Send + Sync>) -> Self {
        Self {
            config,
            storage,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run_daemon(&mut self) -> Result<()> {
        self.log_runtime_config();

        let mut rest_handle = self.spawn_rest_server();
        self.wait_for_shutdown(&mut rest_handle).await
    }

    fn spawn_rest_server(&self) -> JoinHandle<()> {
        let addr = self.config.api_listen;
        let store = self.storage.clone();
        let token = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = rest::serve(addr, store, token).await {
                log::error!("REST server failed: {:#}", e);
            }
        })
    }

    async fn wait_for_shutdown(&self, rest_task: &mut JoinHandle<()>) -> Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => log::info!("🧨 Ctrl-C received, shutting down..."),
            _ = self.shutdown.cancelled() => log::info!("🛑 Shutdown requested"),
            _ = &mut *rest_task => log::error!("REST task exited unexpectedly"),
        }

        self.shutdown.cancel();

        // polling a completed JoinHandle again panics
        if !rest_task.is_finished() {
            let _ = rest_task.await;
        }

        log::info!("✅ Shutdown complete");
        Ok(())
    }

    fn log_runtime_config(&self) {
        log::info!("🌐 REST API: http://{}", self.config.api_listen);
        if let Some(path) = self.config.log_file.as_deref() {
            log::info!("📝 Log file: {}", path.to_string_lossy());
        }
    }
}

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting arboretum");
    log::info!("📂 Data dir: {}", ctx.data_dir.to_string_lossy());
    if ctx.reset {
        log::info!("🧹 Reset requested");
    }
}

fn init_storage(
    data_dir: &Path,
    db_path: &Path,
    reset: bool,
) -> Result<Arc<dyn Storage + Send + Sync>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let sqlite = storage::SqliteStorage::new(db_path);
    if reset {
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;

    Ok(Arc::new(sqlite))
}

pub async fn run() -> Result<()> {
    let cli = cli::parse();

    crate::tracing::set_log_file(cli.log_file.as_deref().map(Path::new));

    let ctx = Context::from_cli(&cli);

    // One-shot client commands never touch the local store.
    if let Some(cmd) = &cli.cmd {
        return cmd.run(&ctx).await;
    }

    let mut app = App::from_context(ctx)?;
    app.run_daemon().await
}
