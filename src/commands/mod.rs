use std::io::IsTerminal;
use std::sync::Arc;

use crate::cli::Command;
use crate::client::{LogNotifier, Notifier, QueryCache, TreesClient};
use crate::{context, ui};

pub mod trees;

impl Command {
    pub async fn run(&self, ctx: &context::Context) -> anyhow::Result<()> {
        // one-shot commands own a fresh cache; the CLI is the UI root here
        let client = TreesClient::new(ctx.api_url.clone(), Arc::new(QueryCache::new()), notifier());
        match self {
            Command::Trees { cmd } => cmd.run(&client).await,
        }
    }
}

/// Interactive sessions get rendered notices; scripts and redirected stderr
/// get regular log lines that also reach `--log-file`.
fn notifier() -> Arc<dyn Notifier> {
    if std::io::stderr().is_terminal() {
        Arc::new(ui::ConsoleNotifier)
    } else {
        Arc::new(LogNotifier)
    }
}
