use std::sync::Arc;

use arboretum::client::{ChannelNotifier, Notification, QueryCache, TreesClient};
use arboretum::storage::SqliteStorage;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A live server on an ephemeral port backed by a throwaway SQLite file.
pub struct TestServer {
    pub base_url: Url,
    pub shutdown: CancellationToken,
    pub handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = SqliteStorage::new(dir.path().join("arboretum.sqlite"));
        storage.init().expect("init storage");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(arboretum::rest::serve_on(
            listener,
            storage,
            shutdown.clone(),
        ));

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).expect("base url"),
            shutdown,
            handle,
            _dir: dir,
        }
    }

    pub fn client(&self) -> (TreesClient, Arc<QueryCache>, UnboundedReceiver<Notification>) {
        let cache = Arc::new(QueryCache::new());
        let (notifier, rx) = ChannelNotifier::new();
        let client = TreesClient::new(self.base_url.clone(), cache.clone(), Arc::new(notifier));
        (client, cache, rx)
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        let result = self.handle.await.expect("server task joined");
        assert!(result.is_ok(), "server exited with {:?}", result);
    }
}
