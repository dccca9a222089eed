#[tokio::main]
async fn main() -> anyhow::Result<()> {
    arboretum::tracing::init();
    arboretum::app::run().await
}
