use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,serenity=warn,tracing::span=warn")
        });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    scrollcheck::cli::run().await
}
