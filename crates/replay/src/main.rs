use feeauction_common::config::AuctionConfig;
use feeauction_replay::Script;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feeauction_replay=info,feeauction_engine=debug".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("FeeAuction replay starting...");

    // Load configuration
    let config = AuctionConfig::from_env()?;

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: feeauction-replay <script.json>"))?;
    let script = Script::load(&path)?;
    tracing::info!(
        script = %path,
        resources = script.resources.len(),
        calls = script.calls.len(),
        "Script loaded"
    );

    let report = feeauction_replay::run(&script, config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("FeeAuction replay stopped.");
    Ok(())
}
