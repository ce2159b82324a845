use clap::Parser;
use panorama_cli::{Args, ReqwestTransport, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    run(&args, ReqwestTransport::default()).await?;
    Ok(())
}
