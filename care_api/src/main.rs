use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use care_api::{router, AppState, PLATFORM_NAME, PLATFORM_VERSION};

#[derive(Debug, Parser)]
#[command(
    name = "care_api",
    version,
    about = "CareBridge clinical AI gateway",
    long_about = "Serves the CareBridge demonstration platform: care-gap detection, \
        readmission risk prediction, and clinical summarization, with governance \
        endpoints for phase gates, cost telemetry, and the audit chain."
)]
struct Args {
    /// Address to bind the gateway on.
    #[arg(long, default_value = "127.0.0.1:8720")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = PLATFORM_VERSION,
        addr = %args.addr,
        "{} starting",
        PLATFORM_NAME
    );

    let state = AppState::new();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .expect("bind gateway address");
    println!("care_api listening on http://{}", args.addr);
    axum::serve(listener, app).await.expect("serve gateway");
}
