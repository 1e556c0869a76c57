use std::net::SocketAddr;

use blind_gantt::{Schedule, http_api};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "blind_gantt=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let addr: SocketAddr = std::env::var("BLIND_GANTT_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("blind-gantt HTTP API listening on http://{addr}");
    http_api::serve(addr, Schedule::new()).await?;
    Ok(())
}
