use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It initializes logging, loads the configuration and data, then hands off
// to the library.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::load_config(Path::new("config.toml"))?;

    let ctx = dataset::DataLoader::load(
        &settings.data.monthly,
        &settings.data.annual,
        &settings.data.fx,
        settings.dashboard.year_min,
        settings.dashboard.year_max,
    )?;

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    web_server::run_server(addr, ctx, settings).await
}
