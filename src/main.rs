use std::env;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let (filter, env_err) = match EnvFilter::try_from_default_env() {
        Ok(f) => (f, None),
        Err(e) => (EnvFilter::new("afford=info"), Some(e)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if let Some(e) = env_err {
        if env::var_os("RUST_LOG").is_some() {
            warn!(error = %e, "invalid RUST_LOG filter, using default");
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = afford::api::run_http_server(port).await {
            error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    let cli = afford::api::Cli::parse();
    if let Err(msg) = afford::api::run_cli(&cli) {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}
