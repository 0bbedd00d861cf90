mod core_cli;

use crate::core_cli::{shell, Cli};
use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use peershare::{Config, Session};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration from the TOML file, if any
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // Override the directory address from CLI if provided
    if let Some(server) = args.server {
        config.client.directory_host = server;
    }
    if let Some(port) = args.port {
        config.client.directory_port = port;
    }

    info!(
        "Client started, directory server at {}:{}",
        config.client.directory_host, config.client.directory_port
    );

    let session = Session::new(&config.client);
    shell::run(session).await
}
