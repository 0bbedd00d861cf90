use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "peershare", about = "Peer-to-peer file sharing client.")]
pub struct Cli {
    /// Directory server host
    #[arg(short, long)]
    pub server: Option<String>,

    /// Directory server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
