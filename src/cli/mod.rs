// CLI module for rategate

use clap::Parser;
use std::path::PathBuf;

/// rategate - In-memory rate limiting and TTL response caching for AI-heavy API routes
#[derive(Parser, Debug)]
#[command(name = "rategate", version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file (default: ~/.rategate/config.toml)
    #[arg(long, env = "RATEGATE_CONFIG")]
    pub config: Option<PathBuf>,
}
