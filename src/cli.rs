//! Command-line flags for the `rapydshare` launcher.

use std::path::PathBuf;

use clap::Parser;

use rapyd_core::config::AppConfig;

/// RapydShare: share a folder with every device on the local network
#[derive(Debug, Parser)]
#[command(name = "rapydshare", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to share
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Require HTTP Basic authentication
    #[arg(long)]
    pub auth: bool,

    /// Username for Basic authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Password for Basic authentication
    #[arg(long)]
    pub password: Option<String>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Apply flags on top of the file/environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(root) = &self.root {
            config.share.root_dir = root.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.auth {
            config.auth.enabled = true;
        }
        if let Some(username) = &self.username {
            config.auth.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.auth.password = password.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
