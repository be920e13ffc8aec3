use std::time::Duration;

use clap::Parser;

/// Browser-based CLAHE contrast enhancement for grayscale radiographs.
#[derive(Parser, Debug)]
#[command(name = "clahe-studio")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP server listens on.
    #[arg(long, default_value = "127.0.0.1:7878", value_name = "HOST:PORT")]
    pub addr: String,

    /// Largest accepted upload body, in megabytes.
    #[arg(long, default_value = "50", value_name = "INT")]
    pub max_upload_mb: usize,

    /// Seconds of inactivity after which a browser session is dropped.
    #[arg(long, default_value = "3600", value_name = "INT")]
    pub session_ttl_secs: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
