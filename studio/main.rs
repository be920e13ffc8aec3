/// CLAHE Studio
///
/// Browser front end for contrast-limited adaptive histogram equalization of
/// grayscale radiographs. Served by a synchronous tiny_http server; the page
/// needs no JavaScript framework.
///
/// Run with:
///   cargo run --release
/// Then open http://127.0.0.1:7878
///
/// Flow:
///   1. Upload a JPG, PNG or BMP image (converted to grayscale)
///   2. Move the Contrast Strength slider (1.0 to 15.0)
///   3. Compare Original against the enhanced image
///   4. Download the enhanced PNG

mod config;
mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tiny_http::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Args;
use state::StudioState;

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clahe_studio={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let server = Server::http(&args.addr)
        .map_err(|e| anyhow!("failed to bind HTTP server on {}: {e}", args.addr))?;

    let shared_state = Arc::new(StudioState::new(args.session_ttl(), args.max_upload_bytes()));

    println!("╔══════════════════════════════════════════════╗");
    println!("║          CLAHE Studio                        ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", args.addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Upload > Adjust strength > Download         ║");
    println!("╚══════════════════════════════════════════════╝");

    info!(
        addr = %args.addr,
        max_upload_mb = args.max_upload_mb,
        session_ttl_secs = args.session_ttl_secs,
        "studio listening"
    );

    // One thread per request; a slow enhancement in one session does not
    // stall page loads in another.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    Ok(())
}
