//! pano-shell host binary.
//!
//! Runs the bridge headless: menu clicks are read from stdin and broadcasts
//! reaching the surface are logged.
//!
//! # Environment Variables
//!
//! - `PANO_SHELL_CONFIG`: YAML config file (optional)
//! - `PANO_SHELL_TIMER_DELAY_MS`: startup `timer_tick` delay
//! - `PANO_SHELL_FS_ROOTS`: allowed filesystem roots
//! - `RUST_LOG`: tracing filter (default: "info,pano_shell=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin pano-shell --features native-dialogs
//! # then type: import | export | quit
//! ```

use std::sync::Arc;

use anyhow::Context;
use pano_shell::channels;
use pano_shell::dialog::NativeDialog;
use pano_shell::{MenuCommand, Shell, ShellConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

#[cfg(feature = "native-dialogs")]
fn dialog_backend() -> Arc<dyn NativeDialog> {
    Arc::new(pano_shell::dialog::RfdDialog)
}

#[cfg(not(feature = "native-dialogs"))]
fn dialog_backend() -> Arc<dyn NativeDialog> {
    Arc::new(pano_shell::dialog::UnavailableDialog)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pano_shell=debug".into()),
        )
        .init();

    let config = ShellConfig::from_env().context("loading shell configuration")?;
    tracing::info!(
        "pano-shell {} starting ({}x{} \"{}\")",
        pano_shell::VERSION,
        config.window.width,
        config.window.height,
        config.window.title
    );

    let mut shell = Shell::builder(config)
        .dialog_backend(dialog_backend())
        .launch()
        .context("launching shell")?;
    let gateway = shell.gateway();

    // Stand-in surface: the real one hands these clicks to its own UI.
    let mut subscriptions = Vec::new();
    for channel in channels::BROADCASTS {
        let sub = gateway.subscribe(channel, |msg| {
            tracing::info!("surface <- {} {}", msg.channel, msg.payload);
        })?;
        subscriptions.push(sub);
    }
    shell.surface_created();

    let menu = shell.menu();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" {
                    break;
                }
                match line.parse::<MenuCommand>() {
                    Ok(command) => menu.activate(command),
                    Err(e) => tracing::warn!("{} (try: import, export, quit)", e),
                }
            }
        }
    }

    for sub in subscriptions {
        sub.release();
    }
    shell.shutdown();
    Ok(())
}
