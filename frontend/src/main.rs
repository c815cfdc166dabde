mod cli;
mod connection;
mod telemetry_dashboard;

use crate::cli::Cli;
use crate::connection::SessionEnd;
use crate::telemetry_dashboard::Dashboard;
use clap::Parser;
use devicemon_shared::DeviceId;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::info;

// Clear screen + cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Operator input comes from a plain thread: a blocking stdin read must not
/// hold up runtime shutdown.
fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn build_dashboard(cli: &Cli) -> anyhow::Result<Dashboard> {
    let mut devices = DeviceId::defaults();
    if !devices.contains(&cli.device) {
        devices.push(cli.device.clone());
    }
    let mut dashboard = Dashboard::new(devices);
    dashboard
        .select_device(&cli.device)
        .map_err(anyhow::Error::msg)?;
    dashboard.set_trend_len(cli.trend).map_err(anyhow::Error::msg)?;
    dashboard
        .set_page_size(cli.page_size)
        .map_err(anyhow::Error::msg)?;
    Ok(dashboard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the dashboard; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut dashboard = build_dashboard(&cli)?;

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    spawn_stdin_reader(cmd_tx)?;

    let clear = !cli.no_clear;
    let redraw = move |d: &Dashboard| {
        let mut stdout = std::io::stdout().lock();
        if clear {
            let _ = write!(stdout, "{CLEAR}");
        }
        let _ = write!(stdout, "{}", d.render());
        let _ = stdout.flush();
    };
    redraw(&dashboard);

    let end = connection::run(&cli.url, &mut dashboard, cmd_rx, redraw).await?;
    match end {
        SessionEnd::ClosedByServer => info!("connection closed by server"),
        SessionEnd::Interrupted => info!("interrupted, connection closed"),
    }
    info!(
        readings = dashboard.store().total_readings(),
        "session ended"
    );
    Ok(())
}
