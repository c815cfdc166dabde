//! Command-line arguments for the dashboard client.

use crate::telemetry_dashboard::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use clap::Parser;
use devicemon_shared::{DeviceId, DEFAULT_TREND_LEN};

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Live terminal dashboard for device telemetry
#[derive(Parser, Debug)]
#[command(name = "devicemon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// WebSocket address of the telemetry producer
    #[arg(long, env = "DEVICEMON_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Device tab to open first
    #[arg(long, default_value = "D1")]
    pub device: DeviceId,

    /// Number of points in the trend chart
    #[arg(long, default_value_t = DEFAULT_TREND_LEN, value_parser = parse_trend_len)]
    pub trend: usize,

    /// Table rows shown per page (25, 50 or 100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: usize,

    /// Print each frame below the previous one instead of redrawing the screen
    #[arg(long)]
    pub no_clear: bool,
}

fn parse_trend_len(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{s:?} is not a positive number")),
    }
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if PAGE_SIZE_OPTIONS.contains(&n) => Ok(n),
        _ => Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}")),
    }
}
