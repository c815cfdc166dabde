// frontend/src/telemetry_dashboard/chart.rs
//
// Text trend chart: one sparkline per channel over the trend window,
// oldest point on the left. Each line is scaled to its own min..max.

use devicemon_shared::{Channel, Reading};
use std::fmt::Write;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn sparkline(values: &[u32]) -> String {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return String::new();
    };
    // Flat data would otherwise divide by zero.
    let span = u64::from(max - min).max(1);
    let top = (BARS.len() - 1) as u64;

    values
        .iter()
        .map(|&v| {
            let idx = (u64::from(v - min) * top + span / 2) / span;
            BARS[idx as usize]
        })
        .collect()
}

pub fn render_trend(points: &[Reading]) -> String {
    let mut out = String::new();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        out.push_str("Trend\n  no data yet\n");
        return out;
    };

    let _ = writeln!(
        out,
        "Trend (last {}: {} -> {})",
        points.len(),
        first.time_label(),
        last.time_label()
    );
    for ch in Channel::ALL {
        let values: Vec<u32> = points.iter().map(|r| r.value(ch)).collect();
        let _ = writeln!(
            out,
            "  {:<12} {} {:>3}",
            ch.as_str(),
            sparkline(&values),
            last.value(ch)
        );
    }
    out
}
