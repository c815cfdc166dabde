use devicemon_shared::{Channel, Reading};

const TILE_WIDTH: usize = 15;

fn border(out: &mut String) {
    for _ in Channel::ALL {
        out.push('+');
        out.push_str(&"-".repeat(TILE_WIDTH));
    }
    out.push_str("+\n");
}

/// Latest value of each channel, one tile per channel.
pub fn render_tiles(latest: &Reading) -> String {
    let mut out = String::new();
    border(&mut out);
    for ch in Channel::ALL {
        out.push_str(&format!("|{:^TILE_WIDTH$}", ch.as_str()));
    }
    out.push_str("|\n");
    for ch in Channel::ALL {
        out.push_str(&format!("|{:^TILE_WIDTH$}", latest.value(ch)));
    }
    out.push_str("|\n");
    border(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicemon_shared::{DeviceId, SeriesStore};

    #[test]
    fn tiles_show_latest_values() {
        let mut store = SeriesStore::new();
        store.on_message("D1V42C7T88");
        let tiles = render_tiles(&store.summary(&DeviceId::from_index(1)));
        let lines: Vec<&str> = tiles.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Voltage") && lines[1].contains("Temperature"));
        let values: Vec<&str> = lines[2]
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(values, vec!["42", "7", "88"]);
    }

    #[test]
    fn tiles_show_zero_before_first_reading() {
        let tiles = render_tiles(&Reading::zero(DeviceId::from_index(2)));
        let values: Vec<&str> = tiles
            .lines()
            .nth(2)
            .unwrap()
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(values, vec!["0", "0", "0"]);
    }
}
