// shared/src/series.rs
//
// Per-session device history. Readings are appended in arrival order and
// never mutated or evicted; views (summary / trend / table) are computed at
// read time.

use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::reading::{DeviceId, Reading};
use crate::wire::{decode, Frame};

/// Number of points the trend chart shows unless told otherwise.
pub const DEFAULT_TREND_LEN: usize = 10;

/// Append-only history for one device.
#[derive(Debug, Clone)]
pub struct DeviceSeries {
    id: DeviceId,
    readings: Vec<Reading>,
}

impl DeviceSeries {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            readings: Vec::new(),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    fn push(&mut self, reading: Reading) {
        debug_assert_eq!(reading.device_id, self.id);
        self.readings.push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Last `n` readings, oldest first.
    pub fn tail(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableColumn {
    #[default]
    Time,
    Voltage,
    Current,
    Temperature,
}

impl TableColumn {
    pub const ALL: [TableColumn; 4] = [
        TableColumn::Time,
        TableColumn::Voltage,
        TableColumn::Current,
        TableColumn::Temperature,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            TableColumn::Time => "Time",
            TableColumn::Voltage => "Voltage",
            TableColumn::Current => "Current",
            TableColumn::Temperature => "Temperature",
        }
    }

    fn key(&self, a: &Reading, b: &Reading) -> Ordering {
        match self {
            TableColumn::Time => a.timestamp.cmp(&b.timestamp),
            TableColumn::Voltage => a.voltage.cmp(&b.voltage),
            TableColumn::Current => a.current.cmp(&b.current),
            TableColumn::Temperature => a.temperature.cmp(&b.temperature),
        }
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for TableColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "time" | "timestamp" => Ok(TableColumn::Time),
            "voltage" | "v" => Ok(TableColumn::Voltage),
            "current" | "c" => Ok(TableColumn::Current),
            "temperature" | "temp" | "t" => Ok(TableColumn::Temperature),
            other => Err(format!("unknown column {other:?}")),
        }
    }
}

/// Sort applied to the table view. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSort {
    pub column: TableColumn,
    pub direction: SortDirection,
}

impl TableSort {
    pub fn new(column: TableColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    // Ties fall back to arrival order so equal keys never shuffle between renders.
    fn compare(&self, a: &Reading, b: &Reading) -> Ordering {
        let ord = self
            .column
            .key(a, b)
            .then_with(|| a.sequence_id.cmp(&b.sequence_id));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// All device series owned by one consumer session.
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: Vec<DeviceSeries>,
    last_sequence: u64,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with empty series already present for `devices`, in that order.
    pub fn with_devices<I>(devices: I) -> Self
    where
        I: IntoIterator<Item = DeviceId>,
    {
        let mut store = Self::new();
        for id in devices {
            store.series_mut(&id);
        }
        store
    }

    /// Decode and route one inbound message, stamped with the local clock.
    ///
    /// Messages that do not match the wire format are dropped without touching
    /// any series.
    pub fn on_message(&mut self, raw: &str) -> Option<&Reading> {
        self.on_message_at(raw, Local::now())
    }

    pub fn on_message_at(&mut self, raw: &str, timestamp: DateTime<Local>) -> Option<&Reading> {
        match decode(raw) {
            Ok(frame) => Some(self.ingest(frame, timestamp)),
            Err(e) => {
                tracing::trace!("dropping inbound message: {e}");
                None
            }
        }
    }

    /// Append an already decoded frame to its device's series.
    pub fn ingest(&mut self, frame: Frame, timestamp: DateTime<Local>) -> &Reading {
        self.last_sequence += 1;
        let sequence_id = self.last_sequence;
        let series = self.series_mut(&frame.device_id);
        series.push(Reading::from_frame(frame, timestamp, sequence_id));
        &series.readings[series.readings.len() - 1]
    }

    fn series_mut(&mut self, id: &DeviceId) -> &mut DeviceSeries {
        let idx = match self.series.iter().position(|s| &s.id == id) {
            Some(idx) => idx,
            None => {
                tracing::debug!(device = %id, "tracking new device");
                self.series.push(DeviceSeries::new(id.clone()));
                self.series.len() - 1
            }
        };
        &mut self.series[idx]
    }

    pub fn series(&self, id: &DeviceId) -> Option<&DeviceSeries> {
        self.series.iter().find(|s| &s.id == id)
    }

    /// Device identities in tab order.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceId> {
        self.series.iter().map(|s| &s.id)
    }

    pub fn device_count(&self) -> usize {
        self.series.len()
    }

    /// Total number of readings stored across all devices.
    pub fn total_readings(&self) -> usize {
        self.series.iter().map(DeviceSeries::len).sum()
    }

    pub fn summary(&self, id: &DeviceId) -> Reading {
        self.series(id)
            .and_then(DeviceSeries::last)
            .cloned()
            .unwrap_or_else(|| Reading::zero(id.clone()))
    }

    pub fn trend(&self, id: &DeviceId, n: usize) -> &[Reading] {
        self.series(id).map(|s| s.tail(n)).unwrap_or(&[])
    }

    /// Full series, newest first.
    pub fn table(&self, id: &DeviceId) -> Vec<&Reading> {
        self.table_sorted(id, TableSort::default())
    }

    pub fn table_sorted(&self, id: &DeviceId, sort: TableSort) -> Vec<&Reading> {
        let Some(series) = self.series(id) else {
            return Vec::new();
        };
        let mut rows: Vec<&Reading> = series.readings.iter().collect();
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }
}
