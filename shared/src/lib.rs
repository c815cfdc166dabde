//! Types shared between the telemetry producer and the dashboard.
//!
//! The wire codec lives in [`wire`], decoded samples in [`reading`], and the
//! per-session device history the dashboard reads from in [`series`].

pub mod reading;
pub mod series;
pub mod wire;

pub use reading::{Channel, DeviceId, InvalidDeviceId, Reading, DEFAULT_DEVICES};
pub use series::{
    DeviceSeries, SeriesStore, SortDirection, TableColumn, TableSort, DEFAULT_TREND_LEN,
};
pub use wire::{decode, DecodeError, Frame};
