use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::UNIX_EPOCH;
use thiserror::Error;

use crate::wire::Frame;

/// Device tokens the producer emits out of the box.
pub const DEFAULT_DEVICES: [&str; 2] = ["D1", "D2"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid device id {0:?}: expected 'D' followed by digits")]
pub struct InvalidDeviceId(pub String);

/// Device token as it appears on the wire, e.g. `D1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(pub(crate) String);

impl DeviceId {
    pub fn from_index(index: u32) -> Self {
        DeviceId(format!("D{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_valid_token(s: &str) -> bool {
        let Some(digits) = s.strip_prefix('D') else {
            return false;
        };
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn defaults() -> Vec<DeviceId> {
        DEFAULT_DEVICES
            .iter()
            .map(|d| DeviceId((*d).to_string()))
            .collect()
    }
}

impl FromStr for DeviceId {
    type Err = InvalidDeviceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if DeviceId::is_valid_token(s) {
            Ok(DeviceId(s.to_string()))
        } else {
            Err(InvalidDeviceId(s.to_string()))
        }
    }
}

impl TryFrom<String> for DeviceId {
    type Error = InvalidDeviceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if DeviceId::is_valid_token(&value) {
            Ok(DeviceId(value))
        } else {
            Err(InvalidDeviceId(value))
        }
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three measured quantities carried by every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Voltage,
    Current,
    Temperature,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Voltage, Channel::Current, Channel::Temperature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Voltage => "Voltage",
            Channel::Current => "Current",
            Channel::Temperature => "Temperature",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded sample, stamped by the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: DeviceId,
    pub timestamp: DateTime<Local>,
    pub voltage: u32,
    pub current: u32,
    pub temperature: u32,
    /// Row identity. Assigned from a per-session counter starting at 1.
    pub sequence_id: u64,
}

impl Reading {
    pub(crate) fn from_frame(frame: Frame, timestamp: DateTime<Local>, sequence_id: u64) -> Self {
        Reading {
            device_id: frame.device_id,
            timestamp,
            voltage: frame.voltage,
            current: frame.current,
            temperature: frame.temperature,
            sequence_id,
        }
    }

    /// Placeholder shown for a device that has not reported yet.
    pub fn zero(device_id: DeviceId) -> Self {
        Reading {
            device_id,
            timestamp: DateTime::<Local>::from(UNIX_EPOCH),
            voltage: 0,
            current: 0,
            temperature: 0,
            sequence_id: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.sequence_id == 0
    }

    pub fn value(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Voltage => self.voltage,
            Channel::Current => self.current,
            Channel::Temperature => self.temperature,
        }
    }

    /// Wire form of this reading; timestamp and sequence id are consumer-side only.
    pub fn frame(&self) -> Frame {
        Frame {
            device_id: self.device_id.clone(),
            voltage: self.voltage,
            current: self.current,
            temperature: self.temperature,
        }
    }

    /// Wall-clock label used by the table and chart axis.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
