// shared/src/wire.rs
//
// One message = one reading: <device>V<voltage>C<current>T<temperature>
// e.g. "D1V42C7T88". No terminator, length prefix or checksum.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::reading::{Channel, DeviceId};

// ASCII digits only; `\d` would also accept other Unicode decimal digits.
static WIRE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(D[0-9]+)V([0-9]+)C([0-9]+)T([0-9]+)$").expect("wire pattern must compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message {0:?} does not match <device>V<voltage>C<current>T<temperature>")]
    Malformed(String),

    #[error("{field} value {value:?} does not fit in u32")]
    OutOfRange { field: Channel, value: String },
}

/// A reading as it travels over the wire, before the consumer stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub device_id: DeviceId,
    pub voltage: u32,
    pub current: u32,
    pub temperature: u32,
}

impl Frame {
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}V{}C{}T{}",
            self.device_id, self.voltage, self.current, self.temperature
        )
    }
}

fn parse_value(field: Channel, digits: &str) -> Result<u32, DecodeError> {
    digits.parse().map_err(|_| DecodeError::OutOfRange {
        field,
        value: digits.to_string(),
    })
}

/// Decode a single message. The whole input must match the grammar.
pub fn decode(raw: &str) -> Result<Frame, DecodeError> {
    let caps = WIRE_PATTERN
        .captures(raw)
        .ok_or_else(|| DecodeError::Malformed(raw.to_string()))?;

    Ok(Frame {
        device_id: DeviceId(caps[1].to_string()),
        voltage: parse_value(Channel::Voltage, &caps[2])?,
        current: parse_value(Channel::Current, &caps[3])?,
        temperature: parse_value(Channel::Temperature, &caps[4])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(device: u32, v: u32, c: u32, t: u32) -> Frame {
        Frame {
            device_id: DeviceId::from_index(device),
            voltage: v,
            current: c,
            temperature: t,
        }
    }

    #[test]
    fn encodes_compact_form() {
        assert_eq!(frame(1, 42, 7, 88).encode(), "D1V42C7T88");
        assert_eq!(frame(2, 0, 0, 0).encode(), "D2V0C0T0");
    }

    #[test]
    fn decodes_example_message() {
        assert_eq!(decode("D1V42C7T88"), Ok(frame(1, 42, 7, 88)));
    }

    #[test]
    fn decode_inverts_encode() {
        for f in [
            frame(1, 0, 0, 0),
            frame(2, 99, 99, 99),
            frame(1, 5, 60, 7),
            frame(17, u32::MAX, 1, 1000),
        ] {
            assert_eq!(decode(&f.encode()), Ok(f));
        }
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(decode("D1V007C01T0"), Ok(frame(1, 7, 1, 0)));
    }

    #[test]
    fn rejects_malformed_messages() {
        for raw in [
            "", "XYZ", "D1V", "D1V10C20", "D1V10C20T", "DV1C2T3", "D1V-1C2T3", "D1V1.5C2T3",
            "d1V1C2T3", "D1V1C2T3\n", " D1V1C2T3", "xD1V1C2T3", "D1V1C2T3D2V1C2T3",
        ] {
            assert!(
                matches!(decode(raw), Err(DecodeError::Malformed(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(decode("D1V٣C2T3").is_err());
    }

    #[test]
    fn overflow_reports_the_field() {
        let err = decode("D1V1C99999999999T3").unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfRange {
                field: Channel::Current,
                value: "99999999999".to_string()
            }
        );
        assert!(err.to_string().contains("Current"));
    }
}
