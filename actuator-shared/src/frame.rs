use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    curve::{Channel, CurveSet},
    drive::DriveSettings,
};

const AIR_OUT: u8 = 1 << 0;
const AIR_IN: u8 = 1 << 1;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V1,
    V2,
    #[default]
    V3,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 3] =
        [ProtocolVersion::V1, ProtocolVersion::V2, ProtocolVersion::V3];

    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "v1",
            ProtocolVersion::V2 => "v2",
            ProtocolVersion::V3 => "v3",
        }
    }

    pub fn frame_len(&self) -> usize {
        match self {
            ProtocolVersion::V1 => 3,
            ProtocolVersion::V2 => 5,
            ProtocolVersion::V3 => 9,
        }
    }

    pub fn oscillates(&self) -> bool {
        *self == ProtocolVersion::V3
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProtocolError(String);

impl fmt::Display for ParseProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown protocol version '{}', expected one of v1, v2, v3",
            self.0
        )
    }
}

impl std::error::Error for ParseProtocolError {}

impl FromStr for ProtocolVersion {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolVersion::ALL
            .into_iter()
            .find(|version| version.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseProtocolError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    Length {
        version: ProtocolVersion,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrameError::Length {
                version,
                expected,
                actual,
            } => write!(
                f,
                "{version} frame must be {expected} bytes, got {actual}"
            ),
        }
    }
}

impl std::error::Error for FrameError {}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TickInput {
    pub time: f64,
    pub end_time: f64,
    pub paused: bool,
    pub air_out: bool,
    pub air_in: bool,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub position: i32,
    pub force: i32,
    pub air_out: bool,
    pub air_in: bool,
}

impl Frame {
    pub fn build(
        curves: &CurveSet,
        tick: &TickInput,
        version: ProtocolVersion,
        drive: &DriveSettings,
    ) -> Frame {
        let sample = |channel| curves.value_at(channel, tick.time, tick.end_time);

        let (position, force) = if version.oscillates() {
            let position = drive.oscillate(
                sample(Channel::Position),
                sample(Channel::Amplitude),
                tick.time,
            );
            let force = if tick.paused {
                0
            } else {
                sample(Channel::Force)
            };
            (position, force)
        } else {
            (sample(Channel::Position), sample(Channel::Force))
        };

        Frame {
            position,
            force,
            air_out: tick.air_out,
            air_in: tick.air_in,
        }
    }

    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.air_out {
            flags |= AIR_OUT;
        }
        if self.air_in {
            flags |= AIR_IN;
        }
        flags
    }

    // Values too wide for an i16 field saturate.
    pub fn encode(&self, version: ProtocolVersion) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(version.frame_len());

        match version {
            ProtocolVersion::V1 => {
                bytes.extend_from_slice(&saturate_i16(self.position).to_be_bytes());
            }
            ProtocolVersion::V2 => {
                bytes.extend_from_slice(&saturate_i16(self.position).to_le_bytes());
                bytes.extend_from_slice(&saturate_i16(self.force).to_le_bytes());
            }
            ProtocolVersion::V3 => {
                bytes.extend_from_slice(&self.position.to_le_bytes());
                bytes.extend_from_slice(&self.force.to_le_bytes());
            }
        }

        bytes.push(self.flags());
        bytes
    }

    // v1 carries no force.
    pub fn decode(bytes: &[u8], version: ProtocolVersion) -> Result<Frame, FrameError> {
        if bytes.len() != version.frame_len() {
            return Err(FrameError::Length {
                version,
                expected: version.frame_len(),
                actual: bytes.len(),
            });
        }

        let (position, force) = match version {
            ProtocolVersion::V1 => (i16::from_be_bytes([bytes[0], bytes[1]]) as i32, 0),
            ProtocolVersion::V2 => (
                i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
                i16::from_le_bytes([bytes[2], bytes[3]]) as i32,
            ),
            ProtocolVersion::V3 => (
                i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            ),
        };

        let flags = bytes[version.frame_len() - 1];

        Ok(Frame {
            position,
            force,
            air_out: flags & AIR_OUT != 0,
            air_in: flags & AIR_IN != 0,
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "position {} force {} air out {} air in {}",
            self.position, self.force, self.air_out, self.air_in
        )
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ControlPoint;
    use pretty_assertions::assert_eq;

    fn frame(position: i32, force: i32, air_out: bool, air_in: bool) -> Frame {
        Frame {
            position,
            force,
            air_out,
            air_in,
        }
    }

    #[test]
    fn flag_byte_bits() {
        assert_eq!(frame(0, 0, true, false).flags(), 0b0000_0001);
        assert_eq!(frame(0, 0, false, true).flags(), 0b0000_0010);
        assert_eq!(frame(0, 0, true, true).flags(), 0b0000_0011);
        assert_eq!(frame(0, 0, false, false).flags(), 0);
    }

    #[test]
    fn v3_layout() {
        let bytes = frame(-2, 513, true, false).encode(ProtocolVersion::V3);
        assert_eq!(
            bytes,
            vec![0xfe, 0xff, 0xff, 0xff, 0x01, 0x02, 0x00, 0x00, 0b01]
        );
    }

    #[test]
    fn v2_layout_does_not_overlap() {
        let bytes = frame(0x0102, 0x0304, false, true).encode(ProtocolVersion::V2);
        assert_eq!(bytes, vec![0x02, 0x01, 0x04, 0x03, 0b10]);
    }

    #[test]
    fn v1_layout_is_big_endian_position_then_flags() {
        let bytes = frame(0x0102, 900, true, true).encode(ProtocolVersion::V1);
        assert_eq!(bytes, vec![0x01, 0x02, 0b11]);
    }

    #[test]
    fn encoded_length_matches_version() {
        for version in ProtocolVersion::ALL {
            assert_eq!(Frame::default().encode(version).len(), version.frame_len());
        }
    }

    #[test]
    fn i16_fields_saturate() {
        let bytes = frame(100_000, -100_000, false, false).encode(ProtocolVersion::V2);
        let decoded = Frame::decode(&bytes, ProtocolVersion::V2).unwrap();
        assert_eq!(decoded.position, i16::MAX as i32);
        assert_eq!(decoded.force, i16::MIN as i32);
    }

    #[test]
    fn v3_decode_recovers_frame() {
        for original in [
            frame(0, 0, false, false),
            frame(-1000, 1023, true, false),
            frame(i32::MIN, i32::MAX, false, true),
            frame(734, 12, true, true),
        ] {
            let bytes = original.encode(ProtocolVersion::V3);
            assert_eq!(Frame::decode(&bytes, ProtocolVersion::V3), Ok(original));
        }
    }

    #[test]
    fn v1_drops_force() {
        let bytes = frame(-300, 700, true, false).encode(ProtocolVersion::V1);
        assert_eq!(
            Frame::decode(&bytes, ProtocolVersion::V1),
            Ok(frame(-300, 0, true, false))
        );
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(
            Frame::decode(&[0; 4], ProtocolVersion::V3),
            Err(FrameError::Length {
                version: ProtocolVersion::V3,
                expected: 9,
                actual: 4,
            })
        );
    }

    #[test]
    fn parses_protocol_names() {
        assert_eq!("v1".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V1));
        assert_eq!(" V3 ".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V3));
        assert!("v4".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn hex_is_lowercase_pairs() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x07]), "00ab07");
    }

    #[test]
    fn v2_build_uses_raw_curves() {
        let mut curves = CurveSet::default();
        curves.position.insert(ControlPoint::new(0.0, 300.0));
        curves.force.insert(ControlPoint::new(0.0, 800.0));

        let tick = TickInput {
            time: 1.0,
            end_time: 10.0,
            paused: true,
            air_out: true,
            air_in: false,
        };
        let frame = Frame::build(&curves, &tick, ProtocolVersion::V2, &DriveSettings::default());

        assert_eq!(frame, self::frame(300, 800, true, false));
    }

    #[test]
    fn v3_build_zeroes_force_when_paused() {
        let mut curves = CurveSet::default();
        curves.force.insert(ControlPoint::new(0.0, 800.0));

        let mut tick = TickInput {
            time: 1.0,
            end_time: 10.0,
            ..Default::default()
        };
        let drive = DriveSettings::default();

        assert_eq!(
            Frame::build(&curves, &tick, ProtocolVersion::V3, &drive).force,
            800
        );

        tick.paused = true;
        assert_eq!(
            Frame::build(&curves, &tick, ProtocolVersion::V3, &drive).force,
            0
        );
    }

    #[test]
    fn v3_build_oscillates_position() {
        let mut curves = CurveSet::default();
        curves.position.insert(ControlPoint::new(0.0, 1023.0));
        curves.amplitude.insert(ControlPoint::new(0.0, 1023.0));

        let drive = DriveSettings {
            max_frequency: 1.0,
            max_amplitude: 1000.0,
            input_full_scale: 1023.0,
        };
        let tick = |time| TickInput {
            time,
            end_time: 10.0,
            ..Default::default()
        };

        let at = |time| Frame::build(&curves, &tick(time), ProtocolVersion::V3, &drive).position;
        assert_eq!(at(0.0), 0);
        assert_eq!(at(0.25), 1000);
        assert_eq!(at(0.75), -1000);
    }
}
