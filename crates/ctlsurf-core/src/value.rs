//! Conversion between normalized values, surface ranges and relative encoder deltas.
//!
//! # Example
//!
//! ```
//! use ctlsurf_core::{RelativeEncoding, ValueChanger};
//!
//! let changer = ValueChanger::new(16384, 128).unwrap();
//! assert_eq!(changer.from_normalized(1.0), 16383);
//!
//! // Mackie V-Pots send 0x01 for one step clockwise, 0x41 for one step counter-clockwise
//! assert_eq!(RelativeEncoding::SignedBit2.decode(0x01), 1);
//! assert_eq!(RelativeEncoding::SignedBit2.decode(0x41), -1);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a relative encoder packs direction and magnitude into a 7-bit CC value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelativeEncoding {
    /// 1..63 = +n, 127..65 = -1..-63.
    TwosComplement,
    /// 64 is the center: 65 = +1, 63 = -1.
    OffsetBinary,
    /// Bit 6 set means positive: 65 = +1, 1 = -1.
    SignedBit,
    /// Bit 6 set means negative: 1 = +1, 65 = -1.
    #[default]
    SignedBit2,
}

impl RelativeEncoding {
    /// Decode a wire value into a signed step count.
    #[inline]
    pub fn decode(self, wire: u8) -> i32 {
        let value = i32::from(wire & 0x7F);
        match self {
            RelativeEncoding::TwosComplement => {
                if value < 64 {
                    value
                } else {
                    value - 128
                }
            }
            RelativeEncoding::OffsetBinary => value - 64,
            RelativeEncoding::SignedBit => {
                if value < 64 {
                    -value
                } else {
                    value - 64
                }
            }
            RelativeEncoding::SignedBit2 => {
                if value < 64 {
                    value
                } else {
                    -(value - 64)
                }
            }
        }
    }

    /// Encode a signed step count, saturating at the 63 step magnitude the scheme can carry.
    pub fn encode(self, steps: i32) -> u8 {
        let steps = steps.clamp(-63, 63);
        let encoded = match self {
            RelativeEncoding::TwosComplement => {
                if steps >= 0 {
                    steps
                } else {
                    128 + steps
                }
            }
            RelativeEncoding::OffsetBinary => 64 + steps,
            RelativeEncoding::SignedBit => {
                if steps >= 0 {
                    64 + steps
                } else {
                    -steps
                }
            }
            RelativeEncoding::SignedBit2 => {
                if steps >= 0 {
                    steps
                } else {
                    64 - steps
                }
            }
        };
        (encoded & 0x7F) as u8
    }
}

/// Converts between the normalized `[0, 1]` domain and a surface's discrete range.
///
/// The range is `0..upper_bound`, so the largest raw value is `upper_bound - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChanger {
    upper_bound: u32,
    step_size: u32,
    encoding: RelativeEncoding,
}

impl ValueChanger {
    /// Create a value changer.
    ///
    /// `step_size` is the raw distance covered by one encoder detent.
    pub fn new(upper_bound: u32, step_size: u32) -> Result<Self> {
        if upper_bound < 2 {
            return Err(Error::InvalidConfig(format!(
                "upper bound {} must be at least 2",
                upper_bound
            )));
        }
        if step_size == 0 || step_size >= upper_bound {
            return Err(Error::InvalidConfig(format!(
                "step size {} must be in 1..{}",
                step_size, upper_bound
            )));
        }
        Ok(Self {
            upper_bound,
            step_size,
            encoding: RelativeEncoding::default(),
        })
    }

    pub fn with_encoding(mut self, encoding: RelativeEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn upper_bound(&self) -> u32 {
        self.upper_bound
    }

    pub fn max_value(&self) -> u32 {
        self.upper_bound - 1
    }

    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    pub fn encoding(&self) -> RelativeEncoding {
        self.encoding
    }

    #[inline]
    pub fn to_normalized(&self, raw: u32) -> f64 {
        f64::from(raw.min(self.max_value())) / f64::from(self.max_value())
    }

    #[inline]
    pub fn from_normalized(&self, normalized: f64) -> u32 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        (normalized * f64::from(self.max_value())).round() as u32
    }

    /// Decode with the configured encoding.
    #[inline]
    pub fn decode_relative(&self, wire: u8) -> i32 {
        self.encoding.decode(wire)
    }

    #[inline]
    pub fn is_increase(&self, wire: u8) -> bool {
        self.decode_relative(wire) > 0
    }

    /// Raw delta for an encoder message, `speed` scales the step (e.g. 4.0 with shift held).
    pub fn delta(&self, wire: u8, speed: f64) -> i64 {
        let steps = f64::from(self.decode_relative(wire));
        (steps * f64::from(self.step_size) * speed).round() as i64
    }

    /// Apply a relative encoder message to `current`, clamped to the range.
    pub fn change_value(&self, current: u32, wire: u8, speed: f64) -> u32 {
        let next = i64::from(current) + self.delta(wire, speed);
        next.clamp(0, i64::from(self.max_value())) as u32
    }

    /// Map an absolute 7-bit controller value onto the range.
    pub fn from_midi_value(&self, value: u8) -> u32 {
        self.from_normalized(f64::from(value.min(127)) / 127.0)
    }

    pub fn to_midi_value(&self, raw: u32) -> u8 {
        (self.to_normalized(raw) * 127.0).round() as u8
    }
}

impl Default for ValueChanger {
    fn default() -> Self {
        Self {
            upper_bound: 16384,
            step_size: 128,
            encoding: RelativeEncoding::default(),
        }
    }
}
