//! 8-digit 7-segment transport display (timecode / bars-beats).
//!
//! Digits are stored least significant first: index 0 is the rightmost digit on
//! the hardware. The wire message carries digits in that order, so a change in the
//! rightmost digit needs a single payload byte while a change in the leftmost digit
//! resends all eight.

use crate::display::DisplayFamily;
use crate::message::SurfaceMessage;
use tracing::trace;

pub const SEGMENT_DIGITS: usize = 8;

/// Adds the dot/colon segment to a digit.
pub const SEGMENT_DOT: u8 = 0x10;

/// HUI timecode display header.
pub const HUI_TIMECODE_HEADER: [u8; 6] = [0xF0, 0x00, 0x00, 0x66, 0x05, 0x00];
const HUI_TIMECODE_COMMAND: u8 = 0x11;

#[derive(Debug, Clone)]
pub struct SegmentDisplay {
    header: Vec<u8>,
    digits: [u8; SEGMENT_DIGITS],
    last_sent: Option<[u8; SEGMENT_DIGITS]>,
}

impl SegmentDisplay {
    pub fn new(header: Vec<u8>) -> Self {
        Self {
            header,
            digits: [0; SEGMENT_DIGITS],
            last_sent: None,
        }
    }

    pub fn hui() -> Self {
        let mut header = HUI_TIMECODE_HEADER.to_vec();
        header.push(HUI_TIMECODE_COMMAND);
        Self::new(header)
    }

    /// The timecode display of a surface family. Mackie units have no
    /// timecode sysex, so they get none.
    pub fn for_family(family: DisplayFamily) -> Option<Self> {
        match family {
            DisplayFamily::HuiMain | DisplayFamily::HuiStrips => Some(Self::hui()),
            DisplayFamily::MackieMain | DisplayFamily::MackieExtender => None,
        }
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn digits(&self) -> &[u8; SEGMENT_DIGITS] {
        &self.digits
    }

    /// Parse `text` such as `"001:02:03:000"` into the digit buffer.
    ///
    /// A `:` or `.` lights the point of the digit to its left. Digits beyond the
    /// eighth (from the right) are dropped; missing ones are blank.
    pub fn set_transport_position(&mut self, text: &str) {
        let mut digits = [0u8; SEGMENT_DIGITS];
        let mut index = 0;
        let mut dot = false;
        for c in text.chars().rev() {
            match c {
                ':' | '.' => dot = true,
                '0'..='9' => {
                    if index < SEGMENT_DIGITS {
                        digits[index] = c as u8 - b'0';
                        if std::mem::take(&mut dot) {
                            digits[index] += SEGMENT_DOT;
                        }
                    }
                    index += 1;
                }
                _ => trace!("Ignoring {:?} in transport position", c),
            }
        }
        if index > SEGMENT_DIGITS {
            trace!("Transport position {:?} truncated to 8 digits", text);
        }
        self.digits = digits;
    }

    /// The run of digits that changed since the last send, or nothing.
    pub fn flush(&mut self) -> Option<SurfaceMessage> {
        let highest = match &self.last_sent {
            None => SEGMENT_DIGITS - 1,
            Some(last) => (0..SEGMENT_DIGITS)
                .rev()
                .find(|&i| last[i] != self.digits[i])?,
        };
        self.last_sent = Some(self.digits);
        Some(SurfaceMessage::sysex(
            &self.header,
            &self.digits[..=highest],
        ))
    }

    /// Force a full resend on the next flush.
    pub fn invalidate(&mut self) {
        self.last_sent = None;
    }
}

impl Default for SegmentDisplay {
    fn default() -> Self {
        Self::hui()
    }
}
