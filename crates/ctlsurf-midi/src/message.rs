//! Byte-level messages sent to a surface.

/// System exclusive terminator.
pub const SYSEX_END: u8 = 0xF7;

/// First CC of the Mackie V-Pot LED rings.
pub const LED_RING_CC_BASE: u8 = 0x30;

/// One complete MIDI message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMessage {
    pub bytes: Vec<u8>,
}

impl SurfaceMessage {
    pub fn control_change(channel: u8, cc_number: u8, value: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: vec![0xB0 | channel, cc_number & 0x7F, value & 0x7F],
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: vec![0x90 | channel, note & 0x7F, velocity & 0x7F],
        }
    }

    /// Motor fader position on pitch bend channel `channel` (8 is the master strip).
    ///
    /// Encoded as `value % 127`, `value / 127`.
    pub fn fader(channel: u8, value: u16) -> Self {
        let channel = channel.min(15);
        let lsb = (value % 127) as u8;
        let msb = (value / 127).min(0x7F) as u8;
        Self {
            bytes: vec![0xE0 | channel, lsb, msb],
        }
    }

    /// Channel aftertouch meter message: `0x10 * channel + level` with the status
    /// offset by `selector`.
    pub fn vu_meter(selector: u8, channel: u8, level: u8) -> Self {
        let data = (channel.min(7) << 4) | (level & 0x0F);
        Self {
            bytes: vec![0xD0 | selector.min(15), data],
        }
    }

    /// V-Pot LED ring: CC `0x30 + knob`, payload `(mode << 4) + position`.
    pub fn led_ring(knob: u8, mode: u8, position: u8) -> Self {
        let payload = ((mode & 0x07) << 4) + position.min(0x0F);
        Self::control_change(0, LED_RING_CC_BASE + (knob & 0x0F), payload)
    }

    /// `header`, then `payload` masked to 7 bits, then end-of-exclusive.
    pub fn sysex(header: &[u8], payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(header.len() + payload.len() + 1);
        bytes.extend_from_slice(header);
        bytes.extend(payload.iter().map(|b| b & 0x7F));
        bytes.push(SYSEX_END);
        Self { bytes }
    }

    pub fn is_sysex(&self) -> bool {
        self.bytes.first() == Some(&0xF0)
    }

    pub fn status(&self) -> Option<u8> {
        self.bytes.first().copied()
    }
}
