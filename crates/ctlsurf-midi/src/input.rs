//! Decoding incoming surface MIDI into control events.
//!
//! The default layout is the Mackie Control one: five rows of eight strip buttons
//! on notes `0x00..=0x27`, fader touch on `0x68..=0x70`, V-Pots on CC `0x10..=0x17`,
//! the jog wheel on CC `0x3C` and motor fader positions as pitch bend.

use crate::error::Result;
use crate::fader::{FADER_CHANNELS, FADER_MAX};
use ctlsurf_core::ButtonEvent;
use midly::live::LiveEvent;
use midly::MidiMessage;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub const ROW_REC: usize = 0;
pub const ROW_SOLO: usize = 1;
pub const ROW_MUTE: usize = 2;
pub const ROW_SELECT: usize = 3;
/// Pressing a V-Pot.
pub const ROW_KNOB_PUSH: usize = 4;

/// A decoded surface gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceInput {
    /// Strip button at `(row, column)`.
    Button {
        row: usize,
        column: usize,
        event: ButtonEvent,
    },
    /// Any other note-addressed button (transport, banking, modifiers).
    Function { note: u8, event: ButtonEvent },
    FaderTouch { channel: usize, touched: bool },
    /// Fader position in `0..=FADER_MAX`.
    Fader { channel: usize, value: u16 },
    /// Relative V-Pot turn, still encoded.
    Knob { slot: usize, wire: u8 },
    Jog { wire: u8 },
}

/// Note and controller layout of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMap {
    /// First note of each strip button row.
    pub row_notes: Vec<u8>,
    pub strip_width: u8,
    pub touch_base: u8,
    pub knob_cc_base: u8,
    pub jog_cc: u8,
    pub shift_note: u8,
    pub bank_left_note: u8,
    pub bank_right_note: u8,
    pub channel_left_note: u8,
    pub channel_right_note: u8,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::mackie()
    }
}

impl InputMap {
    pub fn mackie() -> Self {
        Self {
            row_notes: vec![0x00, 0x08, 0x10, 0x18, 0x20],
            strip_width: 8,
            touch_base: 0x68,
            knob_cc_base: 0x10,
            jog_cc: 0x3C,
            shift_note: 0x46,
            bank_left_note: 0x2E,
            bank_right_note: 0x2F,
            channel_left_note: 0x30,
            channel_right_note: 0x31,
        }
    }

    /// Note of the strip button at `(row, column)`, if the layout has one.
    pub fn button_note(&self, row: usize, column: usize) -> Option<u8> {
        let base = *self.row_notes.get(row)?;
        if column >= usize::from(self.strip_width) {
            return None;
        }
        let note = base.checked_add(u8::try_from(column).ok()?)?;
        (note <= 0x7F).then_some(note)
    }

    /// Decode one complete MIDI message. Messages without a mapping yield `None`.
    pub fn parse(&self, bytes: &[u8]) -> Result<Option<SurfaceInput>> {
        let LiveEvent::Midi { channel, message } = LiveEvent::parse(bytes)? else {
            trace!("Ignoring non-channel message {:02X?}", bytes);
            return Ok(None);
        };
        let input = match message {
            MidiMessage::NoteOn { key, vel } => {
                let event = if vel.as_int() > 0 {
                    ButtonEvent::Down
                } else {
                    ButtonEvent::Up
                };
                Some(self.note(key.as_int(), event))
            }
            MidiMessage::NoteOff { key, .. } => Some(self.note(key.as_int(), ButtonEvent::Up)),
            MidiMessage::Controller { controller, value } => {
                self.controller(controller.as_int(), value.as_int())
            }
            MidiMessage::PitchBend { bend } => {
                let raw = bend.0.as_int();
                let channel = usize::from(channel.as_int());
                (channel < FADER_CHANNELS).then(|| SurfaceInput::Fader {
                    channel,
                    value: ((raw >> 7) * 127 + (raw & 0x7F)).min(FADER_MAX),
                })
            }
            _ => None,
        };
        if input.is_none() {
            trace!("Unmapped input {:02X?}", bytes);
        }
        Ok(input)
    }

    fn note(&self, note: u8, event: ButtonEvent) -> SurfaceInput {
        let width = self.strip_width;
        for (row, &base) in self.row_notes.iter().enumerate() {
            if note >= base && note < base.saturating_add(width) {
                return SurfaceInput::Button {
                    row,
                    column: usize::from(note - base),
                    event,
                };
            }
        }
        let touch_end = self.touch_base.saturating_add(FADER_CHANNELS as u8);
        if note >= self.touch_base && note < touch_end {
            return SurfaceInput::FaderTouch {
                channel: usize::from(note - self.touch_base),
                touched: event == ButtonEvent::Down,
            };
        }
        SurfaceInput::Function { note, event }
    }

    fn controller(&self, cc: u8, value: u8) -> Option<SurfaceInput> {
        if cc >= self.knob_cc_base && cc < self.knob_cc_base.saturating_add(self.strip_width) {
            return Some(SurfaceInput::Knob {
                slot: usize::from(cc - self.knob_cc_base),
                wire: value,
            });
        }
        (cc == self.jog_cc).then_some(SurfaceInput::Jog { wire: value })
    }
}
