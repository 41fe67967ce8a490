//! Button LEDs and V-Pot LED rings.

use crate::cache::SendCache;
use crate::message::SurfaceMessage;
use ctlsurf_core::LedState;
use serde::{Deserialize, Serialize};

/// Segments lit on a ring at full scale, the `11` in `round(value * 11 / max)`.
pub const RING_SEGMENTS: u32 = 11;

/// Ring display style, the high nibble of the ring payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LedRingMode {
    #[default]
    SingleDot = 0,
    BoostCut = 1,
    Wrap = 2,
    Spread = 3,
}

/// `round(value * 11 / max)`, clamped.
pub fn ring_position(value: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let value = value.min(max);
    ((f64::from(value) * f64::from(RING_SEGMENTS)) / f64::from(max)).round() as u8
}

#[derive(Debug, Clone, Default)]
pub struct LedRings {
    cache: SendCache<u8, (LedRingMode, u8)>,
}

impl LedRings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring write for `knob`, or nothing when it already shows this.
    pub fn update(
        &mut self,
        knob: u8,
        mode: LedRingMode,
        value: u32,
        max: u32,
    ) -> Option<SurfaceMessage> {
        let position = ring_position(value, max);
        self.cache
            .should_send(knob, (mode, position))
            .then(|| SurfaceMessage::led_ring(knob, mode as u8, position))
    }

    /// Turn a ring off, e.g. for a slot without a parameter.
    pub fn clear(&mut self, knob: u8) -> Option<SurfaceMessage> {
        self.cache
            .should_send(knob, (LedRingMode::SingleDot, 0))
            .then(|| SurfaceMessage::led_ring(knob, 0, 0))
    }

    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }
}

/// Note-addressed button LEDs.
#[derive(Debug, Clone, Default)]
pub struct ButtonLeds {
    cache: SendCache<u8, LedState>,
}

impl ButtonLeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(state: LedState) -> u8 {
        match state {
            LedState::Off => 0x00,
            LedState::On => 0x7F,
            LedState::Blink => 0x01,
        }
    }

    pub fn update(&mut self, note: u8, state: LedState) -> Option<SurfaceMessage> {
        self.cache
            .should_send(note, state)
            .then(|| SurfaceMessage::note_on(0, note, Self::velocity(state)))
    }

    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }
}
