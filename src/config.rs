//! Surface configuration.

use crate::{Error, Result};
use ctlsurf_core::{RelativeEncoding, ValueChanger};
use ctlsurf_midi::{
    DisplayFamily, Granularity, InputMap, LedRingMode, SegmentDisplay, TextProtocol, VuProfile,
    FADER_CHANNELS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of a surface and its extenders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Channel strips per unit.
    pub page_size: usize,
    /// Extender units next to the main unit.
    pub extenders: usize,
    pub upper_bound: u32,
    pub step_size: u32,
    pub encoding: RelativeEncoding,
    /// Knob step multiplier while shift is held.
    pub shift_speed: f64,
    pub ring_mode: LedRingMode,
    pub vu: VuProfile,
    pub display: DisplayFamily,
    pub granularity: Granularity,
    pub input: InputMap,
    pub long_press_ms: u64,
    /// Leave a "please restart" message on the displays at shutdown.
    pub shutdown_placeholder: bool,
    /// Write displays from a background thread instead of the tick.
    pub threaded_display: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            page_size: 8,
            extenders: 0,
            upper_bound: 16384,
            step_size: 128,
            encoding: RelativeEncoding::SignedBit2,
            shift_speed: 4.0,
            ring_mode: LedRingMode::SingleDot,
            vu: VuProfile::default(),
            display: DisplayFamily::MackieMain,
            granularity: Granularity::PerCell,
            input: InputMap::mackie(),
            long_press_ms: 400,
            shutdown_placeholder: true,
            threaded_display: true,
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size >= FADER_CHANNELS {
            return Err(Error::InvalidConfig(format!(
                "page_size {} out of range (1-{})",
                self.page_size,
                FADER_CHANNELS - 1
            )));
        }
        if self.page_size > usize::from(self.input.strip_width) {
            return Err(Error::InvalidConfig(format!(
                "page_size {} exceeds the input layout's {} strips",
                self.page_size, self.input.strip_width
            )));
        }
        if !self.shift_speed.is_finite() || self.shift_speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "shift_speed {} must be positive",
                self.shift_speed
            )));
        }
        if self.vu.input_max == 0 || self.vu.scale_max > 0x0F {
            return Err(Error::InvalidConfig(format!(
                "VU profile input_max {} / scale_max {} out of range",
                self.vu.input_max, self.vu.scale_max
            )));
        }
        self.value_changer()?;
        self.main_protocol().validate()?;
        Ok(())
    }

    pub fn value_changer(&self) -> Result<ValueChanger> {
        Ok(ValueChanger::new(self.upper_bound, self.step_size)?.with_encoding(self.encoding))
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn main_protocol(&self) -> TextProtocol {
        TextProtocol::preset(self.display, self.granularity)
    }

    /// Mackie extenders answer to their own device id; other families reuse the main layout.
    pub fn extender_protocol(&self) -> TextProtocol {
        let family = match self.display {
            DisplayFamily::MackieMain => DisplayFamily::MackieExtender,
            other => other,
        };
        TextProtocol::preset(family, self.granularity)
    }

    /// Timecode display of the main unit; `None` when the family has no sysex for it.
    pub fn timecode(&self) -> Option<SegmentDisplay> {
        SegmentDisplay::for_family(self.display)
    }

    pub fn units(&self) -> usize {
        1 + self.extenders
    }
}
