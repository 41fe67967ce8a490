//! VU meter output with redundant-send suppression and optional peak hold.

use crate::message::SurfaceMessage;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Meter scaling of one surface family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VuProfile {
    /// Largest raw meter value the host reports.
    pub input_max: u32,
    /// Number of lit segments at full scale.
    pub scale_max: u8,
    /// Offset added to the channel pressure status byte.
    pub selector: u8,
    /// Send every update even when the scaled value did not change.
    pub always_send: bool,
    pub peak_hold: bool,
}

impl Default for VuProfile {
    fn default() -> Self {
        Self {
            input_max: 16383,
            scale_max: 13,
            selector: 0,
            always_send: false,
            peak_hold: false,
        }
    }
}

impl VuProfile {
    /// `round(raw / input_max * scale_max)`.
    pub fn scale(&self, raw: u32) -> u8 {
        if self.input_max == 0 {
            return 0;
        }
        let normalized = f64::from(raw.min(self.input_max)) / f64::from(self.input_max);
        (normalized * f64::from(self.scale_max)).round() as u8
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct VuChannelState {
    last_sent: Option<u8>,
    peak: u8,
    /// Channel volume when the peak was last reset.
    peak_baseline: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct VuMeterSync {
    profile: VuProfile,
    channels: Vec<VuChannelState>,
}

impl VuMeterSync {
    pub fn new(channels: usize, profile: VuProfile) -> Self {
        Self {
            profile,
            channels: vec![VuChannelState::default(); channels],
        }
    }

    pub fn profile(&self) -> &VuProfile {
        &self.profile
    }

    /// Meter update for `channel`. `volume` is the channel's current volume,
    /// used to decide when a held peak resets.
    pub fn update(&mut self, channel: usize, raw: u32, volume: u32) -> Option<SurfaceMessage> {
        let Some(state) = self.channels.get_mut(channel) else {
            error!("VU channel {} out of range", channel);
            return None;
        };
        let scaled = self.profile.scale(raw);
        let level = if self.profile.peak_hold {
            if state.peak_baseline != Some(volume) {
                state.peak_baseline = Some(volume);
                state.peak = scaled;
            } else {
                state.peak = state.peak.max(scaled);
            }
            state.peak
        } else {
            scaled
        };

        if !self.profile.always_send && state.last_sent == Some(level) {
            return None;
        }
        state.last_sent = Some(level);
        Some(SurfaceMessage::vu_meter(
            self.profile.selector,
            channel as u8,
            level,
        ))
    }

    /// Drop `channel` to zero and forget its held peak, e.g. when its strip
    /// no longer shows a channel. Sends once, not on every tick.
    pub fn clear(&mut self, channel: usize) -> Option<SurfaceMessage> {
        let Some(state) = self.channels.get_mut(channel) else {
            error!("VU channel {} out of range", channel);
            return None;
        };
        state.peak = 0;
        state.peak_baseline = None;
        if state.last_sent == Some(0) {
            return None;
        }
        state.last_sent = Some(0);
        Some(SurfaceMessage::vu_meter(self.profile.selector, channel as u8, 0))
    }

    pub fn peak(&self, channel: usize) -> Option<u8> {
        self.channels.get(channel).map(|state| state.peak)
    }

    pub fn reset_peaks(&mut self) {
        for state in &mut self.channels {
            state.peak = 0;
            state.peak_baseline = None;
        }
    }

    /// Resend every meter on the next update.
    pub fn invalidate(&mut self) {
        for state in &mut self.channels {
            state.last_sent = None;
        }
    }
}
