//! Touch-sensitive motor faders.
//!
//! While the user holds a fader, host updates are recorded but not sent, so the
//! motor never fights the hand. On release the latest target goes out at once.

use crate::message::SurfaceMessage;
use tracing::{error, trace};

/// Channel strip faders plus the master.
pub const FADER_CHANNELS: usize = 9;
pub const MASTER_FADER: usize = 8;

/// Largest position the `value % 127`, `value / 127` encoding carries.
pub const FADER_MAX: u16 = 127 * 128 - 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaderChannelState {
    pub last_sent: Option<u16>,
    pub touched: bool,
    /// Latest position the host asked for.
    pub target: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct MotorFaderSync {
    channels: [FaderChannelState; FADER_CHANNELS],
}

impl MotorFaderSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, channel: usize) -> Option<&FaderChannelState> {
        self.channels.get(channel)
    }

    pub fn is_touched(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(|state| state.touched)
    }

    /// Host-side position update. Returns the write to send, if any.
    pub fn set_target(&mut self, channel: usize, value: u16) -> Option<SurfaceMessage> {
        let Some(state) = self.channels.get_mut(channel) else {
            error!("Fader channel {} out of range", channel);
            return None;
        };
        let value = value.min(FADER_MAX);
        state.target = Some(value);
        if state.touched {
            trace!("Fader {} touched, holding {}", channel, value);
            return None;
        }
        if state.last_sent == Some(value) {
            return None;
        }
        state.last_sent = Some(value);
        Some(SurfaceMessage::fader(channel as u8, value))
    }

    /// Master strip target. With `shift` held the alternate source drives the
    /// motor; the wire channel stays the master's.
    pub fn set_master_target(
        &mut self,
        primary: u16,
        alternate: u16,
        shift: bool,
    ) -> Option<SurfaceMessage> {
        self.set_target(MASTER_FADER, if shift { alternate } else { primary })
    }

    /// Touch change. Releasing sends the latest target immediately.
    pub fn set_touched(&mut self, channel: usize, touched: bool) -> Option<SurfaceMessage> {
        let Some(state) = self.channels.get_mut(channel) else {
            error!("Fader channel {} out of range", channel);
            return None;
        };
        let was_touched = std::mem::replace(&mut state.touched, touched);
        if touched || !was_touched {
            return None;
        }
        let target = state.target?;
        state.last_sent = Some(target);
        Some(SurfaceMessage::fader(channel as u8, target))
    }

    /// The hand moved the fader, so the motor is already at `value`.
    pub fn on_user_move(&mut self, channel: usize, value: u16) {
        match self.channels.get_mut(channel) {
            Some(state) => state.last_sent = Some(value.min(FADER_MAX)),
            None => error!("Fader channel {} out of range", channel),
        }
    }

    /// Resend every fader on its next update.
    pub fn invalidate(&mut self) {
        for state in &mut self.channels {
            state.last_sent = None;
        }
    }
}
