//! The surface: input routing, delayed actions and the per-tick flush.

use crate::builder::SurfaceBuilder;
use crate::config::SurfaceConfig;
use crate::rig::{fader_position, fader_value, Rig};
use crate::Result;
use ctlsurf_core::{ButtonEvent, ControlEvent, DelayedActionQueue, LedState, ValueChanger};
use ctlsurf_midi::{SegmentDisplay, SurfaceInput, MASTER_FADER};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// A meter reading of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterReading {
    /// Raw level in the VU profile's input range.
    pub level: u32,
    /// Channel volume, used to reset peak hold when it moves.
    pub volume: u32,
}

/// What the surface needs from the host beyond the mode-driven parameters.
///
/// Every method has a default, so a host only implements what its surface shows.
pub trait SurfaceHost {
    /// Meter of the channel at absolute bank slot `bank_slot`.
    fn meter(&self, _bank_slot: usize) -> Option<MeterReading> {
        None
    }

    /// Transport position text for the timecode display, e.g. "01:02:03.04".
    fn transport_position(&self) -> Option<String> {
        None
    }

    /// Value behind the master fader; `alternate` is the shifted assignment.
    fn master_value(&self, _alternate: bool) -> Option<u32> {
        None
    }

    fn set_master_value(&mut self, _alternate: bool, _value: u32) {}

    fn touch_master(&mut self, _alternate: bool, _touched: bool) {}

    /// A button the surface itself does not handle.
    fn on_function(&mut self, _note: u8, _event: ButtonEvent) {}

    fn on_jog(&mut self, _steps: i32) {}
}

/// Work scheduled for a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// A strip button held past the long-press threshold.
    LongPress {
        unit: usize,
        row: usize,
        column: usize,
    },
    /// End a timed temporary mode.
    RestoreMode,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ModeButton<K> {
    pub(crate) note: u8,
    pub(crate) mode: K,
    /// Held buttons show the mode only while pressed.
    pub(crate) temporary: bool,
}

/// A control surface with its extenders, driven by the host's tick.
///
/// Input arrives through [`handle_midi`](Surface::handle_midi); everything the
/// hardware shows is brought up to date by [`flush`](Surface::flush).
pub struct Surface<K, M> {
    config: SurfaceConfig,
    changer: ValueChanger,
    rig: Rig<K, M>,
    /// Transport display of the main unit, if its family has one.
    timecode: Option<SegmentDisplay>,
    actions: DelayedActionQueue<SurfaceAction, SurfaceAction>,
    mode_buttons: Vec<ModeButton<K>>,
    shift: bool,
    closed: bool,
}

impl<K: Copy + Eq + Debug, M: SurfaceHost> Surface<K, M> {
    pub fn builder() -> SurfaceBuilder<K, M> {
        SurfaceBuilder::default()
    }

    pub(crate) fn new(
        config: SurfaceConfig,
        changer: ValueChanger,
        rig: Rig<K, M>,
        timecode: Option<SegmentDisplay>,
        mode_buttons: Vec<ModeButton<K>>,
    ) -> Self {
        info!(
            "Surface ready: {} unit(s), {} strips each",
            rig.len(),
            config.page_size
        );
        Self {
            config,
            changer,
            rig,
            timecode,
            actions: DelayedActionQueue::new(),
            mode_buttons,
            shift: false,
            closed: false,
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn value_changer(&self) -> &ValueChanger {
        &self.changer
    }

    pub fn rig(&self) -> &Rig<K, M> {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut Rig<K, M> {
        &mut self.rig
    }

    pub fn timecode(&self) -> Option<&SegmentDisplay> {
        self.timecode.as_ref()
    }

    pub fn is_shift_held(&self) -> bool {
        self.shift
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn active_mode(&self) -> Option<K> {
        self.rig.active_mode()
    }

    pub fn pending_actions(&self) -> usize {
        self.actions.len()
    }

    /// Switch every unit to `id`. Cancels a pending timed restore.
    pub fn set_mode(&mut self, id: K, model: &mut M) -> Result<()> {
        self.actions.cancel(&SurfaceAction::RestoreMode);
        self.rig.set_mode(id, model)
    }

    /// Show `id` on top of the current mode until `duration` has passed.
    pub fn show_mode_for(
        &mut self,
        id: K,
        duration: Duration,
        model: &mut M,
        now: Instant,
    ) -> Result<()> {
        self.rig.set_temporary_mode(id, model)?;
        self.actions.schedule(
            SurfaceAction::RestoreMode,
            duration,
            now,
            SurfaceAction::RestoreMode,
        );
        Ok(())
    }

    /// Decode and route one MIDI message received from `unit`.
    pub fn handle_midi(&mut self, unit: usize, bytes: &[u8], model: &mut M, now: Instant) {
        let Some(input_map) = self.rig.unit(unit).map(|u| u.input()) else {
            error!("MIDI from unknown unit {}", unit);
            return;
        };
        match input_map.parse(bytes) {
            Ok(Some(input)) => self.handle_input(unit, input, model, now),
            Ok(None) => {}
            Err(e) => warn!("Unit {}: undecodable input {:02X?}: {}", unit, bytes, e),
        }
    }

    /// Route a decoded gesture from `unit`.
    pub fn handle_input(&mut self, unit: usize, input: SurfaceInput, model: &mut M, now: Instant) {
        if self.closed {
            debug!("Surface closed, ignoring {:?}", input);
            return;
        }
        if unit >= self.rig.len() {
            error!("Input from unknown unit {}", unit);
            return;
        }
        match input {
            SurfaceInput::Button { row, column, event } => {
                let key = SurfaceAction::LongPress { unit, row, column };
                match event {
                    ButtonEvent::Down => {
                        self.actions
                            .schedule(key, self.config.long_press(), now, key)
                    }
                    ButtonEvent::Up => {
                        self.actions.cancel(&key);
                    }
                    ButtonEvent::LongPress => {}
                }
                self.rig
                    .dispatch(unit, ControlEvent::RowButton { row, column, event }, model);
            }
            SurfaceInput::Knob { slot, wire } => {
                let speed = if self.shift {
                    self.config.shift_speed
                } else {
                    1.0
                };
                self.rig
                    .dispatch(unit, ControlEvent::Knob { slot, wire, speed }, model);
            }
            SurfaceInput::FaderTouch { channel, touched } => {
                if let Some(strip) = self.rig.unit_mut(unit) {
                    let release = strip.faders.set_touched(channel, touched);
                    strip.send(release);
                }
                if channel == MASTER_FADER {
                    model.touch_master(self.shift, touched);
                } else {
                    self.rig.dispatch(
                        unit,
                        ControlEvent::KnobTouch {
                            slot: channel,
                            touched,
                        },
                        model,
                    );
                }
            }
            SurfaceInput::Fader { channel, value } => {
                if let Some(strip) = self.rig.unit_mut(unit) {
                    strip.faders.on_user_move(channel, value);
                }
                let value = fader_value(&self.changer, value);
                if channel == MASTER_FADER {
                    model.set_master_value(self.shift, value);
                } else {
                    self.rig.dispatch(
                        unit,
                        ControlEvent::KnobValue {
                            slot: channel,
                            value,
                        },
                        model,
                    );
                }
            }
            SurfaceInput::Jog { wire } => model.on_jog(self.changer.decode_relative(wire)),
            SurfaceInput::Function { note, event } => self.on_function(note, event, model),
        }
    }

    fn on_function(&mut self, note: u8, event: ButtonEvent, model: &mut M) {
        let map = &self.config.input;
        if note == map.shift_note {
            self.shift = event != ButtonEvent::Up;
            return;
        }

        let navigation = [
            map.bank_left_note,
            map.bank_right_note,
            map.channel_left_note,
            map.channel_right_note,
        ];
        if let Some(position) = navigation.iter().position(|&n| n == note) {
            if event != ButtonEvent::Down {
                return;
            }
            let Some(mode) = self
                .rig
                .manager_mut(0)
                .and_then(|manager| manager.active_mut())
            else {
                debug!("No active mode to page");
                return;
            };
            match position {
                0 => mode.select_previous_page(model),
                1 => mode.select_next_page(model),
                2 => mode.select_previous_item(model),
                _ => mode.select_next_item(model),
            }
            return;
        }

        if let Some(button) = self.mode_buttons.iter().find(|b| b.note == note).copied() {
            let result = match (event, button.temporary) {
                (ButtonEvent::Down, false) => self.set_mode(button.mode, model),
                (ButtonEvent::Down, true) => {
                    self.actions.cancel(&SurfaceAction::RestoreMode);
                    self.rig.set_temporary_mode(button.mode, model)
                }
                (ButtonEvent::Up, true) => {
                    self.rig.restore_mode(model);
                    Ok(())
                }
                _ => Ok(()),
            };
            if let Err(e) = result {
                error!("Mode button {:#04X}: {}", note, e);
            }
            return;
        }

        model.on_function(note, event);
    }

    fn run(&mut self, action: SurfaceAction, model: &mut M) {
        debug!("Running {:?}", action);
        match action {
            SurfaceAction::LongPress { unit, row, column } => self.rig.dispatch(
                unit,
                ControlEvent::RowButton {
                    row,
                    column,
                    event: ButtonEvent::LongPress,
                },
                model,
            ),
            SurfaceAction::RestoreMode => self.rig.restore_mode(model),
        }
    }

    /// Run due actions and bring every unit up to date. Returns the number of
    /// messages sent or queued.
    pub fn flush(&mut self, model: &mut M, now: Instant) -> usize {
        if self.closed {
            return 0;
        }
        for action in self.actions.poll(now) {
            self.run(action, model);
        }
        if self.rig.sync_connections() {
            if let Some(timecode) = self.timecode.as_mut() {
                timecode.invalidate();
            }
        }

        let model = &*model;
        let mut sent = self
            .rig
            .render(model, &self.changer, self.config.ring_mode);
        sent += self.flush_meters(model);
        sent += self.flush_primary(model);
        sent + self.rig.flush_displays()
    }

    fn flush_meters(&mut self, model: &M) -> usize {
        let mut sent = 0;
        for index in 0..self.rig.len() {
            let Some(unit) = self.rig.unit_mut(index) else {
                continue;
            };
            let slice = unit.slice();
            for slot in 0..slice.width {
                let message = match model.meter(slice.bank_slot(slot)) {
                    Some(reading) => unit.meters.update(slot, reading.level, reading.volume),
                    None => unit.meters.clear(slot),
                };
                sent += unit.send(message);
            }
        }
        sent
    }

    /// Master fader, timecode and mode button LEDs live on the main unit only.
    fn flush_primary(&mut self, model: &M) -> usize {
        let active = self.rig.active_mode();
        let shift = self.shift;
        let changer = self.changer;
        let Some(unit) = self.rig.unit_mut(0) else {
            return 0;
        };
        let mut sent = 0;

        if let Some(primary) = model.master_value(false) {
            let alternate = model.master_value(true).unwrap_or(primary);
            let message = unit.faders.set_master_target(
                fader_position(&changer, primary),
                fader_position(&changer, alternate),
                shift,
            );
            sent += unit.send(message);
        }

        if let Some(timecode) = self.timecode.as_mut() {
            if let Some(position) = model.transport_position() {
                timecode.set_transport_position(&position);
                sent += unit.send(timecode.flush());
            }
        }

        for button in &self.mode_buttons {
            let state = if active == Some(button.mode) {
                LedState::On
            } else {
                LedState::Off
            };
            let message = unit.leds.update(button.note, state);
            sent += unit.send(message);
        }
        sent
    }

    /// Resend everything on the next flush, e.g. after the surface reconnected.
    pub fn invalidate(&mut self) {
        self.rig.invalidate();
        if let Some(timecode) = self.timecode.as_mut() {
            timecode.invalidate();
        }
    }

    /// Deactivate all modes, stop the display writers and leave the shutdown
    /// message on the displays. Later input and flushes are ignored.
    pub fn shutdown(&mut self, model: &mut M) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.actions.clear();
        self.rig.shutdown(model);
        info!("Surface shut down");
    }
}
