//! Physical units (main surface plus extenders) and the modes mirrored across them.

use crate::Result;
use ctlsurf_core::{
    ConnectedManagers, ControlEvent, LedState, Mode, ModeManager, UnitSlice, ValueChanger,
};
use ctlsurf_midi::{
    ButtonLeds, Display, InputMap, LedRingMode, LedRings, MidiSink, MotorFaderSync,
    SurfaceMessage, VuMeterSync, VuProfile, FADER_MAX,
};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fader position for a raw parameter value.
pub fn fader_position(changer: &ValueChanger, raw: u32) -> u16 {
    (changer.to_normalized(raw) * f64::from(FADER_MAX)).round() as u16
}

/// Raw parameter value for a fader position.
pub fn fader_value(changer: &ValueChanger, position: u16) -> u32 {
    changer.from_normalized(f64::from(position) / f64::from(FADER_MAX))
}

/// Output state of one physical unit.
pub struct Unit {
    index: usize,
    slice: UnitSlice,
    sink: Arc<dyn MidiSink>,
    /// Sink generation everything below was last sent under.
    generation: u64,
    pub(crate) display: Display,
    pub(crate) faders: MotorFaderSync,
    pub(crate) meters: VuMeterSync,
    pub(crate) leds: ButtonLeds,
    pub(crate) rings: LedRings,
    pub(crate) input: InputMap,
}

impl Unit {
    pub(crate) fn new(
        index: usize,
        page_size: usize,
        sink: Arc<dyn MidiSink>,
        display: Display,
        input: InputMap,
        vu: VuProfile,
    ) -> Self {
        Self {
            index,
            slice: UnitSlice::new(index, page_size),
            generation: sink.generation(),
            sink,
            display,
            faders: MotorFaderSync::new(),
            meters: VuMeterSync::new(page_size, vu),
            leds: ButtonLeds::new(),
            rings: LedRings::new(),
            input,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The bank slots this unit shows.
    pub fn slice(&self) -> UnitSlice {
        self.slice
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn faders(&self) -> &MotorFaderSync {
        &self.faders
    }

    pub fn input(&self) -> &InputMap {
        &self.input
    }

    /// Send `message` if there is one. Returns the number of messages sent.
    pub(crate) fn send(&self, message: Option<SurfaceMessage>) -> usize {
        let Some(message) = message else {
            return 0;
        };
        match self.sink.send(message) {
            Ok(()) => 1,
            Err(e) => {
                warn!("Unit {} send failed: {}", self.index, e);
                0
            }
        }
    }

    /// Mirror `mode` onto the display buffer, rings, faders and strip LEDs.
    fn render<M>(
        &mut self,
        mode: Option<&dyn Mode<M>>,
        model: &M,
        changer: &ValueChanger,
        ring_mode: LedRingMode,
    ) -> usize {
        let mut sent = 0;
        for slot in 0..self.slice.width {
            let (label, value_text, knob) = match mode {
                Some(mode) => (
                    mode.slot_label(model, slot),
                    mode.slot_value_text(model, slot),
                    mode.knob_value(model, slot),
                ),
                None => (String::new(), String::new(), None),
            };

            let buffer = self.display.buffer_mut();
            if slot < buffer.columns() {
                buffer.set_cell(0, slot, &label);
                if buffer.rows() > 1 {
                    buffer.set_cell(1, slot, &value_text);
                }
            }

            let knob_id = slot as u8;
            let ring = match knob {
                Some(value) => self
                    .rings
                    .update(knob_id, ring_mode, value, changer.max_value()),
                None => self.rings.clear(knob_id),
            };
            sent += self.send(ring);

            let position = knob.map_or(0, |value| fader_position(changer, value));
            let fader = self.faders.set_target(slot, position);
            sent += self.send(fader);

            for row in 0..self.input.row_notes.len() {
                let Some(note) = self.input.button_note(row, slot) else {
                    continue;
                };
                let state = mode.map_or(LedState::Off, |mode| mode.button_state(model, row, slot));
                let led = self.leds.update(note, state);
                sent += self.send(led);
            }
        }
        sent
    }

    /// Invalidate everything if the sink reconnected since the last check.
    fn sync_connection(&mut self) -> bool {
        let generation = self.sink.generation();
        if generation == self.generation {
            return false;
        }
        self.generation = generation;
        info!("Unit {} reconnected, resending everything", self.index);
        self.invalidate();
        true
    }

    pub(crate) fn invalidate(&mut self) {
        self.display.invalidate();
        self.faders.invalidate();
        self.meters.invalidate();
        self.leds.invalidate_all();
        self.rings.invalidate_all();
    }
}

/// The main unit and its extenders, switched between modes together.
///
/// Unit 0 is the main unit. Every unit has its own mode instances, built for its
/// [`UnitSlice`] of the shared banks, so each shows a different window offset.
pub struct Rig<K, M> {
    modes: ConnectedManagers<K, M>,
    units: Vec<Unit>,
}

impl<K: Copy + Eq + Debug, M> Rig<K, M> {
    pub(crate) fn new(modes: ConnectedManagers<K, M>, units: Vec<Unit>) -> Self {
        Self { modes, units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub(crate) fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.units.get_mut(index)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn modes(&self) -> &ConnectedManagers<K, M> {
        &self.modes
    }

    /// Mode manager of one unit.
    pub fn manager_mut(&mut self, unit: usize) -> Option<&mut ModeManager<K, M>> {
        self.modes.unit_mut(unit)
    }

    pub fn active_mode(&self) -> Option<K> {
        self.modes.active_id()
    }

    pub fn set_mode(&mut self, id: K, model: &mut M) -> Result<()> {
        self.modes.set_active(id, model)?;
        Ok(())
    }

    pub fn set_temporary_mode(&mut self, id: K, model: &mut M) -> Result<()> {
        self.modes.set_temporary(id, model)?;
        Ok(())
    }

    pub fn restore_mode(&mut self, model: &mut M) {
        self.modes.restore(model);
    }

    /// Route a control event to `unit`. Unknown units are logged and ignored.
    pub fn dispatch(&mut self, unit: usize, event: ControlEvent, model: &mut M) {
        if let Err(e) = self.modes.dispatch(unit, event, model) {
            error!("Dropping {:?}: {}", event, e);
        }
    }

    pub(crate) fn render(
        &mut self,
        model: &M,
        changer: &ValueChanger,
        ring_mode: LedRingMode,
    ) -> usize {
        let mut sent = 0;
        for (index, unit) in self.units.iter_mut().enumerate() {
            let mode = self.modes.unit(index).and_then(|manager| manager.active());
            sent += unit.render(mode, model, changer, ring_mode);
        }
        sent
    }

    /// Pick up reconnected sinks. Returns whether the main unit reconnected.
    pub(crate) fn sync_connections(&mut self) -> bool {
        let mut primary = false;
        for unit in &mut self.units {
            if unit.sync_connection() && unit.index == 0 {
                primary = true;
            }
        }
        primary
    }

    pub(crate) fn flush_displays(&mut self) -> usize {
        self.units.iter_mut().map(|unit| unit.display.flush()).sum()
    }

    /// Forget everything sent, e.g. after the surface reconnected.
    pub fn invalidate(&mut self) {
        for unit in &mut self.units {
            unit.invalidate();
        }
    }

    pub(crate) fn shutdown(&mut self, model: &mut M) {
        self.modes.deactivate_all(model);
        for unit in &mut self.units {
            unit.display.shutdown();
        }
    }
}
