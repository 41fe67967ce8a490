//! Modes and the state machine that selects between them.
//!
//! A [`Mode`] interprets one screen/control-row's worth of input and answers
//! rendering queries for it. A [`ModeManager`] keeps exactly one mode active per
//! surface; [`ConnectedManagers`] mirror mode selection across extender units.

mod group;
mod manager;
mod parameter_mode;

pub use group::ConnectedManagers;
pub use manager::ModeManager;
pub use parameter_mode::ParameterMode;

/// Button gesture on a row button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Down,
    Up,
    LongPress,
}

/// Row button LED state a mode asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    #[default]
    Off,
    On,
    Blink,
}

/// Physical input routed to the active mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    RowButton {
        row: usize,
        column: usize,
        event: ButtonEvent,
    },
    /// Relative encoder message; `speed` scales the step (modifier handling).
    Knob { slot: usize, wire: u8, speed: f64 },
    /// Absolute position, e.g. a fader move, in value changer units.
    KnobValue { slot: usize, value: u32 },
    KnobTouch { slot: usize, touched: bool },
}

/// One bound behavior of a surface, driven against the host model `M`.
///
/// Every hook has a no-op default so simple modes only implement what they use.
pub trait Mode<M> {
    fn name(&self) -> &str;

    /// Subscribe host observers.
    fn on_activate(&mut self, _model: &mut M) {}

    /// Release everything `on_activate` acquired.
    fn on_deactivate(&mut self, _model: &mut M) {}

    fn on_row(&mut self, _model: &mut M, _row: usize, _column: usize, _event: ButtonEvent) {}

    fn on_knob(&mut self, _model: &mut M, _slot: usize, _wire: u8, _speed: f64) {}

    fn on_knob_value(&mut self, _model: &mut M, _slot: usize, _value: u32) {}

    fn on_knob_touch(&mut self, _model: &mut M, _slot: usize, _touched: bool) {}

    /// Raw value for LED rings and motor faders.
    fn knob_value(&self, _model: &M, _slot: usize) -> Option<u32> {
        None
    }

    /// Top display line for a slot.
    fn slot_label(&self, _model: &M, _slot: usize) -> String {
        String::new()
    }

    /// Bottom display line for a slot.
    fn slot_value_text(&self, _model: &M, _slot: usize) -> String {
        String::new()
    }

    fn button_state(&self, _model: &M, _row: usize, _column: usize) -> LedState {
        LedState::Off
    }

    fn select_next_page(&mut self, _model: &mut M) {}

    fn select_previous_page(&mut self, _model: &mut M) {}

    fn select_next_item(&mut self, _model: &mut M) {}

    fn select_previous_item(&mut self, _model: &mut M) {}

    fn dispatch(&mut self, model: &mut M, event: ControlEvent) {
        match event {
            ControlEvent::RowButton { row, column, event } => {
                self.on_row(model, row, column, event)
            }
            ControlEvent::Knob { slot, wire, speed } => self.on_knob(model, slot, wire, speed),
            ControlEvent::KnobValue { slot, value } => self.on_knob_value(model, slot, value),
            ControlEvent::KnobTouch { slot, touched } => self.on_knob_touch(model, slot, touched),
        }
    }
}
