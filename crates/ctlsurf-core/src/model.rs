//! Host-side object mirrors and the traits the synchronization layer reads them through.
//!
//! The host adapter owns the real DAW objects. It keeps these mirrors up to date and
//! drains the [`HostCommand`] outbox every tick to apply user gestures to the DAW.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use smallvec::SmallVec;
use tracing::debug;

/// Capacity of the host command outbox.
pub const COMMAND_QUEUE_CAPACITY: usize = 1024;

/// An entry of a host collection that a [`Bank`](crate::Bank) can window over.
pub trait BankItem {
    fn exists(&self) -> bool;

    fn name(&self) -> &str;

    /// A non-existent stand-in for window slot `slot`.
    fn placeholder(slot: usize) -> Self
    where
        Self: Sized;
}

/// A live, parameter-like host object that a knob or fader can drive.
pub trait Parameter {
    fn exists(&self) -> bool;

    fn name(&self) -> &str;

    /// Raw value in the surface value changer's range.
    fn value(&self) -> u32;

    /// Host formatted value, e.g. "-6.0 dB".
    fn displayed_value(&self) -> String;

    fn set_value(&mut self, value: u32);

    fn touch(&mut self, touched: bool);

    fn reset(&mut self);
}

/// Stable host identifier of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(pub u64);

/// A user gesture the host must apply to its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    SetValue { id: ParameterId, value: u32 },
    Touch { id: ParameterId, touched: bool },
    Reset { id: ParameterId },
}

/// Sending half of the host command outbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<HostCommand>,
}

impl CommandSender {
    /// Non-blocking; a full outbox drops the command.
    pub fn send(&self, command: HostCommand) {
        match self.sender.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                debug!("Host command outbox full, dropping {:?}", command);
            }
            Err(TrySendError::Disconnected(command)) => {
                debug!("Host command outbox closed, dropping {:?}", command);
            }
        }
    }
}

/// Create a host command outbox.
pub fn command_channel() -> (CommandSender, Receiver<HostCommand>) {
    let (sender, receiver) = bounded(COMMAND_QUEUE_CAPACITY);
    (CommandSender { sender }, receiver)
}

/// Mirror of a single host parameter.
#[derive(Debug, Clone)]
pub struct ParameterState {
    id: ParameterId,
    exists: bool,
    name: String,
    value: u32,
    displayed: Option<String>,
    default_value: u32,
    touched: bool,
    outbox: Option<CommandSender>,
}

impl ParameterState {
    pub fn new(id: ParameterId, name: impl Into<String>) -> Self {
        Self {
            id,
            exists: true,
            name: name.into(),
            value: 0,
            displayed: None,
            default_value: 0,
            touched: false,
            outbox: None,
        }
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_default(mut self, default_value: u32) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_outbox(mut self, outbox: CommandSender) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn default_value(&self) -> u32 {
        self.default_value
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Host-side update, does not emit a command.
    pub fn update(&mut self, value: u32, displayed: Option<String>) {
        self.value = value;
        self.displayed = displayed;
    }

    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    fn emit(&self, command: HostCommand) {
        if let Some(outbox) = &self.outbox {
            outbox.send(command);
        }
    }
}

impl Parameter for ParameterState {
    fn exists(&self) -> bool {
        self.exists
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> u32 {
        self.value
    }

    fn displayed_value(&self) -> String {
        match &self.displayed {
            Some(text) => text.clone(),
            None => self.value.to_string(),
        }
    }

    fn set_value(&mut self, value: u32) {
        if !self.exists || value == self.value {
            return;
        }
        // Optimistic: the host confirms through `update` later.
        self.value = value;
        self.displayed = None;
        self.emit(HostCommand::SetValue { id: self.id, value });
    }

    fn touch(&mut self, touched: bool) {
        if !self.exists || touched == self.touched {
            return;
        }
        self.touched = touched;
        self.emit(HostCommand::Touch {
            id: self.id,
            touched,
        });
    }

    fn reset(&mut self) {
        if !self.exists {
            return;
        }
        self.value = self.default_value;
        self.displayed = None;
        self.emit(HostCommand::Reset { id: self.id });
    }
}

impl BankItem for ParameterState {
    fn exists(&self) -> bool {
        self.exists
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn placeholder(slot: usize) -> Self {
        let mut state = ParameterState::new(ParameterId(u64::MAX - slot as u64), "");
        state.exists = false;
        state
    }
}

/// Mirror of a mixer channel (track, bus or return).
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub exists: bool,
    pub name: String,
    pub selected: bool,
    pub mute: bool,
    pub solo: bool,
    pub arm: bool,
    /// Index into the surface color palette.
    pub color: u8,
    pub volume: ParameterState,
    pub pan: ParameterState,
    pub sends: SmallVec<[ParameterState; 8]>,
}

impl ChannelState {
    /// A channel whose volume, pan and sends share `id_base` as their id prefix.
    pub fn new(id_base: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            exists: true,
            volume: ParameterState::new(ParameterId(id_base << 8), "Volume"),
            pan: ParameterState::new(ParameterId((id_base << 8) | 1), "Pan"),
            name,
            selected: false,
            mute: false,
            solo: false,
            arm: false,
            color: 0,
            sends: SmallVec::new(),
        }
    }

    pub fn with_outbox(mut self, outbox: &CommandSender) -> Self {
        self.volume = self.volume.with_outbox(outbox.clone());
        self.pan = self.pan.with_outbox(outbox.clone());
        for send in self.sends.iter_mut() {
            *send = send.clone().with_outbox(outbox.clone());
        }
        self
    }

    pub fn send(&self, index: usize) -> Option<&ParameterState> {
        self.sends.get(index)
    }

    pub fn send_mut(&mut self, index: usize) -> Option<&mut ParameterState> {
        self.sends.get_mut(index)
    }
}

impl BankItem for ChannelState {
    fn exists(&self) -> bool {
        self.exists
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn placeholder(slot: usize) -> Self {
        let mut channel = ChannelState::new(u64::MAX >> 8, "");
        channel.exists = false;
        channel.volume = ParameterState::placeholder(slot);
        channel.pan = ParameterState::placeholder(slot);
        channel
    }
}
