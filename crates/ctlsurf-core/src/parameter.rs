//! Slot-to-parameter indirection.
//!
//! A [`ParameterProvider`] answers "which live object does knob `n` drive right
//! now". Modes hold a provider instead of hard-coding their data source, so a
//! volume, pan or send mode is the same [`ParameterMode`](crate::ParameterMode)
//! with a different provider.

use crate::bank::{Bank, Pageable, UnitSlice};
use crate::model::{BankItem, ChannelState, Parameter, ParameterState};
use crate::subscription::Interest;

/// Resolves a physical control slot to a parameter of the host model `M`.
pub trait ParameterProvider<M> {
    /// Number of addressable slots.
    fn size(&self) -> usize;

    fn parameter<'a>(&self, model: &'a M, slot: usize) -> Option<&'a dyn Parameter>;

    fn parameter_mut<'a>(&self, model: &'a mut M, slot: usize) -> Option<&'a mut dyn Parameter>;

    /// Top display line for the slot. Defaults to the parameter name.
    fn label(&self, model: &M, slot: usize) -> String {
        self.parameter(model, slot)
            .filter(|param| param.exists())
            .map(|param| param.name().to_string())
            .unwrap_or_default()
    }

    /// The bank this provider pages through, if any.
    fn pageable<'a>(&self, _model: &'a mut M) -> Option<&'a mut dyn Pageable> {
        None
    }

    /// Host properties the provider reads.
    fn interests(&self) -> Vec<Interest> {
        Vec::new()
    }
}

/// Which parameter of a channel strip a [`ChannelProvider`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelParameter {
    Volume,
    Pan,
    Send(usize),
}

impl ChannelParameter {
    fn resolve(self, channel: &ChannelState) -> Option<&ParameterState> {
        match self {
            ChannelParameter::Volume => Some(&channel.volume),
            ChannelParameter::Pan => Some(&channel.pan),
            ChannelParameter::Send(index) => channel.send(index),
        }
    }

    fn resolve_mut(self, channel: &mut ChannelState) -> Option<&mut ParameterState> {
        match self {
            ChannelParameter::Volume => Some(&mut channel.volume),
            ChannelParameter::Pan => Some(&mut channel.pan),
            ChannelParameter::Send(index) => channel.send_mut(index),
        }
    }

    fn interest(self) -> Interest {
        match self {
            ChannelParameter::Volume => Interest::new("track/volume"),
            ChannelParameter::Pan => Interest::new("track/pan"),
            ChannelParameter::Send(index) => Interest::new(format!("track/send/{}", index)),
        }
    }
}

/// One parameter per channel of a channel bank, labelled with the channel name.
pub struct ChannelProvider<M> {
    bank: fn(&M) -> &Bank<ChannelState>,
    bank_mut: fn(&mut M) -> &mut Bank<ChannelState>,
    target: ChannelParameter,
    slice: UnitSlice,
}

impl<M> ChannelProvider<M> {
    pub fn new(
        bank: fn(&M) -> &Bank<ChannelState>,
        bank_mut: fn(&mut M) -> &mut Bank<ChannelState>,
        target: ChannelParameter,
        slice: UnitSlice,
    ) -> Self {
        Self {
            bank,
            bank_mut,
            target,
            slice,
        }
    }

    pub fn target(&self) -> ChannelParameter {
        self.target
    }

    pub fn slice(&self) -> UnitSlice {
        self.slice
    }
}

impl<M> ParameterProvider<M> for ChannelProvider<M> {
    fn size(&self) -> usize {
        self.slice.width
    }

    fn parameter<'a>(&self, model: &'a M, slot: usize) -> Option<&'a dyn Parameter> {
        if slot >= self.slice.width {
            return None;
        }
        let channel = (self.bank)(model).get_item(self.slice.bank_slot(slot));
        self.target
            .resolve(channel)
            .map(|param| param as &dyn Parameter)
    }

    fn parameter_mut<'a>(&self, model: &'a mut M, slot: usize) -> Option<&'a mut dyn Parameter> {
        if slot >= self.slice.width {
            return None;
        }
        let channel = (self.bank_mut)(model).get_item_mut(self.slice.bank_slot(slot))?;
        self.target
            .resolve_mut(channel)
            .map(|param| param as &mut dyn Parameter)
    }

    fn label(&self, model: &M, slot: usize) -> String {
        if slot >= self.slice.width {
            return String::new();
        }
        let channel = (self.bank)(model).get_item(self.slice.bank_slot(slot));
        if channel.exists() {
            channel.name().to_string()
        } else {
            String::new()
        }
    }

    fn pageable<'a>(&self, model: &'a mut M) -> Option<&'a mut dyn Pageable> {
        Some((self.bank_mut)(model))
    }

    fn interests(&self) -> Vec<Interest> {
        vec![Interest::new("track/name"), self.target.interest()]
    }
}

/// Slots map straight onto a bank of parameters, e.g. the selected device's page.
pub struct ParameterBankProvider<M> {
    bank: fn(&M) -> &Bank<ParameterState>,
    bank_mut: fn(&mut M) -> &mut Bank<ParameterState>,
    slice: UnitSlice,
}

impl<M> ParameterBankProvider<M> {
    pub fn new(
        bank: fn(&M) -> &Bank<ParameterState>,
        bank_mut: fn(&mut M) -> &mut Bank<ParameterState>,
        slice: UnitSlice,
    ) -> Self {
        Self {
            bank,
            bank_mut,
            slice,
        }
    }
}

impl<M> ParameterProvider<M> for ParameterBankProvider<M> {
    fn size(&self) -> usize {
        self.slice.width
    }

    fn parameter<'a>(&self, model: &'a M, slot: usize) -> Option<&'a dyn Parameter> {
        if slot >= self.slice.width {
            return None;
        }
        let param = (self.bank)(model).get_item(self.slice.bank_slot(slot));
        Some(param as &dyn Parameter)
    }

    fn parameter_mut<'a>(&self, model: &'a mut M, slot: usize) -> Option<&'a mut dyn Parameter> {
        if slot >= self.slice.width {
            return None;
        }
        (self.bank_mut)(model)
            .get_item_mut(self.slice.bank_slot(slot))
            .map(|param| param as &mut dyn Parameter)
    }

    fn pageable<'a>(&self, model: &'a mut M) -> Option<&'a mut dyn Pageable> {
        Some((self.bank_mut)(model))
    }

    fn interests(&self) -> Vec<Interest> {
        vec![
            Interest::new("device/parameter/name"),
            Interest::new("device/parameter/value"),
        ]
    }
}
