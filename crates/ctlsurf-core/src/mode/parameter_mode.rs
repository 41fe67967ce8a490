//! The generic knob-row mode, configured by a parameter provider.

use super::{ButtonEvent, LedState, Mode};
use crate::parameter::ParameterProvider;
use crate::subscription::{Observable, SubscriptionList};
use crate::value::ValueChanger;

/// Drives one parameter per slot through an injected [`ParameterProvider`].
///
/// Volume, pan, send and device modes are all this type with different providers.
pub struct ParameterMode<M> {
    name: String,
    provider: Box<dyn ParameterProvider<M>>,
    changer: ValueChanger,
    subscriptions: SubscriptionList,
    /// Row whose buttons reset the slot's parameter to its default.
    reset_row: Option<usize>,
    touched: Vec<bool>,
}

impl<M> ParameterMode<M> {
    pub fn new(
        name: impl Into<String>,
        provider: Box<dyn ParameterProvider<M>>,
        changer: ValueChanger,
    ) -> Self {
        let subscriptions = SubscriptionList::new(provider.interests());
        let touched = vec![false; provider.size()];
        Self {
            name: name.into(),
            provider,
            changer,
            subscriptions,
            reset_row: None,
            touched,
        }
    }

    pub fn with_reset_row(mut self, row: usize) -> Self {
        self.reset_row = Some(row);
        self
    }

    pub fn provider(&self) -> &dyn ParameterProvider<M> {
        self.provider.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.is_subscribed()
    }

    fn slot_exists(&self, model: &M, slot: usize) -> bool {
        self.provider
            .parameter(model, slot)
            .is_some_and(|param| param.exists())
    }
}

impl<M: Observable> Mode<M> for ParameterMode<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_activate(&mut self, model: &mut M) {
        self.subscriptions.subscribe_all(model);
    }

    fn on_deactivate(&mut self, model: &mut M) {
        // A knob still held when the mode goes away must not stay touched on the host.
        for slot in 0..self.touched.len() {
            if std::mem::take(&mut self.touched[slot]) {
                if let Some(param) = self.provider.parameter_mut(model, slot) {
                    param.touch(false);
                }
            }
        }
        self.subscriptions.unsubscribe_all(model);
    }

    fn on_row(&mut self, model: &mut M, row: usize, column: usize, event: ButtonEvent) {
        if self.reset_row != Some(row) || event != ButtonEvent::Down {
            return;
        }
        if let Some(param) = self.provider.parameter_mut(model, column) {
            param.reset();
        }
    }

    fn on_knob(&mut self, model: &mut M, slot: usize, wire: u8, speed: f64) {
        let changer = self.changer;
        if let Some(param) = self.provider.parameter_mut(model, slot) {
            if param.exists() {
                let value = changer.change_value(param.value(), wire, speed);
                param.set_value(value);
            }
        }
    }

    fn on_knob_value(&mut self, model: &mut M, slot: usize, value: u32) {
        let value = value.min(self.changer.max_value());
        if let Some(param) = self.provider.parameter_mut(model, slot) {
            param.set_value(value);
        }
    }

    fn on_knob_touch(&mut self, model: &mut M, slot: usize, touched: bool) {
        let Some(state) = self.touched.get_mut(slot) else {
            tracing::error!("Touch on slot {} out of range", slot);
            return;
        };
        *state = touched;
        if let Some(param) = self.provider.parameter_mut(model, slot) {
            param.touch(touched);
        }
    }

    fn knob_value(&self, model: &M, slot: usize) -> Option<u32> {
        self.provider
            .parameter(model, slot)
            .filter(|param| param.exists())
            .map(|param| param.value())
    }

    fn slot_label(&self, model: &M, slot: usize) -> String {
        self.provider.label(model, slot)
    }

    fn slot_value_text(&self, model: &M, slot: usize) -> String {
        self.provider
            .parameter(model, slot)
            .filter(|param| param.exists())
            .map(|param| param.displayed_value())
            .unwrap_or_default()
    }

    fn button_state(&self, model: &M, row: usize, column: usize) -> LedState {
        if self.reset_row == Some(row) && self.slot_exists(model, column) {
            LedState::On
        } else {
            LedState::Off
        }
    }

    fn select_next_page(&mut self, model: &mut M) {
        if let Some(bank) = self.provider.pageable(model) {
            bank.scroll_page_forward();
        }
    }

    fn select_previous_page(&mut self, model: &mut M) {
        if let Some(bank) = self.provider.pageable(model) {
            bank.scroll_page_backward();
        }
    }

    fn select_next_item(&mut self, model: &mut M) {
        if let Some(bank) = self.provider.pageable(model) {
            bank.select_next_item();
        }
    }

    fn select_previous_item(&mut self, model: &mut M) {
        if let Some(bank) = self.provider.pageable(model) {
            bank.select_previous_item();
        }
    }
}
