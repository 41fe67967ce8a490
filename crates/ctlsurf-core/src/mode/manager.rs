//! Mode state machine for a single surface.

use super::{ControlEvent, Mode};
use crate::error::{Error, Result};
use std::fmt::Debug;
use tracing::{debug, trace};

/// Keeps exactly one registered mode active.
///
/// `set_active` deactivates the current mode before activating the next one.
/// A temporary mode overlays the persistent one until [`restore`](Self::restore).
pub struct ModeManager<K, M> {
    modes: Vec<(K, Box<dyn Mode<M>>)>,
    active: Option<K>,
    /// Mode to go back to while a temporary mode is shown.
    previous: Option<K>,
    temporary: bool,
}

impl<K: Copy + Eq + Debug, M> ModeManager<K, M> {
    pub fn new() -> Self {
        Self {
            modes: Vec::new(),
            active: None,
            previous: None,
            temporary: false,
        }
    }

    /// Register a mode. Replacing the active mode is refused.
    pub fn register(&mut self, id: K, mode: Box<dyn Mode<M>>) -> Result<()> {
        if let Some(slot) = self.modes.iter_mut().find(|(key, _)| *key == id) {
            if self.active == Some(id) {
                return Err(Error::InvalidConfig(format!(
                    "cannot replace active mode {:?}",
                    id
                )));
            }
            slot.1 = mode;
        } else {
            self.modes.push((id, mode));
        }
        Ok(())
    }

    pub fn contains(&self, id: K) -> bool {
        self.modes.iter().any(|(key, _)| *key == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.modes.iter().map(|(key, _)| *key)
    }

    pub fn active_id(&self) -> Option<K> {
        self.active
    }

    pub fn previous_id(&self) -> Option<K> {
        self.previous
    }

    pub fn is_active(&self, id: K) -> bool {
        self.active == Some(id)
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn get(&self, id: K) -> Option<&dyn Mode<M>> {
        self.modes
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, mode)| mode.as_ref())
    }

    pub fn active(&self) -> Option<&dyn Mode<M>> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut (dyn Mode<M> + 'static)> {
        let id = self.active?;
        self.mode_mut(id)
    }

    /// Persistent switch. Ends any temporary overlay.
    pub fn set_active(&mut self, id: K, model: &mut M) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::UnknownMode(format!("{:?}", id)));
        }
        self.temporary = false;
        self.previous = None;
        if self.active == Some(id) {
            return Ok(());
        }
        self.switch_to(id, model);
        Ok(())
    }

    /// Overlay `id`, remembering the persistent mode for [`restore`](Self::restore).
    pub fn set_temporary(&mut self, id: K, model: &mut M) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::UnknownMode(format!("{:?}", id)));
        }
        if !self.temporary {
            self.previous = self.active;
            self.temporary = true;
        }
        if self.active != Some(id) {
            self.switch_to(id, model);
        }
        Ok(())
    }

    /// Leave a temporary overlay. No-op when none is shown.
    pub fn restore(&mut self, model: &mut M) {
        if !self.temporary {
            return;
        }
        self.temporary = false;
        match self.previous.take() {
            Some(previous) if self.active != Some(previous) => self.switch_to(previous, model),
            Some(_) => {}
            None => self.deactivate(model),
        }
    }

    /// Deactivate the active mode, leaving none active.
    pub fn deactivate(&mut self, model: &mut M) {
        if let Some(mode) = self.active_mut() {
            mode.on_deactivate(model);
        }
        self.active = None;
    }

    /// Forward an input event to the active mode.
    pub fn dispatch(&mut self, event: ControlEvent, model: &mut M) {
        match self.active_mut() {
            Some(mode) => mode.dispatch(model, event),
            None => trace!("No active mode, dropping {:?}", event),
        }
    }

    fn mode_mut(&mut self, id: K) -> Option<&mut (dyn Mode<M> + 'static)> {
        self.modes
            .iter_mut()
            .find(|(key, _)| *key == id)
            .map(|(_, mode)| mode.as_mut())
    }

    fn switch_to(&mut self, id: K, model: &mut M) {
        if let Some(mode) = self.active_mut() {
            mode.on_deactivate(model);
        }
        debug!("Mode {:?} -> {:?}", self.active, id);
        self.active = Some(id);
        if let Some(mode) = self.mode_mut(id) {
            mode.on_activate(model);
        }
    }
}

impl<K: Copy + Eq + Debug, M> Default for ModeManager<K, M> {
    fn default() -> Self {
        Self::new()
    }
}
