//! Builder for configuring and constructing a [`Surface`].

use crate::config::SurfaceConfig;
use crate::rig::{Rig, Unit};
use crate::surface::{ModeButton, Surface, SurfaceHost};
use crate::{Error, Result};
use ctlsurf_core::{ConnectedManagers, Mode, ModeManager, UnitSlice, ValueChanger};
use ctlsurf_midi::display::DEFAULT_SHUTDOWN_MESSAGE;
use ctlsurf_midi::{Display, MidiSink};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Builds one mode instance for a unit's slice of the banks.
pub type ModeFactory<M> = Box<dyn Fn(UnitSlice, ValueChanger) -> Box<dyn Mode<M>>>;

/// Every mode is instantiated once per unit, so extenders page through the same
/// banks with their own window offset. Sinks are taken in unit order: the first
/// one is the main unit.
///
/// # Example
///
/// ```ignore
/// use ctlsurf::prelude::*;
///
/// let surface = Surface::builder()
///     .config(SurfaceConfig { extenders: 1, ..Default::default() })
///     .sink(main_port)
///     .sink(extender_port)
///     .mode(Modes::Volume, |slice, changer| {
///         Box::new(ParameterMode::new("Volume", volume_provider(slice), changer))
///     })
///     .mode_button(0x2A, Modes::Volume)
///     .build()?;
/// ```
pub struct SurfaceBuilder<K, M> {
    config: SurfaceConfig,
    sinks: Vec<Arc<dyn MidiSink>>,
    modes: Vec<(K, ModeFactory<M>)>,
    mode_buttons: Vec<ModeButton<K>>,
}

impl<K, M> Default for SurfaceBuilder<K, M> {
    fn default() -> Self {
        Self {
            config: SurfaceConfig::default(),
            sinks: Vec::new(),
            modes: Vec::new(),
            mode_buttons: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Debug, M: SurfaceHost> SurfaceBuilder<K, M> {
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Output of the next unit.
    pub fn sink(mut self, sink: Arc<dyn MidiSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn mode<F>(mut self, id: K, factory: F) -> Self
    where
        F: Fn(UnitSlice, ValueChanger) -> Box<dyn Mode<M>> + 'static,
    {
        self.modes.push((id, Box::new(factory)));
        self
    }

    /// Pressing `note` switches to `id`.
    pub fn mode_button(mut self, note: u8, id: K) -> Self {
        self.mode_buttons.push(ModeButton {
            note,
            mode: id,
            temporary: false,
        });
        self
    }

    /// Holding `note` shows `id` until released.
    pub fn temporary_mode_button(mut self, note: u8, id: K) -> Self {
        self.mode_buttons.push(ModeButton {
            note,
            mode: id,
            temporary: true,
        });
        self
    }

    pub fn build(self) -> Result<Surface<K, M>> {
        let config = self.config;
        config.validate()?;

        let units = config.units();
        if self.sinks.len() != units {
            return Err(Error::InvalidConfig(format!(
                "{} unit(s) configured but {} sink(s) given",
                units,
                self.sinks.len()
            )));
        }
        for button in &self.mode_buttons {
            if !self.modes.iter().any(|(id, _)| *id == button.mode) {
                return Err(Error::InvalidConfig(format!(
                    "Mode button {:#04X} bound to unregistered mode {:?}",
                    button.note, button.mode
                )));
            }
        }

        let changer = config.value_changer()?;
        let shutdown_message = config
            .shutdown_placeholder
            .then(|| DEFAULT_SHUTDOWN_MESSAGE.to_string());

        let mut managers = Vec::with_capacity(units);
        let mut strips = Vec::with_capacity(units);
        for (index, sink) in self.sinks.into_iter().enumerate() {
            let protocol = if index == 0 {
                config.main_protocol()
            } else {
                config.extender_protocol()
            };
            let display = if config.threaded_display {
                Display::new(protocol, Arc::clone(&sink))?
            } else {
                Display::inline(protocol, Arc::clone(&sink))?
            }
            .with_shutdown_message(shutdown_message.clone());

            let slice = UnitSlice::new(index, config.page_size);
            let mut manager = ModeManager::new();
            for (id, factory) in &self.modes {
                manager.register(*id, factory(slice, changer))?;
            }
            debug!("Unit {} built with {} mode(s)", index, self.modes.len());

            managers.push(manager);
            strips.push(Unit::new(
                index,
                config.page_size,
                sink,
                display,
                config.input.clone(),
                config.vu,
            ));
        }

        let mut managers = managers.into_iter();
        let primary = managers.next().ok_or_else(|| {
            Error::InvalidConfig("A surface needs at least one unit".to_string())
        })?;
        let mut modes = ConnectedManagers::new(primary);
        for manager in managers {
            modes.add_unit(manager);
        }

        let timecode = config.timecode();
        Ok(Surface::new(
            config,
            changer,
            Rig::new(modes, strips),
            timecode,
            self.mode_buttons,
        ))
    }
}
