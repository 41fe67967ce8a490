//! # ctlsurf - Control Surface Synchronization
//!
//! Keeps hardware control surfaces (Mackie Control, HUI and their extenders) in
//! step with a host's mixer and device state.
//!
//! ## Architecture
//!
//! ctlsurf is an umbrella crate that coordinates:
//! - **ctlsurf-core** - Host mirrors, banks, value changer, parameter providers and modes
//! - **ctlsurf-midi** - Displays, segment display, meters, motor faders, LEDs and input decoding
//!
//! The [`Surface`] ties them together: it routes decoded input to the active mode of
//! each unit and, once per host tick, mirrors the modes back onto the hardware.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ctlsurf::prelude::*;
//!
//! let mut surface = Surface::builder()
//!     .sink(Arc::new(port))
//!     .mode(Modes::Volume, |slice, changer| {
//!         Box::new(ParameterMode::new("Volume", volume_provider(slice), changer))
//!     })
//!     .build()?;
//! surface.set_mode(Modes::Volume, &mut project)?;
//!
//! // Host MIDI input callback
//! surface.handle_midi(0, bytes, &mut project, Instant::now());
//!
//! // Host tick
//! surface.flush(&mut project, Instant::now());
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything below
//! - `midi-io` - Hardware MIDI output through midir

/// Re-export of ctlsurf-core for direct access
pub use ctlsurf_core as core;

/// Re-export of ctlsurf-midi for direct access
pub use ctlsurf_midi as midi;

// Error types
pub mod error;
pub use error::{Error, Result};

pub mod builder;
pub mod config;
pub mod rig;
pub mod surface;

pub use builder::{ModeFactory, SurfaceBuilder};
pub use config::SurfaceConfig;
pub use rig::{fader_position, fader_value, Rig, Unit};
pub use surface::{MeterReading, Surface, SurfaceAction, SurfaceHost};

/// Everything needed to set up and drive a surface.
pub mod prelude {
    pub use crate::{
        Error, MeterReading, Result, Surface, SurfaceBuilder, SurfaceConfig, SurfaceHost,
    };

    pub use ctlsurf_core::{
        command_channel, Bank, ButtonEvent, ChannelParameter, ChannelProvider, ChannelState,
        ControlEvent, HostCommand, LedState, Mode, Observable, ObserverRegistry, Parameter,
        ParameterBankProvider, ParameterMode, ParameterProvider, UnitSlice, ValueChanger,
    };

    pub use ctlsurf_midi::{
        DisplayFamily, Granularity, InputMap, LedRingMode, MidiSink, RecordingSink,
        SurfaceMessage, VuProfile,
    };

    #[cfg(feature = "midi-io")]
    pub use ctlsurf_midi::{MidiOutputDevice, MidiOutputManager};

    pub use std::sync::Arc;
}
