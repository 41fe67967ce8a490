//! Wire side of the control surface layer.
//!
//! Turns abstract surface state into byte-exact MIDI with as little redundant
//! traffic as possible, and decodes incoming surface messages.
//!
//! # Features
//!
//! - **Text displays**: cell grid, snapshot diffing, per-row coalescing writes
//! - **Segment display**: 8-digit transport position with changed-run sends
//! - **Meters and faders**: VU scaling with peak hold, touch-aware motor faders
//! - **LEDs**: button LEDs and V-Pot rings behind last-sent caches
//! - **Input**: Mackie-layout decoding of notes, V-Pots, jog and fader positions
//! - **Hardware I/O**: midir output thread (feature: `midi-io`)
//!
//! # Example
//!
//! ```
//! use ctlsurf_midi::{MotorFaderSync, SurfaceMessage};
//!
//! let mut faders = MotorFaderSync::new();
//! faders.set_touched(0, true);
//! assert!(faders.set_target(0, 1200).is_none());
//! assert_eq!(faders.set_touched(0, false), Some(SurfaceMessage::fader(0, 1200)));
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

pub mod cache;
pub mod display;
pub mod fader;
pub mod input;
pub mod led;
pub mod message;
pub mod segment;
pub mod sink;
pub mod vu;

#[cfg(feature = "midi-io")]
pub mod io;

pub use cache::SendCache;
pub use display::{
    CoalescingQueue, Display, DisplayBuffer, DisplayFamily, Granularity, TextProtocol,
};
pub use fader::{FaderChannelState, MotorFaderSync, FADER_CHANNELS, FADER_MAX, MASTER_FADER};
pub use input::{InputMap, SurfaceInput};
pub use led::{ButtonLeds, LedRingMode, LedRings};
pub use message::SurfaceMessage;
pub use segment::SegmentDisplay;
pub use sink::{MidiSink, RecordingSink};
pub use vu::{VuMeterSync, VuProfile};

#[cfg(feature = "midi-io")]
pub use io::{MidiOutputDevice, MidiOutputManager};
