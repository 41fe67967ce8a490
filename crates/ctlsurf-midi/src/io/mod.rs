//! Hardware MIDI transport (feature: `midi-io`).

mod output;

pub use output::{MidiOutputDevice, MidiOutputManager};
