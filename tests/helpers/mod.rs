//! Test helpers and fixtures for ctlsurf integration tests
//!
//! Surfaces are built over [`RecordingSink`]s with inline display writers, so
//! every flush lands in the sinks before it returns and tests drive time
//! explicitly through the `now` argument.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use ctlsurf::core::{Interest, SubscriptionId};
use ctlsurf::prelude::*;
use std::time::{Duration, Instant};

/// Strips per unit, matching the Mackie layout.
pub const STRIPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modes {
    Volume,
    Pan,
    /// Records gestures into [`Project::log`].
    Log,
}

/// Minimal host model: a track bank plus the extras a surface reads.
pub struct Project {
    pub tracks: Bank<ChannelState>,
    pub observers: ObserverRegistry,
    /// Meter level per absolute track index.
    pub levels: Vec<u32>,
    pub transport: Option<String>,
    pub master: Option<u32>,
    pub cue: Option<u32>,
    pub master_touched: bool,
    pub functions: Vec<(u8, ButtonEvent)>,
    pub jog: i32,
    pub log: Vec<String>,
    pub commands: Receiver<HostCommand>,
}

impl Project {
    /// `count` tracks named "Trk 1".. and a bank spanning `units` surfaces.
    pub fn new(count: u64, units: usize) -> Self {
        let (outbox, commands) = command_channel();
        let mut tracks = Bank::new(STRIPS * units);
        tracks.set_items(
            (0..count)
                .map(|i| ChannelState::new(i, format!("Trk {}", i + 1)).with_outbox(&outbox))
                .collect(),
        );
        Self {
            tracks,
            observers: ObserverRegistry::new(),
            levels: vec![0; count as usize],
            transport: None,
            master: None,
            cue: None,
            master_touched: false,
            functions: Vec::new(),
            jog: 0,
            log: Vec::new(),
            commands,
        }
    }

    /// Drain the host command outbox.
    pub fn drain(&self) -> Vec<HostCommand> {
        self.commands.try_iter().collect()
    }
}

impl Observable for Project {
    fn subscribe(&mut self, interest: &Interest) -> SubscriptionId {
        self.observers.subscribe(interest)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.unsubscribe(id)
    }
}

impl SurfaceHost for Project {
    fn meter(&self, bank_slot: usize) -> Option<MeterReading> {
        let index = self.tracks.absolute_index(bank_slot)?;
        let track = self.tracks.item(index)?;
        Some(MeterReading {
            level: self.levels[index],
            volume: track.volume.value(),
        })
    }

    fn transport_position(&self) -> Option<String> {
        self.transport.clone()
    }

    fn master_value(&self, alternate: bool) -> Option<u32> {
        if alternate {
            self.cue
        } else {
            self.master
        }
    }

    fn set_master_value(&mut self, alternate: bool, value: u32) {
        if alternate {
            self.cue = Some(value);
        } else {
            self.master = Some(value);
        }
    }

    fn touch_master(&mut self, _alternate: bool, touched: bool) {
        self.master_touched = touched;
    }

    fn on_function(&mut self, note: u8, event: ButtonEvent) {
        self.functions.push((note, event));
    }

    fn on_jog(&mut self, steps: i32) {
        self.jog += steps;
    }
}

pub struct LogMode;

impl Mode<Project> for LogMode {
    fn name(&self) -> &str {
        "log"
    }

    fn on_activate(&mut self, model: &mut Project) {
        model.log.push("+log".to_string());
    }

    fn on_deactivate(&mut self, model: &mut Project) {
        model.log.push("-log".to_string());
    }

    fn on_row(&mut self, model: &mut Project, row: usize, column: usize, event: ButtonEvent) {
        model.log.push(format!("{:?} {} {}", event, row, column));
    }
}

fn channel_mode(
    name: &str,
    target: ChannelParameter,
    slice: UnitSlice,
    changer: ValueChanger,
) -> Box<dyn Mode<Project>> {
    let provider = ChannelProvider::new(
        |p: &Project| &p.tracks,
        |p: &mut Project| &mut p.tracks,
        target,
        slice,
    );
    Box::new(ParameterMode::new(name, Box::new(provider), changer).with_reset_row(4))
}

/// Note of the volume mode button.
pub const VOLUME_BUTTON: u8 = 0x2A;
/// Note of the held pan overlay button.
pub const PAN_BUTTON: u8 = 0x2B;

/// A surface with `extenders` extenders and the volume mode active.
pub fn test_surface(
    extenders: usize,
    project: &mut Project,
) -> (Surface<Modes, Project>, Vec<RecordingSink>) {
    test_surface_with(
        SurfaceConfig {
            extenders,
            threaded_display: false,
            ..SurfaceConfig::default()
        },
        project,
    )
}

pub fn test_surface_with(
    config: SurfaceConfig,
    project: &mut Project,
) -> (Surface<Modes, Project>, Vec<RecordingSink>) {
    let sinks: Vec<RecordingSink> = (0..config.units()).map(|_| RecordingSink::new()).collect();
    let mut builder = Surface::<Modes, Project>::builder().config(config);
    for sink in &sinks {
        builder = builder.sink(Arc::new(sink.clone()));
    }
    let mut surface = builder
        .mode(Modes::Volume, |slice, changer| {
            channel_mode("Volume", ChannelParameter::Volume, slice, changer)
        })
        .mode(Modes::Pan, |slice, changer| {
            channel_mode("Pan", ChannelParameter::Pan, slice, changer)
        })
        .mode(Modes::Log, |_, _| -> Box<dyn Mode<Project>> { Box::new(LogMode) })
        .mode_button(VOLUME_BUTTON, Modes::Volume)
        .temporary_mode_button(PAN_BUTTON, Modes::Pan)
        .build()
        .expect("Failed to build test surface");
    surface
        .set_mode(Modes::Volume, project)
        .expect("Volume mode is registered");
    (surface, sinks)
}

/// Time `ms` milliseconds after `start`.
pub fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

/// Trimmed text of a display cell.
pub fn cell(surface: &Surface<Modes, Project>, unit: usize, row: usize, column: usize) -> String {
    surface
        .rig()
        .unit(unit)
        .and_then(|u| u.display().buffer().cell(row, column))
        .unwrap_or_default()
        .trim_end()
        .to_string()
}

/// Route tracing to the test harness; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
