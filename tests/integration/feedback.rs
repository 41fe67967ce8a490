//! What the surface sends back to the hardware, and when it stays quiet.

use crate::helpers::*;
use ctlsurf::core::ParameterId;
use ctlsurf::midi::{FADER_MAX, MASTER_FADER};
use ctlsurf::prelude::*;
use ctlsurf::{fader_position, fader_value};
use std::time::Instant;

fn faders(messages: &[SurfaceMessage], channel: u8) -> Vec<SurfaceMessage> {
    messages
        .iter()
        .filter(|m| m.status() == Some(0xE0 | channel))
        .cloned()
        .collect()
}

// ----------------------------------------------------------------------------
// 1. Idempotence
// ----------------------------------------------------------------------------

#[test]
fn test_unchanged_state_sends_nothing() {
    let start = Instant::now();
    let mut project = Project::new(20, 2);
    project.transport = Some("00:00:01.00".to_string());
    project.master = Some(8000);
    let (mut surface, sinks) = test_surface(1, &mut project);

    assert!(surface.flush(&mut project, start) > 0);
    for sink in &sinks {
        sink.clear();
    }

    assert_eq!(surface.flush(&mut project, at(start, 10)), 0);
    assert!(sinks.iter().all(|sink| sink.is_empty()));
}

#[test]
fn test_only_changed_cells_are_rewritten() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);
    surface.flush(&mut project, start);
    sinks[0].clear();

    project.tracks.item_mut(3).unwrap().name = "Bass".to_string();
    surface.flush(&mut project, start);

    let messages = sinks[0].take();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].is_sysex());
    assert_eq!(cell(&surface, 0, 0, 3), "Bass");
}

// ----------------------------------------------------------------------------
// 2. Motor faders
// ----------------------------------------------------------------------------

#[test]
fn test_touched_fader_is_not_driven() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);
    let changer = *surface.value_changer();
    surface.flush(&mut project, start);
    sinks[0].clear();

    // Touch, then move the fader by hand
    surface.handle_midi(0, &[0x90, 0x68, 0x7F], &mut project, start);
    surface.handle_midi(0, &[0xE0, 0x10, 0x40], &mut project, start);
    let moved = fader_value(&changer, 0x40 * 127 + 0x10);
    assert_eq!(
        project.drain(),
        vec![
            HostCommand::Touch {
                id: ParameterId(0),
                touched: true
            },
            HostCommand::SetValue {
                id: ParameterId(0),
                value: moved
            },
        ]
    );

    // Host automation while the hand is on the fader
    project
        .tracks
        .item_mut(0)
        .unwrap()
        .volume
        .update(12000, None);
    surface.flush(&mut project, start);
    assert!(faders(&sinks[0].take(), 0).is_empty());
    assert!(surface.rig().unit(0).unwrap().faders().is_touched(0));

    // Release snaps to the latest host value at once
    surface.handle_midi(0, &[0x90, 0x68, 0x00], &mut project, start);
    assert_eq!(
        faders(&sinks[0].take(), 0),
        vec![SurfaceMessage::fader(0, fader_position(&changer, 12000))]
    );
    assert_eq!(
        project.drain(),
        vec![HostCommand::Touch {
            id: ParameterId(0),
            touched: false
        }]
    );

    surface.flush(&mut project, start);
    assert!(faders(&sinks[0].take(), 0).is_empty());
}

#[test]
fn test_master_fader() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    project.master = Some(16383);
    project.cue = Some(0);
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    let master = MASTER_FADER as u8;
    assert_eq!(
        faders(&sinks[0].take(), master),
        vec![SurfaceMessage::fader(master, FADER_MAX)]
    );

    // Shift flips the motor to the alternate assignment
    surface.handle_midi(0, &[0x90, 0x46, 0x7F], &mut project, start);
    surface.flush(&mut project, start);
    assert_eq!(
        faders(&sinks[0].take(), master),
        vec![SurfaceMessage::fader(master, 0)]
    );
    surface.handle_midi(0, &[0x90, 0x46, 0x00], &mut project, start);

    surface.handle_midi(0, &[0x90, 0x70, 0x7F], &mut project, start);
    assert!(project.master_touched);
    surface.handle_midi(0, &[0xE8, 0x00, 0x00], &mut project, start);
    assert_eq!(project.master, Some(0));
    surface.handle_midi(0, &[0x90, 0x70, 0x00], &mut project, start);
    assert!(!project.master_touched);
}

// ----------------------------------------------------------------------------
// 3. Meters, timecode, jog
// ----------------------------------------------------------------------------

#[test]
fn test_meters_follow_bank_window() {
    let start = Instant::now();
    let mut project = Project::new(20, 1);
    project.levels[0] = 16383;
    project.levels[9] = 8192;
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    let messages = sinks[0].take();
    assert!(messages.contains(&SurfaceMessage::vu_meter(0, 0, 13)));
    assert!(messages.contains(&SurfaceMessage::vu_meter(0, 1, 0)));

    surface.handle_midi(0, &[0x90, 0x2F, 0x7F], &mut project, start);
    surface.flush(&mut project, start);
    let messages = sinks[0].take();
    assert!(messages.contains(&SurfaceMessage::vu_meter(0, 0, 0)));
    assert!(messages.contains(&SurfaceMessage::vu_meter(0, 1, 7)));
}

const HUI_TIMECODE: [u8; 7] = [0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x11];

fn timecode(messages: &[SurfaceMessage]) -> Vec<SurfaceMessage> {
    messages
        .iter()
        .filter(|m| m.bytes.starts_with(&HUI_TIMECODE))
        .cloned()
        .collect()
}

#[test]
fn test_meter_drops_when_strip_loses_its_track() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    project.levels[7] = 16383;
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    assert!(sinks[0]
        .take()
        .contains(&SurfaceMessage::vu_meter(0, 7, 13)));

    project.tracks.truncate(5);
    surface.flush(&mut project, start);
    let messages = sinks[0].take();
    assert!(messages.contains(&SurfaceMessage::vu_meter(0, 7, 0)));
    // Strips 5 and 6 were already at zero
    assert!(!messages.contains(&SurfaceMessage::vu_meter(0, 5, 0)));

    surface.flush(&mut project, start);
    assert!(sinks[0].is_empty());
}

#[test]
fn test_timecode_sends_changed_digits() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    project.transport = Some("01:02:03.04".to_string());
    let (mut surface, sinks) = test_surface_with(
        SurfaceConfig {
            display: DisplayFamily::HuiMain,
            threaded_display: false,
            ..SurfaceConfig::default()
        },
        &mut project,
    );

    surface.flush(&mut project, start);
    let first = timecode(&sinks[0].take());
    assert_eq!(first.len(), 1);
    // Header, eight digits, end of exclusive
    assert_eq!(first[0].bytes.len(), 7 + 8 + 1);

    project.transport = Some("01:02:03.05".to_string());
    surface.flush(&mut project, start);
    let second = timecode(&sinks[0].take());
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].bytes.len(), 7 + 1 + 1);
    assert_eq!(second[0].bytes[7], 5);
}

#[test]
fn test_mackie_unit_gets_no_timecode_sysex() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    project.transport = Some("01:02:03.04".to_string());
    let (mut surface, sinks) = test_surface(0, &mut project);
    assert!(surface.timecode().is_none());

    surface.flush(&mut project, start);
    let messages = sinks[0].take();
    assert!(!messages.is_empty());
    // Every sysex the Mackie unit receives is addressed to its own device id
    assert!(messages
        .iter()
        .filter(|m| m.is_sysex())
        .all(|m| m.bytes.starts_with(&[0xF0, 0x00, 0x00, 0x66, 0x14])));
    assert!(timecode(&messages).is_empty());
}

#[test]
fn test_jog_reaches_host() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface.handle_midi(0, &[0xB0, 0x3C, 0x03], &mut project, start);
    surface.handle_midi(0, &[0xB0, 0x3C, 0x41], &mut project, start);
    assert_eq!(project.jog, 2);
}
