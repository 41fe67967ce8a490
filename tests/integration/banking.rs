//! Bank paging, knob routing and mode switching across units.

use crate::helpers::*;
use ctlsurf::core::ParameterId;
use ctlsurf::fader_position;
use ctlsurf::prelude::*;
use std::time::{Duration, Instant};

const BANK_LEFT: [u8; 3] = [0x90, 0x2E, 0x7F];
const BANK_RIGHT: [u8; 3] = [0x90, 0x2F, 0x7F];

// ----------------------------------------------------------------------------
// 1. Window paging
// ----------------------------------------------------------------------------

#[test]
fn test_bank_buttons_page_the_window() {
    init_tracing();
    let start = Instant::now();
    let mut project = Project::new(20, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    assert_eq!(cell(&surface, 0, 0, 0), "Trk 1");
    assert_eq!(cell(&surface, 0, 0, 7), "Trk 8");
    assert_eq!(cell(&surface, 0, 1, 0), "0");

    project
        .tracks
        .item_mut(8)
        .unwrap()
        .volume
        .update(8192, Some("-6.0 dB".to_string()));
    sinks[0].clear();

    surface.handle_midi(0, &BANK_RIGHT, &mut project, start);
    assert_eq!(project.tracks.scroll_position(), 8);
    surface.flush(&mut project, start);
    assert_eq!(cell(&surface, 0, 0, 0), "Trk 9");
    assert_eq!(cell(&surface, 0, 1, 0), "-6.0 dB");

    let changer = *surface.value_changer();
    assert!(sinks[0]
        .messages()
        .contains(&SurfaceMessage::fader(0, fader_position(&changer, 8192))));

    // Last page is clamped so the window stays full
    surface.handle_midi(0, &BANK_RIGHT, &mut project, start);
    surface.flush(&mut project, start);
    assert_eq!(project.tracks.scroll_position(), 12);
    assert_eq!(cell(&surface, 0, 0, 0), "Trk 13");
    assert_eq!(cell(&surface, 0, 0, 7), "Trk 20");

    surface.handle_midi(0, &BANK_LEFT, &mut project, start);
    assert_eq!(project.tracks.scroll_position(), 4);
}

#[test]
fn test_short_bank_shows_blank_strips() {
    let start = Instant::now();
    let mut project = Project::new(3, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    assert_eq!(cell(&surface, 0, 0, 2), "Trk 3");
    assert_eq!(cell(&surface, 0, 0, 3), "");
    assert_eq!(cell(&surface, 0, 1, 3), "");

    // Empty strips get their ring cleared
    assert!(sinks[0].messages().contains(&SurfaceMessage::led_ring(3, 0, 0)));
}

#[test]
fn test_channel_buttons_move_selection() {
    let start = Instant::now();
    let mut project = Project::new(20, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    for _ in 0..8 {
        surface.handle_midi(0, &[0x90, 0x31, 0x7F], &mut project, start);
    }
    assert_eq!(project.tracks.cursor_index(), Some(7));
    assert_eq!(project.tracks.scroll_position(), 0);

    surface.handle_midi(0, &[0x90, 0x31, 0x7F], &mut project, start);
    assert_eq!(project.tracks.cursor_index(), Some(8));
    assert_eq!(project.tracks.scroll_position(), 8);

    surface.handle_midi(0, &[0x90, 0x30, 0x7F], &mut project, start);
    assert_eq!(project.tracks.cursor_index(), Some(7));
    assert_eq!(project.tracks.scroll_position(), 0);
}

// ----------------------------------------------------------------------------
// 2. Knobs
// ----------------------------------------------------------------------------

#[test]
fn test_knob_turn_reaches_host() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface.handle_midi(0, &[0xB0, 0x10, 0x01], &mut project, start);
    assert_eq!(
        project.drain(),
        vec![HostCommand::SetValue {
            id: ParameterId(0),
            value: 128
        }]
    );

    // Shift scales the step
    surface.handle_midi(0, &[0x90, 0x46, 0x7F], &mut project, start);
    assert!(surface.is_shift_held());
    surface.handle_midi(0, &[0xB0, 0x10, 0x01], &mut project, start);
    surface.handle_midi(0, &[0x90, 0x46, 0x00], &mut project, start);
    assert!(!surface.is_shift_held());
    assert_eq!(
        project.drain(),
        vec![HostCommand::SetValue {
            id: ParameterId(0),
            value: 640
        }]
    );

    // Turning down past zero clamps
    surface.handle_midi(0, &[0xB0, 0x11, 0x7F], &mut project, start);
    assert!(project.drain().is_empty());
}

#[test]
fn test_knob_push_resets_parameter() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface.handle_midi(0, &[0x90, 0x22, 0x7F], &mut project, start);
    assert_eq!(
        project.drain(),
        vec![HostCommand::Reset {
            id: ParameterId(2 << 8)
        }]
    );
}

// ----------------------------------------------------------------------------
// 3. Extenders
// ----------------------------------------------------------------------------

#[test]
fn test_extender_shows_next_slice() {
    let start = Instant::now();
    let mut project = Project::new(20, 2);
    let (mut surface, sinks) = test_surface(1, &mut project);

    surface.flush(&mut project, start);
    assert_eq!(cell(&surface, 0, 0, 0), "Trk 1");
    assert_eq!(cell(&surface, 1, 0, 0), "Trk 9");
    assert_eq!(cell(&surface, 1, 0, 7), "Trk 16");

    // Extender text goes out with its own device id
    assert!(sinks[1]
        .messages()
        .iter()
        .any(|m| m.bytes.starts_with(&[0xF0, 0x00, 0x00, 0x66, 0x15, 0x12])));
    assert!(!sinks[0]
        .messages()
        .iter()
        .any(|m| m.bytes.starts_with(&[0xF0, 0x00, 0x00, 0x66, 0x15])));

    surface.handle_midi(1, &[0xB0, 0x10, 0x01], &mut project, start);
    assert_eq!(
        project.drain(),
        vec![HostCommand::SetValue {
            id: ParameterId(8 << 8),
            value: 128
        }]
    );

    surface.handle_midi(0, &BANK_RIGHT, &mut project, start);
    surface.flush(&mut project, start);
    assert_eq!(cell(&surface, 0, 0, 0), "Trk 5");
    assert_eq!(cell(&surface, 1, 0, 0), "Trk 13");
}

#[test]
fn test_mode_switch_mirrors_to_extender() {
    let mut project = Project::new(16, 2);
    let (mut surface, _sinks) = test_surface(1, &mut project);

    surface.set_mode(Modes::Pan, &mut project).unwrap();
    assert_eq!(surface.active_mode(), Some(Modes::Pan));
    assert!(surface
        .rig()
        .modes()
        .units()
        .all(|unit| unit.is_active(Modes::Pan)));
    assert!(project.observers.is_observed("track/pan"));
    assert!(!project.observers.is_observed("track/volume"));
}

#[test]
fn test_input_from_unknown_unit_is_ignored() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface.handle_midi(3, &[0xB0, 0x10, 0x01], &mut project, start);
    surface.handle_midi(0, &[0x90], &mut project, start);
    assert!(project.drain().is_empty());
}

// ----------------------------------------------------------------------------
// 4. Mode buttons and delayed actions
// ----------------------------------------------------------------------------

#[test]
fn test_mode_buttons() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);

    surface.flush(&mut project, start);
    assert!(sinks[0]
        .messages()
        .contains(&SurfaceMessage::note_on(0, VOLUME_BUTTON, 0x7F)));

    // Held overlay
    surface.handle_midi(0, &[0x90, PAN_BUTTON, 0x7F], &mut project, start);
    assert_eq!(surface.active_mode(), Some(Modes::Pan));
    sinks[0].clear();
    surface.flush(&mut project, start);
    assert!(sinks[0]
        .messages()
        .contains(&SurfaceMessage::note_on(0, VOLUME_BUTTON, 0x00)));

    surface.handle_midi(0, &[0x90, PAN_BUTTON, 0x00], &mut project, start);
    assert_eq!(surface.active_mode(), Some(Modes::Volume));

    // Unbound buttons go to the host
    surface.handle_midi(0, &[0x90, 0x5E, 0x7F], &mut project, start);
    assert_eq!(project.functions, vec![(0x5E, ButtonEvent::Down)]);
}

#[test]
fn test_long_press() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);
    surface.set_mode(Modes::Log, &mut project).unwrap();

    surface.handle_midi(0, &[0x90, 0x02, 0x7F], &mut project, start);
    assert_eq!(surface.pending_actions(), 1);
    surface.flush(&mut project, at(start, 100));
    surface.flush(&mut project, at(start, 450));
    surface.handle_midi(0, &[0x90, 0x02, 0x00], &mut project, at(start, 500));

    // Released before the threshold: no long press
    surface.handle_midi(0, &[0x90, 0x0A, 0x7F], &mut project, at(start, 1000));
    surface.handle_midi(0, &[0x90, 0x0A, 0x00], &mut project, at(start, 1100));
    surface.flush(&mut project, at(start, 1500));

    assert_eq!(
        project.log,
        vec![
            "+log",
            "Down 0 2",
            "LongPress 0 2",
            "Up 0 2",
            "Down 1 2",
            "Up 1 2"
        ]
    );
    assert_eq!(surface.pending_actions(), 0);
}

#[test]
fn test_timed_overlay_restores() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface
        .show_mode_for(Modes::Pan, Duration::from_secs(1), &mut project, start)
        .unwrap();
    assert_eq!(surface.active_mode(), Some(Modes::Pan));

    surface.flush(&mut project, at(start, 500));
    assert_eq!(surface.active_mode(), Some(Modes::Pan));

    surface.flush(&mut project, at(start, 1001));
    assert_eq!(surface.active_mode(), Some(Modes::Volume));
}

#[test]
fn test_mode_change_cancels_timed_restore() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface
        .show_mode_for(Modes::Pan, Duration::from_secs(1), &mut project, start)
        .unwrap();
    surface.set_mode(Modes::Log, &mut project).unwrap();
    surface.flush(&mut project, at(start, 2000));
    assert_eq!(surface.active_mode(), Some(Modes::Log));
}

#[test]
fn test_held_mode_button_outlives_timed_overlay() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, _sinks) = test_surface(0, &mut project);

    surface
        .show_mode_for(Modes::Log, Duration::from_secs(1), &mut project, start)
        .unwrap();
    surface.handle_midi(0, &[0x90, PAN_BUTTON, 0x7F], &mut project, at(start, 200));
    assert_eq!(surface.pending_actions(), 0);

    // Still held after the timed overlay would have ended
    surface.flush(&mut project, at(start, 1500));
    assert_eq!(surface.active_mode(), Some(Modes::Pan));

    surface.handle_midi(0, &[0x90, PAN_BUTTON, 0x00], &mut project, at(start, 1600));
    assert_eq!(surface.active_mode(), Some(Modes::Volume));
}
