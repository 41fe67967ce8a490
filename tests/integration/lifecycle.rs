//! Construction, invalidation and shutdown.

use crate::helpers::*;
use ctlsurf::prelude::*;
use std::time::{Duration, Instant};

// ----------------------------------------------------------------------------
// 1. Construction
// ----------------------------------------------------------------------------

#[test]
fn test_build_requires_one_sink_per_unit() {
    let result = Surface::<Modes, Project>::builder()
        .config(SurfaceConfig {
            extenders: 1,
            threaded_display: false,
            ..SurfaceConfig::default()
        })
        .sink(Arc::new(RecordingSink::new()))
        .build();
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_build_rejects_unbound_mode_button() {
    let result = Surface::<Modes, Project>::builder()
        .config(SurfaceConfig {
            threaded_display: false,
            ..SurfaceConfig::default()
        })
        .sink(Arc::new(RecordingSink::new()))
        .mode_button(0x2A, Modes::Pan)
        .build();
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_build_rejects_invalid_config() {
    let result = Surface::<Modes, Project>::builder()
        .config(SurfaceConfig {
            page_size: 12,
            ..SurfaceConfig::default()
        })
        .sink(Arc::new(RecordingSink::new()))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_unknown_mode_is_an_error() {
    let mut project = Project::new(8, 1);
    let sink = RecordingSink::new();
    let mut surface = Surface::<Modes, Project>::builder()
        .config(SurfaceConfig {
            threaded_display: false,
            ..SurfaceConfig::default()
        })
        .sink(Arc::new(sink))
        .build()
        .unwrap();
    assert!(matches!(
        surface.set_mode(Modes::Volume, &mut project),
        Err(Error::Core(_))
    ));
    assert_eq!(surface.active_mode(), None);
}

// ----------------------------------------------------------------------------
// 2. Invalidation
// ----------------------------------------------------------------------------

#[test]
fn test_invalidate_resends_everything() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    project.transport = Some("12:34".to_string());
    let (mut surface, sinks) = test_surface(0, &mut project);

    let first = surface.flush(&mut project, start);
    let sent = sinks[0].take();
    assert_eq!(first, sent.len());
    assert_eq!(surface.flush(&mut project, start), 0);

    surface.invalidate();
    assert_eq!(surface.flush(&mut project, start), first);
    assert_eq!(sinks[0].take(), sent);
}

#[test]
fn test_reconnected_unit_gets_full_resend() {
    let start = Instant::now();
    let mut project = Project::new(16, 2);
    let (mut surface, sinks) = test_surface(1, &mut project);

    surface.flush(&mut project, start);
    let extender = sinks[1].take();
    sinks[0].clear();

    // Power cycling the extender leaves the main unit alone
    sinks[1].reconnect();
    surface.flush(&mut project, start);
    assert_eq!(sinks[1].take(), extender);
    assert!(sinks[0].is_empty());

    assert_eq!(surface.flush(&mut project, start), 0);
}

// ----------------------------------------------------------------------------
// 3. Shutdown
// ----------------------------------------------------------------------------

#[test]
fn test_shutdown_leaves_placeholder() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);
    surface.flush(&mut project, start);
    sinks[0].clear();
    assert!(!project.observers.is_empty());

    surface.shutdown(&mut project);
    assert!(surface.is_closed());
    assert!(project.observers.is_empty());
    assert_eq!(surface.active_mode(), None);

    // Two rows of eight cells
    let messages = sinks[0].take();
    assert_eq!(messages.len(), 16);
    assert!(messages.iter().all(|m| m.is_sysex()));
    assert_eq!(&messages[0].bytes[7..14], b"Please ");

    // Everything after shutdown is ignored
    surface.handle_midi(0, &[0xB0, 0x10, 0x01], &mut project, start);
    assert!(project.drain().is_empty());
    assert_eq!(surface.flush(&mut project, start), 0);
    surface.shutdown(&mut project);
    assert!(sinks[0].is_empty());
}

#[test]
fn test_shutdown_without_placeholder() {
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface_with(
        SurfaceConfig {
            shutdown_placeholder: false,
            threaded_display: false,
            ..SurfaceConfig::default()
        },
        &mut project,
    );
    surface.shutdown(&mut project);
    assert!(sinks[0].is_empty());
}

#[test]
fn test_shutdown_skips_unavailable_transport() {
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface(0, &mut project);
    sinks[0].set_available(false);
    surface.shutdown(&mut project);
    assert!(sinks[0].is_empty());
}

// ----------------------------------------------------------------------------
// 4. Display variants
// ----------------------------------------------------------------------------

#[test]
fn test_threaded_display_converges() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface_with(
        SurfaceConfig {
            threaded_display: true,
            ..SurfaceConfig::default()
        },
        &mut project,
    );

    surface.flush(&mut project, start);
    let display = surface.rig().unit(0).unwrap().display();
    assert!(display.wait_idle(Duration::from_secs(2)));
    let text = sinks[0]
        .messages()
        .iter()
        .filter(|m| m.bytes.starts_with(&[0xF0, 0x00, 0x00, 0x66, 0x14, 0x12]))
        .count();
    assert_eq!(text, 16);

    surface.shutdown(&mut project);
}

#[test]
fn test_per_line_display() {
    let start = Instant::now();
    let mut project = Project::new(8, 1);
    let (mut surface, sinks) = test_surface_with(
        SurfaceConfig {
            display: DisplayFamily::MackieMain,
            granularity: Granularity::PerLine,
            threaded_display: false,
            ..SurfaceConfig::default()
        },
        &mut project,
    );

    surface.flush(&mut project, start);
    let lines: Vec<_> = sinks[0]
        .take()
        .into_iter()
        .filter(|m| m.is_sysex())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(&lines[0].bytes[7..12], b"Trk 1");

    project.tracks.item_mut(0).unwrap().name = "Kick".to_string();
    surface.flush(&mut project, start);
    let lines: Vec<_> = sinks[0]
        .take()
        .into_iter()
        .filter(|m| m.is_sysex())
        .collect();
    assert_eq!(lines.len(), 1);
}
