//! Hardware output: device enumeration, connection, and sending via a dedicated thread.
//!
//! The thread owns the port. Each wake drains every queued command in order, so a
//! display flush that queued a burst of sysex goes out back to back. Every
//! successful connect bumps the sink generation, which tells the surface the
//! hardware lost its state and needs a full resend.

use crate::error::{Error, Result};
use crate::message::SurfaceMessage;
use crate::sink::MidiSink;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

const CLIENT_NAME: &str = "ctlsurf-output";

/// Commands queued ahead of the output thread.
const COMMAND_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

/// Byte destination the output thread writes surface messages to.
pub trait OutputPort: Send {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

impl OutputPort for MidiOutputConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        MidiOutputConnection::send(self, bytes)?;
        Ok(())
    }
}

/// Opens the port at a device index, returning it with its name.
pub type PortOpener = Box<dyn FnMut(usize) -> Result<(Box<dyn OutputPort>, String)> + Send>;

enum OutputCommand {
    Connect(usize),
    Disconnect,
    Send(SurfaceMessage),
    Shutdown,
}

/// State shared between the handles and the output thread.
struct Link {
    connected_device: arc_swap::ArcSwap<Option<String>>,
    is_connected: AtomicBool,
    generation: AtomicU64,
}

/// Owns the port on its own thread; cloning shares the thread.
#[derive(Clone)]
pub struct MidiOutputManager {
    command_sender: Sender<OutputCommand>,
    link: Arc<Link>,
}

impl MidiOutputManager {
    /// Output over midir.
    pub fn new() -> Result<Self> {
        Self::with_opener(Box::new(open_midir_port))
    }

    /// Output over ports from `opener`, e.g. a virtual loopback.
    pub fn with_opener(opener: PortOpener) -> Result<Self> {
        let (command_sender, command_receiver) = bounded(COMMAND_CAPACITY);
        let link = Arc::new(Link {
            connected_device: arc_swap::ArcSwap::new(Arc::new(None)),
            is_connected: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        });

        let worker = OutputWorker {
            opener,
            port: None,
            link: Arc::clone(&link),
        };
        thread::Builder::new()
            .name("surface-output-thread".to_string())
            .spawn(move || worker.run(command_receiver))?;

        Ok(Self {
            command_sender,
            link,
        })
    }

    pub fn list_devices() -> Vec<MidiOutputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_output) = MidiOutput::new("ctlsurf-device-list") {
            for (index, port) in midi_output.ports().iter().enumerate() {
                let name = midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiOutputDevice { index, name });
            }
        }
        devices
    }

    pub fn connect(&self, device_index: usize) -> Result<()> {
        self.command_sender
            .send(OutputCommand::Connect(device_index))
            .map_err(|_| Error::MidiDevice("Surface output thread not running".to_string()))
    }

    pub fn connect_by_name(&self, name: &str) -> Result<()> {
        let devices = Self::list_devices();
        let device = devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| {
                Error::MidiDevice(format!("No MIDI output device found matching '{}'", name))
            })?;
        self.connect(device.index)
    }

    pub fn disconnect(&self) {
        let _ = self.command_sender.send(OutputCommand::Disconnect);
    }

    /// Stop the output thread for every clone. The thread also exits once the
    /// last handle is dropped.
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(OutputCommand::Shutdown);
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected.load(Ordering::SeqCst)
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.link.connected_device.load().as_ref().clone()
    }
}

impl MidiSink for MidiOutputManager {
    /// Non-blocking; a full command channel drops the message.
    fn send(&self, message: SurfaceMessage) -> Result<()> {
        self.command_sender
            .try_send(OutputCommand::Send(message))
            .map_err(|e| Error::MidiPort(format!("output command channel: {}", e)))
    }

    fn is_available(&self) -> bool {
        self.is_connected()
    }

    fn generation(&self) -> u64 {
        self.link.generation.load(Ordering::SeqCst)
    }
}

struct OutputWorker {
    opener: PortOpener,
    port: Option<Box<dyn OutputPort>>,
    link: Arc<Link>,
}

impl OutputWorker {
    fn run(mut self, commands: Receiver<OutputCommand>) {
        loop {
            let first = match commands.recv_timeout(Duration::from_millis(100)) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            let mut dropped = 0;
            let mut stop = false;
            for command in std::iter::once(first).chain(commands.try_iter()) {
                match command {
                    OutputCommand::Send(message) => {
                        if !self.write(&message) {
                            dropped += 1;
                        }
                    }
                    OutputCommand::Connect(device_index) => self.connect(device_index),
                    OutputCommand::Disconnect => self.disconnect(),
                    OutputCommand::Shutdown => {
                        stop = true;
                        break;
                    }
                }
            }
            if dropped > 0 {
                debug!("Dropped {} surface message(s): no device connected", dropped);
            }
            if stop {
                break;
            }
        }
        self.disconnect();
    }

    /// False when there is no port to write to.
    fn write(&mut self, message: &SurfaceMessage) -> bool {
        let Some(port) = self.port.as_mut() else {
            return false;
        };
        trace!("-> {:02X?}", message.bytes);
        if let Err(e) = port.send(&message.bytes) {
            debug!("Surface output send failed: {}", e);
        }
        true
    }

    fn connect(&mut self, device_index: usize) {
        self.port = None;
        match (self.opener)(device_index) {
            Ok((port, name)) => {
                debug!("Surface output connected to {}", name);
                self.port = Some(port);
                self.link.connected_device.store(Arc::new(Some(name)));
                self.link.is_connected.store(true, Ordering::SeqCst);
                self.link.generation.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                warn!("Surface output connect failed: {}", e);
                self.link.is_connected.store(false, Ordering::SeqCst);
                self.link.connected_device.store(Arc::new(None));
            }
        }
    }

    fn disconnect(&mut self) {
        if self.port.take().is_some() {
            debug!("Surface output disconnected");
        }
        self.link.is_connected.store(false, Ordering::SeqCst);
        self.link.connected_device.store(Arc::new(None));
    }
}

fn open_midir_port(device_index: usize) -> Result<(Box<dyn OutputPort>, String)> {
    let midi_output = MidiOutput::new(CLIENT_NAME)?;

    let ports = midi_output.ports();
    let port = ports.get(device_index).ok_or_else(|| {
        Error::MidiDevice(format!("MIDI output device {} not found", device_index))
    })?;

    let port_name = midi_output
        .port_name(port)
        .unwrap_or_else(|_| format!("Device {}", device_index));

    let connection = midi_output.connect(port, CLIENT_NAME)?;

    Ok((Box::new(connection), port_name))
}
