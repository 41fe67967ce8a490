//! Text displays: in-memory grid, diff against the last transmitted snapshot,
//! and coalesced asynchronous writes.
//!
//! Modes write into the [`DisplayBuffer`] freely during a tick; nothing reaches
//! the transport until [`Display::flush`], which sends only what changed since the
//! previous flush.

mod grid;
mod protocol;
mod queue;

pub use grid::DisplayBuffer;
pub use protocol::{CellAddress, DisplayFamily, Granularity, TextProtocol};
pub use queue::CoalescingQueue;

use crate::error::Result;
use crate::sink::MidiSink;
use grid::fit;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Text shown on every row after shutdown while the transport is still up.
pub const DEFAULT_SHUTDOWN_MESSAGE: &str = "Please restart the host to use this surface";

/// A text display bound to a transport.
pub struct Display {
    protocol: TextProtocol,
    buffer: DisplayBuffer,
    /// Cell texts as last handed to the queue, `None` when never sent.
    snapshot: Vec<Option<String>>,
    queue: CoalescingQueue,
    sink: Arc<dyn MidiSink>,
    shutdown_message: Option<String>,
}

impl Display {
    /// Display with a dedicated writer thread.
    pub fn new(protocol: TextProtocol, sink: Arc<dyn MidiSink>) -> Result<Self> {
        protocol.validate()?;
        let queue = CoalescingQueue::spawn(protocol.rows, Arc::clone(&sink))?;
        Ok(Self::with_queue(protocol, sink, queue))
    }

    /// Display that writes on the flushing thread.
    pub fn inline(protocol: TextProtocol, sink: Arc<dyn MidiSink>) -> Result<Self> {
        protocol.validate()?;
        let queue = CoalescingQueue::inline(protocol.rows, Arc::clone(&sink));
        Ok(Self::with_queue(protocol, sink, queue))
    }

    fn with_queue(protocol: TextProtocol, sink: Arc<dyn MidiSink>, queue: CoalescingQueue) -> Self {
        let buffer = DisplayBuffer::new(protocol.rows, protocol.columns, protocol.cell_width);
        Self {
            snapshot: vec![None; protocol.rows * protocol.columns],
            protocol,
            buffer,
            queue,
            sink,
            shutdown_message: Some(DEFAULT_SHUTDOWN_MESSAGE.to_string()),
        }
    }

    /// `None` disables the shutdown placeholder.
    pub fn with_shutdown_message(mut self, message: Option<String>) -> Self {
        self.shutdown_message = message;
        self
    }

    pub fn protocol(&self) -> &TextProtocol {
        &self.protocol
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut DisplayBuffer {
        &mut self.buffer
    }

    pub fn set_cell(&mut self, row: usize, column: usize, text: &str) {
        self.buffer.set_cell(row, column, text);
    }

    pub fn set_block(&mut self, row: usize, block: usize, text: &str) {
        self.buffer.set_block(row, block, text);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Forget what was sent, so the next flush rewrites everything.
    pub fn invalidate(&mut self) {
        self.snapshot.iter_mut().for_each(|cell| *cell = None);
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Submit changed cells or lines. Returns the number of writes submitted.
    pub fn flush(&mut self) -> usize {
        if self.queue.is_closed() {
            trace!("Display closed, flush skipped");
            return 0;
        }
        let columns = self.protocol.columns;
        let mut submitted = 0;
        for row in 0..self.protocol.rows {
            let changed: Vec<usize> = (0..columns)
                .filter(|&column| {
                    let current = self.buffer.cell(row, column);
                    self.snapshot[row * columns + column].as_deref() != current
                })
                .collect();
            if changed.is_empty() {
                continue;
            }
            let writes = match self.protocol.granularity {
                Granularity::PerCell => changed
                    .iter()
                    .map(|&column| {
                        let text = self.buffer.cell(row, column).unwrap_or_default();
                        (column, self.protocol.encode_cell(row, column, text))
                    })
                    .collect::<Vec<_>>(),
                Granularity::PerLine => {
                    vec![(0, self.protocol.encode_line(row, &self.buffer.row_text(row)))]
                }
            };
            for (key, message) in writes {
                if self.queue.submit(row, key, message).is_err() {
                    return submitted;
                }
                submitted += 1;
            }
            for column in 0..columns {
                self.snapshot[row * columns + column] =
                    self.buffer.cell(row, column).map(str::to_string);
            }
        }
        submitted
    }

    /// Block until queued writes reached the transport.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Close the queue and leave the shutdown placeholder on the hardware.
    ///
    /// Writes after this are dropped. Calling it twice is a no-op.
    pub fn shutdown(&mut self) {
        if self.queue.is_closed() {
            return;
        }
        self.queue.close();
        let Some(message) = self.shutdown_message.as_deref() else {
            return;
        };
        if !self.sink.is_available() {
            debug!("Transport gone, skipping shutdown placeholder");
            return;
        }
        let width = self.protocol.columns * self.protocol.cell_width;
        let text = fit(message, width);
        for row in 0..self.protocol.rows {
            let line = if row == 0 { text.clone() } else { " ".repeat(width) };
            let result = match self.protocol.granularity {
                Granularity::PerLine => self.sink.send(self.protocol.encode_line(row, &line)),
                Granularity::PerCell => (0..self.protocol.columns).try_for_each(|column| {
                    let start = column * self.protocol.cell_width;
                    let cell = &line[start..start + self.protocol.cell_width];
                    self.sink
                        .send(self.protocol.encode_cell(row, column, cell))
                }),
            };
            if let Err(e) = result {
                warn!("Shutdown placeholder not written: {}", e);
                return;
            }
        }
    }
}
