//! Per-row coalescing write queue.
//!
//! Each display row owns one pending slot. A write submitted while an earlier one
//! for the same row is still pending replaces it (per cell key), so a slow transport
//! only ever sees the newest text. A single worker thread drains rows in submission
//! order, which keeps at most one write per row in flight and never reorders them.

use crate::error::{Error, Result};
use crate::message::SurfaceMessage;
use crate::sink::MidiSink;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Pending writes of one row, keyed by cell (or 0 for whole lines).
type RowBatch = Vec<(usize, SurfaceMessage)>;

struct State {
    slots: Vec<Option<RowBatch>>,
    /// Rows with a pending batch, oldest first.
    order: VecDeque<usize>,
    in_flight: bool,
    closed: bool,
    superseded: u64,
}

struct Shared {
    state: Mutex<State>,
    work: Condvar,
    idle: Condvar,
    sink: Arc<dyn MidiSink>,
}

impl Shared {
    fn deliver(&self, batch: RowBatch) {
        for (_, message) in batch {
            if let Err(e) = self.sink.send(message) {
                warn!("Display write failed: {}", e);
            }
        }
    }
}

pub struct CoalescingQueue {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl CoalescingQueue {
    /// Start a queue for `rows` rows with a dedicated writer thread.
    pub fn spawn(rows: usize, sink: Arc<dyn MidiSink>) -> Result<Self> {
        let shared = Self::shared(rows, sink);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("display-writer".to_string())
            .spawn(move || Self::writer_thread(worker_shared))?;
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// A queue without a writer thread: submissions are delivered on the caller's thread.
    pub fn inline(rows: usize, sink: Arc<dyn MidiSink>) -> Self {
        Self {
            shared: Self::shared(rows, sink),
            worker: None,
        }
    }

    fn shared(rows: usize, sink: Arc<dyn MidiSink>) -> Arc<Shared> {
        Arc::new(Shared {
            state: Mutex::new(State {
                slots: vec![None; rows],
                order: VecDeque::new(),
                in_flight: false,
                closed: false,
                superseded: 0,
            }),
            work: Condvar::new(),
            idle: Condvar::new(),
            sink,
        })
    }

    fn writer_thread(shared: Arc<Shared>) {
        loop {
            let batch = {
                let mut state = shared.state.lock();
                loop {
                    if state.closed {
                        return;
                    }
                    if let Some(row) = state.order.pop_front() {
                        if let Some(batch) = state.slots[row].take() {
                            state.in_flight = true;
                            break batch;
                        }
                    } else {
                        shared.idle.notify_all();
                        shared.work.wait(&mut state);
                    }
                }
            };
            shared.deliver(batch);
            let mut state = shared.state.lock();
            state.in_flight = false;
            if state.order.is_empty() {
                shared.idle.notify_all();
            }
        }
    }

    /// Queue `message` for cell `key` of `row`. Never blocks on the transport.
    pub fn submit(&self, row: usize, key: usize, message: SurfaceMessage) -> Result<()> {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        if state.closed {
            error!("Display write to row {} after close dropped", row);
            return Err(Error::QueueClosed);
        }
        let Some(slot) = state.slots.get_mut(row) else {
            error!("Display write to unknown row {}", row);
            return Ok(());
        };
        let mut superseded = false;
        match slot {
            Some(batch) => match batch.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => {
                    entry.1 = message;
                    superseded = true;
                }
                None => batch.push((key, message)),
            },
            None => {
                *slot = Some(vec![(key, message)]);
                state.order.push_back(row);
            }
        }
        if superseded {
            state.superseded += 1;
            debug!("Pending write for row {} cell {} superseded", row, key);
        }

        if self.worker.is_none() {
            // Inline delivery: drain immediately on this thread.
            let batch = state.slots[row].take();
            state.order.retain(|r| *r != row);
            drop(guard);
            if let Some(batch) = batch {
                self.shared.deliver(batch);
            }
        } else {
            self.shared.work.notify_one();
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Writes replaced before they reached the transport.
    pub fn superseded(&self) -> u64 {
        self.shared.state.lock().superseded
    }

    /// Block until nothing is pending or in flight. Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.order.is_empty() || state.in_flight {
            if state.closed {
                return true;
            }
            if self
                .shared
                .idle
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.order.is_empty() && !state.in_flight;
            }
        }
        true
    }

    /// Stop accepting writes, drop pending ones and join the writer.
    pub fn close(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let dropped = state.slots.iter_mut().filter_map(Option::take).count();
            state.order.clear();
            if dropped > 0 {
                debug!("Display queue closed with {} pending rows", dropped);
            }
        }
        self.shared.work.notify_all();
        self.shared.idle.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Display writer thread panicked");
            }
        }
    }
}

impl Drop for CoalescingQueue {
    fn drop(&mut self) {
        self.close();
    }
}
