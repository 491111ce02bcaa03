use std::io::{self, BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;

use super::framing::{SyncError, read_packet, write_packet};
use super::protocol::{Packet, WireState};
use super::stats::{SyncStats, SyncStatsSnapshot};
use crate::state::{InstructionQueue, IntegrityError, MergeableState};

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Single-slot, latest-wins cell holding the authoritative state.
///
/// Readers get an immutable `Arc` snapshot. Writers replace the slot as a
/// whole, so a value handed out is never mutated afterwards.
pub struct SyncHandle<S> {
    slot: Arc<watch::Sender<Arc<S>>>,
}

impl<S> Clone for SyncHandle<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: MergeableState> SyncHandle<S> {
    pub fn new(initial: S) -> Self {
        let (slot, _) = watch::channel(Arc::new(initial));
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn current(&self) -> Arc<S> {
        Arc::clone(&self.slot.borrow())
    }

    /// Receiver that is notified every time the slot is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.slot.subscribe()
    }

    /// Checks `incoming`, merges it onto the current value and stores the
    /// result, all under the slot's write lock. On error the slot is left as
    /// it was.
    pub fn merge_incoming(&self, incoming: S) -> Result<(), IntegrityError> {
        if !incoming.check_integrity() {
            return Err(IntegrityError::Corrupt { id: incoming.id() });
        }

        let mut outcome = Ok(());
        self.slot.send_if_modified(|current| match incoming.merge(current) {
            Ok(merged) => {
                *current = Arc::new(merged);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    /// Atomically replaces the current value with `next(current)` and
    /// returns the value that was replaced.
    pub fn exchange(&self, next: impl FnOnce(&S) -> S) -> Arc<S> {
        let mut previous = None;
        self.slot.send_modify(|current| {
            let replacement = Arc::new(next(current));
            previous = Some(std::mem::replace(current, replacement));
        });
        // send_modify always runs the closure before returning
        previous.unwrap_or_else(|| self.current())
    }
}

impl SyncHandle<InstructionQueue> {
    /// Takes every pending instruction, leaving an empty queue with the same
    /// id as the baseline for later merges.
    pub fn take_pending(&self) -> InstructionQueue {
        let taken = self.exchange(|current| InstructionQueue::new(current.id()));
        Arc::unwrap_or_clone(taken)
    }
}

/// Serves one client at a time on a dedicated thread and merges every state
/// it receives into the authoritative slot.
///
/// Accepts and reads block without a timeout: a client that connects and
/// stays silent holds the only slot until it disconnects.
pub struct SyncServer<S> {
    local_addr: SocketAddr,
    handle: SyncHandle<S>,
    stats: Arc<SyncStats>,
    thread: JoinHandle<()>,
}

impl<S> SyncServer<S>
where
    S: WireState + Send + Sync + 'static,
{
    pub fn start<A: ToSocketAddrs>(addr: A, initial: S) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        log::info!("Server online on {}", local_addr);

        let handle = SyncHandle::new(initial);
        let stats = Arc::new(SyncStats::default());

        let worker = NetworkWorker {
            listener,
            handle: handle.clone(),
            stats: Arc::clone(&stats),
        };
        let thread = thread::Builder::new()
            .name("camsync-net".into())
            .spawn(move || worker.run())?;

        Ok(Self {
            local_addr,
            handle,
            stats,
            thread,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> SyncHandle<S> {
        self.handle.clone()
    }

    pub fn current_state(&self) -> Arc<S> {
        self.handle.current()
    }

    pub fn stats(&self) -> SyncStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}

struct NetworkWorker<S> {
    listener: TcpListener,
    handle: SyncHandle<S>,
    stats: Arc<SyncStats>,
}

impl<S: WireState> NetworkWorker<S> {
    fn run(self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => self.serve(stream, addr),
                Err(e) => {
                    log::error!("Accept failed: {}", e);
                    self.stats.record_fault();
                    thread::sleep(ACCEPT_RETRY_DELAY);
                }
            }
        }
    }

    fn serve(&self, stream: TcpStream, addr: SocketAddr) {
        log::info!("Incoming connection from {}", addr);
        self.stats.record_connection();

        match self.session(stream) {
            Ok(()) => {}
            Err(SyncError::Disconnected) => {
                log::info!("Client {} disconnected", addr);
                self.stats.record_disconnect();
            }
            Err(e) => {
                log::error!("Connection with {} failed: {:?}", addr, e);
                self.stats.record_fault();
            }
        }
    }

    fn session(&self, stream: TcpStream) -> Result<(), SyncError> {
        stream.set_nodelay(true)?;
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        write_packet(&mut writer, &Packet::ready())?;
        let snapshot = self.handle.current();
        write_packet(&mut writer, &snapshot.to_packet())?;
        log::debug!("Snapshot of state {} sent", snapshot.id());

        loop {
            let packet = read_packet(&mut reader)?;
            let merged = S::from_packet(packet).and_then(|incoming| {
                let id = incoming.id();
                self.handle.merge_incoming(incoming).map(|()| id)
            });

            match merged {
                Ok(id) => {
                    log::debug!("Merged update for state {}", id);
                    self.stats.record_merge();
                }
                Err(e) => {
                    log::warn!("Skipping update: {}", e);
                    self.stats.record_rejection();
                }
            }
        }
    }
}
