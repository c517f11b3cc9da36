//! TCP client for the message broker.
//!
//! The broker speaks newline-free framed JSON/BSON over a plain TCP socket
//! (default port 9090). Connection establishment and all socket writes run
//! on a background thread; `send` only pushes onto a bounded queue and
//! never blocks the frame-delivery path. The caller observes a successful
//! connection through a `Connected` event delivered exactly once.
//!
//! There is no automatic reconnection. A write failure tears the
//! connection down and the caller decides whether to call `connect` again.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use log::{info, warn};
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Backstop for a peer that stops draining entirely; writes normally
/// complete immediately because the writer thread is the only blocker.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Outgoing queue depth. At 10 Hz with six topics this is several seconds
/// of backlog; beyond that messages are stale and dropping is correct.
const SEND_QUEUE_CAPACITY: usize = 64;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events delivered to the caller through the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// Emitted exactly once per successful connection. The caller uses
    /// this to run the advertise handshake.
    Connected,
    /// Emitted when a write failure tears the connection down.
    Disconnected,
}

/// Broker client with background connection and writes.
pub struct BridgeClient {
    addr: SocketAddr,
    state: Arc<Mutex<ConnectionState>>,
    /// Sender side of the writer queue; present only while connected
    out_tx: Arc<Mutex<Option<Sender<Vec<u8>>>>>,
    /// Clone of the live stream kept for shutdown
    stream_handle: Arc<Mutex<Option<TcpStream>>>,
    event_tx: Sender<ClientEvent>,
    event_rx: Receiver<ClientEvent>,
}

impl BridgeClient {
    /// Create a client for `host:port`.
    ///
    /// The address is resolved eagerly; an unresolvable host is the one
    /// configuration error treated as fatal at startup.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::InvalidAddress(format!("{}:{} ({})", host, port, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("{}:{}", host, port)))?;

        let (event_tx, event_rx) = unbounded();

        Ok(Self {
            addr,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            out_tx: Arc::new(Mutex::new(None)),
            stream_handle: Arc::new(Mutex::new(None)),
            event_tx,
            event_rx,
        })
    }

    /// Start a connection attempt on a background thread. On success the
    /// same thread becomes the writer loop draining the send queue.
    ///
    /// No-op while a connection attempt is in flight or a connection is
    /// already up.
    pub fn connect(&self) -> Result<()> {
        {
            let mut state = lock(&self.state)?;
            if *state != ConnectionState::Disconnected {
                return Ok(());
            }
            *state = ConnectionState::Connecting;
        }

        let addr = self.addr;
        let state = Arc::clone(&self.state);
        let out_slot = Arc::clone(&self.out_tx);
        let handle_slot = Arc::clone(&self.stream_handle);
        let event_tx = self.event_tx.clone();

        thread::Builder::new()
            .name("bridge-writer".to_string())
            .spawn(move || {
                let mut stream = match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("Connection to broker at {} failed: {}", addr, e);
                        if let Ok(mut s) = state.lock() {
                            *s = ConnectionState::Disconnected;
                        }
                        return;
                    }
                };
                if let Err(e) = stream.set_write_timeout(Some(WRITE_TIMEOUT)) {
                    warn!("Failed to set write timeout: {}", e);
                }

                let (out_tx, out_rx) = bounded::<Vec<u8>>(SEND_QUEUE_CAPACITY);
                if let Ok(mut slot) = out_slot.lock() {
                    *slot = Some(out_tx);
                }
                if let Ok(mut slot) = handle_slot.lock() {
                    *slot = stream.try_clone().ok();
                }
                if let Ok(mut s) = state.lock() {
                    *s = ConnectionState::Connected;
                }
                info!("Connected to broker at {}", addr);
                let _ = event_tx.send(ClientEvent::Connected);

                // Drain the queue until a write fails or the client side
                // drops the sender (disconnect)
                let mut failed = false;
                while let Ok(bytes) = out_rx.recv() {
                    if let Err(e) = stream.write_all(&bytes) {
                        warn!("Write to broker failed: {}", e);
                        failed = true;
                        break;
                    }
                }

                if let Ok(mut slot) = out_slot.lock() {
                    *slot = None;
                }
                if let Ok(mut slot) = handle_slot.lock() {
                    *slot = None;
                }
                if let Ok(mut s) = state.lock() {
                    *s = ConnectionState::Disconnected;
                }
                if failed {
                    let _ = event_tx.send(ClientEvent::Disconnected);
                }
            })?;

        Ok(())
    }

    /// Queue one framed message for the writer thread. Never blocks.
    ///
    /// While not connected the message is dropped with a warning; dropped
    /// messages are acceptable because every stream is refreshed on the
    /// next accepted frame. A full queue drops for the same reason.
    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        let slot = lock(&self.out_tx)?;
        let Some(tx) = slot.as_ref() else {
            warn!("Not connected, dropping {} byte message", bytes.len());
            return Ok(());
        };
        match tx.try_send(bytes.to_vec()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Send queue full, dropping {} byte message", bytes.len());
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Writer gone, dropping {} byte message", bytes.len());
            }
        }
        Ok(())
    }

    /// Tear the connection down without an event.
    pub fn disconnect(&self) -> Result<()> {
        // Dropping the sender ends the writer loop cleanly
        *lock(&self.out_tx)? = None;
        if let Some(stream) = lock(&self.stream_handle)?.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        *lock(&self.state)? = ConnectionState::Disconnected;
        Ok(())
    }

    pub fn state(&self) -> Result<ConnectionState> {
        Ok(*lock(&self.state)?)
    }

    /// Event channel for connection lifecycle notifications.
    pub fn events(&self) -> &Receiver<ClientEvent> {
        &self.event_rx
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Other("client lock poisoned".to_string()))
}
