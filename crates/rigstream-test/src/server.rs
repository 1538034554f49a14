//! Mock capture server
//!
//! Accepts any number of clients on a loopback port and writes framed
//! tracker records to all of them on request. Commands are queued from
//! synchronous code and carried out by the server task.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rigstream_core::{RigResult, TrackerWeights};
use rigstream_wire::{encode_frame, encode_tracker_frame, ByteOrder};

enum Command {
    /// Bytes written as they are
    Write(Bytes),
    /// Close every open client socket
    DropClients,
}

/// Loopback capture server for tests and demos
pub struct MockCaptureServer {
    local_addr: SocketAddr,
    byte_order: ByteOrder,
    commands: mpsc::UnboundedSender<Command>,
    accepted: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockCaptureServer {
    /// Bind to an ephemeral loopback port with little-endian headers
    pub async fn bind() -> std::io::Result<Self> {
        Self::bind_with(ByteOrder::LittleEndian).await
    }

    pub async fn bind_with(byte_order: ByteOrder) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        let (commands, rx) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn(serve(listener, rx, Arc::clone(&accepted)));

        Ok(Self {
            local_addr,
            byte_order,
            commands,
            accepted,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Total connections accepted so far
    pub fn connections(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Frame and send one tracker record to every client
    pub fn send_weights(&self, weights: &TrackerWeights) -> RigResult<()> {
        self.send_body(encode_tracker_frame(weights).as_bytes())
    }

    /// Frame and send an arbitrary body
    pub fn send_body(&self, body: &[u8]) -> RigResult<()> {
        let frame = encode_frame(body, self.byte_order)?;
        self.send_raw(frame);
        Ok(())
    }

    /// Send bytes without framing
    pub fn send_raw(&self, bytes: impl Into<Bytes>) {
        let _ = self.commands.send(Command::Write(bytes.into()));
    }

    /// Close every client connection; the listener stays open
    pub fn drop_clients(&self) {
        let _ = self.commands.send(Command::DropClients);
    }

    /// Send `frames` in a loop, one every `interval`, until the server is
    /// dropped
    pub fn replay(&self, frames: Vec<TrackerWeights>, interval: Duration) -> RigResult<JoinHandle<()>> {
        let encoded = frames
            .iter()
            .map(|w| encode_frame(encode_tracker_frame(w).as_bytes(), self.byte_order))
            .collect::<RigResult<Vec<Bytes>>>()?;
        let commands = self.commands.clone();

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for frame in encoded.iter().cycle() {
                ticker.tick().await;
                if commands.send(Command::Write(frame.clone())).is_err() {
                    break;
                }
            }
        }))
    }
}

impl Drop for MockCaptureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    listener: TcpListener,
    mut commands: mpsc::UnboundedReceiver<Command>,
    accepted: Arc<AtomicUsize>,
) {
    let mut clients: Vec<TcpStream> = Vec::new();
    loop {
        tokio::select! {
            conn = listener.accept() => match conn {
                Ok((socket, peer)) => {
                    tracing::debug!("Mock server accepted {}", peer);
                    accepted.fetch_add(1, Ordering::SeqCst);
                    clients.push(socket);
                }
                Err(e) => tracing::warn!("Mock server accept failed: {}", e),
            },
            command = commands.recv() => match command {
                Some(Command::Write(bytes)) => {
                    let mut open = Vec::with_capacity(clients.len());
                    for mut socket in clients.drain(..) {
                        if socket.write_all(&bytes).await.is_ok() {
                            open.push(socket);
                        }
                    }
                    clients = open;
                }
                Some(Command::DropClients) => clients.clear(),
                None => break,
            },
        }
    }
}
