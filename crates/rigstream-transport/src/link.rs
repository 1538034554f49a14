//! Connection task
//!
//! One task per connection attempt. It dials, then reads one frame at a
//! time: header, body, hand the body over, wait for the re-arm signal,
//! repeat. Everything it learns reaches the client through a capacity-1
//! channel tagged with the link generation.

use std::io;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use rigstream_core::{RigError, RigResult};
use rigstream_wire::{FrameHeader, HEADER_SIZE};

use crate::config::StreamConfig;

/// What the connection task reports
#[derive(Debug)]
pub(crate) enum LinkEvent {
    Connected,
    Failed(RigError),
    Frame(Vec<u8>),
    Lost(RigError),
}

#[derive(Debug)]
pub(crate) struct Tagged {
    pub generation: u64,
    pub event: LinkEvent,
}

/// Client side of a running connection task
pub(crate) struct Link {
    pub generation: u64,
    events: mpsc::Receiver<Tagged>,
    rearm: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl Link {
    /// Spawn a connection task on `runtime`
    pub fn spawn(
        runtime: &Handle,
        host: String,
        port: u16,
        config: StreamConfig,
        generation: u64,
    ) -> Link {
        let (tx, events) = mpsc::channel(1);
        let rearm = Arc::new(Notify::new());

        let task_rearm = Arc::clone(&rearm);
        let handle = runtime.spawn(async move {
            run(host, port, config, generation, tx, task_rearm).await;
        });

        Link {
            generation,
            events,
            rearm,
            handle,
        }
    }

    /// Next pending event, if any. Never blocks.
    pub fn poll(&mut self) -> Option<LinkEvent> {
        while let Ok(tagged) = self.events.try_recv() {
            if tagged.generation == self.generation {
                return Some(tagged.event);
            }
        }
        None
    }

    /// Let the task read the next frame
    pub fn rearm(&self) {
        self.rearm.notify_one();
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(
    host: String,
    port: u16,
    config: StreamConfig,
    generation: u64,
    tx: mpsc::Sender<Tagged>,
    rearm: Arc<Notify>,
) {
    let connect = TcpStream::connect((host.as_str(), port));
    let stream = match timeout(config.connect_timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            let err = RigError::ConnectionFailed(format!("{}:{}: {}", host, port, e));
            report(&tx, generation, LinkEvent::Failed(err)).await;
            return;
        }
        Err(_) => {
            let err = RigError::ConnectionFailed(format!(
                "{}:{}: timed out after {:?}",
                host, port, config.connect_timeout
            ));
            report(&tx, generation, LinkEvent::Failed(err)).await;
            return;
        }
    };

    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("Could not disable Nagle on capture stream: {}", e);
    }

    if !report(&tx, generation, LinkEvent::Connected).await {
        return;
    }

    if let Err(e) = read_frames(stream, &config, generation, &tx, &rearm).await {
        report(&tx, generation, LinkEvent::Lost(e)).await;
    }
}

/// Returns false once the client side is gone
async fn report(tx: &mpsc::Sender<Tagged>, generation: u64, event: LinkEvent) -> bool {
    tx.send(Tagged { generation, event }).await.is_ok()
}

/// Read frames until the client goes away or the stream fails
async fn read_frames(
    mut stream: TcpStream,
    config: &StreamConfig,
    generation: u64,
    tx: &mpsc::Sender<Tagged>,
    rearm: &Notify,
) -> RigResult<()> {
    let mut header = [0u8; HEADER_SIZE];
    loop {
        stream.read_exact(&mut header).await.map_err(read_error)?;
        let len = FrameHeader::parse(&header, config.byte_order)?.validate(config.max_body_len)?;

        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await.map_err(read_error)?;

        if !report(tx, generation, LinkEvent::Frame(body)).await {
            return Ok(());
        }
        rearm.notified().await;
    }
}

fn read_error(e: io::Error) -> RigError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => RigError::ConnectionLost,
        _ => RigError::TransportError(e.to_string()),
    }
}
