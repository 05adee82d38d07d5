//! Per-connection client session handling
//!
//! Each accepted TCP connection gets one session task that decodes frames,
//! dispatches requests, and writes responses back. A `Subscribe` request
//! additionally wires the connection to the broadcast hub through a
//! forwarding task; disconnecting at any point deregisters the observer.

use crate::dispatch::Relay;
use crate::hub::ObserverChannel;
use anyhow::Result;
use homelink_shared::{
    codec::{self, FrameDecoder},
    Envelope, Header, Payload,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Handle to write frames to one connection
#[derive(Clone)]
struct SessionHandle {
    addr: SocketAddr,
    writer: Arc<Mutex<WriteHalf<TcpStream>>>,
    sequence_id: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Send a payload to this client, framed and headed as the relay
    async fn send(&self, payload: Payload) -> Result<()> {
        let seq = self.sequence_id.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = Envelope {
            header: Header::new("relay", seq),
            payload,
        };
        let encoded = codec::encode(&envelope)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(&encoded).await?;
        Ok(())
    }
}

/// Run one client session until the connection closes
pub async fn run(stream: TcpStream, addr: SocketAddr, relay: Arc<Relay>) {
    let (mut reader, writer) = tokio::io::split(stream);
    let handle = SessionHandle {
        addr,
        writer: Arc::new(Mutex::new(writer)),
        sequence_id: Arc::new(AtomicU64::new(0)),
    };

    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; 4096];
    let mut observer_id: Option<u64> = None;

    'session: loop {
        // Drain all complete frames before reading more
        loop {
            match decoder.decode_next() {
                Ok(Some(envelope)) => {
                    handle_envelope(&envelope, &handle, &relay, &mut observer_id).await;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Decode error from {}: {}", addr, e);
                    break 'session;
                }
            }
        }

        match reader.read(&mut read_buf).await {
            Ok(0) => break, // connection closed
            Ok(n) => decoder.extend(&read_buf[..n]),
            Err(e) => {
                warn!("Read error from {}: {}", addr, e);
                break;
            }
        }
    }

    // Disconnect is an immediate, idempotent deregistration
    if let Some(id) = observer_id {
        relay.hub().leave(id).await;
    }
    debug!("Session ended: {}", addr);
}

async fn handle_envelope(
    envelope: &Envelope,
    handle: &SessionHandle,
    relay: &Arc<Relay>,
    observer_id: &mut Option<u64>,
) {
    debug!(
        "Frame from {} ({}): seq={}",
        handle.addr, envelope.header.sender, envelope.header.sequence_id
    );

    let response = match &envelope.payload {
        Payload::Subscribe => {
            if observer_id.is_none() {
                let channel = relay.hub().join().await;
                *observer_id = Some(channel.id);
                tokio::spawn(forward_events(channel, handle.clone(), relay.clone()));
            }
            Some(Payload::Subscribed)
        }
        request => relay.handle(request).await,
    };

    if let Some(response) = response {
        if let Err(e) = handle.send(response).await {
            warn!("Failed to respond to {}: {}", handle.addr, e);
        }
    }
}

/// Push broadcast events to one observer until either side goes away
async fn forward_events(mut channel: ObserverChannel, handle: SessionHandle, relay: Arc<Relay>) {
    while let Some(event) = channel.receiver.recv().await {
        if handle.send(Payload::Event(event)).await.is_err() {
            break;
        }
    }
    relay.hub().leave(channel.id).await;
}
