//! Shard driver
//!
//! Owns the connect/read/reconnect loop: opens the TLS WebSocket, installs
//! the transport seam on the shard, pumps inbound frames into
//! `handle_frame` and serializes outbound writes through a single writer
//! task. The loop is infinite; it exits only on unrecoverable close codes.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, warn};

use super::{Shard, WireCommand};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::GatewayCloseCode;

/// WebSocket path without transport compression
pub const PATH_UNCOMPRESSED: &str = "/?v=8&encoding=json";

/// WebSocket path requesting zlib-stream compression
pub const PATH_COMPRESSED: &str = "/?v=8&encoding=json&compress=zlib-stream";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the gateway WebSocket URL for a host
#[must_use]
pub fn gateway_url(host: &str, compressed: bool) -> String {
    let path = if compressed {
        PATH_COMPRESSED
    } else {
        PATH_UNCOMPRESSED
    };
    format!("wss://{host}:443{path}")
}

/// Reconnect loop
///
/// Repeats forever: connect, run the read loop until the transport closes,
/// tear down, reconnect. There is no backoff beyond the cluster's IDENTIFY
/// throttle; the 5-second identify floor is the only delay. Terminates on
/// unrecoverable close codes (4004/4013/4014) or when the owning cluster
/// is gone.
pub async fn run(shard: Arc<Shard>) {
    loop {
        let Some(host) = shard.gateway_host() else {
            debug!(shard_id = shard.shard_id(), "Cluster dropped, shard stopping");
            return;
        };

        match connect_once(&shard, &host).await {
            Ok(()) => {
                debug!(
                    shard_id = shard.shard_id(),
                    "Gateway connection ended, reconnecting"
                );
            }
            Err(GatewayError::Unrecoverable(code)) => {
                error!(
                    shard_id = shard.shard_id(),
                    code = code.as_u16(),
                    "Unrecoverable gateway close, shard terminating"
                );
                shard.detach_transport();
                return;
            }
            Err(e) => {
                warn!(
                    shard_id = shard.shard_id(),
                    error = %e,
                    "Gateway connection error, reconnecting"
                );
            }
        }

        shard.detach_transport();
    }
}

/// One connection lifetime: handshake, writer task, read loop
async fn connect_once(shard: &Arc<Shard>, host: &str) -> GatewayResult<()> {
    shard.mark_connecting();

    let url = gateway_url(host, shard.is_compressed());
    debug!(shard_id = shard.shard_id(), url = %url, "Connecting to gateway");

    let (ws, _response) = connect_async(&url).await?;
    let (sink, mut stream) = ws.split();

    let wire_rx = shard.attach_transport();
    let writer = tokio::spawn(write_loop(shard.shard_id(), sink, wire_rx));

    let result = read_loop(shard, &mut stream).await;
    writer.abort();
    result
}

/// Single writer: every outbound frame goes through here, so no two frames
/// interleave on the wire
async fn write_loop(
    shard_id: u32,
    mut sink: SplitSink<WsStream, Message>,
    mut wire_rx: tokio::sync::mpsc::UnboundedReceiver<WireCommand>,
) {
    while let Some(command) = wire_rx.recv().await {
        match command {
            WireCommand::Send(text) => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!(shard_id, error = %e, "Failed to write gateway frame");
                    break;
                }
            }
            WireCommand::Close(code) => {
                // Codes outside the sendable range (the zlib categories) are
                // logged by the shard; the wire gets a plain close.
                let frame = (1000..=4999).contains(&code).then(|| CloseFrame {
                    code: code.into(),
                    reason: "closing".into(),
                });
                let _ = sink.send(Message::Close(frame)).await;
                break;
            }
        }
    }

    let _ = sink.close().await;
}

/// Pump inbound frames until the connection drops
async fn read_loop(shard: &Arc<Shard>, stream: &mut SplitStream<WsStream>) -> GatewayResult<()> {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                shard.handle_frame(text.as_bytes()).await;
            }
            Ok(Message::Binary(data)) => {
                shard.handle_frame(&data).await;
            }
            Ok(Message::Close(frame)) => {
                let code = frame.as_ref().map_or(1005, |f| u16::from(f.code));
                shard.on_close_code(code);

                if let Some(close) = GatewayCloseCode::from_u16(code) {
                    if close.is_unrecoverable() {
                        return Err(GatewayError::Unrecoverable(close));
                    }
                }
                return Err(GatewayError::Closed(code));
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                // Ping/pong are answered by tungstenite.
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Stream ended without a close frame.
    Ok(())
}
