//! The single I/O worker task: resolves and connects the socket, drives the
//! handshake and the `connect`/`createStream`/`publish` command sequence,
//! then multiplexes outgoing media against incoming protocol messages until
//! `done()` is called or a fatal error occurs.
//!
//! This task exclusively owns the socket, the receive-side reassembler and
//! `ProducerState.state`; only the send ring and timestamp tracks are
//! shared with producer threads, under [`super::Shared::producer`].

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use super::state::ConnectionState;
use super::Shared;
use crate::chunk::{
    Chunk, ChunkDecoder, ChunkEncoder, ChunkReadOutcome, COMMAND_CHUNK_STREAM_ID, CONTROL_CHUNK_STREAM_ID, OUT_CHUNK_SIZE, OUT_WINDOW_ACK_SIZE,
};
use crate::command_messages::netconnection::{encode_connect, encode_create_stream};
use crate::command_messages::netstream::{encode_delete_stream, encode_publish, PublishingType};
use crate::command_messages::on_status::codes;
use crate::command_messages::{CommandError, CommandReply, RawCommand};
use crate::error::RtmpError;
use crate::handshake::{ClientHandshake, HandshakeStep};
use crate::messages::{MessageData, MessageTypeID};
use crate::protocol_control_messages::{ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize};
use crate::url::RtmpUrl;

const TRANSACTION_CONNECT: f64 = 1.0;
const TRANSACTION_CREATE_STREAM: f64 = 2.0;
const TRANSACTION_PUBLISH: f64 = 3.0;
const TRANSACTION_DELETE_STREAM: f64 = 4.0;

fn set_state(shared: &Shared, state: ConnectionState) {
    shared.producer.lock().unwrap().state = state;
}

/// Frames one AMF0 command as a fmt=0 chunk on [`COMMAND_CHUNK_STREAM_ID`].
fn frame_command(encoder: &ChunkEncoder, msg_stream_id: u32, payload: Vec<u8>) -> Result<Vec<u8>, RtmpError> {
    let mut out = Vec::new();
    encoder
        .write_chunk(
            &mut out,
            Chunk::new(COMMAND_CHUNK_STREAM_ID, 0, MessageTypeID::CommandAMF0, msg_stream_id, Bytes::from(payload)),
        )
        .map_err(CommandError::from)?;
    Ok(out)
}

/// Drives the whole connection lifecycle. Returns once `done()` was
/// honored or a fatal error terminated the connection; either way, the
/// final state has already been written to `shared.producer.state`.
pub(crate) async fn run(shared: std::sync::Arc<Shared>, url: RtmpUrl, key: String, stop: CancellationToken) {
    if let Err(err) = run_inner(&shared, url, key, stop).await {
        tracing::warn!(error = %err, "rtmp connection terminated");
        set_state(&shared, ConnectionState::Error);
    }
}

async fn run_inner(shared: &Shared, url: RtmpUrl, key: String, stop: CancellationToken) -> Result<(), RtmpError> {
    set_state(shared, ConnectionState::Resolving);
    let addr = tokio::net::lookup_host((url.host.as_str(), url.port))
        .await
        .map_err(RtmpError::Resolve)?
        .next()
        .ok_or_else(|| RtmpError::Resolve(io::Error::new(io::ErrorKind::NotFound, "no addresses resolved")))?;

    set_state(shared, ConnectionState::Connecting);
    let mut socket = TcpStream::connect(addr).await.map_err(RtmpError::Connect)?;

    set_state(shared, ConnectionState::Handshake);
    let mut recv_acc = handshake(&mut socket).await?;

    let mut encoder = ChunkEncoder::default();
    let mut decoder = ChunkDecoder::default();

    // Announce our own chunk size and acknowledgement window before
    // anything else, so every chunk after this point already reflects them.
    // The window-ack-size message carries a trailing limit-type byte in the
    // same type=5 payload rather than a separate type=6 SetPeerBandwidth
    // message: real-world publishers (and the source this was distilled
    // from) send it this way, and the server only ever reads the first 4
    // bytes of either message, so the two are interchangeable in practice.
    let mut setup = Vec::new();
    ProtocolControlMessageSetChunkSize {
        chunk_size: OUT_CHUNK_SIZE as u32,
    }
    .write(&mut setup, &encoder)?;
    let mut window_ack_payload = OUT_WINDOW_ACK_SIZE.to_be_bytes().to_vec();
    window_ack_payload.push(2); // limit type: dynamic
    encoder.write_chunk(
        &mut setup,
        Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeID::WindowAcknowledgementSize, 0, Bytes::from(window_ack_payload)),
    )?;
    socket.write_all(&setup).await?;
    encoder.set_chunk_size(OUT_CHUNK_SIZE);

    set_state(shared, ConnectionState::StreamConnecting);
    let mut connect_payload = Vec::new();
    encode_connect(&mut connect_payload, &url.app, &url.tc_url, TRANSACTION_CONNECT)?;
    socket.write_all(&frame_command(&encoder, 0, connect_payload)?).await?;

    let (mut read_half, mut write_half) = socket.into_split();

    let mut pending_result_for: Option<&'static str> = Some("connect");
    let mut stream_id: u32 = 0;
    let mut peer_window_ack_size: Option<u32> = None;
    let mut total_bytes_received: u64 = 0;
    let mut bytes_since_last_ack: u32 = 0;

    let mut write_buf = BytesMut::new();
    let mut write_pos = 0usize;
    let mut read_buf = [0u8; 16 * 1024];

    loop {
        tokio::select! {
            _ = stop.cancelled() => {
                if matches!(shared.producer.lock().unwrap().state, ConnectionState::StreamReady) {
                    let mut payload = Vec::new();
                    if encode_delete_stream(&mut payload, stream_id as f64, TRANSACTION_DELETE_STREAM).is_ok() {
                        if let Ok(bytes) = frame_command(&encoder, stream_id, payload) {
                            let _ = write_half.write_all(&bytes).await;
                        }
                    }
                }
                set_state(shared, ConnectionState::StreamDeleted);
                return Ok(());
            }

            result = write_half.write(&write_buf[write_pos..]), if !write_buf.is_empty() => {
                let n = result?;
                if n == 0 {
                    return Err(RtmpError::Transport(io::Error::new(io::ErrorKind::WriteZero, "write returned zero bytes")));
                }
                write_pos += n;
                if write_pos == write_buf.len() {
                    write_buf.clear();
                    write_pos = 0;
                }
            }

            _ = shared.data_ready.notified(), if write_buf.is_empty() => {
                let mut producer = shared.producer.lock().unwrap();
                let len = {
                    let avail = producer.ring.begin_read();
                    write_buf.extend_from_slice(avail);
                    avail.len()
                };
                if len > 0 {
                    producer.ring.end_read(len).expect("end_read matches the length just drained");
                }
            }

            result = read_half.read(&mut read_buf) => {
                let n = result?;
                if n == 0 {
                    return Err(RtmpError::Transport(io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed the connection")));
                }
                recv_acc.extend_from_slice(&read_buf[..n]);
                total_bytes_received += n as u64;
                bytes_since_last_ack += n as u32;

                let mut pos = 0;
                loop {
                    match decoder.read_chunk(&recv_acc[pos..])? {
                        ChunkReadOutcome::NeedMore => break,
                        ChunkReadOutcome::Progress { consumed } => pos += consumed,
                        ChunkReadOutcome::Message { chunk, consumed } => {
                            pos += consumed;
                            handle_message(
                                MessageData::read(&chunk)?,
                                shared,
                                &mut decoder,
                                &mut encoder,
                                &mut pending_result_for,
                                &mut stream_id,
                                &mut peer_window_ack_size,
                                &key,
                                &mut write_half,
                            )
                            .await?;
                        }
                    }
                }
                recv_acc.drain(..pos);

                if let Some(window) = peer_window_ack_size {
                    if u64::from(bytes_since_last_ack) > u64::from(window) / 2 {
                        let ack = ProtocolControlMessageAcknowledgement {
                            sequence_number: total_bytes_received as u32,
                        };
                        let mut buf = Vec::new();
                        ack.write(&mut buf, &encoder)?;
                        write_half.write_all(&buf).await?;
                        bytes_since_last_ack = 0;
                    }
                }
            }
        }
    }
}

/// Reads S0/S1/S2 off the wire, replies with C2, and returns whatever bytes
/// were already buffered past the handshake for the chunk decoder to pick
/// up first.
async fn handshake(socket: &mut TcpStream) -> Result<Vec<u8>, RtmpError> {
    let client = ClientHandshake::new();
    socket.write_all(&client.c0_c1()).await?;

    let mut client = client;
    let mut buf = Vec::new();
    let mut read_buf = [0u8; 4096];
    loop {
        match client.try_complete(&buf)? {
            HandshakeStep::Complete { c2, consumed } => {
                socket.write_all(&c2).await?;
                let leftover = buf.split_off(consumed);
                return Ok(leftover);
            }
            HandshakeStep::NeedMore => {
                let n = socket.read(&mut read_buf).await?;
                if n == 0 {
                    return Err(RtmpError::Transport(io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed during handshake")));
                }
                buf.extend_from_slice(&read_buf[..n]);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_message(
    message: MessageData,
    shared: &Shared,
    decoder: &mut ChunkDecoder,
    encoder: &mut ChunkEncoder,
    pending_result_for: &mut Option<&'static str>,
    stream_id: &mut u32,
    peer_window_ack_size: &mut Option<u32>,
    key: &str,
    write_half: &mut tokio::net::tcp::OwnedWriteHalf,
) -> Result<(), RtmpError> {
    match message {
        MessageData::SetChunkSize(m) => decoder.set_chunk_size(m.chunk_size as usize),
        MessageData::WindowAcknowledgementSize(m) => *peer_window_ack_size = Some(m.acknowledgement_window_size),
        MessageData::Acknowledgement(_) | MessageData::SetPeerBandwidth(_) | MessageData::Other { .. } => {}
        MessageData::Command(raw) => handle_command(raw, shared, encoder, pending_result_for, stream_id, key, write_half).await?,
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_command(
    raw: RawCommand,
    shared: &Shared,
    encoder: &mut ChunkEncoder,
    pending_result_for: &mut Option<&'static str>,
    stream_id: &mut u32,
    key: &str,
    write_half: &mut tokio::net::tcp::OwnedWriteHalf,
) -> Result<(), RtmpError> {
    match CommandReply::classify(&raw, *pending_result_for)? {
        CommandReply::ConnectResult(result) => {
            if result.code != codes::NET_CONNECTION_CONNECT_SUCCESS {
                return Err(RtmpError::ProtocolReject(format!("connect rejected: {}", result.code)));
            }
            set_state(shared, ConnectionState::StreamCreating);
            *pending_result_for = Some("createStream");

            let mut payload = Vec::new();
            encode_create_stream(&mut payload, TRANSACTION_CREATE_STREAM)?;
            write_half.write_all(&frame_command(encoder, 0, payload)?).await?;
        }
        CommandReply::CreateStreamResult(result) => {
            *stream_id = result.stream_id as u32;
            shared.producer.lock().unwrap().stream_id = *stream_id;
            set_state(shared, ConnectionState::StreamPublishing);
            *pending_result_for = None;

            let mut payload = Vec::new();
            encode_publish(&mut payload, key, PublishingType::Live, TRANSACTION_PUBLISH)?;
            write_half.write_all(&frame_command(encoder, *stream_id, payload)?).await?;
        }
        CommandReply::OnStatus(status) => {
            let currently_publishing = matches!(shared.producer.lock().unwrap().state, ConnectionState::StreamPublishing);
            if status.is_publish_success() {
                set_state(shared, ConnectionState::StreamReady);
            } else if currently_publishing {
                return Err(RtmpError::ProtocolReject(format!("publish rejected: {}", status.code)));
            }
        }
        CommandReply::Error {
            command_name,
            code,
            description,
        } => {
            return Err(RtmpError::ProtocolReject(format!(
                "{command_name} rejected: {} ({})",
                code.unwrap_or_default(),
                description.unwrap_or_default()
            )));
        }
        CommandReply::Other { .. } => {}
    }
    Ok(())
}
