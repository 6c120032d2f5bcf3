//! Publishes a handful of synthetic H.264/AAC frames to an RTMP server.
//!
//! This is a smoke test for the wiring, not a real encoder: the "frames" are
//! empty NALU/ADTS-shaped payloads. Point it at a local `rtmp-dump`-style
//! listener or any server that accepts a `publish` and discards the media.
//!
//! ```text
//! cargo run --example publish -- rtmp://127.0.0.1:1935/live my-stream-key
//! ```

use std::time::Duration;

use bytes::Bytes;
use rtmp_client::{AudioConfig, Connection, VideoConfig};

const TIME_BASE: u32 = 1000;

fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "rtmp://127.0.0.1:1935/live".to_string());
    let key = args.next().unwrap_or_else(|| "stream-key".to_string());

    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(run(&url, &key));
}

async fn run(url: &str, key: &str) {
    let conn = match Connection::init(url, key, 4 * 1024 * 1024) {
        Ok(conn) => conn,
        Err(err) => {
            tracing::error!(error = %err, "failed to start connection");
            return;
        }
    };

    while !conn.is_streaming() {
        if conn.is_error() {
            tracing::error!("connection failed before it ever reached StreamReady");
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tracing::info!("stream ready, sending config");

    let video = VideoConfig {
        width: 1280,
        height: 720,
        frame_rate: 30.0,
        bitrate_kbps: 2500,
        avc_decoder_configuration_record: Bytes::from_static(&[
            0x01, 0x64, 0x00, 0x1f, 0xff, 0xe1, 0x00, 0x00, 0x01, 0x00, 0x00,
        ]),
    };
    let audio = AudioConfig {
        sample_rate: 44100,
        channels: 2,
        bitrate_kbps: 128,
        audio_specific_config: Bytes::from_static(&[0x12, 0x10]),
    };
    conn.send_config(Some(&video), Some(&audio));

    for i in 0..150u32 {
        let decode_t = i64::from(i) * 33;
        let is_keyframe = i % 30 == 0;
        let video_frame = vec![0u8; 512];
        if !conn.send_video(decode_t, decode_t, TIME_BASE, &video_frame, is_keyframe) {
            tracing::warn!(frame = i, "video frame dropped (backpressure or not ready)");
        }

        let audio_t = i64::from(i) * 23;
        let audio_frame = vec![0u8; 128];
        if !conn.send_audio(audio_t, TIME_BASE, &audio_frame) {
            tracing::warn!(frame = i, "audio frame dropped (backpressure or not ready)");
        }

        if conn.is_error() {
            tracing::error!("connection errored mid-stream");
            break;
        }
        tokio::time::sleep(Duration::from_millis(33)).await;
    }

    conn.done();
    tokio::time::sleep(Duration::from_millis(100)).await;
}
