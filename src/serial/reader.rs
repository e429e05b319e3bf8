//! # Line Reader
//!
//! Turns the receiver's byte stream into text lines and feeds them to the
//! aggregator. Reads await data, so an idle link costs nothing.

use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::error::{Result, TelemetryError};
use crate::telemetry::decoder::{self, LineKind};
use crate::telemetry::{Aggregator, TelemetryFrame};

/// Default number of bytes requested per read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Splits an async byte stream into lines
///
/// Bytes that are not valid UTF-8 are replaced, never rejected. Trailing
/// `\r\n` or `\n` is removed. A final line without a newline is still returned
/// when the stream ends.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: BytesMut,
    read_size: usize,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_read_size(inner, DEFAULT_READ_BUFFER_SIZE)
    }

    pub fn with_read_size(inner: R, read_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(read_size),
            read_size: read_size.max(1),
            eof: false,
        }
    }

    /// Next complete line, or `None` once the stream has ended
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line = self.buf.split_to(pos + 1);
                return Ok(Some(decode_line(&line)));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let rest = self.buf.split();
                return Ok(Some(decode_line(&rest)));
            }

            self.buf.reserve(self.read_size);
            if self.inner.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Counters for one producer run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    /// Lines read from the stream
    pub lines: u64,
    /// Telemetry frames appended to the log
    pub frames: u64,
    /// "Message received" notices discarded
    pub notices: u64,
    /// Other lines ignored
    pub ignored: u64,
}

/// Read lines until the stream ends, appending telemetry frames.
///
/// `on_frame` is called with each new frame right after it is logged.
///
/// # Errors
///
/// Returns [`TelemetryError::Serial`] if reading fails. Frames appended
/// before the failure stay in the log.
pub async fn pump<R, F>(
    mut reader: LineReader<R>,
    aggregator: Arc<Aggregator>,
    mut on_frame: F,
) -> Result<PumpStats>
where
    R: AsyncRead + Unpin,
    F: FnMut(&Arc<TelemetryFrame>),
{
    let mut stats = PumpStats::default();

    while let Some(line) = reader
        .next_line()
        .await
        .map_err(|e| TelemetryError::Serial(format!("Failed to read: {}", e)))?
    {
        stats.lines += 1;

        match decoder::classify_line(&line) {
            LineKind::Notice => stats.notices += 1,
            LineKind::Other => {
                debug!("Ignoring line: {:?}", line);
                stats.ignored += 1;
            }
            LineKind::Frame(_) => {
                if let Some(frame) = aggregator.append(&line) {
                    stats.frames += 1;
                    on_frame(&frame);
                }
            }
        }
    }

    info!(
        "Serial stream closed after {} lines ({} frames)",
        stats.lines, stats.frames
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_splits_lines_across_reads() {
        let mock = Builder::new()
            .read(b"first\nsec")
            .read(b"ond\r\nthi")
            .read(b"rd\n")
            .build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("third"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flushes_unterminated_last_line() {
        let mock = Builder::new().read(b"a\ntail").build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("tail"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let mock = Builder::new().read(b"T\xFFemp\n").build();
        let mut reader = LineReader::new(mock);

        let line = reader.next_line().await.unwrap().unwrap();
        assert_eq!(line, "T\u{FFFD}emp");
    }

    #[tokio::test]
    async fn test_small_read_size() {
        let mock = Builder::new().read(b"abc\ndef\n").build();
        let mut reader = LineReader::with_read_size(mock, 2);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("def"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pump_feeds_aggregator() {
        let stream = "boot ok\n📥 LoRa Message Received:\n🔹 Temp:23.5 Volt:3,7 Alt:102m\n\
                      📥 LoRa Message Received:\n🔹 Temp:24 Hum:40%\n";
        let mock = Builder::new().read(stream.as_bytes()).build();
        let aggregator = Arc::new(Aggregator::new());

        let mut seen = Vec::new();
        let stats = pump(LineReader::new(mock), Arc::clone(&aggregator), |frame| {
            seen.push(frame.raw_line().to_string());
        })
        .await
        .unwrap();

        assert_eq!(
            stats,
            PumpStats {
                lines: 5,
                frames: 2,
                notices: 2,
                ignored: 1,
            }
        );
        assert_eq!(seen, vec!["Temp:23.5 Volt:3,7 Alt:102m", "Temp:24 Hum:40%"]);
        assert_eq!(aggregator.len(), 2);

        let temps: Vec<Option<f64>> = aggregator
            .recent_window("Temp", 10)
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(temps, vec![Some(23.5), Some(24.0)]);
    }

    #[tokio::test]
    async fn test_pump_read_error_keeps_earlier_frames() {
        let mock = Builder::new()
            .read("🔹 Temp:20\n".as_bytes())
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
            .build();
        let aggregator = Arc::new(Aggregator::new());

        let result = pump(LineReader::new(mock), Arc::clone(&aggregator), |_| {}).await;

        match result {
            Err(TelemetryError::Serial(msg)) => assert!(msg.contains("unplugged")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
        assert_eq!(aggregator.len(), 1);
    }
}
