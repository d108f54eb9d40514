//! Line-oriented operator channel.
//!
//! The engine only ever reads one line or writes one line. Byte framing, buffering and
//! baud rates belong to whatever sits under these traits: process stdio, a serial port
//! (with the `serial` feature), or an in-memory buffer in tests.

use crate::error::{AppResult, PolscanError};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

/// Source of operator commands, one line at a time.
#[async_trait]
pub trait LineSource: Send {
    /// Next line without its terminator, or `None` once the channel is closed.
    async fn read_line(&mut self) -> AppResult<Option<String>>;
}

/// Destination for responses, one line at a time.
#[async_trait]
pub trait LineSink: Send {
    /// Write `line` followed by a newline.
    async fn write_line(&mut self, line: &str) -> AppResult<()>;
}

/// [`LineSource`] over any buffered async reader. Accepts `\n` and `\r\n` endings.
pub struct StreamLineSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> StreamLineSource<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for StreamLineSource<R> {
    async fn read_line(&mut self) -> AppResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// [`LineSink`] over any async writer. Flushes after every line so the operator
/// sees samples as they are taken.
pub struct StreamLineSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> StreamLineSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> LineSink for StreamLineSink<W> {
    async fn write_line(&mut self, line: &str) -> AppResult<()> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        self.writer
            .write_all(record.as_bytes())
            .await
            .map_err(|e| PolscanError::Transport(format!("write failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| PolscanError::Transport(format!("flush failed: {e}")))
    }
}

/// Collects written lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLineSink {
    lines: Vec<String>,
}

impl MemoryLineSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the collected lines, leaving the sink empty
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

#[async_trait]
impl LineSink for MemoryLineSink {
    async fn write_line(&mut self, line: &str) -> AppResult<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Open a serial port and split it into a line source and a line sink.
#[cfg(feature = "serial")]
pub fn open_serial(
    path: &str,
    baud_rate: u32,
) -> AppResult<(
    StreamLineSource<tokio::io::BufReader<tokio::io::ReadHalf<tokio_serial::SerialStream>>>,
    StreamLineSink<tokio::io::WriteHalf<tokio_serial::SerialStream>>,
)> {
    use tokio_serial::SerialPortBuilderExt;

    let port = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .open_native_async()
        .map_err(|e| PolscanError::Transport(format!("failed to open {path}: {e}")))?;

    let (reader, writer) = tokio::io::split(port);
    Ok((
        StreamLineSource::new(tokio::io::BufReader::new(reader)),
        StreamLineSink::new(writer),
    ))
}
