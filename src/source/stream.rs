//! Stream-based data source.
//!
//! Receives device output from an async byte stream. This covers serial
//! bridges exposed over TCP (ser2net and friends) and replaying a captured
//! session from a file.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{DataSource, LineBuffer, SharedStatus};
use crate::error::SourceError;

const CHANNEL_CAPACITY: usize = 256;
const READ_CHUNK_SIZE: usize = 1024;

/// A data source that reads device output from an async stream.
///
/// This source spawns a background task that frames the stream into lines
/// and makes them available via `poll()`.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use envwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"temperature\":21,\"airQuality\":90,\"soundLevel\":35}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    status: SharedStatus,
    finished: bool,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let status = SharedStatus::default();
        let task_status = status.clone();

        tokio::spawn(async move {
            let mut reader = reader;
            let mut buffer = LineBuffer::new();
            let mut chunk = vec![0u8; READ_CHUNK_SIZE];

            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => {
                        task_status.set("Connection closed");
                        break;
                    }
                    Ok(n) => {
                        for line in buffer.push(&chunk[..n]) {
                            if tx.send(line).await.is_err() {
                                debug!("Receiver dropped, stopping stream reader");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Stream read error: {}", e);
                        task_status.set(format!("Read error: {}", e));
                        break;
                    }
                }
            }

            if !buffer.is_empty() {
                warn!(
                    "Discarding {} bytes of unterminated trailing data",
                    buffer.pending().len()
                );
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            status,
            finished: false,
        }
    }

    /// Connect to a TCP serial bridge.
    pub async fn connect(addr: &str) -> Result<Self, SourceError> {
        info!("Connecting to {}", addr);
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SourceError::Connection(format!("{}: {}", addr, e)))?;
        Ok(Self::spawn(stream, &format!("tcp://{}", addr)))
    }

    /// Replay a captured session from a file.
    pub async fn replay(path: &Path) -> Result<Self, SourceError> {
        info!("Replaying {}", path.display());
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::spawn(file, &format!("file://{}", path.display())))
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<String> {
        // Try to receive without blocking
        match self.receiver.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.finished = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.status.get()
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tokio::io::AsyncWriteExt;

    fn sample_line(n: u32) -> String {
        format!(
            r#"{{"temperature":{},"airQuality":100,"soundLevel":40}}"#,
            20 + n
        )
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n{}\n", sample_line(1), sample_line(2));
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(source.poll(), Some(sample_line(1)));
        assert_eq!(source.poll(), Some(sample_line(2)));
        assert!(source.poll().is_none());
        assert!(source.is_finished());
        assert_eq!(source.error().as_deref(), Some("Connection closed"));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:4001");
        assert_eq!(source.description(), "stream: tcp://localhost:4001");
    }

    #[tokio::test]
    async fn test_stream_source_split_writes() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut source = StreamSource::spawn(server, "duplex");

        let line = sample_line(3);
        let (head, tail) = line.split_at(10);
        client.write_all(head.as_bytes()).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        assert!(source.poll().is_none());

        client.write_all(tail.as_bytes()).await.unwrap();
        client.write_all(b"\n").await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        assert_eq!(source.poll(), Some(line));
        assert!(!source.is_finished());
    }

    #[tokio::test]
    async fn test_stream_source_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_line(1)).unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "{}", sample_line(2)).unwrap();
        file.flush().unwrap();

        let mut source = StreamSource::replay(file.path()).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(source.poll(), Some(sample_line(1)));
        assert_eq!(source.poll(), Some(sample_line(2)));
        assert!(source.poll().is_none());
        assert!(source.is_finished());
    }

    #[tokio::test]
    async fn test_stream_source_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = StreamSource::connect(&addr).await;
        assert!(matches!(result, Err(SourceError::Connection(_))));
    }
}
