//! Async adapters for PTY I/O.
//!
//! PTY handles only offer blocking reads and writes. These adapters park
//! them on tokio's blocking pool and talk to the rest of the program
//! through channels, so chunk order is whatever order `read` returned.

use std::io::{ErrorKind, Read, Write};

use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Bytes requested per `read` call.
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Async reader for PTY output.
///
/// Each successful `read` becomes one chunk on the channel.
pub struct AsyncPtyReader<R: Read + Send + 'static> {
    reader: R,
    tx: mpsc::Sender<Vec<u8>>,
    buffer_size: usize,
}

impl<R: Read + Send + 'static> AsyncPtyReader<R> {
    pub fn new(reader: R, tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            reader,
            tx,
            buffer_size: DEFAULT_READ_SIZE,
        }
    }

    /// Create with custom buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Pump the PTY into the channel until EOF, EIO or a dropped receiver.
    ///
    /// Returns the number of bytes forwarded.
    pub async fn run(self) -> u64 {
        let Self {
            mut reader,
            tx,
            buffer_size,
        } = self;

        let result = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; buffer_size];
            let mut total = 0u64;

            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("PTY reader: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!("PTY reader: read {} bytes", n);
                        total += n as u64;
                        if tx.blocking_send(buf[..n].to_vec()).is_err() {
                            debug!("PTY reader: channel closed");
                            break;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        // EIO on Unix means the slave side closed: the shell exited
                        #[cfg(unix)]
                        if e.raw_os_error() == Some(libc::EIO) {
                            debug!("PTY reader: PTY closed (EIO)");
                            break;
                        }

                        if e.kind() == ErrorKind::BrokenPipe {
                            debug!("PTY reader: broken pipe");
                            break;
                        }

                        error!("PTY reader error: {}", e);
                        break;
                    }
                }
            }

            total
        })
        .await;

        result.unwrap_or_else(|e| {
            error!("PTY reader task panicked: {}", e);
            0
        })
    }
}

/// Async writer for PTY input.
///
/// Every message received is written and flushed before the next one.
pub struct AsyncPtyWriter<W: Write + Send + 'static> {
    writer: W,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl<W: Write + Send + 'static> AsyncPtyWriter<W> {
    pub fn new(writer: W, rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { writer, rx }
    }

    /// Drain the channel into the PTY until all senders are gone or a
    /// write fails. Hands the writer back when the channel closes cleanly.
    pub async fn run(self) -> Option<W> {
        let Self { mut writer, mut rx } = self;

        let result = tokio::task::spawn_blocking(move || {
            while let Some(data) = rx.blocking_recv() {
                trace!("PTY writer: writing {} bytes", data.len());
                if let Err(e) = writer.write_all(&data).and_then(|()| writer.flush()) {
                    if e.kind() == ErrorKind::BrokenPipe {
                        debug!("PTY writer: broken pipe");
                    } else {
                        error!("PTY writer error: {}", e);
                    }
                    return None;
                }
            }
            debug!("PTY writer: channel closed");
            Some(writer)
        })
        .await;

        result.unwrap_or_else(|e| {
            error!("PTY writer task panicked: {}", e);
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[tokio::test]
    async fn test_async_reader_basic() {
        let data = b"Hello, World!\nTest line 2\n";
        let (tx, mut rx) = mpsc::channel(32);
        let reader = AsyncPtyReader::new(Cursor::new(data.to_vec()), tx);

        let handle = tokio::spawn(reader.run());

        let mut received = Vec::new();
        while let Some(chunk) = rx.recv().await {
            received.extend(chunk);
        }

        assert_eq!(received, data);
        assert_eq!(handle.await.unwrap(), data.len() as u64);
    }

    #[tokio::test]
    async fn test_async_reader_chunking() {
        let (tx, mut rx) = mpsc::channel(32);
        let reader = AsyncPtyReader::new(Cursor::new(b"abcdefg".to_vec()), tx).with_buffer_size(3);
        tokio::spawn(reader.run());

        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        assert_eq!(chunks, vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
    }

    #[tokio::test]
    async fn test_async_reader_empty() {
        let (tx, mut rx) = mpsc::channel(32);
        let reader = AsyncPtyReader::new(Cursor::new(Vec::new()), tx);

        let handle = tokio::spawn(reader.run());

        let result = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(result.unwrap().is_none());
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reader_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        let reader = AsyncPtyReader::new(Cursor::new(b"unread".to_vec()), tx);
        drop(rx);

        let handle = tokio::spawn(reader.run());
        let result = tokio::time::timeout(Duration::from_millis(500), handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_async_writer_basic() {
        let (tx, rx) = mpsc::channel(32);
        let writer = AsyncPtyWriter::new(Vec::new(), rx);

        tx.send(b"Hello".to_vec()).await.unwrap();
        tx.send(b", World!".to_vec()).await.unwrap();
        drop(tx);

        let written = writer.run().await.unwrap();
        assert_eq!(written, b"Hello, World!");
    }
}
