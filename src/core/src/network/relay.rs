use std::fmt;
use std::io;
use std::sync::Arc;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use crate::data_capture::CaptureRecorder;

const RELAY_BUFFER_SIZE: usize = 16 * 1024;
const PREVIEW_BYTES: usize = 64;

/// Direction of a relayed byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Routed client towards the local service; the tapped direction.
    InboundToLocal,
    /// Local service back to the routed client.
    LocalToInbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::InboundToLocal => write!(f, "inbound->local"),
            Direction::LocalToInbound => write!(f, "local->inbound"),
        }
    }
}

/// Copies `reader` into `writer` until EOF, feeding every chunk read into
/// `tap` before forwarding it.
///
/// Returns the number of bytes forwarded. The writer is not shut down on EOF.
pub async fn relay<R, W>(
    conn_id: Uuid,
    direction: Direction,
    mut reader: R,
    mut writer: W,
    tap: Option<Arc<CaptureRecorder>>,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    trace!("[{}] {} relay started", conn_id, direction);
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            trace!("[{}] {} EOF after {} bytes", conn_id, direction, total);
            return Ok(total);
        }
        if let Some(ref recorder) = tap {
            recorder.write(&buf[..n]);
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;

        let preview = &buf[..n.min(PREVIEW_BYTES)];
        trace!(
            "[{}] relayed {} {} bytes: {}{}",
            conn_id,
            direction,
            n,
            String::from_utf8_lossy(preview),
            if n > PREVIEW_BYTES { " ..." } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_relay_forwards_and_taps() {
        let reader = Builder::new().read(b"hello").read(b" world").build();
        let writer = Builder::new().write(b"hello").write(b" world").build();
        let recorder = Arc::new(CaptureRecorder::default());

        let n = relay(
            Uuid::new_v4(),
            Direction::InboundToLocal,
            reader,
            writer,
            Some(Arc::clone(&recorder)),
        )
        .await
        .unwrap();

        assert_eq!(n, 11);
        assert_eq!(recorder.snapshot(), b"hello world");
        assert!(!recorder.truncated());
    }

    #[tokio::test]
    async fn test_relay_forwards_everything_past_capture_limit() {
        let reader = Builder::new().read(b"abcdef").read(b"ghij").build();
        let writer = Builder::new().write(b"abcdef").write(b"ghij").build();
        let recorder = Arc::new(CaptureRecorder::new(4));

        let n = relay(
            Uuid::new_v4(),
            Direction::InboundToLocal,
            reader,
            writer,
            Some(Arc::clone(&recorder)),
        )
        .await
        .unwrap();

        assert_eq!(n, 10);
        assert_eq!(recorder.snapshot(), b"abcd");
        assert!(recorder.truncated());
    }

    #[tokio::test]
    async fn test_relay_without_tap() {
        let reader = Builder::new().read(b"pong").build();
        let writer = Builder::new().write(b"pong").build();
        let n = relay(Uuid::new_v4(), Direction::LocalToInbound, reader, writer, None)
            .await
            .unwrap();
        assert_eq!(n, 4);
    }

    #[tokio::test]
    async fn test_relay_read_error_is_returned() {
        let reader = Builder::new()
            .read(b"partial")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let writer = Builder::new().write(b"partial").build();
        let recorder = Arc::new(CaptureRecorder::default());

        let err = relay(
            Uuid::new_v4(),
            Direction::InboundToLocal,
            reader,
            writer,
            Some(Arc::clone(&recorder)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(recorder.snapshot(), b"partial");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::InboundToLocal.to_string(), "inbound->local");
        assert_eq!(Direction::LocalToInbound.to_string(), "local->inbound");
    }
}
