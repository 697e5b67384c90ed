use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error_handling::types::NetworkError;

/// Opens a fresh connection to `target`, writes `payload` and closes it.
///
/// Nothing is read back. An empty payload still connects, then closes.
pub async fn send_payload(target: &str, payload: &[u8]) -> Result<(), NetworkError> {
    let mut stream =
        TcpStream::connect(target)
            .await
            .map_err(|source| NetworkError::TargetConnectFailed {
                target: target.to_string(),
                source,
            })?;
    let write_failed = |source| NetworkError::WriteFailed {
        target: target.to_string(),
        source,
    };
    if !payload.is_empty() {
        stream.write_all(payload).await.map_err(write_failed)?;
    }
    stream.shutdown().await.map_err(write_failed)?;
    debug!("Sent {} byte(s) to {}", payload.len(), target);
    Ok(())
}
