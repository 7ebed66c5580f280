use bytes::BytesMut;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::config::TransportConfig;
use crate::core::codec::Codec;
use crate::core::shape::Shape;
use crate::error::{constants, CodecError, Result};
use crate::utils::metrics::global_metrics;

/// Run `fut`, failing with `CodecError::Timeout` once `duration` elapses
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| CodecError::Timeout)?
}

/// Write a whole buffer and close the write half of the stream
#[instrument(skip(stream, buffer), fields(bytes = buffer.len()))]
pub async fn send_buffer<W>(stream: &mut W, buffer: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(buffer).await?;
    stream.flush().await?;
    stream.shutdown().await?;

    global_metrics().buffer_sent();
    debug!("Buffer sent");
    Ok(())
}

/// Read until the peer closes, refusing more than `max_size` bytes.
///
/// # Errors
/// - `CodecError::OversizedBuffer` once more than `max_size` bytes arrive
/// - `CodecError::TransportError` if the peer closes without sending anything
#[instrument(skip(stream))]
pub async fn receive_buffer<R>(stream: &mut R, max_size: usize, chunk_size: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(chunk_size);

    loop {
        buf.reserve(chunk_size);
        let n = stream.read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }
        if buf.len() > max_size {
            warn!(received = buf.len(), max_size, "Peer sent an oversized buffer");
            return Err(CodecError::OversizedBuffer(buf.len()));
        }
    }

    if buf.is_empty() {
        return Err(CodecError::TransportError(
            constants::ERR_CONNECTION_CLOSED.to_string(),
        ));
    }

    global_metrics().buffer_received();
    debug!(bytes = buf.len(), "Buffer received");
    Ok(buf.to_vec())
}

/// Encode `value` and send it as the only buffer on `stream`
pub async fn send_value<T, W>(
    codec: &Codec,
    stream: &mut W,
    value: &T,
    config: &TransportConfig,
) -> Result<usize>
where
    T: Shape,
    W: AsyncWrite + Unpin,
{
    let buffer = codec.encode(value)?;
    with_timeout(config.io_timeout, send_buffer(stream, &buffer)).await?;
    Ok(buffer.len())
}

/// Receive the only buffer on `stream` and decode it as `T`
pub async fn receive_value<T, R>(codec: &Codec, stream: &mut R, config: &TransportConfig) -> Result<T>
where
    T: Shape,
    R: AsyncRead + Unpin,
{
    let buffer = with_timeout(
        config.io_timeout,
        receive_buffer(stream, codec.max_buffer_size(), config.read_chunk_size),
    )
    .await?;
    codec.decode(&buffer)
}
