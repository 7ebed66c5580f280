use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{info, instrument};

use crate::config::TransportConfig;
use crate::core::codec::Codec;
use crate::core::shape::Shape;
use crate::error::{CodecError, Result};
use crate::transport::stream::{receive_value, send_value};

/// Bind a listener on the configured address
#[instrument(skip(config), fields(address = %config.address))]
pub async fn bind(config: &TransportConfig) -> Result<TcpListener> {
    let listener = TcpListener::bind(&config.address).await?;
    info!(local = %listener.local_addr()?, "Listening");
    Ok(listener)
}

/// Accept one connection and decode the buffer it carries
#[instrument(skip(listener, codec, config))]
pub async fn serve_once<T: Shape>(
    listener: &TcpListener,
    codec: &Codec,
    config: &TransportConfig,
) -> Result<(T, SocketAddr)> {
    let (mut stream, peer) = timeout(config.io_timeout, listener.accept())
        .await
        .map_err(|_| CodecError::Timeout)??;
    info!(peer = %peer, "Accepted connection");

    let value = receive_value(codec, &mut stream, config).await?;
    Ok((value, peer))
}

/// Connect to `addr`, send `value`, and return the number of bytes written
#[instrument(skip(codec, value, config))]
pub async fn connect_and_send<T: Shape>(
    addr: SocketAddr,
    codec: &Codec,
    value: &T,
    config: &TransportConfig,
) -> Result<usize> {
    let mut stream = timeout(config.io_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| CodecError::Timeout)??;

    let sent = send_value(codec, &mut stream, value, config).await?;
    info!(peer = %addr, bytes = sent, "Sent buffer");
    Ok(sent)
}
