//! Chat network connection.
//!
//! - [`connect`]: TCP, optionally upgraded to TLS
//! - [`Session`]: registration and the read/write loop
//! - [`ChatHandle`]: cloneable sender used by handlers and announcements

mod connection;
mod handle;
mod stream;
mod tls;

pub use connection::Session;
pub use handle::ChatHandle;
pub use stream::ChatStream;

use tokio::net::TcpStream;
use tracing::info;

use crate::config::IrcConfig;
use crate::error::ConnectionError;

/// Open the transport to the configured chat server.
pub async fn connect(config: &IrcConfig) -> Result<ChatStream, ConnectionError> {
    let tcp = TcpStream::connect((config.host.as_str(), config.port)).await?;
    tcp.set_nodelay(true)?;

    let stream = if config.tls {
        ChatStream::Tls(Box::new(tls::upgrade_to_tls(tcp, &config.host).await?))
    } else {
        ChatStream::Plain(tcp)
    };

    info!(
        host = %config.host,
        port = config.port,
        tls = stream.is_tls(),
        "Connected to chat server"
    );
    Ok(stream)
}
