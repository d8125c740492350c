use std::io::Result;
use tokio::net::TcpListener;

/// Binds a listener to an OS-assigned port on `127.0.0.1`.
///
/// Lets tests and the demo start any number of backends without picking
/// ports by hand.
pub async fn bind_tcp_listener_on_random_port() -> Result<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}
