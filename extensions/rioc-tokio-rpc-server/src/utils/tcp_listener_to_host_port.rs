use std::io::Result;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

/// The IP and port a bound listener actually serves on.
pub fn tcp_listener_to_host_port(listener: &TcpListener) -> Result<(IpAddr, u16)> {
    let local_addr: SocketAddr = listener.local_addr()?;
    Ok((local_addr.ip(), local_addr.port()))
}

/// `host:port` form of a bound listener's address, as clients configure it.
pub fn tcp_listener_to_backend_address(listener: &TcpListener) -> Result<String> {
    let (host, port) = tcp_listener_to_host_port(listener)?;
    Ok(SocketAddr::new(host, port).to_string())
}
