//! Internal utilities.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Create a UDP socket on an ephemeral port matching the target's family.
///
/// For IPv6 targets the socket has `IPV6_V6ONLY` set; the session talks to
/// exactly one agent so dual-stack is never needed. The socket is made
/// non-blocking before handing it to tokio.
pub(crate) fn bind_ephemeral_udp_socket(target: SocketAddr) -> io::Result<UdpSocket> {
    let (domain, bind_addr) = if target.is_ipv6() {
        (
            Domain::IPV6,
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        )
    } else {
        (
            Domain::IPV4,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        )
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if target.is_ipv6() {
        socket.set_only_v6(true)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&bind_addr.into())?;

    UdpSocket::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_ipv4() {
        let target: SocketAddr = "127.0.0.1:161".parse().unwrap();
        let socket = bind_ephemeral_udp_socket(target).unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_ipv6() {
        let target: SocketAddr = "[::1]:161".parse().unwrap();
        let socket = bind_ephemeral_udp_socket(target).unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv6());
        assert_ne!(local.port(), 0);
    }
}
