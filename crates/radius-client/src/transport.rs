//! UDP transport owned by one client session

use crate::error::{TransactionError, TransactionResult};
use radius_proto::Packet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

/// A UDP socket connected to a single RADIUS server
///
/// Connecting the socket makes the kernel drop datagrams from any other
/// peer, so only the identifier needs checking on receipt.
#[derive(Debug)]
pub struct Transport {
    socket: UdpSocket,
    server: SocketAddr,
    buffer: Vec<u8>,
}

impl Transport {
    /// Bind an ephemeral local port of the server's address family and connect it
    pub async fn connect(server: SocketAddr) -> std::io::Result<Self> {
        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        Self::connect_from(local, server).await
    }

    /// Bind `local` and connect it to `server`
    pub async fn connect_from(local: SocketAddr, server: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        debug!(local = %socket.local_addr()?, server = %server, "RADIUS transport connected");

        Ok(Transport {
            socket,
            server,
            buffer: vec![0u8; Packet::MAX_PACKET_SIZE],
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Transmit one datagram
    ///
    /// A connection-refused error left pending by an earlier ICMP port
    /// unreachable is consumed and the send is repeated once.
    pub async fn send(&self, datagram: &[u8]) -> TransactionResult<()> {
        let sent = match self.socket.send(datagram).await {
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                debug!(server = %self.server, "Clearing pending port unreachable before send");
                self.socket.send(datagram).await?
            }
            result => result?,
        };
        if sent != datagram.len() {
            return Err(TransactionError::Network(std::io::Error::other(format!(
                "short send: {} of {} bytes",
                sent,
                datagram.len()
            ))));
        }
        Ok(())
    }

    /// Wait up to `wait` for a datagram carrying `identifier`
    ///
    /// Returns `Ok(None)` when the wait elapses. Datagrams too short to hold a
    /// header, and datagrams for any other identifier, are discarded: they are
    /// most likely late answers to an earlier transaction. An ICMP port
    /// unreachable counts as no answer, so the caller still retransmits.
    pub async fn await_response(
        &mut self,
        identifier: u8,
        wait: Duration,
    ) -> TransactionResult<Option<Vec<u8>>> {
        let deadline = Instant::now() + wait;

        loop {
            let len = match timeout_at(deadline, self.socket.recv(&mut self.buffer)).await {
                Err(_elapsed) => return Ok(None),
                Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                    debug!(server = %self.server, "Server port unreachable");
                    continue;
                }
                Ok(result) => result?,
            };
            let datagram = &self.buffer[..len];

            if len < Packet::MIN_PACKET_SIZE {
                warn!(
                    server = %self.server,
                    length = len,
                    "Discarding runt datagram"
                );
                continue;
            }

            if datagram[1] != identifier {
                debug!(
                    server = %self.server,
                    expected = identifier,
                    received = datagram[1],
                    "Discarding response with stale identifier"
                );
                continue;
            }

            return Ok(Some(datagram.to_vec()));
        }
    }
}
