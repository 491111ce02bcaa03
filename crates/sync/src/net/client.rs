use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use super::framing::{SyncError, read_packet, write_packet};
use super::protocol::WireState;
use crate::state::IntegrityError;

/// Blocking remote end of a sync session.
pub struct SyncClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    server_addr: SocketAddr,
}

impl SyncClient {
    /// Connects and waits for the server's handshake marker.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, SyncError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let server_addr = stream.peer_addr()?;

        let mut client = Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            server_addr,
        };

        let handshake = read_packet(&mut client.reader)?;
        if !handshake.is_ready() {
            return Err(IntegrityError::UnexpectedPacket("handshake").into());
        }
        log::debug!("Handshake received from {}", server_addr);

        Ok(client)
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Reads the snapshot the server sends right after the handshake.
    pub fn receive_snapshot<S: WireState>(&mut self) -> Result<S, SyncError> {
        let packet = read_packet(&mut self.reader)?;
        Ok(S::from_packet(packet)?)
    }

    /// Sends one state update. The server never replies.
    pub fn send<S: WireState>(&mut self, state: &S) -> Result<(), SyncError> {
        write_packet(&mut self.writer, &state.to_packet())
    }
}
