use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};

use crate::config::ServerConfig;
use crate::network::{PacketReader, PacketType};

/// Duplex byte stream a connection runs over
pub trait LinkStream: Read + Write + Send {}

impl<T: Read + Write + Send> LinkStream for T {}

/// One live link to the render server
pub struct Connection {
    stream: Box<dyn LinkStream>,
    /// Remote address, if the stream is a socket
    remote_addr: Option<SocketAddr>,
    stats: ConnectionStats,
}

/// Connection statistics
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub send_failures: u64,
}

impl Connection {
    /// Wrap an already connected TCP stream
    pub fn from_tcp(tcp_stream: TcpStream, config: &ServerConfig) -> std::io::Result<Self> {
        let remote_addr = tcp_stream.peer_addr().ok();
        tcp_stream.set_nodelay(config.nodelay)?;
        tcp_stream.set_read_timeout(config.read_timeout())?;
        tcp_stream.set_write_timeout(config.write_timeout())?;

        Ok(Self {
            stream: Box::new(tcp_stream),
            remote_addr,
            stats: ConnectionStats::default(),
        })
    }

    /// Wrap any duplex stream
    pub fn from_stream<S: LinkStream + 'static>(stream: S) -> Self {
        Self {
            stream: Box::new(stream),
            remote_addr: None,
            stats: ConnectionStats::default(),
        }
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Write one complete frame
    pub fn send_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        let result = self.stream.write_all(frame).and_then(|_| self.stream.flush());
        match &result {
            Ok(()) => {
                self.stats.packets_sent += 1;
                self.stats.bytes_sent += frame.len() as u64;
            }
            Err(_) => self.stats.send_failures += 1,
        }
        result
    }

    /// Block until one frame arrives
    pub fn receive(&mut self) -> PacketReader {
        let reply = PacketReader::read_from(&mut self.stream);
        if reply.packet_type() != PacketType::None || reply.raw_type() != 0 {
            self.stats.packets_received += 1;
            self.stats.bytes_received += (crate::network::protocol::HEADER_SIZE + reply.payload_len()) as u64;
        }
        reply
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}
