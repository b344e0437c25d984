pub mod client;
pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod packet;
pub mod protocol;

pub use client::RenderServer;
pub use connection::{Connection, ConnectionStats, LinkStream};
pub use decoder::PacketReader;
pub use encoder::PacketWriter;
pub use error::{
    connection_error, protocol_error, server_error, transport_error, NetworkErrorContext,
    NetworkResult,
};
pub use packet::PacketType;
pub use protocol::{Protocol, DEFAULT_SERVER_PORT, GLOBAL_MESH_NAME, HEADER_SIZE};
