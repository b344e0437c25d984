//! Render server client
//!
//! Every RPC is one request frame followed by one blocking reply. The reply
//! repeats the request type on success; any other type carries an error
//! string that is kept as the last error message.

use std::net::{TcpStream, ToSocketAddrs};

use glam::Affine3A;
use parking_lot::Mutex;

use crate::config::ServerConfig;
use crate::network::connection::{Connection, LinkStream};
use crate::network::error::{
    connection_error, protocol_error, server_error, transport_error, NetworkErrorContext,
    NetworkResult,
};
use crate::network::protocol::{Protocol, I32_SIZE, MATRIX_3X4_SIZE, U32_SIZE, U64_SIZE};
use crate::network::{PacketReader, PacketType, PacketWriter};
use crate::scene::affine_to_rows_3x4;
use crate::sync::MeshBatch;

/// Client side of the render server link
pub struct RenderServer {
    link: Mutex<Option<Connection>>,
    last_error: Mutex<String>,
    endpoint: String,
}

impl RenderServer {
    /// Connect to the server named in `config`.
    ///
    /// An unresolvable address is an error. A server that cannot be reached
    /// yields a disconnected client whose operations do nothing.
    pub fn connect(config: &ServerConfig) -> NetworkResult<Self> {
        let endpoint = config.endpoint();
        let socket_addr = endpoint
            .to_socket_addrs()
            .map_err(|e| connection_error(&endpoint, e))?
            .next()
            .ok_or_else(|| connection_error(&endpoint, "no address found"))?;

        let link = match TcpStream::connect_timeout(&socket_addr, config.connect_timeout()) {
            Ok(tcp_stream) => {
                let connection = Connection::from_tcp(tcp_stream, config)
                    .network_context("configuring render server socket")?;
                log::info!("Connected to render server at {}", socket_addr);
                Some(connection)
            }
            Err(e) => {
                log::warn!("Render server at {} is not reachable: {}", socket_addr, e);
                None
            }
        };

        Ok(Self {
            link: Mutex::new(link),
            last_error: Mutex::new(String::new()),
            endpoint,
        })
    }

    /// Client without a link; every operation is a no-op
    pub fn disconnected() -> Self {
        Self {
            link: Mutex::new(None),
            last_error: Mutex::new(String::new()),
            endpoint: String::new(),
        }
    }

    /// Client over an arbitrary duplex stream
    pub fn from_stream<S: LinkStream + 'static>(stream: S) -> Self {
        Self {
            link: Mutex::new(Some(Connection::from_stream(stream))),
            last_error: Mutex::new(String::new()),
            endpoint: String::from("stream"),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.lock().is_some()
    }

    /// Address this client was created for
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Reset the server project with no GPUs and drop the link
    pub fn disconnect(&self) -> NetworkResult<()> {
        let result = self.reset(0);
        if self.link.lock().take().is_some() {
            log::info!("Disconnected from render server {}", self.endpoint);
        }
        result
    }

    /// Last error reported by the server
    pub fn error_message(&self) -> String {
        self.last_error.lock().clone()
    }

    pub fn clear_error_message(&self) {
        self.last_error.lock().clear();
    }

    /// Run `f` with the link held. `None` when not connected.
    fn with_link<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> NetworkResult<T>,
    ) -> NetworkResult<Option<T>> {
        let mut link = self.link.lock();
        match link.as_mut() {
            Some(connection) => f(connection).map(Some),
            None => {
                log::debug!("Render server not connected, request skipped");
                Ok(None)
            }
        }
    }

    /// Send one request and wait for its reply
    fn exchange(
        &self,
        connection: &mut Connection,
        packet: PacketWriter,
        operation: &str,
    ) -> NetworkResult<PacketReader> {
        let expected = packet.packet_type();
        let frame = packet.into_frame();

        if let Err(e) = connection.send_frame(&frame) {
            log::error!("Network send error while {}: {}", operation, e);
            return Err(transport_error(operation, e));
        }

        let mut reply = connection.receive();
        if reply.packet_type() == expected {
            return Ok(reply);
        }
        if reply.packet_type() == PacketType::None {
            if reply.raw_type() == 0 {
                log::error!("No reply from render server while {}", operation);
                return Err(transport_error(operation, "connection closed before reply"));
            }
            log::error!("Unknown reply tag {} while {}", reply.raw_type(), operation);
            return Err(protocol_error(format!("unknown reply tag {}", reply.raw_type())));
        }

        let message = reply.read_string();
        log::error!("ERROR {}: {}", operation, message);
        *self.last_error.lock() = message.clone();
        Err(server_error(expected, message))
    }

    fn request(&self, packet: PacketWriter, operation: &str) -> NetworkResult<()> {
        self.with_link(|connection| self.exchange(connection, packet, operation))?;
        Ok(())
    }

    /// Send the license credentials
    pub fn activate(&self, login: &str, password: &str) -> NetworkResult<()> {
        let size = Protocol::string_field_len(login) + Protocol::string_field_len(password);
        let mut packet = PacketWriter::new(PacketType::SetLicenseData, size, None);
        packet.write_str(login);
        packet.write_str(password);
        self.request(packet, "activating render server")
    }

    /// Soft reset of the server project. `gpus` is a bit map of devices.
    pub fn reset(&self, gpus: u32) -> NetworkResult<()> {
        let mut packet = PacketWriter::new(PacketType::Reset, U32_SIZE, None);
        packet.write_u32(gpus);
        self.request(packet, "resetting render server")
    }

    /// Select the GPUs the server renders with, as a bit map
    pub fn load_gpus(&self, gpus: u32) -> NetworkResult<()> {
        let mut packet = PacketWriter::new(PacketType::LoadGpu, U32_SIZE, None);
        packet.write_u32(gpus);
        self.request(packet, "setting GPUs on render server")
    }

    /// Ask the server to apply pending changes. `false` when it refused or
    /// when not connected.
    pub fn update(&self) -> NetworkResult<bool> {
        let accepted = self.with_link(|connection| {
            connection
                .send_frame(&PacketWriter::new(PacketType::Update, 0, None).into_frame())
                .network_context("updating render project")?;
            Ok(connection.receive().packet_type() == PacketType::Update)
        })?;
        Ok(accepted.unwrap_or(false))
    }

    pub fn start_render(&self, width: i32, height: i32, image_type: u32) -> NetworkResult<()> {
        let mut packet = PacketWriter::new(PacketType::Start, I32_SIZE * 2 + U32_SIZE, None);
        packet.write_i32(width);
        packet.write_i32(height);
        packet.write_u32(image_type);
        self.request(packet, "starting render")
    }

    pub fn pause_render(&self, pause: bool) -> NetworkResult<()> {
        let mut packet = PacketWriter::new(PacketType::Pause, I32_SIZE, None);
        packet.write_i32(pause as i32);
        self.request(packet, "pausing render")
    }

    /// Upload a local or global mesh batch
    pub fn load_mesh(&self, batch: &MeshBatch<'_>) -> NetworkResult<()> {
        let operation = if batch.is_global() {
            "loading global mesh"
        } else {
            "loading mesh"
        };
        self.with_link(|connection| {
            log::debug!(
                "Sending {:?} '{}' with {} entr(ies), {} payload bytes",
                batch.packet_type(),
                batch.packet_name(),
                batch.len(),
                batch.payload_size()
            );
            self.exchange(connection, batch.to_packet(), operation)
        })?;
        Ok(())
    }

    pub fn delete_mesh(&self, global: bool, name: &str) -> NetworkResult<()> {
        let packet = PacketWriter::new(PacketType::delete_mesh(global), 0, Some(name));
        self.request(packet, "deleting mesh")
    }

    /// Upload a scatter: the material list under `{name}_m__`, then the
    /// instance transforms under `{name}_s__`. Both requests run under one
    /// lock.
    pub fn load_scatter(
        &self,
        scatter_name: &str,
        mesh_name: &str,
        transforms: &[Affine3A],
        shader_names: &[&str],
    ) -> NetworkResult<()> {
        let material_name = format!("{}_m__", scatter_name);
        let transform_name = format!("{}_s__", scatter_name);

        self.with_link(|connection| {
            let size = U64_SIZE
                + Protocol::string_field_len(mesh_name)
                + shader_names
                    .iter()
                    .map(|shader| Protocol::string_field_len(shader))
                    .sum::<u64>();
            let mut packet =
                PacketWriter::new(PacketType::LoadGeoMaterial, size, Some(&material_name));
            packet.write_u64(shader_names.len() as u64);
            packet.write_str(mesh_name);
            for shader in shader_names {
                packet.write_str(shader);
            }
            self.exchange(connection, packet, "loading materials of transform")?;

            let size = U64_SIZE
                + Protocol::string_field_len(&material_name)
                + MATRIX_3X4_SIZE * transforms.len() as u64;
            let mut packet =
                PacketWriter::new(PacketType::LoadGeoScatter, size, Some(&transform_name));
            packet.write_u64(transforms.len() as u64);
            packet.write_str(&material_name);
            for transform in transforms {
                packet.write_f32_slice(&affine_to_rows_3x4(transform));
            }
            self.exchange(connection, packet, "loading transform")
        })?;
        Ok(())
    }

    pub fn delete_scatter(&self, name: &str) -> NetworkResult<()> {
        let packet = PacketWriter::new(PacketType::DelGeoScatter, 0, Some(name));
        self.request(packet, "deleting transform")
    }

    pub fn delete_material(&self, name: &str) -> NetworkResult<()> {
        let packet = PacketWriter::new(PacketType::DelMaterial, 0, Some(name));
        self.request(packet, "deleting material")
    }

    /// Traffic counters of the live link
    pub fn stats(&self) -> Option<crate::network::ConnectionStats> {
        self.link.lock().as_ref().map(|connection| connection.stats().clone())
    }
}

impl std::fmt::Debug for RenderServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderServer")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.is_connected())
            .finish()
    }
}
