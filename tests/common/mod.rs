//! In-memory render server used by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use render_bridge::network::{PacketReader, PacketType, PacketWriter, Protocol, HEADER_SIZE};
use render_bridge::{Mesh, MeshType, RenderServer};

#[derive(Default)]
struct ServerState {
    pending: Vec<u8>,
    replies: VecDeque<u8>,
    received: Vec<Vec<u8>>,
    reject: Option<(PacketType, String)>,
}

/// Answers every complete request frame with an acknowledgement of the
/// same type, or with an error string for the rejected type
#[derive(Clone, Default)]
pub struct MockRenderServer {
    state: Arc<Mutex<ServerState>>,
}

impl MockRenderServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client connected to this mock
    pub fn client(&self) -> RenderServer {
        RenderServer::from_stream(self.clone())
    }

    /// Reply to `packet_type` requests with an error carrying `message`
    pub fn reject(&self, packet_type: PacketType, message: &str) {
        self.state.lock().reject = Some((packet_type, message.to_string()));
    }

    /// Every request received so far, decoded
    pub fn requests(&self) -> Vec<PacketReader> {
        self.state
            .lock()
            .received
            .iter()
            .map(|frame| PacketReader::from_frame(frame))
            .collect()
    }

    pub fn request_types(&self) -> Vec<PacketType> {
        self.requests().iter().map(PacketReader::packet_type).collect()
    }

    pub fn requests_of(&self, packet_type: PacketType) -> Vec<PacketReader> {
        self.requests()
            .into_iter()
            .filter(|request| request.packet_type() == packet_type)
            .collect()
    }

    pub fn clear(&self) {
        self.state.lock().received.clear();
    }

    /// Reply bytes queued but not yet read by the client
    pub fn unread_reply_len(&self) -> usize {
        self.state.lock().replies.len()
    }
}

fn reply_for(request_type: PacketType, reject: &Option<(PacketType, String)>) -> Vec<u8> {
    match reject {
        Some((rejected, message)) if *rejected == request_type => {
            let mut packet =
                PacketWriter::new(PacketType::Error, Protocol::string_field_len(message), None);
            packet.write_str(message);
            packet.into_frame()
        }
        _ => PacketWriter::new(request_type, 0, None).into_frame(),
    }
}

impl Write for MockRenderServer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.pending.extend_from_slice(buf);

        loop {
            if state.pending.len() < HEADER_SIZE {
                break;
            }
            let mut len_bytes = [0u8; 8];
            len_bytes.copy_from_slice(&state.pending[8..16]);
            let frame_len = HEADER_SIZE + u64::from_ne_bytes(len_bytes) as usize;
            if state.pending.len() < frame_len {
                break;
            }

            let frame: Vec<u8> = state.pending.drain(..frame_len).collect();
            let request_type = PacketReader::from_frame(&frame).packet_type();
            let reply = reply_for(request_type, &state.reject);
            state.replies.extend(reply);
            state.received.push(frame);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockRenderServer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let count = buf.len().min(state.replies.len());
        for (slot, byte) in buf.iter_mut().zip(state.replies.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Four-point square split into two triangles
pub fn square(name: &str, mesh_type: MeshType) -> Mesh {
    let mut mesh = Mesh::new(name).with_type(mesh_type);
    mesh.points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    mesh.normals = vec![Vec3::Z; 4];
    mesh.uvs = mesh.points.clone();
    mesh.add_polygon(&[0, 1, 2], &[0, 1, 2], 0);
    mesh.add_polygon(&[0, 2, 3], &[0, 2, 3], 0);
    mesh.used_shaders = vec![0];
    mesh
}

/// Skip the entry count and size block of a single-entry mesh packet and
/// return its points
pub fn read_single_entry_points(request: &mut PacketReader) -> Vec<Vec3> {
    assert_eq!(request.read_u64(), 1);
    let point_count = request.read_u64() as usize;
    for _ in 0..9 {
        request.read_u64();
    }
    request.read_vec3_buffer(point_count)
}
