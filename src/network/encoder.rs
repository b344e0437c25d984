//! Outgoing frame builder
//!
//! A `PacketWriter` is created with the exact payload size the caller is about
//! to append. The buffer is allocated once and never grows: an append that
//! does not fit is dropped and reported with `false`. Callers compute the
//! payload size from the same field list they append, so a dropped field is a
//! sizing bug on the sender side, never a reason to reallocate.

use glam::Vec3;

use super::packet::PacketType;
use super::protocol::{truncate_str, Protocol, HEADER_SIZE, MAX_NAME_LENGTH, MAX_STRING_LENGTH};

/// Builder for one outgoing frame
#[derive(Debug)]
pub struct PacketWriter {
    packet_type: PacketType,
    buffer: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl PacketWriter {
    /// Create a writer for `payload_size` bytes of typed fields, optionally
    /// prefixed with a name block.
    pub fn new(packet_type: PacketType, payload_size: u64, name: Option<&str>) -> Self {
        let name_block = name.map(Protocol::name_block_len).unwrap_or(0);
        let payload_len = payload_size as usize + name_block;
        let capacity = HEADER_SIZE + payload_len;

        let mut buffer = Vec::with_capacity(capacity);
        buffer.extend_from_slice(&packet_type.tag().to_ne_bytes());
        buffer.extend_from_slice(&(payload_len as u64).to_ne_bytes());

        if let Some(name) = name {
            let name = truncate_str(name, MAX_NAME_LENGTH);
            let block_start = buffer.len();
            buffer.push(name_block as u8);
            buffer.extend_from_slice(name.as_bytes());
            buffer.resize(block_start + name_block, 0);
        }

        Self {
            packet_type,
            buffer,
            capacity,
            dropped: 0,
        }
    }

    /// Packet type this writer frames
    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Bytes still available before the declared payload is full
    pub fn remaining(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Number of appends dropped for lack of capacity
    pub fn dropped_fields(&self) -> usize {
        self.dropped
    }

    fn append(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.remaining() {
            self.dropped += 1;
            return false;
        }
        self.buffer.extend_from_slice(bytes);
        true
    }

    pub fn write_f32(&mut self, value: f32) -> bool {
        self.append(&value.to_ne_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> bool {
        self.append(&value.to_ne_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> bool {
        self.append(&value.to_ne_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> bool {
        self.append(&value.to_ne_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> bool {
        self.append(&value.to_ne_bytes())
    }

    /// Booleans travel as a 32-bit 0/1 slot
    pub fn write_bool(&mut self, value: bool) -> bool {
        self.write_u32(value as u32)
    }

    pub fn write_vec3(&mut self, value: Vec3) -> bool {
        self.append(bytemuck::bytes_of(&value))
    }

    /// Length-prefixed, NUL-terminated string, truncated to 254 bytes
    pub fn write_str(&mut self, value: &str) -> bool {
        let value = truncate_str(value, MAX_STRING_LENGTH);
        if value.len() + 2 > self.remaining() {
            self.dropped += 1;
            return false;
        }
        self.buffer.push(value.len() as u8);
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
        true
    }

    /// Raw bytes, no length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) -> bool {
        self.append(bytes)
    }

    /// Packed f32 triples
    pub fn write_vec3_slice(&mut self, values: &[Vec3]) -> bool {
        self.append(bytemuck::cast_slice(values))
    }

    pub fn write_i32_slice(&mut self, values: &[i32]) -> bool {
        self.append(bytemuck::cast_slice(values))
    }

    pub fn write_f32_slice(&mut self, values: &[f32]) -> bool {
        self.append(bytemuck::cast_slice(values))
    }

    /// Finish the frame. An under-filled payload is zero-padded up to the
    /// declared length so the header stays truthful.
    pub fn into_frame(mut self) -> Vec<u8> {
        if self.dropped > 0 {
            log::warn!(
                "{:?} packet dropped {} field(s) that exceeded the declared payload",
                self.packet_type,
                self.dropped
            );
        }
        self.buffer.resize(self.capacity, 0);
        self.buffer
    }
}
