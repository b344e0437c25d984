//! Incoming frame reader
//!
//! Decoding is best-effort. A short header or body yields an empty packet of
//! type `None`; every extractor that runs past the end of the payload returns
//! a zero or empty fallback instead of failing.

use std::io::Read;

use glam::Vec3;

use super::packet::PacketType;
use super::protocol::HEADER_SIZE;

/// One received frame with a read cursor over its payload
#[derive(Debug, Clone)]
pub struct PacketReader {
    packet_type: PacketType,
    raw_type: u64,
    payload: Vec<u8>,
    name: Option<String>,
    cursor: usize,
}

impl PacketReader {
    fn empty() -> Self {
        Self {
            packet_type: PacketType::None,
            raw_type: 0,
            payload: Vec::new(),
            name: None,
            cursor: 0,
        }
    }

    /// Read exactly one frame from the stream
    pub fn read_from<R: Read + ?Sized>(stream: &mut R) -> Self {
        let mut header = [0u8; HEADER_SIZE];
        if let Err(e) = stream.read_exact(&mut header) {
            log::debug!("Short read on frame header: {}", e);
            return Self::empty();
        }

        let (raw_type, payload_len) = split_header(&header);
        // the declared length is untrusted; grow the buffer only as bytes arrive
        let mut payload = Vec::new();
        if let Err(e) = stream.take(payload_len).read_to_end(&mut payload) {
            log::debug!("Failed reading {} byte frame body: {}", payload_len, e);
            return Self::empty();
        }
        if payload.len() as u64 != payload_len {
            log::debug!(
                "Short read on frame body: {} of {} bytes",
                payload.len(),
                payload_len
            );
            return Self::empty();
        }

        Self::from_parts(raw_type, payload)
    }

    /// Parse a complete frame held in memory
    pub fn from_frame(frame: &[u8]) -> Self {
        if frame.len() < HEADER_SIZE {
            return Self::empty();
        }
        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&frame[..HEADER_SIZE]);
        let (raw_type, payload_len) = split_header(&header);

        let body = &frame[HEADER_SIZE..];
        match usize::try_from(payload_len) {
            Ok(len) if len <= body.len() => Self::from_parts(raw_type, body[..len].to_vec()),
            _ => Self::empty(),
        }
    }

    fn from_parts(raw_type: u64, payload: Vec<u8>) -> Self {
        let packet_type = PacketType::from_tag(raw_type);
        let mut reader = Self {
            packet_type,
            raw_type,
            payload,
            name: None,
            cursor: 0,
        };

        if packet_type.is_named() && !reader.payload.is_empty() {
            let block_len = reader.payload[0] as usize;
            let block_end = block_len.min(reader.payload.len());
            let name_bytes = reader.payload.get(1..block_end).unwrap_or(&[]);
            let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
            reader.name = Some(String::from_utf8_lossy(&name_bytes[..name_end]).into_owned());
            reader.cursor = block_end;
        }

        reader
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Tag as it appeared on the wire, including unknown values
    pub fn raw_type(&self) -> u64 {
        self.raw_type
    }

    /// Entity name for named packet types
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Payload length as declared by the header
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.cursor.checked_add(N)?;
        let bytes = self.payload.get(self.cursor..end)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.cursor = end;
        Some(out)
    }

    pub fn read_f32(&mut self) -> f32 {
        self.take::<4>().map(f32::from_ne_bytes).unwrap_or(0.0)
    }

    pub fn read_f64(&mut self) -> f64 {
        self.take::<8>().map(f64::from_ne_bytes).unwrap_or(0.0)
    }

    pub fn read_u32(&mut self) -> u32 {
        self.take::<4>().map(u32::from_ne_bytes).unwrap_or(0)
    }

    pub fn read_i32(&mut self) -> i32 {
        self.take::<4>().map(i32::from_ne_bytes).unwrap_or(0)
    }

    pub fn read_u64(&mut self) -> u64 {
        self.take::<8>().map(u64::from_ne_bytes).unwrap_or(0)
    }

    pub fn read_bool(&mut self) -> bool {
        self.take::<4>().map(|b| u32::from_ne_bytes(b) != 0).unwrap_or(false)
    }

    pub fn read_vec3(&mut self) -> Vec3 {
        Vec3::new(self.read_f32(), self.read_f32(), self.read_f32())
    }

    /// Length-prefixed string. Returns an empty string when the declared
    /// length runs past the payload; the length byte is still consumed.
    pub fn read_string(&mut self) -> String {
        let Some([len]) = self.take::<1>() else {
            return String::new();
        };
        let len = len as usize;
        let start = self.cursor;
        let end = start + len + 1;
        if end > self.payload.len() {
            return String::new();
        }
        self.cursor = end;
        String::from_utf8_lossy(&self.payload[start..start + len]).into_owned()
    }

    /// Raw bytes without a length prefix
    pub fn read_bytes(&mut self, len: usize) -> Option<&[u8]> {
        let start = self.cursor;
        let end = start.checked_add(len)?;
        if end > self.payload.len() {
            return None;
        }
        self.cursor = end;
        Some(&self.payload[start..end])
    }

    /// `count` packed f32 triples
    pub fn read_vec3_buffer(&mut self, count: usize) -> Vec<Vec3> {
        match count.checked_mul(12).and_then(|len| self.read_bytes(len)) {
            Some(bytes) => bytemuck::pod_collect_to_vec(bytes),
            None => Vec::new(),
        }
    }

    pub fn read_i32_buffer(&mut self, count: usize) -> Vec<i32> {
        match count.checked_mul(4).and_then(|len| self.read_bytes(len)) {
            Some(bytes) => bytemuck::pod_collect_to_vec(bytes),
            None => Vec::new(),
        }
    }

    pub fn read_f32_buffer(&mut self, count: usize) -> Vec<f32> {
        match count.checked_mul(4).and_then(|len| self.read_bytes(len)) {
            Some(bytes) => bytemuck::pod_collect_to_vec(bytes),
            None => Vec::new(),
        }
    }
}

fn split_header(header: &[u8; HEADER_SIZE]) -> (u64, u64) {
    let mut type_bytes = [0u8; 8];
    let mut len_bytes = [0u8; 8];
    type_bytes.copy_from_slice(&header[0..8]);
    len_bytes.copy_from_slice(&header[8..16]);
    (u64::from_ne_bytes(type_bytes), u64::from_ne_bytes(len_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::encoder::PacketWriter;
    use crate::network::protocol::{Protocol, GLOBAL_MESH_NAME};
    use std::io::Cursor;

    #[test]
    fn test_round_trip_all_field_types() {
        let long = "s".repeat(255);
        let max = "m".repeat(254);
        let size = 4 + 8 + 4 + 4 + 8 + 4 + 4 + 12
            + Protocol::string_field_len("")
            + Protocol::string_field_len(&max)
            + Protocol::string_field_len(&long)
            + 24
            + 8;

        let mut writer = PacketWriter::new(PacketType::LoadKernel, size, None);
        writer.write_f32(1.5);
        writer.write_f64(-2.25);
        writer.write_u32(7);
        writer.write_i32(-9);
        writer.write_u64(u64::MAX - 1);
        writer.write_bool(true);
        writer.write_bool(false);
        writer.write_vec3(Vec3::new(1.0, 2.0, 3.0));
        writer.write_str("");
        writer.write_str(&max);
        writer.write_str(&long);
        writer.write_vec3_slice(&[Vec3::X, Vec3::Y]);
        writer.write_i32_slice(&[4, -5]);
        assert_eq!(writer.remaining(), 0);
        assert_eq!(writer.dropped_fields(), 0);

        let frame = writer.into_frame();
        let mut reader = PacketReader::read_from(&mut Cursor::new(frame));

        assert_eq!(reader.packet_type(), PacketType::LoadKernel);
        assert_eq!(reader.name(), None);
        assert_eq!(reader.read_f32(), 1.5);
        assert_eq!(reader.read_f64(), -2.25);
        assert_eq!(reader.read_u32(), 7);
        assert_eq!(reader.read_i32(), -9);
        assert_eq!(reader.read_u64(), u64::MAX - 1);
        assert!(reader.read_bool());
        assert!(!reader.read_bool());
        assert_eq!(reader.read_vec3(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(reader.read_string(), "");
        assert_eq!(reader.read_string(), max);
        assert_eq!(reader.read_string(), max.replace('m', "s"));
        assert_eq!(reader.read_vec3_buffer(2), vec![Vec3::X, Vec3::Y]);
        assert_eq!(reader.read_i32_buffer(2), vec![4, -5]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_named_packet_exposes_name() {
        let mut writer = PacketWriter::new(PacketType::LoadGlobalMesh, 8, Some(GLOBAL_MESH_NAME));
        writer.write_u64(2);
        let mut reader = PacketReader::from_frame(&writer.into_frame());

        assert_eq!(reader.name(), Some(GLOBAL_MESH_NAME));
        assert_eq!(reader.read_u64(), 2);
    }

    #[test]
    fn test_name_ignored_outside_named_range() {
        let mut writer = PacketWriter::new(PacketType::Reset, 4, Some("ignored"));
        writer.write_u32(1);
        let reader = PacketReader::from_frame(&writer.into_frame());
        assert_eq!(reader.name(), None);
        // the block is left in the payload for the caller to skip
        assert_eq!(reader.remaining(), Protocol::name_block_len("ignored") + 4);
    }

    #[test]
    fn test_short_header_is_none() {
        let mut reader = PacketReader::read_from(&mut Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(reader.packet_type(), PacketType::None);
        assert_eq!(reader.payload_len(), 0);
        assert_eq!(reader.read_u64(), 0);
        assert_eq!(reader.read_string(), "");
    }

    #[test]
    fn test_short_body_is_none() {
        let mut frame = PacketWriter::new(PacketType::Update, 16, None).into_frame();
        frame.truncate(HEADER_SIZE + 4);
        let reader = PacketReader::read_from(&mut Cursor::new(frame.clone()));
        assert_eq!(reader.packet_type(), PacketType::None);
        let reader = PacketReader::from_frame(&frame);
        assert_eq!(reader.packet_type(), PacketType::None);
    }

    #[test]
    fn test_oversized_length_is_none() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&PacketType::Error.tag().to_ne_bytes());
        frame.extend_from_slice(&u64::MAX.to_ne_bytes());
        frame.extend_from_slice(&[5, b'b', b'o', b'o', b'm', b'!', 0]);

        let mut reader = PacketReader::read_from(&mut Cursor::new(frame));
        assert_eq!(reader.packet_type(), PacketType::None);
        assert_eq!(reader.raw_type(), 0);
        assert_eq!(reader.read_string(), "");
    }

    #[test]
    fn test_buffer_count_overflow_is_empty() {
        let mut writer = PacketWriter::new(PacketType::LoadLocalMesh, 12, None);
        writer.write_vec3(Vec3::ONE);
        let mut reader = PacketReader::from_frame(&writer.into_frame());

        assert!(reader.read_vec3_buffer(usize::MAX).is_empty());
        assert!(reader.read_i32_buffer(usize::MAX).is_empty());
        assert!(reader.read_f32_buffer(usize::MAX / 2).is_empty());
        assert_eq!(reader.read_vec3(), Vec3::ONE);
    }

    #[test]
    fn test_extractors_fall_back_past_end() {
        let mut writer = PacketWriter::new(PacketType::Error, 2, None);
        writer.write_bytes(&[200, b'x']);
        let mut reader = PacketReader::from_frame(&writer.into_frame());

        // declared 200 bytes, only one present
        assert_eq!(reader.read_string(), "");
        assert_eq!(reader.read_u32(), 0);
        assert_eq!(reader.read_f64(), 0.0);
        assert!(!reader.read_bool());
        assert!(reader.read_bytes(2).is_none());
        assert!(reader.read_vec3_buffer(1).is_empty());
    }

    #[test]
    fn test_unknown_type_keeps_raw_tag() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&999u64.to_ne_bytes());
        frame.extend_from_slice(&0u64.to_ne_bytes());
        let reader = PacketReader::from_frame(&frame);
        assert_eq!(reader.packet_type(), PacketType::None);
        assert_eq!(reader.raw_type(), 999);
    }
}
