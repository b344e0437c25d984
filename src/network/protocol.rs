use std::time::Duration;

/// Default render server port
pub const DEFAULT_SERVER_PORT: u16 = 5130;

/// Default connect timeout used when resolving and dialing the server
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Frame header: packet type then payload length, both native-endian u64
pub const HEADER_SIZE: usize = std::mem::size_of::<u64>() * 2;

/// Wire limits
pub const MAX_NAME_LENGTH: usize = 245;
pub const MAX_STRING_LENGTH: usize = 254;

/// Name block and payload alignment
pub const NAME_BLOCK_ALIGN: usize = std::mem::size_of::<u64>();

/// Reserved identity of the merged world-space mesh
pub const GLOBAL_MESH_NAME: &str = "__global";

/// Field sizes as they appear on the wire
pub const F32_SIZE: u64 = 4;
pub const U32_SIZE: u64 = 4;
pub const I32_SIZE: u64 = 4;
pub const U64_SIZE: u64 = 8;
pub const BOOL_SIZE: u64 = 4;
pub const VEC3_SIZE: u64 = F32_SIZE * 3;
pub const MATRIX_3X4_SIZE: u64 = F32_SIZE * 12;

/// Protocol helpers shared by the encoder and the request builders
pub struct Protocol;

impl Protocol {
    /// Length of the name block for a name, including the length byte,
    /// the terminator and the padding. The remote reader skips the block
    /// with a single read of this value.
    pub fn name_block_len(name: &str) -> usize {
        let name_len = truncate_str(name, MAX_NAME_LENGTH).len();
        let block = name_len + 2;
        block + NAME_BLOCK_ALIGN - block % NAME_BLOCK_ALIGN
    }

    /// Bytes a length-prefixed string occupies on the wire
    pub fn string_field_len(value: &str) -> u64 {
        truncate_str(value, MAX_STRING_LENGTH).len() as u64 + 2
    }

    /// Validate an entity name before it goes on the wire. Long names are
    /// accepted; the name block and string fields truncate them.
    pub fn validate_entity_name(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err("Entity name cannot be empty".to_string());
        }

        if name.as_bytes().contains(&0) {
            return Err("Entity name cannot contain NUL bytes".to_string());
        }

        Ok(())
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence
pub(crate) fn truncate_str(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
