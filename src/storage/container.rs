//! Store file framing.
//!
//! ```text
//! ┌──────────┬────────────┬──────────────────────┬────────────────────┐
//! │ MAGIC(8) │ len u32 LE │ ContainerHeader      │ compressed payload │
//! │          │            │ (bincode, len bytes) │                    │
//! └──────────┴────────────┴──────────────────────┴────────────────────┘
//! ```
//!
//! A container holds exactly one named entry. The checksum covers the
//! uncompressed payload.

use crc32fast::Hasher;
use serde::{Serialize, Deserialize};
use crate::compression::compress::{CompressedBlock, CompressionType};
use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::ENTRY_SUFFIX;

pub const MAGIC: &[u8; 8] = b"MHSSTORE";
pub const CONTAINER_VERSION: u32 = 1;
const MAX_HEADER_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerHeader {
    pub version: u32,
    pub entry_name: String,
    pub compression: CompressionType,
    pub checksum: u32,
    pub original_size: u64,
}

/// Decoded entry of a store container
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn encode(entry_name: &str, payload: &[u8], compression: CompressionType, level: i32) -> Result<Vec<u8>> {
    let block = CompressedBlock::compress(payload, compression, level)?;
    let header = ContainerHeader {
        version: CONTAINER_VERSION,
        entry_name: entry_name.to_string(),
        compression,
        checksum: checksum(payload),
        original_size: payload.len() as u64,
    };
    let header_data = bincode::serialize(&header)?;

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header_data.len() + block.data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(header_data.len() as u32).to_le_bytes());
    out.extend_from_slice(&header_data);
    out.extend_from_slice(&block.data);
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<StoreEntry> {
    let rest = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| malformed("not a store container".to_string()))?;

    if rest.len() < 4 {
        return Err(malformed("truncated container header".to_string()));
    }
    let (len_buf, rest) = rest.split_at(4);
    let header_len = u32::from_le_bytes([len_buf[0], len_buf[1], len_buf[2], len_buf[3]]) as usize;
    if header_len > MAX_HEADER_LEN || header_len > rest.len() {
        return Err(malformed(format!("bad container header length {}", header_len)));
    }
    let (header_buf, data) = rest.split_at(header_len);

    let header: ContainerHeader = bincode::deserialize(header_buf)
        .map_err(|e| malformed(format!("unreadable container header: {}", e)))?;
    if header.version != CONTAINER_VERSION {
        return Err(malformed(format!("unsupported container version {}", header.version)));
    }
    if !header.entry_name.ends_with(ENTRY_SUFFIX) {
        return Err(malformed(format!(
            "unexpected entry '{}', expected a name ending in '{}'",
            header.entry_name, ENTRY_SUFFIX
        )));
    }

    let original_size = usize::try_from(header.original_size)
        .map_err(|_| malformed("entry too large".to_string()))?;
    let payload = CompressedBlock::from_parts(data.to_vec(), original_size, header.compression).decompress()?;
    if checksum(&payload) != header.checksum {
        return Err(malformed(format!("checksum mismatch in entry '{}'", header.entry_name)));
    }

    Ok(StoreEntry {
        name: header.entry_name,
        payload,
    })
}

fn malformed(context: String) -> Error {
    Error::new(ErrorKind::MalformedStore, context)
}
