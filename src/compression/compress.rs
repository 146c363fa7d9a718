use crate::core::error::{Error, ErrorKind, Result};
use serde::{Serialize, Deserialize};

/// Highest zstd level that does not need the "ultra" window settings
pub const MAX_PRACTICAL_ZSTD_LEVEL: i32 = 19;

/// Compressed payload of a store container
#[derive(Debug, Clone)]
pub struct CompressedBlock {
    pub data: Vec<u8>,
    pub original_size: usize,
    pub compression: CompressionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    None,
    LZ4,      // Fast, weaker ratio
    Zstd,     // Best ratio; default for store files
}

impl Default for CompressionType {
    fn default() -> Self {
        CompressionType::Zstd
    }
}

impl CompressedBlock {
    /// Compress raw bytes. `level` only applies to zstd.
    pub fn compress(data: &[u8], compression: CompressionType, level: i32) -> Result<Self> {
        let compressed = match compression {
            CompressionType::None => data.to_vec(),

            CompressionType::LZ4 => {
                lz4::block::compress(data, None, false)?
            }

            CompressionType::Zstd => {
                let level = level.clamp(1, MAX_PRACTICAL_ZSTD_LEVEL);
                zstd::encode_all(data, level)?
            }
        };

        Ok(CompressedBlock {
            data: compressed,
            original_size: data.len(),
            compression,
        })
    }

    /// Rebuild a block read back from a container
    pub fn from_parts(data: Vec<u8>, original_size: usize, compression: CompressionType) -> Self {
        CompressedBlock {
            data,
            original_size,
            compression,
        }
    }

    pub fn decompress(&self) -> Result<Vec<u8>> {
        let raw = match self.compression {
            CompressionType::None => self.data.clone(),

            CompressionType::LZ4 => {
                // LZ4 expands a block by at most 255x
                let bound = self.data.len().saturating_mul(255).saturating_add(16);
                if self.original_size > bound {
                    return Err(Error::new(
                        ErrorKind::MalformedStore,
                        format!("LZ4 block of {} bytes cannot hold {} bytes", self.data.len(), self.original_size),
                    ));
                }
                let size = i32::try_from(self.original_size).map_err(|_| {
                    Error::new(ErrorKind::MalformedStore, "LZ4 block too large".to_string())
                })?;
                lz4::block::decompress(&self.data, Some(size))
                    .map_err(|e| Error::new(ErrorKind::MalformedStore, e.to_string()))?
            }

            CompressionType::Zstd => {
                zstd::decode_all(&self.data[..])
                    .map_err(|e| Error::new(ErrorKind::MalformedStore, e.to_string()))?
            }
        };

        if raw.len() != self.original_size {
            return Err(Error::new(
                ErrorKind::MalformedStore,
                format!("expected {} bytes after decompression, got {}", self.original_size, raw.len()),
            ));
        }

        Ok(raw)
    }

    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            1.0
        } else {
            self.data.len() as f64 / self.original_size as f64
        }
    }
}
