// renderer/buffer.rs
//! Seam between the geometry pool and the graphics backend.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::range::BufferId;
use super::vertex::VertexFormat;

/// How often buffer contents are expected to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferUsage {
    /// Specified once, used many times.
    Static,
    /// Specified once, used a few times.
    Stream,
    /// Respecified and reused repeatedly.
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    /// Size of one index in bytes.
    pub const fn size(self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }

    /// wgpu has no 8-bit index format.
    pub fn to_wgpu(self) -> Option<wgpu::IndexFormat> {
        match self {
            IndexType::U8 => None,
            IndexType::U16 => Some(wgpu::IndexFormat::Uint16),
            IndexType::U32 => Some(wgpu::IndexFormat::Uint32),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexType::U8 => f.write_str("u8"),
            IndexType::U16 => f.write_str("u16"),
            IndexType::U32 => f.write_str("u32"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("cannot create a buffer with zero elements")]
    Empty,
    #[error("buffer of {size} bytes exceeds the device limit of {limit} bytes")]
    ExceedsLimit { size: u64, limit: u64 },
    #[error("write of {len} bytes at offset {offset} is not {alignment}-byte aligned")]
    Misaligned { offset: u64, len: usize, alignment: u64 },
    #[error("requested {requested} elements but the buffer holds {actual}")]
    Undersized { requested: usize, actual: usize },
    #[error("backend failed to create buffer: {0}")]
    Backend(String),
}

/// A GPU buffer owned by a geometry pool.
pub trait GpuBuffer {
    fn id(&self) -> BufferId;

    /// Capacity in elements (vertices or indices).
    fn count(&self) -> usize;

    /// Uploads `bytes` starting at byte `offset`.
    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), BufferError>;
}

/// Creates the buffers a geometry pool grows into.
pub trait BufferFactory {
    type Buffer: GpuBuffer;

    fn create_vertex_buffer(
        &mut self,
        count: usize,
        format: &VertexFormat,
        usage: BufferUsage,
    ) -> Result<Self::Buffer, BufferError>;

    fn create_index_buffer(
        &mut self,
        count: usize,
        index_type: IndexType,
        usage: BufferUsage,
    ) -> Result<Self::Buffer, BufferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_sizes() {
        assert_eq!(IndexType::U8.size(), 1);
        assert_eq!(IndexType::U16.size(), 2);
        assert_eq!(IndexType::U32.size(), 4);
    }

    #[test]
    fn u8_indices_have_no_wgpu_format() {
        assert_eq!(IndexType::U8.to_wgpu(), None);
        assert_eq!(IndexType::U32.to_wgpu(), Some(wgpu::IndexFormat::Uint32));
    }

    #[test]
    fn usage_deserializes_from_snake_case() {
        let usage: BufferUsage = serde_json::from_str("\"stream\"").unwrap();
        assert_eq!(usage, BufferUsage::Stream);
    }
}
