// renderer/wgpu_buffer.rs
use super::buffer::{BufferError, BufferFactory, BufferUsage, GpuBuffer, IndexType};
use super::range::BufferId;
use super::vertex::VertexFormat;

/// Pool buffer backed by a `wgpu::Buffer`.
pub struct WgpuBuffer {
    id: BufferId,
    count: usize,
    buffer: wgpu::Buffer,
    queue: wgpu::Queue,
}

impl WgpuBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Byte slice of `count` elements of `element_size` bytes starting at
    /// element `start`, for binding a pool range in a render pass.
    pub fn slice(&self, start: usize, count: usize, element_size: usize) -> wgpu::BufferSlice<'_> {
        let begin = (start * element_size) as wgpu::BufferAddress;
        let end = begin + (count * element_size) as wgpu::BufferAddress;
        self.buffer.slice(begin..end)
    }
}

impl GpuBuffer for WgpuBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn count(&self) -> usize {
        self.count
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.is_empty() {
            return Ok(());
        }
        check_alignment(offset, bytes.len())?;
        self.queue.write_buffer(&self.buffer, offset, bytes);
        Ok(())
    }
}

/// Creates pool buffers on a wgpu device.
pub struct WgpuBufferFactory {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_id: u32,
}

impl WgpuBufferFactory {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            next_id: 0,
        }
    }

    fn create(
        &mut self,
        count: usize,
        element_size: usize,
        usage: wgpu::BufferUsages,
        label: &str,
    ) -> Result<WgpuBuffer, BufferError> {
        if count == 0 || element_size == 0 {
            return Err(BufferError::Empty);
        }

        let size = padded_size(count, element_size);
        let limit = self.device.limits().max_buffer_size;
        if size > limit {
            return Err(BufferError::ExceedsLimit { size, limit });
        }

        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| BufferError::Backend("buffer ids exhausted".into()))?;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(WgpuBuffer {
            id: BufferId::new(self.next_id),
            count,
            buffer,
            queue: self.queue.clone(),
        })
    }
}

impl BufferFactory for WgpuBufferFactory {
    type Buffer = WgpuBuffer;

    // wgpu has no usage hints; every pool buffer is a COPY_DST target.
    fn create_vertex_buffer(
        &mut self,
        count: usize,
        format: &VertexFormat,
        _usage: BufferUsage,
    ) -> Result<WgpuBuffer, BufferError> {
        self.create(count, format.stride(), wgpu::BufferUsages::VERTEX, "PoolVertexBuffer")
    }

    fn create_index_buffer(
        &mut self,
        count: usize,
        index_type: IndexType,
        _usage: BufferUsage,
    ) -> Result<WgpuBuffer, BufferError> {
        if index_type.to_wgpu().is_none() {
            return Err(BufferError::Backend(format!(
                "{index_type} indices are not supported by wgpu"
            )));
        }
        self.create(count, index_type.size(), wgpu::BufferUsages::INDEX, "PoolIndexBuffer")
    }
}

/// Buffer size in bytes, padded to the copy alignment.
fn padded_size(count: usize, element_size: usize) -> u64 {
    let bytes = (count as u64).saturating_mul(element_size as u64);
    bytes.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

fn check_alignment(offset: u64, len: usize) -> Result<(), BufferError> {
    let alignment = wgpu::COPY_BUFFER_ALIGNMENT;
    if offset % alignment != 0 || len as u64 % alignment != 0 {
        return Err(BufferError::Misaligned {
            offset,
            len,
            alignment,
        });
    }
    Ok(())
}
