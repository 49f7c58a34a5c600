//! Fakes shared by the integration tests.
#![allow(dead_code)]

use glam::{Mat4, Vec3};
use render_queue::renderer::{
    BufferError, BufferFactory, BufferId, BufferUsage, GpuBuffer, IndexType, LightData, Pass,
    PassId, PrimitiveRange, RenderBackend, VertexFormat,
};

pub struct FakeBuffer {
    pub id: BufferId,
    pub count: usize,
    pub data: Vec<u8>,
    pub writes: usize,
}

impl GpuBuffer for FakeBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn count(&self) -> usize {
        self.count
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), BufferError> {
        if offset % 4 != 0 || bytes.len() % 4 != 0 {
            return Err(BufferError::Misaligned {
                offset,
                len: bytes.len(),
                alignment: 4,
            });
        }
        let offset = offset as usize;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

/// Factory that records every creation and can be told to fail.
#[derive(Default)]
pub struct FakeFactory {
    pub next_id: u32,
    pub created: Vec<usize>,
    pub fail: bool,
}

impl FakeFactory {
    fn create(&mut self, count: usize, element_size: usize) -> Result<FakeBuffer, BufferError> {
        if self.fail {
            return Err(BufferError::Backend("device lost".into()));
        }
        self.next_id += 1;
        self.created.push(count);
        Ok(FakeBuffer {
            id: BufferId::new(self.next_id),
            count,
            data: vec![0; count * element_size],
            writes: 0,
        })
    }
}

impl BufferFactory for FakeFactory {
    type Buffer = FakeBuffer;

    fn create_vertex_buffer(
        &mut self,
        count: usize,
        format: &VertexFormat,
        _usage: BufferUsage,
    ) -> Result<FakeBuffer, BufferError> {
        self.create(count, format.stride())
    }

    fn create_index_buffer(
        &mut self,
        count: usize,
        index_type: IndexType,
        _usage: BufferUsage,
    ) -> Result<FakeBuffer, BufferError> {
        self.create(count, index_type.size())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub pass: PassId,
    pub blending: bool,
    pub transform: Mat4,
    pub range: PrimitiveRange,
}

/// Backend that records draws along with the pass bound at the time.
#[derive(Default)]
pub struct RecordingBackend {
    pub lights: usize,
    pub ambient: Vec3,
    pub applied: Vec<PassId>,
    pub draws: Vec<Draw>,
    current: Option<(PassId, bool)>,
    transform: Mat4,
}

impl RenderBackend for RecordingBackend {
    fn set_lights(&mut self, lights: &[LightData], ambient: Vec3) {
        self.lights = lights.len();
        self.ambient = ambient;
    }

    fn apply_pass(&mut self, pass: &Pass) {
        self.applied.push(pass.id());
        self.current = Some((pass.id(), pass.is_blending()));
    }

    fn set_model_matrix(&mut self, transform: &Mat4) {
        self.transform = *transform;
    }

    fn draw(&mut self, range: &PrimitiveRange) {
        let (pass, blending) = self.current.expect("draw without an applied pass");
        self.draws.push(Draw {
            pass,
            blending,
            transform: self.transform,
            range: *range,
        });
    }
}
