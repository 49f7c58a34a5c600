// renderer/renderable.rs
use glam::{Mat4, Vec3};

use super::buffer::BufferFactory;
use super::camera::Camera;
use super::material::Material;
use super::pool::GeometryPool;
use super::queue::RenderQueue;
use super::range::PrimitiveRange;

/// Everything a renderable needs to submit work for one frame.
pub struct EnqueueContext<'c, 'a, F: BufferFactory> {
    pub queue: &'c mut RenderQueue<'a>,
    pub pool: &'c mut GeometryPool<F>,
    pub camera: &'c Camera,
}

impl<'c, 'a, F: BufferFactory> EnqueueContext<'c, 'a, F> {
    pub fn new(queue: &'c mut RenderQueue<'a>, pool: &'c mut GeometryPool<F>, camera: &'c Camera) -> Self {
        Self { queue, pool, camera }
    }
}

/// Something that produces render operations.
pub trait Renderable<F: BufferFactory> {
    /// Queues the operations for drawing `self` with the given
    /// local-to-world transform.
    fn enqueue<'a>(&'a self, cx: &mut EnqueueContext<'_, 'a, F>, transform: &Mat4);
}

/// Geometry living in caller-owned buffers, drawn with one material.
#[derive(Debug, Clone)]
pub struct StaticMesh<'m> {
    pub range: PrimitiveRange,
    pub material: &'m Material,
    /// Local-space point used to compute the sort depth.
    pub center: Vec3,
}

impl<F: BufferFactory> Renderable<F> for StaticMesh<'_> {
    fn enqueue<'a>(&'a self, cx: &mut EnqueueContext<'_, 'a, F>, transform: &Mat4) {
        let depth = cx.camera.normalized_depth(transform.transform_point3(self.center));
        cx.queue
            .create_operations(*transform, self.range, self.material, depth);
    }
}
