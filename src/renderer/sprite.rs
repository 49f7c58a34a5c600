// renderer/sprite.rs
use glam::{Mat4, Vec2, Vec3};

use super::buffer::{BufferFactory, IndexType};
use super::material::Material;
use super::range::{PrimitiveRange, PrimitiveType};
use super::renderable::{EnqueueContext, Renderable};
use super::vertex::SpriteVertex;

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Camera-facing quad whose geometry is rebuilt from the geometry pool
/// every frame.
#[derive(Debug, Clone)]
pub struct Sprite<'m> {
    pub material: &'m Material,
    pub size: Vec2,
}

impl<'m> Sprite<'m> {
    pub fn new(material: &'m Material, size: Vec2) -> Self {
        Self { material, size }
    }

    /// World-space corners facing `eye`, counter-clockwise from bottom left.
    pub fn vertices(&self, center: Vec3, eye: Vec3, up: Vec3) -> [SpriteVertex; 4] {
        let to_eye = (eye - center).normalize_or(Vec3::Z);
        let right = up.cross(to_eye).normalize_or(Vec3::X);
        let up = to_eye.cross(right);

        let half_right = right * (self.size.x * 0.5);
        let half_up = up * (self.size.y * 0.5);

        let corner = |offset: Vec3, uv: [f32; 2]| SpriteVertex {
            pos: (center + offset).to_array(),
            uv,
        };

        [
            corner(-half_right - half_up, [0.0, 1.0]),
            corner(half_right - half_up, [1.0, 1.0]),
            corner(half_right + half_up, [1.0, 0.0]),
            corner(-half_right + half_up, [0.0, 0.0]),
        ]
    }
}

impl<F: BufferFactory> Renderable<F> for Sprite<'_> {
    fn enqueue<'a>(&'a self, cx: &mut EnqueueContext<'_, 'a, F>, transform: &Mat4) {
        let vertex_range = match cx.pool.allocate_vertices(4, &SpriteVertex::format()) {
            Ok(range) => range,
            Err(err) => {
                log::warn!("Skipping sprite '{}': {}", self.material.name, err);
                return;
            }
        };
        let index_range = match cx.pool.allocate_indices(QUAD_INDICES.len(), IndexType::U16) {
            Ok(range) => range,
            Err(err) => {
                log::warn!("Skipping sprite '{}': {}", self.material.name, err);
                return;
            }
        };

        let center = transform.transform_point3(Vec3::ZERO);
        let vertices = self.vertices(center, cx.camera.eye, cx.camera.up);

        let written = cx
            .pool
            .write_vertices(&vertex_range, &vertices)
            .and_then(|()| cx.pool.write_indices(&index_range, &QUAD_INDICES));
        if let Err(err) = written {
            log::warn!("Failed to upload sprite '{}': {}", self.material.name, err);
            return;
        }

        let range = PrimitiveRange::indexed(PrimitiveType::TriangleList, vertex_range, index_range)
            .with_base(vertex_range.start());
        let depth = cx.camera.normalized_depth(center);

        // Corners are already in world space.
        cx.queue
            .create_operations(Mat4::IDENTITY, range, self.material, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_faces_the_eye() {
        let material = Material::new("spark");
        let sprite = Sprite::new(&material, Vec2::new(2.0, 1.0));
        let verts = sprite.vertices(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), Vec3::Y);

        for v in &verts {
            assert!(v.pos[2].abs() < 1e-6, "quad must lie in the plane facing +Z");
        }
        assert_eq!(verts[0].pos, [-1.0, -0.5, 0.0]);
        assert_eq!(verts[2].pos, [1.0, 0.5, 0.0]);
    }
}
