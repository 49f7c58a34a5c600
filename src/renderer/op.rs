// renderer/op.rs
use glam::Mat4;

use super::material::Pass;
use super::range::PrimitiveRange;

/// A single draw: geometry, the state to draw it with, and a local-to-world
/// transform.
///
/// The pass is borrowed, so materials must outlive the queue holding the
/// operation. Leave `transform` at identity for geometry already in world
/// space.
#[derive(Debug, Clone, Copy)]
pub struct RenderOp<'a> {
    pub range: PrimitiveRange,
    pub state: &'a Pass,
    pub transform: Mat4,
}

impl<'a> RenderOp<'a> {
    pub fn new(range: PrimitiveRange, state: &'a Pass, transform: Mat4) -> Self {
        Self {
            range,
            state,
            transform,
        }
    }
}
