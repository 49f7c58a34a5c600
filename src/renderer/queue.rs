// renderer/queue.rs
use glam::{Mat4, Vec3};

use super::bucket::RenderBucket;
use super::key::RenderOpKey;
use super::lights::LightData;
use super::material::{Material, RenderPhase};
use super::op::RenderOp;
use super::range::PrimitiveRange;
use crate::settings::RenderSettings;

/// Per-frame submission surface: an opaque and a blended bucket plus the
/// lighting for the current phase.
///
/// Operations borrow the passes they draw with, so materials must outlive
/// the queue (or at least the next [`remove_operations`]). The owner must
/// call [`remove_operations`] once the frame has been rendered; stale
/// operations would otherwise be sorted into the next frame.
///
/// [`remove_operations`]: RenderQueue::remove_operations
#[derive(Debug)]
pub struct RenderQueue<'a> {
    phase: RenderPhase,
    opaque: RenderBucket<'a>,
    blended: RenderBucket<'a>,
    lights: Vec<LightData>,
    ambient: Vec3,
}

impl<'a> RenderQueue<'a> {
    pub fn new(phase: RenderPhase) -> Self {
        Self {
            phase,
            opaque: RenderBucket::new(),
            blended: RenderBucket::new(),
            lights: Vec::new(),
            ambient: Vec3::ZERO,
        }
    }

    pub fn with_settings(phase: RenderPhase, settings: &RenderSettings) -> Self {
        Self {
            phase,
            opaque: RenderBucket::with_capacity(settings.bucket_capacity),
            blended: RenderBucket::with_capacity(settings.bucket_capacity),
            lights: Vec::new(),
            ambient: Vec3::ZERO,
        }
    }

    /// Places an already built operation in the bucket matching its pass.
    ///
    /// `depth` is the normalized view depth in `[0, 1]`; out of range values
    /// are clamped. Returns `false` if the bucket was full.
    pub fn add_operation(&mut self, operation: RenderOp<'a>, depth: f32, layer: u8) -> bool {
        if operation.state.is_blending() {
            let key = RenderOpKey::blended(layer, depth);
            self.blended.add_operation(operation, key)
        } else {
            let key = RenderOpKey::opaque(layer, operation.state.id().get(), depth);
            self.opaque.add_operation(operation, key)
        }
    }

    /// Queues one operation per pass of the material's technique for the
    /// current phase.
    ///
    /// Passes get increasing layers so they draw in declared order relative
    /// to each other. Each pass is bucketed by its own blending state, so a
    /// technique may mix opaque and blended passes. Returns the number of
    /// operations queued.
    pub fn create_operations(
        &mut self,
        transform: Mat4,
        range: PrimitiveRange,
        material: &'a Material,
        depth: f32,
    ) -> usize {
        let passes = material.technique(self.phase).passes();
        if passes.len() > usize::from(u8::MAX) + 1 {
            log::warn!(
                "Material '{}' has {} passes, only the first {} are queued",
                material.name,
                passes.len(),
                usize::from(u8::MAX) + 1
            );
        }

        let mut queued = 0;
        for (layer, pass) in (0..=u8::MAX).zip(passes) {
            let operation = RenderOp::new(range, pass, transform);
            if self.add_operation(operation, depth, layer) {
                queued += 1;
            }
        }
        queued
    }

    /// Clears both buckets. Lights and ambient intensity are kept.
    pub fn remove_operations(&mut self) {
        self.opaque.remove_operations();
        self.blended.remove_operations();
    }

    pub fn add_light(&mut self, light: LightData) {
        self.lights.push(light);
    }

    pub fn remove_lights(&mut self) {
        self.lights.clear();
    }

    /// Lights in insertion order; no priority is implied.
    pub fn lights(&self) -> &[LightData] {
        &self.lights
    }

    pub fn ambient_intensity(&self) -> Vec3 {
        self.ambient
    }

    pub fn set_ambient_intensity(&mut self, intensity: Vec3) {
        self.ambient = intensity;
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Affects subsequent [`create_operations`](Self::create_operations)
    /// calls only.
    pub fn set_phase(&mut self, phase: RenderPhase) {
        self.phase = phase;
    }

    pub fn opaque_bucket(&self) -> &RenderBucket<'a> {
        &self.opaque
    }

    pub fn opaque_bucket_mut(&mut self) -> &mut RenderBucket<'a> {
        &mut self.opaque
    }

    pub fn blended_bucket(&self) -> &RenderBucket<'a> {
        &self.blended
    }

    pub fn blended_bucket_mut(&mut self) -> &mut RenderBucket<'a> {
        &mut self.blended
    }

    pub fn operation_count(&self) -> usize {
        self.opaque.len() + self.blended.len()
    }
}

impl Default for RenderQueue<'_> {
    fn default() -> Self {
        Self::new(RenderPhase::Default)
    }
}
