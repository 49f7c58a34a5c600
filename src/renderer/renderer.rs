// renderer/renderer.rs
use glam::{Mat4, Vec3};

use super::bucket::RenderBucket;
use super::lights::LightData;
use super::material::{Pass, PassId};
use super::queue::RenderQueue;
use super::range::PrimitiveRange;

/// Graphics backend that executes sorted render operations.
pub trait RenderBackend {
    /// Called once per render with the queue's lighting.
    fn set_lights(&mut self, _lights: &[LightData], _ambient: Vec3) {}

    /// Binds all GPU state of `pass`.
    fn apply_pass(&mut self, pass: &Pass);

    fn set_model_matrix(&mut self, transform: &Mat4);

    fn draw(&mut self, range: &PrimitiveRange);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub operations: usize,
    pub state_changes: usize,
    pub opaque_draws: usize,
    pub blended_draws: usize,
    /// Operations whose primitive range was empty.
    pub skipped: usize,
}

/// Walks a render queue in key order and feeds it to a backend.
#[derive(Debug, Default)]
pub struct Renderer {
    last_stats: RenderStats,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the opaque bucket, then the blended bucket.
    ///
    /// A pass is applied only when it differs from the one applied last, so
    /// runs of equal state in the opaque bucket cost a single bind. The queue
    /// keeps its operations; clearing it is up to the caller.
    pub fn render(&mut self, queue: &mut RenderQueue<'_>, backend: &mut impl RenderBackend) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut current = None;

        backend.set_lights(queue.lights(), queue.ambient_intensity());

        let opaque = render_bucket(queue.opaque_bucket_mut(), backend, &mut current, &mut stats);
        let blended = render_bucket(queue.blended_bucket_mut(), backend, &mut current, &mut stats);
        stats.opaque_draws = opaque;
        stats.blended_draws = blended;

        log::debug!(
            "Rendered {} operations ({} opaque, {} blended) with {} state changes",
            stats.operations,
            stats.opaque_draws,
            stats.blended_draws,
            stats.state_changes
        );

        self.last_stats = stats;
        stats
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }
}

fn render_bucket(
    bucket: &mut RenderBucket<'_>,
    backend: &mut impl RenderBackend,
    current: &mut Option<PassId>,
    stats: &mut RenderStats,
) -> usize {
    let mut draws = 0;

    for (_, op) in bucket.iter_sorted() {
        stats.operations += 1;
        if op.range.is_empty() {
            stats.skipped += 1;
            continue;
        }

        if *current != Some(op.state.id()) {
            backend.apply_pass(op.state);
            *current = Some(op.state.id());
            stats.state_changes += 1;
        }

        backend.set_model_matrix(&op.transform);
        backend.draw(&op.range);
        draws += 1;
    }

    draws
}
