// renderer/key.rs
//! Packed sort keys for render operations.
//!
//! Layout, most significant bits first:
//!
//! | bits  | field | meaning                                   |
//! |-------|-------|-------------------------------------------|
//! | 63-56 | layer | pass order within a material              |
//! | 55-40 | state | pass id, zero for blended keys            |
//! | 39-16 | depth | quantized depth, reversed for blended keys |
//! | 15-0  | index | position of the operation in its bucket   |
//!
//! Comparing two keys as plain integers therefore yields draw order.

const INDEX_SHIFT: u32 = 0;
const DEPTH_SHIFT: u32 = 16;
const STATE_SHIFT: u32 = 40;
const LAYER_SHIFT: u32 = 56;

const INDEX_MASK: u64 = 0xffff;
const DEPTH_MASK: u64 = 0xff_ffff;
const STATE_MASK: u64 = 0xffff;
const LAYER_MASK: u64 = 0xff;

/// Largest quantized depth value (24 bits).
pub const MAX_DEPTH: u32 = (1 << 24) - 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderOpKey(u64);

impl RenderOpKey {
    /// Key for an opaque operation: sorted by layer, then by state to keep
    /// equal-state runs together, then front to back.
    ///
    /// `depth` is clamped to `[0, 1]`; NaN is treated as zero.
    pub fn opaque(layer: u8, state: u16, depth: f32) -> Self {
        Self::pack(layer, state, quantize_depth(clamp_depth(depth)), 0)
    }

    /// Key for a blended operation: sorted by layer, then back to front.
    ///
    /// Blended operations cannot be regrouped by state without breaking
    /// compositing, so the state field stays zero.
    pub fn blended(layer: u8, depth: f32) -> Self {
        Self::pack(layer, 0, quantize_depth(1.0 - clamp_depth(depth)), 0)
    }

    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn layer(self) -> u8 {
        ((self.0 >> LAYER_SHIFT) & LAYER_MASK) as u8
    }

    pub const fn state(self) -> u16 {
        ((self.0 >> STATE_SHIFT) & STATE_MASK) as u16
    }

    pub const fn depth(self) -> u32 {
        ((self.0 >> DEPTH_SHIFT) & DEPTH_MASK) as u32
    }

    pub const fn index(self) -> u16 {
        ((self.0 >> INDEX_SHIFT) & INDEX_MASK) as u16
    }

    /// Returns a copy of this key pointing at operation `index`.
    pub const fn with_index(self, index: u16) -> Self {
        Self((self.0 & !(INDEX_MASK << INDEX_SHIFT)) | ((index as u64) << INDEX_SHIFT))
    }

    const fn pack(layer: u8, state: u16, depth: u32, index: u16) -> Self {
        Self(
            ((layer as u64) << LAYER_SHIFT)
                | ((state as u64) << STATE_SHIFT)
                | (((depth as u64) & DEPTH_MASK) << DEPTH_SHIFT)
                | ((index as u64) << INDEX_SHIFT),
        )
    }
}

impl From<RenderOpKey> for u64 {
    fn from(key: RenderOpKey) -> Self {
        key.0
    }
}

fn clamp_depth(depth: f32) -> f32 {
    if depth.is_nan() {
        0.0
    } else {
        depth.clamp(0.0, 1.0)
    }
}

fn quantize_depth(depth: f32) -> u32 {
    (MAX_DEPTH as f32 * depth) as u32
}
