// renderer/range.rs
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Identity of a GPU buffer, handed out by a [`BufferFactory`].
///
/// [`BufferFactory`]: crate::renderer::buffer::BufferFactory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u32);

impl BufferId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Marker for ranges of vertices.
#[derive(Debug)]
pub enum Vertices {}

/// Marker for ranges of indices.
#[derive(Debug)]
pub enum Indices {}

/// A contiguous range of elements within a buffer.
///
/// Ranges never own the buffer they point into. Ranges handed out by a
/// [`GeometryPool`] additionally carry the pool frame they were allocated in
/// and stop being valid once the pool is reset.
///
/// [`GeometryPool`]: crate::renderer::pool::GeometryPool
pub struct BufferRange<M> {
    buffer: Option<BufferId>,
    start: usize,
    count: usize,
    frame: u64,
    _marker: PhantomData<M>,
}

pub type VertexRange = BufferRange<Vertices>;
pub type IndexRange = BufferRange<Indices>;

// Manual impls so the marker type doesn't need to implement anything.
impl<M> Clone for BufferRange<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for BufferRange<M> {}

impl<M> PartialEq for BufferRange<M> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
            && self.start == other.start
            && self.count == other.count
            && self.frame == other.frame
    }
}

impl<M> Eq for BufferRange<M> {}

impl<M> Hash for BufferRange<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buffer.hash(state);
        self.start.hash(state);
        self.count.hash(state);
        self.frame.hash(state);
    }
}

impl<M> fmt::Debug for BufferRange<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferRange")
            .field("buffer", &self.buffer)
            .field("start", &self.start)
            .field("count", &self.count)
            .field("frame", &self.frame)
            .finish()
    }
}

impl<M> Default for BufferRange<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<M> BufferRange<M> {
    /// A range that references no buffer.
    pub const fn empty() -> Self {
        Self {
            buffer: None,
            start: 0,
            count: 0,
            frame: 0,
            _marker: PhantomData,
        }
    }

    /// A range into a buffer whose lifetime is managed by the caller.
    pub const fn new(buffer: BufferId, start: usize, count: usize) -> Self {
        Self {
            buffer: Some(buffer),
            start,
            count,
            frame: 0,
            _marker: PhantomData,
        }
    }

    pub(crate) const fn transient(buffer: BufferId, start: usize, count: usize, frame: u64) -> Self {
        Self {
            buffer: Some(buffer),
            start,
            count,
            frame,
            _marker: PhantomData,
        }
    }

    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The pool frame this range was allocated in, or `None` for ranges not
    /// handed out by a pool.
    pub fn frame(&self) -> Option<u64> {
        (self.frame != 0).then_some(self.frame)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    LineLoop,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// Geometry for a single draw: vertices, optionally indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrimitiveRange {
    pub primitive_type: PrimitiveType,
    pub vertices: VertexRange,
    pub indices: Option<IndexRange>,
    /// Added to every index before vertex lookup.
    pub base: usize,
}

impl PrimitiveRange {
    pub fn new(primitive_type: PrimitiveType, vertices: VertexRange) -> Self {
        Self {
            primitive_type,
            vertices,
            indices: None,
            base: 0,
        }
    }

    pub fn indexed(primitive_type: PrimitiveType, vertices: VertexRange, indices: IndexRange) -> Self {
        Self {
            primitive_type,
            vertices,
            indices: Some(indices),
            base: 0,
        }
    }

    pub fn with_base(mut self, base: usize) -> Self {
        self.base = base;
        self
    }

    /// Number of elements the draw consumes: indices when indexed,
    /// vertices otherwise.
    pub fn count(&self) -> usize {
        match self.indices {
            Some(indices) => indices.count(),
            None => self.vertices.count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_has_no_buffer() {
        let range = VertexRange::empty();
        assert!(range.is_empty());
        assert_eq!(range.buffer(), None);
        assert_eq!(range.frame(), None);
    }

    #[test]
    fn caller_owned_ranges_are_not_frame_stamped() {
        let range = IndexRange::new(BufferId::new(3), 12, 6);
        assert_eq!(range.frame(), None);
        assert_eq!(range.buffer(), Some(BufferId::new(3)));
    }

    #[test]
    fn indexed_primitive_counts_indices() {
        let vertices = VertexRange::new(BufferId::new(1), 0, 4);
        let indices = IndexRange::new(BufferId::new(2), 0, 6);
        let range = PrimitiveRange::indexed(PrimitiveType::TriangleList, vertices, indices);
        assert_eq!(range.count(), 6);
        assert!(!range.is_empty());

        let unindexed = PrimitiveRange::new(PrimitiveType::TriangleFan, vertices);
        assert_eq!(unindexed.count(), 4);
        assert!(PrimitiveRange::default().is_empty());
    }
}
