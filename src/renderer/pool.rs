// renderer/pool.rs
//! Frame-scoped vertex and index allocation.
//!
//! The pool hands out ranges carved from a growing list of buffer slots.
//! Nothing is ever freed individually: [`GeometryPool::reset_frame`] makes
//! every slot fully available again and invalidates all ranges handed out
//! before it.
use bytemuck::Pod;
use std::fmt;
use thiserror::Error;

use super::buffer::{BufferError, BufferFactory, BufferUsage, GpuBuffer, IndexType};
use super::range::{BufferId, BufferRange, IndexRange, VertexRange};
use super::vertex::VertexFormat;
use crate::settings::RenderSettings;

pub const DEFAULT_GRANULARITY: usize = 1024;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to grow {kind} pool for {count} elements")]
    BufferCreation {
        kind: &'static str,
        count: usize,
        #[source]
        source: BufferError,
    },
    #[error("range from frame {allocated} used in frame {current}")]
    StaleRange { allocated: u64, current: u64 },
    #[error("{len} bytes do not fit a range of {capacity} bytes")]
    RangeOverflow { len: usize, capacity: usize },
    #[error("range does not reference a buffer owned by this pool")]
    UnknownBuffer,
    #[error("failed to write pool range")]
    Write(#[source] BufferError),
}

/// Byte alignment of every carved range, so each range can be uploaded
/// with a single buffer copy.
const COPY_ALIGNMENT: usize = wgpu::COPY_BUFFER_ALIGNMENT as usize;

/// What a slot's buffer holds; allocations only share slots with equal keys.
trait SlotKey: Clone + PartialEq + fmt::Display {
    const KIND: &'static str;

    fn element_size(&self) -> usize;

    /// `count` rounded up so the range spans a whole number of copy
    /// alignment units. `None` on overflow.
    fn padded_count(&self, count: usize) -> Option<usize> {
        let size = self.element_size().max(1);
        let step = COPY_ALIGNMENT / gcd(size, COPY_ALIGNMENT);
        count.div_ceil(step).checked_mul(step)
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl SlotKey for VertexFormat {
    const KIND: &'static str = "vertex";

    fn element_size(&self) -> usize {
        self.stride()
    }
}

impl SlotKey for IndexType {
    const KIND: &'static str = "index";

    fn element_size(&self) -> usize {
        self.size()
    }
}

struct Slot<K, B> {
    key: K,
    buffer: B,
    available: usize,
}

struct SlotList<K, B> {
    slots: Vec<Slot<K, B>>,
    granularity: usize,
}

impl<K: SlotKey, B: GpuBuffer> SlotList<K, B> {
    fn new(granularity: usize) -> Self {
        Self {
            slots: Vec::new(),
            granularity: granularity.max(1),
        }
    }

    fn allocate<M>(
        &mut self,
        count: usize,
        key: &K,
        frame: u64,
        create: impl FnOnce(usize) -> Result<B, BufferError>,
    ) -> Result<BufferRange<M>, PoolError> {
        if count == 0 {
            return Ok(BufferRange::empty());
        }

        let fail = |source: BufferError| {
            log::warn!(
                "Failed to allocate {} pool slot for {} elements of '{}': {}",
                K::KIND,
                count,
                key,
                source
            );
            PoolError::BufferCreation {
                kind: K::KIND,
                count,
                source,
            }
        };
        let too_large = || BufferError::ExceedsLimit {
            size: (count as u64).saturating_mul(key.element_size() as u64),
            limit: usize::MAX as u64,
        };

        let padded = key.padded_count(count).ok_or_else(|| fail(too_large()))?;

        let index = match self
            .slots
            .iter()
            .position(|slot| slot.key == *key && slot.available >= padded)
        {
            Some(index) => index,
            None => {
                let actual = padded
                    .div_ceil(self.granularity)
                    .checked_mul(self.granularity)
                    .ok_or_else(|| fail(too_large()))?;
                let buffer = create(actual).map_err(fail)?;

                let available = buffer.count();
                if available < padded {
                    return Err(fail(BufferError::Undersized {
                        requested: actual,
                        actual: available,
                    }));
                }

                log::info!(
                    "Allocated {} pool slot of {} elements for '{}'",
                    K::KIND,
                    available,
                    key
                );

                self.slots.push(Slot {
                    key: key.clone(),
                    buffer,
                    available,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        let start = slot.buffer.count() - slot.available;
        slot.available -= padded;
        Ok(BufferRange::transient(slot.buffer.id(), start, count, frame))
    }

    fn write(&mut self, buffer: BufferId, start: usize, count: usize, bytes: &[u8]) -> Result<(), PoolError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.buffer.id() == buffer)
            .ok_or(PoolError::UnknownBuffer)?;

        let element_size = slot.key.element_size();
        let capacity = count.saturating_mul(element_size);
        if bytes.len() > capacity {
            return Err(PoolError::RangeOverflow {
                len: bytes.len(),
                capacity,
            });
        }

        let offset = (start * element_size) as u64;
        if bytes.len() % COPY_ALIGNMENT == 0 {
            return slot.buffer.write(offset, bytes).map_err(PoolError::Write);
        }

        // The range reserved padding up to the next alignment unit.
        let mut padded = bytes.to_vec();
        padded.resize(bytes.len().next_multiple_of(COPY_ALIGNMENT), 0);
        slot.buffer.write(offset, &padded).map_err(PoolError::Write)
    }

    fn get(&self, buffer: BufferId) -> Option<&B> {
        self.slots
            .iter()
            .find(|slot| slot.buffer.id() == buffer)
            .map(|slot| &slot.buffer)
    }

    fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.available = slot.buffer.count();
        }
    }

    fn stats(&self) -> SlotStats {
        let capacity: usize = self.slots.iter().map(|s| s.buffer.count()).sum();
        let available: usize = self.slots.iter().map(|s| s.available).sum();
        SlotStats {
            slots: self.slots.len(),
            capacity,
            used: capacity - available,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub slots: usize,
    /// Total elements across all slots.
    pub capacity: usize,
    /// Elements handed out since the last reset.
    pub used: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub frame: u64,
    pub vertices: SlotStats,
    pub indices: SlotStats,
}

/// Transient geometry storage for a single render context.
pub struct GeometryPool<F: BufferFactory> {
    factory: F,
    usage: BufferUsage,
    vertex_slots: SlotList<VertexFormat, F::Buffer>,
    index_slots: SlotList<IndexType, F::Buffer>,
    frame: u64,
}

impl<F: BufferFactory> GeometryPool<F> {
    /// Creates a pool growing both vertex and index slots in multiples of
    /// `granularity` elements. A granularity of zero is treated as one.
    pub fn new(factory: F, granularity: usize) -> Self {
        Self {
            factory,
            usage: BufferUsage::Dynamic,
            vertex_slots: SlotList::new(granularity),
            index_slots: SlotList::new(granularity),
            frame: 1,
        }
    }

    pub fn with_settings(factory: F, settings: &RenderSettings) -> Self {
        Self {
            factory,
            usage: settings.buffer_usage,
            vertex_slots: SlotList::new(settings.vertex_granularity),
            index_slots: SlotList::new(settings.index_granularity),
            frame: 1,
        }
    }

    /// Allocates `count` vertices of `format`, valid until the next
    /// [`reset_frame`](Self::reset_frame).
    ///
    /// A zero count yields an empty range without touching any slot.
    pub fn allocate_vertices(&mut self, count: usize, format: &VertexFormat) -> Result<VertexRange, PoolError> {
        let factory = &mut self.factory;
        let usage = self.usage;
        self.vertex_slots.allocate(count, format, self.frame, |actual| {
            factory.create_vertex_buffer(actual, format, usage)
        })
    }

    /// Index counterpart of [`allocate_vertices`](Self::allocate_vertices).
    pub fn allocate_indices(&mut self, count: usize, index_type: IndexType) -> Result<IndexRange, PoolError> {
        let factory = &mut self.factory;
        let usage = self.usage;
        self.index_slots.allocate(count, &index_type, self.frame, |actual| {
            factory.create_index_buffer(actual, index_type, usage)
        })
    }

    /// Makes every slot fully available again. Ranges allocated before this
    /// call are no longer live.
    pub fn reset_frame(&mut self) {
        let stats = self.stats();
        log::debug!(
            "Resetting geometry pool at frame {}: {} vertices and {} indices used",
            self.frame,
            stats.vertices.used,
            stats.indices.used
        );

        self.vertex_slots.reset();
        self.index_slots.reset();
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether `range` was allocated from this pool during the current frame.
    pub fn is_live<M>(&self, range: &BufferRange<M>) -> bool {
        range.buffer().is_some() && range.frame() == Some(self.frame)
    }

    /// Uploads `data` into the start of `range`.
    pub fn write_vertices<T: Pod>(&mut self, range: &VertexRange, data: &[T]) -> Result<(), PoolError> {
        let Some(buffer) = self.check_range(range)? else {
            return Ok(());
        };
        self.vertex_slots
            .write(buffer, range.start(), range.count(), bytemuck::cast_slice(data))
    }

    /// Uploads `data` into the start of `range`.
    pub fn write_indices<T: Pod>(&mut self, range: &IndexRange, data: &[T]) -> Result<(), PoolError> {
        let Some(buffer) = self.check_range(range)? else {
            return Ok(());
        };
        self.index_slots
            .write(buffer, range.start(), range.count(), bytemuck::cast_slice(data))
    }

    pub fn vertex_buffer(&self, id: BufferId) -> Option<&F::Buffer> {
        self.vertex_slots.get(id)
    }

    pub fn index_buffer(&self, id: BufferId) -> Option<&F::Buffer> {
        self.index_slots.get(id)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            frame: self.frame,
            vertices: self.vertex_slots.stats(),
            indices: self.index_slots.stats(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the buffer to write into, or `None` for an empty range.
    fn check_range<M>(&self, range: &BufferRange<M>) -> Result<Option<BufferId>, PoolError> {
        let Some(buffer) = range.buffer() else {
            return Ok(None);
        };

        match range.frame() {
            Some(frame) if frame == self.frame => Ok(Some(buffer)),
            Some(frame) => Err(PoolError::StaleRange {
                allocated: frame,
                current: self.frame,
            }),
            None => Err(PoolError::UnknownBuffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::{SpriteVertex, Vertex};

    struct FakeBuffer {
        id: BufferId,
        count: usize,
        data: Vec<u8>,
    }

    impl GpuBuffer for FakeBuffer {
        fn id(&self) -> BufferId {
            self.id
        }

        fn count(&self) -> usize {
            self.count
        }

        fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), BufferError> {
            // Same rule as the wgpu backend.
            if offset % 4 != 0 || bytes.len() % 4 != 0 {
                return Err(BufferError::Misaligned {
                    offset,
                    len: bytes.len(),
                    alignment: 4,
                });
            }
            let offset = offset as usize;
            self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeFactory {
        next_id: u32,
        created: Vec<usize>,
        fail: bool,
        /// Hand out buffers one element smaller than requested.
        shrink: bool,
    }

    impl FakeFactory {
        fn create(&mut self, count: usize, element_size: usize) -> Result<FakeBuffer, BufferError> {
            if self.fail {
                return Err(BufferError::Backend("out of memory".into()));
            }
            self.next_id += 1;
            self.created.push(count);
            let count = if self.shrink { count - 1 } else { count };
            Ok(FakeBuffer {
                id: BufferId::new(self.next_id),
                count,
                data: vec![0; count * element_size],
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

    fn pool() -> GeometryPool<FakeFactory> {
        GeometryPool::new(FakeFactory::default(), 1024)
    }

    #[test]
    fn full_granule_then_one_more_creates_second_slot() {
        let mut pool = pool();
        let format = Vertex::format();

        let first = pool.allocate_vertices(1024, &format).unwrap();
        assert_eq!(first.start(), 0);
        assert_eq!(pool.stats().vertices.slots, 1);
        assert_eq!(pool.stats().vertices.used, 1024);

        let second = pool.allocate_vertices(1, &format).unwrap();
        assert_eq!(pool.stats().vertices.slots, 2);
        assert_ne!(first.buffer(), second.buffer());
        assert_eq!(second.start(), 0);
    }

    #[test]
    fn allocations_are_carved_sequentially() {
        let mut pool = pool();
        let format = Vertex::format();

        let a = pool.allocate_vertices(10, &format).unwrap();
        let b = pool.allocate_vertices(20, &format).unwrap();
        assert_eq!(a.buffer(), b.buffer());
        assert_eq!(a.start(), 0);
        assert_eq!(b.start(), 10);
        assert_eq!(pool.factory().created, vec![1024]);
    }

    #[test]
    fn new_slots_round_up_to_granularity() {
        let mut pool = pool();
        pool.allocate_vertices(1500, &Vertex::format()).unwrap();
        assert_eq!(pool.factory().created, vec![2048]);
        assert_eq!(pool.stats().vertices.capacity, 2048);
    }

    #[test]
    fn zero_count_is_empty_and_leaves_slots_alone() {
        let mut pool = pool();
        let range = pool.allocate_vertices(0, &Vertex::format()).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.buffer(), None);
        assert_eq!(pool.stats().vertices, SlotStats::default());

        let indices = pool.allocate_indices(0, IndexType::U16).unwrap();
        assert!(indices.is_empty());
        assert!(pool.factory().created.is_empty());
    }

    #[test]
    fn formats_do_not_share_slots() {
        let mut pool = pool();
        let a = pool.allocate_vertices(4, &Vertex::format()).unwrap();
        let b = pool.allocate_vertices(4, &SpriteVertex::format()).unwrap();
        assert_ne!(a.buffer(), b.buffer());
        assert_eq!(pool.stats().vertices.slots, 2);

        let c = pool.allocate_indices(6, IndexType::U16).unwrap();
        let d = pool.allocate_indices(6, IndexType::U32).unwrap();
        assert_ne!(c.buffer(), d.buffer());
        assert_eq!(pool.stats().indices.slots, 2);
    }

    #[test]
    fn reset_recycles_full_capacity() {
        let mut pool = pool();
        let format = Vertex::format();
        pool.allocate_vertices(1000, &format).unwrap();
        pool.reset_frame();

        let range = pool.allocate_vertices(1024, &format).unwrap();
        assert_eq!(range.start(), 0);
        assert_eq!(pool.stats().vertices.slots, 1);
        assert_eq!(pool.factory().created.len(), 1);
    }

    #[test]
    fn failed_growth_reports_error_and_keeps_pool_unchanged() {
        let mut pool = GeometryPool::new(
            FakeFactory {
                fail: true,
                ..FakeFactory::default()
            },
            1024,
        );
        let err = pool.allocate_indices(6, IndexType::U16).unwrap_err();
        assert!(matches!(err, PoolError::BufferCreation { kind: "index", count: 6, .. }));
        assert_eq!(pool.stats().indices.slots, 0);
    }

    #[test]
    fn ranges_expire_on_reset() {
        let mut pool = pool();
        let range = pool.allocate_indices(6, IndexType::U16).unwrap();
        assert!(pool.is_live(&range));

        pool.reset_frame();
        assert!(!pool.is_live(&range));
        let err = pool.write_indices(&range, &[0u16, 1, 2, 0, 2, 3]).unwrap_err();
        assert!(matches!(err, PoolError::StaleRange { allocated: 1, current: 2 }));
    }

    #[test]
    fn writes_land_at_range_offset() {
        let mut pool = pool();
        pool.allocate_indices(2, IndexType::U16).unwrap();
        let range = pool.allocate_indices(3, IndexType::U16).unwrap();
        pool.write_indices(&range, &[7u16, 8, 9]).unwrap();

        let buffer = pool.index_buffer(range.buffer().unwrap()).unwrap();
        let expected: &[u8] = bytemuck::cast_slice(&[7u16, 8, 9]);
        assert_eq!(&buffer.data[4..10], expected);
    }

    #[test]
    fn oversized_writes_are_rejected() {
        let mut pool = pool();
        let range = pool.allocate_indices(2, IndexType::U16).unwrap();
        let err = pool.write_indices(&range, &[1u16, 2, 3]).unwrap_err();
        assert!(matches!(err, PoolError::RangeOverflow { len: 6, capacity: 4 }));
    }

    #[test]
    fn caller_owned_ranges_cannot_be_written_through_pool() {
        let mut pool = pool();
        let range = VertexRange::new(BufferId::new(99), 0, 1);
        let err = pool.write_vertices(&range, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, PoolError::UnknownBuffer));
    }

    #[test]
    fn odd_u16_ranges_keep_following_ranges_aligned() {
        let mut pool = pool();
        let first = pool.allocate_indices(3, IndexType::U16).unwrap();
        let second = pool.allocate_indices(6, IndexType::U16).unwrap();
        assert_eq!(first.count(), 3);
        assert_eq!(second.start(), 4);
        assert_eq!(second.start() * IndexType::U16.size() % 4, 0);

        pool.write_indices(&first, &[1u16, 2, 3]).unwrap();
        pool.write_indices(&second, &[4u16, 5, 6, 4, 6, 7]).unwrap();

        let buffer = pool.index_buffer(second.buffer().unwrap()).unwrap();
        let expected: &[u8] = bytemuck::cast_slice(&[1u16, 2, 3, 0, 4, 5, 6, 4, 6, 7]);
        assert_eq!(&buffer.data[..20], expected);
    }

    #[test]
    fn u8_ranges_are_padded_to_four_indices() {
        let mut pool = pool();
        pool.allocate_indices(1, IndexType::U8).unwrap();
        let next = pool.allocate_indices(5, IndexType::U8).unwrap();
        assert_eq!(next.start(), 4);
        assert_eq!(pool.stats().indices.used, 12);
        pool.write_indices(&next, &[0u8, 1, 2, 3, 4]).unwrap();
    }

    #[test]
    fn huge_counts_fail_instead_of_overflowing() {
        let mut pool = GeometryPool::new(FakeFactory::default(), 1000);
        let err = pool.allocate_indices(usize::MAX - 1, IndexType::U16).unwrap_err();
        assert!(matches!(
            err,
            PoolError::BufferCreation {
                source: BufferError::ExceedsLimit { .. },
                ..
            }
        ));
        assert!(pool.factory().created.is_empty());
        assert_eq!(pool.stats().indices.slots, 0);
    }

    #[test]
    fn undersized_buffers_are_rejected() {
        let mut pool = GeometryPool::new(
            FakeFactory {
                shrink: true,
                ..FakeFactory::default()
            },
            1024,
        );
        let err = pool.allocate_vertices(10, &Vertex::format()).unwrap_err();
        assert!(matches!(
            err,
            PoolError::BufferCreation {
                source: BufferError::Undersized { requested: 1024, actual: 1023 },
                ..
            }
        ));
        assert_eq!(pool.stats().vertices.slots, 0);
    }
}
