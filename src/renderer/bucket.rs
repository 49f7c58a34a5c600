// renderer/bucket.rs
use super::key::RenderOpKey;
use super::op::RenderOp;

/// Keys carry a 16-bit operation index, so a bucket holds at most this many
/// operations.
pub const MAX_OPERATIONS: usize = 1 << 16;

/// Unsorted operations plus their sort keys, sorted lazily on read.
///
/// `keys` is reordered by sorting while `operations` never is, so operations
/// are always looked up through `key.index()`.
#[derive(Debug)]
pub struct RenderBucket<'a> {
    operations: Vec<RenderOp<'a>>,
    keys: Vec<RenderOpKey>,
    sorted: bool,
}

impl<'a> RenderBucket<'a> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            sorted: true,
        }
    }

    /// Appends `operation`, pointing `key` at it.
    ///
    /// Returns `false` and drops the operation when the bucket is full.
    pub fn add_operation(&mut self, operation: RenderOp<'a>, key: RenderOpKey) -> bool {
        let Ok(index) = u16::try_from(self.operations.len()) else {
            log::warn!(
                "Render bucket is full ({} operations), dropping operation",
                MAX_OPERATIONS
            );
            return false;
        };

        self.keys.push(key.with_index(index));
        self.operations.push(operation);
        self.sorted = false;
        true
    }

    /// Sort keys in draw order. Sorting happens at most once per batch of
    /// insertions.
    pub fn keys(&mut self) -> &[RenderOpKey] {
        self.sort();
        &self.keys
    }

    /// Operations in insertion order.
    pub fn operations(&self) -> &[RenderOp<'a>] {
        &self.operations
    }

    /// Operations in draw order, paired with their keys.
    pub fn iter_sorted(&mut self) -> impl Iterator<Item = (RenderOpKey, &RenderOp<'a>)> + '_ {
        self.sort();
        let operations = &self.operations;
        self.keys
            .iter()
            .map(move |key| (*key, &operations[usize::from(key.index())]))
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn remove_operations(&mut self) {
        self.operations.clear();
        self.keys.clear();
        self.sorted = true;
    }

    fn sort(&mut self) {
        if !self.sorted {
            // Indices make every key unique, so an unstable sort is deterministic.
            self.keys.sort_unstable();
            self.sorted = true;
        }
    }
}

impl Default for RenderBucket<'_> {
    fn default() -> Self {
        Self::new()
    }
}
