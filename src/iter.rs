//! Read-only, forward-only iteration over the block list.
//!
//! Not present in the teacher: `BumpAllocator` exposes no way to walk
//! its list at all, only `first`/`last`. Consumed by external observers
//! (a memory-map visualizer, a statistics printer, the `demos/` driver)
//! that stay outside this crate's core allocation logic entirely; this
//! module is the seam they're built against.

use crate::pool::PoolAllocator;

/// A single block as seen by an observer: enough to draw a memory map
/// or print a row of a table, nothing that would let the observer
/// mutate allocator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockView {
  /// Header byte offset from the pool base.
  pub address: usize,
  /// Payload byte offset from the pool base (`address + H`).
  pub payload_address: usize,
  /// Payload size in bytes.
  pub size: usize,
  /// Whether the block is currently free.
  pub free: bool,
}

/// Forward-only cursor over a `PoolAllocator`'s block list. Verifies
/// each block before yielding it; stops (rather than panicking) the
/// moment a block fails verification, since a corrupt list has no
/// well-defined successor.
pub struct BlockCursor<'a> {
  allocator: &'a PoolAllocator,
  next: Option<usize>,
  corrupted: bool,
}

impl<'a> BlockCursor<'a> {
  pub(crate) fn new(allocator: &'a PoolAllocator) -> Self {
    Self { allocator, next: Some(allocator.head_offset()), corrupted: false }
  }
}

impl<'a> Iterator for BlockCursor<'a> {
  type Item = BlockView;

  fn next(&mut self) -> Option<Self::Item> {
    if self.corrupted {
      return None;
    }
    let offset = self.next?;
    let header = self.allocator.decode_header(offset);
    if !header.verify(self.allocator.magic()) {
      self.corrupted = true;
      return None;
    }
    self.next = header.next;
    Some(BlockView {
      address: offset,
      payload_address: offset + self.allocator.header_len(),
      size: header.size,
      free: header.free,
    })
  }
}
