//! Error taxonomy and diagnostic reporting.
//!
//! The teacher has no error type at all: `BumpAllocator::allocate` and
//! `deallocate` either succeed or return a null pointer, and the only
//! diagnostics are `print_alloc`'s unconditional `println!`. This module
//! adds a real taxonomy plus an injectable reporter, grounded on
//! `examples/vanyastaff-nebula/crates/nebula-system/src/error.rs` for the
//! `thiserror`-enum shape and on that same repo's `tracing` dependency
//! for the default reporter.

use thiserror::Error;
use tracing::{debug, error, warn};

/// The only `Result`-returning error in this crate: a `PoolConfig` that
/// can't be turned into a valid pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
  /// `alignment`/`pool_size`/`magic` combination cannot back a pool.
  #[error("invalid pool configuration: {0}")]
  InvalidConfig(String),
}

/// One kind of non-fatal condition the allocator can hit during
/// `allocate`/`free`. `ZeroRequest` carries no diagnostic and is
/// therefore never constructed here, but is kept in the enum so an
/// embedder can match on it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
  /// `allocate(0)` was called. Not routed through `Reporter`.
  ZeroRequest,
  /// No free block could satisfy a request of `requested` bytes.
  OutOfMemory {
    /// The payload size that could not be satisfied.
    requested: usize,
  },
  /// `free(None)` was called.
  NullFree,
  /// `free` was called on a block that was already free.
  DoubleFree {
    /// Header offset of the affected block.
    block: usize,
  },
  /// `verify` failed on a block reached during traversal.
  Corruption {
    /// Header offset of the affected block.
    block: usize,
  },
}

/// Injectable diagnostic sink: an observable diagnostic routed through
/// a caller-supplied reporter instead of a hardcoded `println!`.
pub trait Reporter {
  /// Called once per error condition detected by `allocate`/`free`.
  fn report(&self, diagnostic: Diagnostic);
}

/// Default `Reporter`: routes every diagnostic through the `tracing`
/// crate instead of the teacher's bare `println!`
/// (`examples/0xErwin1-rallocator/src/bump.rs::print_alloc`), so an
/// embedder gets structured, filterable logs out of the box.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
  fn report(&self, diagnostic: Diagnostic) {
    match diagnostic {
      Diagnostic::ZeroRequest => {}
      Diagnostic::OutOfMemory { requested } => {
        debug!(requested, "pool allocator: out of memory");
      }
      Diagnostic::NullFree => {
        warn!("pool allocator: free(None) is a no-op");
      }
      Diagnostic::DoubleFree { block } => {
        warn!(block, "pool allocator: double free");
      }
      Diagnostic::Corruption { block } => {
        error!(block, "pool allocator: corrupted block header");
      }
    }
  }
}

/// A `Reporter` that discards every diagnostic. Useful in tests that
/// want to assert on return values only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
  fn report(&self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;

  #[derive(Default)]
  struct RecordingReporter {
    seen: RefCell<Vec<Diagnostic>>,
  }

  impl Reporter for RecordingReporter {
    fn report(&self, diagnostic: Diagnostic) {
      self.seen.borrow_mut().push(diagnostic);
    }
  }

  #[test]
  fn recording_reporter_captures_diagnostics() {
    let reporter = RecordingReporter::default();
    reporter.report(Diagnostic::NullFree);
    reporter.report(Diagnostic::DoubleFree { block: 40 });
    assert_eq!(
      *reporter.seen.borrow(),
      vec![Diagnostic::NullFree, Diagnostic::DoubleFree { block: 40 }]
    );
  }

  #[test]
  fn invalid_config_error_message_mentions_reason() {
    let err = PoolError::InvalidConfig("alignment must be a power of two".into());
    assert!(err.to_string().contains("alignment"));
  }
}
