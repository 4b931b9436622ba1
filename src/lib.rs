//! # pool-allocator: a fixed-region, first-fit block allocator
//!
//! This crate provides a general-purpose byte allocator backed by a
//! single fixed-size, contiguous region of process memory. It services
//! variable-size allocation and deallocation requests against that
//! region without ever calling into the host operating system after
//! construction, the kind of primitive a language runtime, embedded
//! firmware, or game engine substitutes for the host allocator when
//! predictability, locality, or introspection matters.
//!
//! ## Overview
//!
//! ```text
//!   Pool Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         FIXED POOL (P bytes)                         │
//!   │                                                                      │
//!   │   ┌─────────┬─────────┬─────────┬────────────────────────────────┐  │
//!   │   │ [H|A1]  │ [H|A2]  │ [H|free]│          ...more blocks...      │  │
//!   │   └─────────┴─────────┴─────────┴────────────────────────────────┘  │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Every block is a Header (H bytes) followed by a Payload. Allocation
//!   is first-fit with tail-splitting; deallocation marks a block free
//!   and coalesces with address-adjacent free neighbors.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   pool_allocator
//!   ├── align      - Alignment helpers
//!   ├── checksum   - Header integrity digest
//!   ├── block      - Block header record (encode/decode + verify)
//!   ├── config     - PoolConfig (pool size, alignment, magic tag)
//!   ├── error      - Diagnostic taxonomy + injectable Reporter
//!   ├── iter       - Read-only block-list cursor (observer surface)
//!   └── pool       - PoolAllocator: allocate / free / stats / iterate
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use pool_allocator::{PoolAllocator, PoolConfig};
//!
//! let mut pool = PoolAllocator::new(PoolConfig::default()).unwrap();
//!
//! let a = pool.allocate(128).unwrap();
//! let b = pool.allocate(256).unwrap();
//!
//! pool.write(a).copy_from_slice(&[0u8; 128]);
//!
//! pool.free(Some(a));
//! pool.free(Some(b));
//!
//! assert_eq!(pool.stats().allocated, 0);
//! ```
//!
//! ## How It Works
//!
//! The pool is carved into blocks, each a header (integrity metadata plus
//! size, free flag, and doubly linked address-order pointers) followed by
//! a payload:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ magic: u32      │  │  ┌──────────────────────────┐  │
//!   │  │ size: usize     │  │  │                          │  │
//!   │  │ free: bool      │  │  │     N bytes usable       │  │
//!   │  │ next/prev: off  │  │  │                          │  │
//!   │  │ checksum: u32   │  │  └──────────────────────────┘  │
//!   │  └─────────────────┘  │                                │
//!   │       H bytes          │                                │
//!   └───────────────────────┴────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **First-fit allocation** with tail-splitting, bounded by a minimum
//!   successor size so splits never leave a degenerate free block.
//! - **Bidirectional coalescing** on free, forward then backward.
//! - **Inline integrity metadata**: a magic tag plus a checksum over
//!   every header field, verified on every traversal.
//! - **Read-only iteration** for external observers (visualizers,
//!   statistics printers) without exposing allocator internals.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives.
//! - **No growth**: once the pool is exhausted, allocation fails.
//! - **No in-place realloc** and no alignment beyond the pool default.
//!
//! ## Safety
//!
//! Unlike the teacher this crate is modeled on, this crate's public API
//! requires no `unsafe` blocks from callers: payload references are
//! opaque offsets (`PayloadRef`), not raw pointers, and the pool owns
//! its backing buffer for its entire lifetime.

pub mod align;
mod block;
mod checksum;
pub mod config;
pub mod error;
pub mod iter;
pub mod pool;

pub use align::align_up;
pub use config::PoolConfig;
pub use error::{Diagnostic, PoolError, Reporter, SilentReporter, TracingReporter};
pub use iter::{BlockCursor, BlockView};
pub use pool::{PayloadRef, PoolAllocator, Stats};
