use std::io::Read;

use pool_allocator::{PoolAllocator, PoolConfig};

/// Waits until the user presses ENTER.
/// Useful when you want to step through the block list one operation at
/// a time instead of watching it scroll by.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints every block in address order, marking free vs. allocated.
fn print_blocks(pool: &PoolAllocator) {
  for view in pool.iter() {
    println!(
      "  [{:>6}] {:<9} size={:<6} payload@{}",
      view.address,
      if view.free { "free" } else { "allocated" },
      view.size,
      view.payload_address,
    );
  }
}

fn print_stats(
  label: &str,
  pool: &PoolAllocator,
) {
  let stats = pool.stats();
  println!(
    "\n[{label}] pool_size={} allocated={} free={} count={} fragmentation={} header_size={} alignment={}",
    stats.pool_size,
    stats.allocated,
    stats.free,
    stats.count,
    stats.fragmentation,
    stats.header_size,
    stats.alignment,
  );
}

fn main() {
  // A small pool keeps the demo's block list short enough to read.
  let config = PoolConfig { pool_size: 4096, alignment: 8, magic: 0xDEAD_BEEF };
  let mut pool = PoolAllocator::new(config).expect("valid pool configuration");

  println!("[start] single free block spanning the whole pool");
  print_blocks(&pool);
  print_stats("start", &pool);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Three sequential allocations: no fragmentation yet.
  // --------------------------------------------------------------------
  let a = pool.allocate(128).expect("pool has room");
  let b = pool.allocate(256).expect("pool has room");
  let c = pool.allocate(64).expect("pool has room");
  println!(
    "\n[1] Allocated a=128@{}, b=256@{}, c=64@{}",
    a.offset(),
    b.offset(),
    c.offset(),
  );
  print_blocks(&pool);
  print_stats("1", &pool);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Free the middle block: no coalescing possible (both neighbors
  //    are allocated), so fragmentation rises.
  // --------------------------------------------------------------------
  pool.free(Some(b));
  println!("\n[2] Freed b (middle block)");
  print_blocks(&pool);
  print_stats("2", &pool);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Free the tail block: coalesces backward into the trailing free
  //    run, restoring a single large free block at the end.
  // --------------------------------------------------------------------
  pool.free(Some(c));
  println!("\n[3] Freed c (tail block, coalesces with trailing free space)");
  print_blocks(&pool);
  print_stats("3", &pool);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Free the head block: coalesces forward with the now-free b,
  //    restoring the fresh-init single-block state.
  // --------------------------------------------------------------------
  pool.free(Some(a));
  println!("\n[4] Freed a (head block, coalesces forward), back to one free block");
  print_blocks(&pool);
  print_stats("4", &pool);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Exhaust the pool to see OutOfMemory reported.
  // --------------------------------------------------------------------
  let huge = pool.allocate(pool.pool_size());
  println!("\n[5] allocate(pool_size) -> {huge:?} (expected: None, OutOfMemory logged)");

  // --------------------------------------------------------------------
  // 6) Double free to see the DoubleFree diagnostic.
  // --------------------------------------------------------------------
  let d = pool.allocate(32).expect("pool has room");
  pool.free(Some(d));
  pool.free(Some(d));
  println!("\n[6] Freed d twice (second call logs DoubleFree, no-op)");

  println!("\n[end] Demo complete.");
}
