// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! [`Pool`]: recycles [`Buffer`]s by size class instead of allocating fresh ones on
//! every acquire. Grounded on the same `SegQueue` + atomic-counters shape used by
//! production buffer pools for zero-allocation hot paths; adapted here to a
//! never-blocks, `acquire` always succeeds immediately contract (no semaphore, no
//! async wait — allocation is the fallback, not a blocked caller).

use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::sync::Mutex;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use crate::buffer::Buffer;

#[cfg(feature = "multi-thread")]
use crossbeam_queue::SegQueue;
#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Fixed at [`Pool::new`]. `SingleThreaded` pools assume a single logical caller —
/// concurrent use is undefined even though the underlying storage happens to be
/// `Sync` — while `MultiThreaded` pools are safe under concurrent
/// `acquire`/`release`/`stats` from any number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingMode {
	SingleThreaded,
	MultiThreaded,
}

/// A snapshot of a [`Pool`]'s counters. `hits + misses` is the total number of
/// `acquire` calls ever made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
	pub hits: u64,
	pub misses: u64,
	pub peak_pool_size: usize,
	pub current_pool_size: usize,
}

#[derive(Default)]
struct Counters {
	hits: AtomicU64,
	misses: AtomicU64,
	peak_pool_size: AtomicUsize,
	current_pool_size: AtomicUsize,
}

impl Counters {
	fn snapshot(&self) -> PoolStats {
		PoolStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			peak_pool_size: self.peak_pool_size.load(Ordering::Relaxed),
			current_pool_size: self.current_pool_size.load(Ordering::Relaxed),
		}
	}

	fn record_insert(&self) {
		let new_size = self.current_pool_size.fetch_add(1, Ordering::Relaxed) + 1;
		self.peak_pool_size.fetch_max(new_size, Ordering::Relaxed);
	}

	fn record_remove(&self) {
		self.current_pool_size.fetch_sub(1, Ordering::Relaxed);
	}
}

/// A spinlock-guarded cell. `Pool` is one type regardless of `ThreadingMode`, so every
/// `FreeList` variant's storage must itself be `Sync`, or the whole enum — and `Pool`
/// with it — loses `Sync` even when the active variant is a `SegQueue` or `Mutex`.
/// `RefCell` can't provide that, so the single-threaded free list spins on an atomic
/// flag instead. Lock hold times here are a deque push/pop/scan, never unbounded.
struct SpinCell<T> {
	locked: AtomicBool,
	value: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for SpinCell<T> {}
unsafe impl<T: Send> Sync for SpinCell<T> {}

impl<T> SpinCell<T> {
	fn new(value: T) -> Self {
		Self { locked: AtomicBool::new(false), value: UnsafeCell::new(value) }
	}

	fn lock(&self) -> SpinGuard<'_, T> {
		while self.locked.compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed).is_err() {
			core::hint::spin_loop();
		}
		SpinGuard { cell: self }
	}
}

struct SpinGuard<'a, T> {
	cell: &'a SpinCell<T>,
}

impl<T> Deref for SpinGuard<'_, T> {
	type Target = T;
	fn deref(&self) -> &T { unsafe { &*self.cell.value.get() } }
}

impl<T> DerefMut for SpinGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut T { unsafe { &mut *self.cell.value.get() } }
}

impl<T> Drop for SpinGuard<'_, T> {
	fn drop(&mut self) {
		self.cell.locked.store(false, Ordering::Release);
	}
}

enum FreeList {
	/// Spinlock-guarded deque, sound to share but meant for single-threaded use —
	/// concurrent access from a `SingleThreaded`-mode pool is still the caller's
	/// responsibility per `ThreadingMode`'s contract.
	Single(SpinCell<VecDeque<Buffer>>),
	#[cfg(feature = "multi-thread")]
	/// Lock-free queue; `acquire`/`release` never block.
	Lockfree(SegQueue<Buffer>),
	#[cfg(all(feature = "std", not(feature = "multi-thread")))]
	/// Mutex fallback when the lock-free backend isn't compiled in. Contention windows
	/// are tiny (a push/pop), so this still satisfies "never blocks indefinitely".
	Locked(Mutex<VecDeque<Buffer>>),
}

/// Recycles [`Buffer`]s by size class. `acquire` never allocates more eagerly than
/// necessary and never waits: it either reuses an idle buffer or allocates fresh.
pub struct Pool {
	max_pool_size: usize,
	default_buffer_size: usize,
	mode: ThreadingMode,
	free: FreeList,
	counters: Counters,
}

impl Pool {
	pub fn new(mode: ThreadingMode, max_pool_size: usize, default_buffer_size: usize) -> Self {
		let free = match mode {
			ThreadingMode::SingleThreaded => FreeList::Single(SpinCell::new(VecDeque::new())),
			ThreadingMode::MultiThreaded => {
				#[cfg(feature = "multi-thread")]
				{ FreeList::Lockfree(SegQueue::new()) }
				#[cfg(all(feature = "std", not(feature = "multi-thread")))]
				{ FreeList::Locked(Mutex::new(VecDeque::new())) }
				#[cfg(not(any(feature = "multi-thread", feature = "std")))]
				{
					compile_error!("ThreadingMode::MultiThreaded requires the `std` or `multi-thread` feature");
				}
			}
		};
		#[cfg(feature = "tracing")]
		info!(?mode, max_pool_size, default_buffer_size, "pool created");
		Self { max_pool_size, default_buffer_size, mode, free, counters: Counters::default() }
	}

	pub fn threading_mode(&self) -> ThreadingMode { self.mode }
	pub fn default_buffer_size(&self) -> usize { self.default_buffer_size }
	pub fn max_pool_size(&self) -> usize { self.max_pool_size }

	/// Returns a Buffer of capacity `>= size`. Reuses the first idle buffer found with
	/// sufficient capacity (a hit); otherwise allocates fresh (a miss), with
	/// `position = 0, limit = capacity`. Never waits.
	pub fn acquire(&self, size: usize) -> Buffer {
		if let Some(buffer) = self.take_fitting(size) {
			self.counters.hits.fetch_add(1, Ordering::Relaxed);
			self.counters.record_remove();
			buffer
		} else {
			self.counters.misses.fetch_add(1, Ordering::Relaxed);
			#[cfg(feature = "tracing")]
			debug!(size, "pool miss, allocating fresh buffer");
			Buffer::new(size)
		}
	}

	/// `acquire` with [`default_buffer_size`](Self::default_buffer_size).
	pub fn acquire_default(&self) -> Buffer {
		self.acquire(self.default_buffer_size)
	}

	fn take_fitting(&self, size: usize) -> Option<Buffer> {
		match &self.free {
			FreeList::Single(list) => {
				let mut list = list.lock();
				// Best-fit: smallest idle buffer that still satisfies `size`.
				let index = list.iter()
					.enumerate()
					.filter(|(_, b)| b.capacity() >= size)
					.min_by_key(|(_, b)| b.capacity())
					.map(|(i, _)| i);
				index.and_then(|i| list.remove(i))
			}
			#[cfg(feature = "multi-thread")]
			FreeList::Lockfree(queue) => {
				// Lock-free structures can't do a best-fit scan cheaply; take the first
				// buffer found with enough capacity, requeuing anything that doesn't
				// fit. Tightness of the match is not guaranteed.
				let mut requeued = VecDeque::new();
				let mut found = None;
				while let Some(buffer) = queue.pop() {
					if buffer.capacity() >= size {
						found = Some(buffer);
						break;
					}
					requeued.push_back(buffer);
				}
				for buffer in requeued {
					queue.push(buffer);
				}
				found
			}
			#[cfg(all(feature = "std", not(feature = "multi-thread")))]
			FreeList::Locked(queue) => {
				let mut queue = queue.lock().unwrap_or_else(|poison| poison.into_inner());
				let index = queue.iter()
					.enumerate()
					.filter(|(_, b)| b.capacity() >= size)
					.min_by_key(|(_, b)| b.capacity())
					.map(|(i, _)| i);
				index.and_then(|i| queue.remove(i))
			}
		}
	}

	/// Returns `buffer` to the pool if `current_pool_size < max_pool_size`; otherwise
	/// drops it. `buffer.reset_for_write()` is applied before re-entry. The caller must
	/// not use `buffer` after this call.
	pub fn release(&self, mut buffer: Buffer) {
		if self.counters.snapshot().current_pool_size >= self.max_pool_size {
			return;
		}
		buffer.reset_for_write();
		let inserted = match &self.free {
			FreeList::Single(list) => {
				list.lock().push_back(buffer);
				true
			}
			#[cfg(feature = "multi-thread")]
			FreeList::Lockfree(queue) => {
				queue.push(buffer);
				true
			}
			#[cfg(all(feature = "std", not(feature = "multi-thread")))]
			FreeList::Locked(queue) => {
				queue.lock().unwrap_or_else(|poison| poison.into_inner()).push_back(buffer);
				true
			}
		};
		if inserted {
			self.counters.record_insert();
		}
	}

	/// Drops all idle Buffers, resetting `current_pool_size` to `0`.
	pub fn clear(&self) {
		let dropped = match &self.free {
			FreeList::Single(list) => list.lock().drain(..).count(),
			#[cfg(feature = "multi-thread")]
			FreeList::Lockfree(queue) => {
				let mut count = 0;
				while queue.pop().is_some() {
					count += 1;
				}
				count
			}
			#[cfg(all(feature = "std", not(feature = "multi-thread")))]
			FreeList::Locked(queue) => queue.lock().unwrap_or_else(|poison| poison.into_inner()).drain(..).count(),
		};
		for _ in 0..dropped {
			self.counters.record_remove();
		}
		#[cfg(feature = "tracing")]
		debug!(dropped, "pool cleared");
	}

	pub fn stats(&self) -> PoolStats {
		self.counters.snapshot()
	}

	/// Acquires a buffer of `size`, runs `body`, and releases the buffer on every exit
	/// path including a panic inside `body`.
	pub fn with_buffer<R>(&self, size: usize, body: impl FnOnce(&mut Buffer) -> R) -> R {
		struct ReleaseGuard<'p> {
			pool: &'p Pool,
			buffer: Option<Buffer>,
		}

		impl Drop for ReleaseGuard<'_> {
			fn drop(&mut self) {
				if let Some(buffer) = self.buffer.take() {
					self.pool.release(buffer);
				}
			}
		}

		let mut guard = ReleaseGuard { pool: self, buffer: Some(self.acquire(size)) };
		body(guard.buffer.as_mut().expect("buffer present for duration of with_buffer"))
	}
}

/// Scoped helper: runs `body` with the pool, guaranteeing [`Pool::clear`] runs on every
/// exit path including a panic inside `body`.
pub fn with_pool<R>(pool: Pool, body: impl FnOnce(&Pool) -> R) -> R {
	struct ClearGuard(Pool);

	impl Drop for ClearGuard {
		fn drop(&mut self) {
			self.0.clear();
		}
	}

	let guard = ClearGuard(pool);
	body(&guard.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pool_reuses_released_buffers() {
		let pool = Pool::new(ThreadingMode::SingleThreaded, 4, 1024);
		for _ in 0..10 {
			let buffer = pool.acquire(1024);
			pool.release(buffer);
		}
		let stats = pool.stats();
		assert!(stats.hits >= 6, "hits: {}", stats.hits);
		assert!(stats.misses <= 4, "misses: {}", stats.misses);
		assert!(stats.current_pool_size <= 4);
	}

	#[test]
	fn hits_plus_misses_equals_total_acquires() {
		let pool = Pool::new(ThreadingMode::SingleThreaded, 2, 16);
		let a = pool.acquire(16);
		let b = pool.acquire(16);
		let c = pool.acquire(16);
		pool.release(a);
		pool.release(b);
		pool.release(c);
		let stats = pool.stats();
		assert_eq!(stats.hits + stats.misses, 3);
		assert!(stats.current_pool_size <= pool.max_pool_size());
		pool.clear();
		assert_eq!(pool.stats().current_pool_size, 0);
	}

	#[test]
	fn acquire_returns_capacity_at_least_requested() {
		let pool = Pool::new(ThreadingMode::SingleThreaded, 4, 64);
		pool.release(Buffer::new(128));
		let acquired = pool.acquire(100);
		assert!(acquired.capacity() >= 100);
	}

	#[test]
	fn with_buffer_releases_on_panic() {
		let pool = Pool::new(ThreadingMode::SingleThreaded, 4, 16);
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			pool.with_buffer(16, |_buf| panic!("boom"));
		}));
		assert!(result.is_err());
		assert_eq!(pool.stats().current_pool_size, 1);
	}

	#[test]
	fn pool_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<Pool>();
	}

	#[test]
	fn multi_threaded_pool_shares_across_threads() {
		use std::sync::Arc;

		let pool = Arc::new(Pool::new(ThreadingMode::MultiThreaded, 16, 64));
		let handles: Vec<_> = (0..4).map(|_| {
			let pool = Arc::clone(&pool);
			std::thread::spawn(move || {
				for _ in 0..64 {
					let buffer = pool.acquire(64);
					pool.release(buffer);
				}
			})
		}).collect();

		for handle in handles {
			handle.join().unwrap();
		}

		let stats = pool.stats();
		assert_eq!(stats.hits + stats.misses, 256);
		assert!(stats.current_pool_size <= pool.max_pool_size());
	}
}
