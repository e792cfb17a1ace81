// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! [`StreamProcessor`]: an ordered queue of [`Buffer`] chunks with a logical read cursor
//! spanning all of them. Fixed-width reads and peeks straddling a chunk boundary are
//! served byte-by-byte across the queue; fully-consumed chunks are released to the
//! associated [`Pool`], if any, as soon as the cursor passes them.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::{vec, vec::Vec};
use core::mem::size_of;
use bytemuck::{bytes_of_mut, Pod};
use num_traits::PrimInt;
use crate::buffer::Buffer;
use crate::byte_order::ByteOrder;
use crate::pool::Pool;
use crate::{Error, Result};

/// An external `feed(bytes) -> zero-or-more Buffer` / `finish() -> zero-or-more Buffer`
/// stage sitting between [`StreamProcessor::append`] and the internal chunk queue, e.g.
/// a decompressor. Internals are opaque to the processor; it only routes chunks through.
pub trait Transform {
	fn feed(&mut self, chunk: Buffer) -> Vec<Buffer>;
	fn finish(&mut self) -> Vec<Buffer>;
}

/// Queues fragmented chunks and exposes a single cursor across all of them.
pub struct StreamProcessor {
	chunks: VecDeque<Buffer>,
	available: usize,
	finished: bool,
	order: Option<ByteOrder>,
	pool: Option<Pool>,
	transform: Option<Box<dyn Transform>>,
}

impl Default for StreamProcessor {
	fn default() -> Self { Self::new() }
}

impl StreamProcessor {
	pub fn new() -> Self {
		Self { chunks: VecDeque::new(), available: 0, finished: false, order: None, pool: None, transform: None }
	}

	/// Chunks released by eager consumption are returned to `pool` instead of dropped.
	pub fn with_pool(pool: Pool) -> Self {
		Self { pool: Some(pool), ..Self::new() }
	}

	/// Routes every appended chunk through `transform` before it reaches the queue.
	pub fn with_transform(transform: Box<dyn Transform>) -> Self {
		Self { transform: Some(transform), ..Self::new() }
	}

	pub fn with_pool_and_transform(pool: Pool, transform: Box<dyn Transform>) -> Self {
		Self { pool: Some(pool), transform: Some(transform), ..Self::new() }
	}

	/// The byte order used to interpret multi-byte peeks/reads, inherited from the
	/// first chunk ever appended. Defaults to big-endian if nothing has been appended.
	pub fn byte_order(&self) -> ByteOrder {
		self.order.unwrap_or(ByteOrder::BigEndian)
	}

	fn enqueue(&mut self, chunk: Buffer) {
		if chunk.has_remaining() {
			if self.order.is_none() {
				self.order = Some(chunk.byte_order());
			}
			self.available += chunk.remaining();
			self.chunks.push_back(chunk);
		}
	}

	/// Enqueues `chunk` at the tail, routing it through the transform stage first if
	/// one is configured.
	pub fn append(&mut self, chunk: Buffer) {
		if let Some(transform) = &mut self.transform {
			for output in transform.feed(chunk) {
				self.enqueue_raw(output);
			}
		} else {
			self.enqueue(chunk);
		}
	}

	// Separate from `enqueue` only so `append`'s transform branch doesn't double-borrow
	// `self.transform` while iterating its own output.
	fn enqueue_raw(&mut self, chunk: Buffer) {
		self.enqueue(chunk);
	}

	/// Declares that no further `append` will occur. Drains any trailing transform
	/// output first.
	pub fn finish(&mut self) {
		if let Some(transform) = &mut self.transform {
			for output in transform.finish() {
				self.enqueue_raw(output);
			}
		}
		self.finished = true;
	}

	pub fn is_finished(&self) -> bool { self.finished }

	/// Total unconsumed bytes across every queued chunk.
	pub fn available(&self) -> usize { self.available }

	/// Releases all retained chunks, returning each to the associated pool if any.
	pub fn release(&mut self) {
		for chunk in self.chunks.drain(..) {
			if let Some(pool) = &self.pool {
				pool.release(chunk);
			}
		}
		self.available = 0;
	}

	fn ensure_available(&self, count: usize) -> Result {
		if self.available >= count {
			Ok(())
		} else if self.finished {
			Err(Error::EndOfStream { required_count: count - self.available })
		} else {
			Err(Error::NeedMore { required_count: count, available: self.available })
		}
	}

	// -- Consuming reads -----------------------------------------------------------

	fn consume_into(&mut self, out: &mut [u8]) -> Result {
		self.ensure_available(out.len())?;
		let mut written = 0;
		while written < out.len() {
			let done = {
				let chunk = self.chunks.front_mut().expect("available tracks queue contents");
				let take = chunk.remaining().min(out.len() - written);
				chunk.read_bytes(&mut out[written..written + take]).expect("take <= remaining");
				written += take;
				!chunk.has_remaining()
			};
			if done {
				let chunk = self.chunks.pop_front().expect("just read from front");
				if let Some(pool) = &self.pool {
					pool.release(chunk);
				}
			}
		}
		self.available -= out.len();
		Ok(())
	}

	fn read_prim<T: PrimInt + Pod>(&mut self) -> Result<T> {
		let mut raw = T::zeroed();
		self.consume_into(bytes_of_mut(&mut raw))?;
		Ok(self.byte_order().load(raw))
	}

	pub fn read_byte(&mut self) -> Result<i8> {
		let mut b = [0u8; 1];
		self.consume_into(&mut b)?;
		Ok(b[0] as i8)
	}

	pub fn read_unsigned_byte(&mut self) -> Result<u8> {
		let mut b = [0u8; 1];
		self.consume_into(&mut b)?;
		Ok(b[0])
	}

	pub fn read_short(&mut self) -> Result<i16> { self.read_prim() }
	pub fn read_int(&mut self) -> Result<i32> { self.read_prim() }
	pub fn read_long(&mut self) -> Result<i64> { self.read_prim() }

	/// Best-effort skip: consumes up to `count` bytes, returning the number actually
	/// consumed (bounded by `available()`). Never fails.
	pub fn skip(&mut self, count: usize) -> usize {
		let mut remaining = count.min(self.available);
		let total = remaining;
		while remaining > 0 {
			let done = {
				let chunk = self.chunks.front_mut().expect("available tracks queue contents");
				let take = chunk.remaining().min(remaining);
				chunk.set_position(chunk.position() + take).expect("take <= remaining");
				remaining -= take;
				!chunk.has_remaining()
			};
			if done {
				let chunk = self.chunks.pop_front().expect("just advanced front");
				if let Some(pool) = &self.pool {
					pool.release(chunk);
				}
			}
		}
		self.available -= total;
		total
	}

	/// Reads exactly `size` bytes into a freshly allocated Buffer, copying in both the
	/// single-chunk and cross-chunk cases — the single-chunk path skips the multi-chunk
	/// coalescing loop but still copies out of the source chunk rather than aliasing it.
	/// Byte order of the returned Buffer matches the processor's configured order.
	pub fn read_buffer(&mut self, size: usize) -> Result<Buffer> {
		self.ensure_available(size)?;
		let single_chunk_fits = self.chunks.front().is_some_and(|c| c.remaining() >= size);
		let mut bytes = vec![0u8; size];
		if single_chunk_fits {
			let done = {
				let chunk = self.chunks.front_mut().expect("checked above");
				chunk.read_bytes(&mut bytes)?;
				!chunk.has_remaining()
			};
			if done {
				let chunk = self.chunks.pop_front().expect("just read from front");
				if let Some(pool) = &self.pool {
					pool.release(chunk);
				}
			}
			self.available -= size;
		} else {
			self.consume_into(&mut bytes)?;
		}
		let mut out = Buffer::with_order(size, self.byte_order());
		out.write_bytes(&bytes)?;
		out.reset_for_read();
		Ok(out)
	}

	// -- Peeking (absolute by offset, does not consume) -----------------------------

	fn peek_into(&self, offset: usize, out: &mut [u8]) -> Result {
		self.ensure_available(offset + out.len())?;
		let mut skip = offset;
		let mut written = 0;
		for chunk in &self.chunks {
			let remaining = chunk.remaining();
			if skip >= remaining {
				skip -= remaining;
				continue;
			}
			let start = chunk.position() + skip;
			let available_here = chunk.limit() - start;
			let take = available_here.min(out.len() - written);
			out[written..written + take].copy_from_slice(chunk.bytes_in_range(start, take));
			written += take;
			skip = 0;
			if written == out.len() {
				break;
			}
		}
		Ok(())
	}

	fn peek_prim<T: PrimInt + Pod>(&self, offset: usize) -> Result<T> {
		let mut raw = T::zeroed();
		self.peek_into(offset, bytes_of_mut(&mut raw))?;
		Ok(self.byte_order().load(raw))
	}

	pub fn peek_byte(&self, offset: usize) -> Result<i8> {
		let mut b = [0u8; 1];
		self.peek_into(offset, &mut b)?;
		Ok(b[0] as i8)
	}

	pub fn peek_short(&self, offset: usize) -> Result<i16> { self.peek_prim(offset) }
	pub fn peek_int(&self, offset: usize) -> Result<i32> { self.peek_prim(offset) }
	pub fn peek_long(&self, offset: usize) -> Result<i64> { self.peek_prim(offset) }

	/// True iff the next `pattern.remaining()` bytes equal `pattern`'s remaining bytes.
	pub fn peek_matches(&self, pattern: &Buffer) -> Result<bool> {
		let mut bytes = vec![0u8; pattern.remaining()];
		self.peek_into(0, &mut bytes)?;
		Ok(bytes == pattern.remaining_slice())
	}

	/// Offset of the first byte at which the upcoming stream differs from `pattern`, or
	/// `None` if it's an exact match over `pattern.remaining()` bytes.
	pub fn peek_mismatch(&self, pattern: &Buffer) -> Result<Option<usize>> {
		let mut bytes = vec![0u8; pattern.remaining()];
		self.peek_into(0, &mut bytes)?;
		let pattern_bytes = pattern.remaining_slice();
		Ok(bytes.iter().zip(pattern_bytes).position(|(a, b)| a != b))
	}
}

/// Decorator that ensures enough bytes are available before every peek/read by calling a
/// user-supplied `refill` in a loop, removing the caller-side "wait for more data" loop.
/// `refill` returns `Ok(Some(chunk))` with more data, `Ok(None)` at end-of-stream, or an
/// error to abort.
pub struct AutoFillingProcessor<F> {
	inner: StreamProcessor,
	refill: F,
}

impl<F> AutoFillingProcessor<F>
where
	F: FnMut() -> Result<Option<Buffer>>,
{
	pub fn new(inner: StreamProcessor, refill: F) -> Self {
		Self { inner, refill }
	}

	pub fn inner(&self) -> &StreamProcessor { &self.inner }
	pub fn inner_mut(&mut self) -> &mut StreamProcessor { &mut self.inner }

	/// Calls `refill` until `available() >= required` or the source signals
	/// end-of-stream, in which case [`StreamProcessor::finish`] is called and, if still
	/// short, `EndOfStream` is raised.
	pub fn ensure(&mut self, required: usize) -> Result {
		while self.inner.available() < required && !self.inner.is_finished() {
			match (self.refill)()? {
				Some(chunk) => self.inner.append(chunk),
				None => self.inner.finish(),
			}
		}
		if self.inner.available() < required {
			Err(Error::EndOfStream { required_count: required - self.inner.available() })
		} else {
			Ok(())
		}
	}

	pub fn read_byte(&mut self) -> Result<i8> { self.ensure(1)?; self.inner.read_byte() }
	pub fn read_unsigned_byte(&mut self) -> Result<u8> { self.ensure(1)?; self.inner.read_unsigned_byte() }
	pub fn read_short(&mut self) -> Result<i16> { self.ensure(size_of::<i16>())?; self.inner.read_short() }
	pub fn read_int(&mut self) -> Result<i32> { self.ensure(size_of::<i32>())?; self.inner.read_int() }
	pub fn read_long(&mut self) -> Result<i64> { self.ensure(size_of::<i64>())?; self.inner.read_long() }

	pub fn read_buffer(&mut self, size: usize) -> Result<Buffer> {
		self.ensure(size)?;
		self.inner.read_buffer(size)
	}

	pub fn peek_byte(&mut self, offset: usize) -> Result<i8> { self.ensure(offset + 1)?; self.inner.peek_byte(offset) }
	pub fn peek_int(&mut self, offset: usize) -> Result<i32> {
		self.ensure(offset + size_of::<i32>())?;
		self.inner.peek_int(offset)
	}
}

/// A single-threaded cooperative adapter over [`StreamProcessor`] for asynchronous
/// callers. Per the engine's concurrency model, the only suspension points are inside
/// `append` (waiting on the chunk source) and `refill` (the auto-filling callback);
/// reads and peeks themselves never suspend. Cancelling the future driving `append` or
/// `refill` leaves already-appended bytes intact.
#[cfg(feature = "std")]
pub struct SuspendingStreamProcessor {
	inner: StreamProcessor,
}

#[cfg(feature = "std")]
impl SuspendingStreamProcessor {
	pub fn new(inner: StreamProcessor) -> Self { Self { inner } }

	pub fn get_mut(&mut self) -> &mut StreamProcessor { &mut self.inner }

	/// Awaits `source` for the next chunk, then appends it. The only suspension point
	/// this adapter adds beyond the synchronous processor.
	pub async fn append<Fut>(&mut self, source: Fut)
	where
		Fut: core::future::Future<Output = Buffer>,
	{
		let chunk = source.await;
		self.inner.append(chunk);
	}

	/// Awaits `refill` in a loop until `available() >= required` or end-of-stream.
	pub async fn ensure<Fut>(&mut self, required: usize, mut refill: impl FnMut() -> Fut) -> Result
	where
		Fut: core::future::Future<Output = Result<Option<Buffer>>>,
	{
		while self.inner.available() < required && !self.inner.is_finished() {
			match refill().await? {
				Some(chunk) => self.inner.append(chunk),
				None => self.inner.finish(),
			}
		}
		if self.inner.available() < required {
			Err(Error::EndOfStream { required_count: required - self.inner.available() })
		} else {
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_across_chunk_boundary() {
		let mut sp = StreamProcessor::new();
		sp.append(Buffer::wrap(vec![0x00, 0x00, 0x00]));
		sp.append(Buffer::wrap(vec![0x2A, 0x01, 0x02]));

		assert_eq!(sp.peek_int(0).unwrap(), 0x0000_002A);
		assert_eq!(sp.available(), 6);
		assert_eq!(sp.read_int().unwrap(), 0x0000_002A);
		assert_eq!(sp.available(), 2);
		assert_eq!(sp.read_unsigned_byte().unwrap(), 0x01);
		assert_eq!(sp.read_unsigned_byte().unwrap(), 0x02);

		assert!(matches!(sp.peek_byte(0), Err(Error::NeedMore { .. })));
		sp.finish();
		assert!(matches!(sp.peek_byte(0), Err(Error::EndOfStream { .. })));
	}

	#[test]
	fn byte_order_preserved_across_arbitrary_chunking() {
		let source: Vec<u8> = (0..64u8).collect();
		let mut sp = StreamProcessor::new();
		for chunk in source.chunks(7) {
			sp.append(Buffer::wrap(chunk.to_vec()));
		}
		sp.finish();

		let mut out = Vec::new();
		let mut last_available = sp.available();
		while sp.available() > 0 {
			out.push(sp.read_unsigned_byte().unwrap());
			assert!(sp.available() <= last_available);
			last_available = sp.available();
		}
		assert_eq!(out, source);
	}

	#[test]
	fn read_buffer_coalesces_across_chunks() {
		let mut sp = StreamProcessor::new();
		sp.append(Buffer::wrap(vec![1, 2, 3]));
		sp.append(Buffer::wrap(vec![4, 5, 6]));
		let mut slice = sp.read_buffer(5).unwrap();
		let mut bytes = [0u8; 5];
		slice.read_bytes(&mut bytes).unwrap();
		assert_eq!(bytes, [1, 2, 3, 4, 5]);
		assert_eq!(sp.available(), 1);
	}

	#[test]
	fn peek_matches_and_mismatch() {
		let mut sp = StreamProcessor::new();
		sp.append(Buffer::wrap(b"hello".to_vec()));
		let pattern = Buffer::wrap(b"hello".to_vec());
		assert!(sp.peek_matches(&pattern).unwrap());

		let mismatched = Buffer::wrap(b"hezzo".to_vec());
		assert_eq!(sp.peek_mismatch(&mismatched).unwrap(), Some(2));
	}

	#[test]
	fn skip_bounded_by_available() {
		let mut sp = StreamProcessor::new();
		sp.append(Buffer::wrap(vec![1, 2, 3]));
		assert_eq!(sp.skip(10), 3);
		assert_eq!(sp.available(), 0);
	}

	#[test]
	fn auto_filling_processor_retries_refill() {
		let mut pending = VecDeque::from(vec![
			Buffer::wrap(vec![0x00, 0x00]),
			Buffer::wrap(vec![0x00, 0x2A]),
		]);
		let mut auto = AutoFillingProcessor::new(StreamProcessor::new(), move || Ok(pending.pop_front()));
		assert_eq!(auto.read_int().unwrap(), 0x2A);
	}
}
