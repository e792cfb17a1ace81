// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! [`Buffer`]: a contiguous, owned byte region with a `(position, limit, capacity)`
//! cursor and a fixed [`ByteOrder`]. This is the primitive every other module in this
//! crate is built on: the [`Pool`](crate::pool::Pool) recycles them, the
//! [`StreamProcessor`](crate::stream::StreamProcessor) queues them as chunks, and the
//! [`StreamingStringDecoder`](crate::decoder::StreamingStringDecoder) reads from them.

use alloc::boxed::Box;
use alloc::{string::String, vec, vec::Vec};
use core::mem::size_of;
use bytemuck::{bytes_of, bytes_of_mut, Pod};
use num_traits::PrimInt;
use crate::byte_order::ByteOrder;
use crate::charset::{Charset, CodecPolicy};
use crate::{Error, Result};

/// A contiguous, owned byte region with a position/limit cursor.
///
/// Invariants, upheld at every public boundary: `0 <= position <= limit <= capacity`.
/// `capacity` and `byte_order` are fixed for the life of the Buffer.
#[derive(Debug)]
pub struct Buffer {
	storage: Box<[u8]>,
	position: usize,
	limit: usize,
	order: ByteOrder,
}

impl Buffer {
	/// Allocates a new zero-filled Buffer of `capacity` bytes, big-endian, ready for
	/// writing (`position = 0`, `limit = capacity`).
	pub fn new(capacity: usize) -> Self {
		Self::with_order(capacity, ByteOrder::BigEndian)
	}

	/// As [`new`](Self::new), with an explicit byte order.
	pub fn with_order(capacity: usize, order: ByteOrder) -> Self {
		Self {
			storage: vec![0u8; capacity].into_boxed_slice(),
			position: 0,
			limit: capacity,
			order,
		}
	}

	/// Wraps an existing byte region as a big-endian Buffer ready for reading
	/// (`position = 0`, `limit = capacity = bytes.len()`).
	pub fn wrap(bytes: impl Into<Box<[u8]>>) -> Self {
		Self::wrap_with_order(bytes, ByteOrder::BigEndian)
	}

	/// As [`wrap`](Self::wrap), with an explicit byte order.
	pub fn wrap_with_order(bytes: impl Into<Box<[u8]>>, order: ByteOrder) -> Self {
		let storage = bytes.into();
		let limit = storage.len();
		Self { storage, position: 0, limit, order }
	}

	// -- Position / limit --------------------------------------------------

	#[inline]
	pub fn position(&self) -> usize { self.position }

	/// Sets `position`. Requires `0 <= new <= limit`.
	pub fn set_position(&mut self, new: usize) -> Result {
		if new > self.limit {
			return Err(Error::index(new, self.limit));
		}
		self.position = new;
		Ok(())
	}

	#[inline]
	pub fn limit(&self) -> usize { self.limit }

	/// Sets `limit`. Requires `position <= new <= capacity`.
	pub fn set_limit(&mut self, new: usize) -> Result {
		if new < self.position || new > self.capacity() {
			return Err(Error::index(new, self.capacity()));
		}
		self.limit = new;
		Ok(())
	}

	#[inline]
	pub fn capacity(&self) -> usize { self.storage.len() }

	#[inline]
	pub fn remaining(&self) -> usize { self.limit - self.position }

	#[inline]
	pub fn has_remaining(&self) -> bool { self.position < self.limit }

	#[inline]
	pub fn byte_order(&self) -> ByteOrder { self.order }

	/// Flips the buffer for reading what was just written: `limit <- position`, then
	/// `position <- 0`.
	pub fn reset_for_read(&mut self) {
		self.limit = self.position;
		self.position = 0;
	}

	/// Prepares the buffer for writing from the start: `position <- 0`, `limit <-
	/// capacity`. This is also the state a Buffer is returned to by a
	/// [`Pool`](crate::pool::Pool) before reuse.
	pub fn reset_for_write(&mut self) {
		self.position = 0;
		self.limit = self.capacity();
	}

	#[inline]
	fn check_index(&self, index: usize, width: usize) -> Result {
		let in_bounds = matches!(index.checked_add(width), Some(end) if end <= self.capacity());
		if in_bounds {
			Ok(())
		} else {
			Err(Error::index(index, self.capacity()))
		}
	}

	// -- Relative typed I/O --------------------------------------------------

	fn read_prim<T: PrimInt + Pod>(&mut self) -> Result<T> {
		let width = size_of::<T>();
		if self.remaining() < width {
			return Err(Error::underflow(width, self.remaining()));
		}
		let mut value = T::zeroed();
		bytes_of_mut(&mut value).copy_from_slice(&self.storage[self.position..self.position + width]);
		self.position += width;
		Ok(self.order.load(value))
	}

	fn write_prim<T: PrimInt + Pod>(&mut self, value: T) -> Result {
		let width = size_of::<T>();
		if self.remaining() < width {
			return Err(Error::buffer_overflow(self.remaining()));
		}
		let value = self.order.store(value);
		self.storage[self.position..self.position + width].copy_from_slice(bytes_of(&value));
		self.position += width;
		Ok(())
	}

	pub fn read_byte(&mut self) -> Result<i8> { self.read_prim() }
	pub fn read_ubyte(&mut self) -> Result<u8> { self.read_prim() }
	pub fn read_short(&mut self) -> Result<i16> { self.read_prim() }
	pub fn read_ushort(&mut self) -> Result<u16> { self.read_prim() }
	pub fn read_int(&mut self) -> Result<i32> { self.read_prim() }
	pub fn read_uint(&mut self) -> Result<u32> { self.read_prim() }
	pub fn read_long(&mut self) -> Result<i64> { self.read_prim() }
	pub fn read_ulong(&mut self) -> Result<u64> { self.read_prim() }
	pub fn read_float(&mut self) -> Result<f32> { self.read_prim::<u32>().map(f32::from_bits) }
	pub fn read_double(&mut self) -> Result<f64> { self.read_prim::<u64>().map(f64::from_bits) }

	pub fn write_byte(&mut self, value: i8) -> Result { self.write_prim(value) }
	pub fn write_ubyte(&mut self, value: u8) -> Result { self.write_prim(value) }
	pub fn write_short(&mut self, value: i16) -> Result { self.write_prim(value) }
	pub fn write_ushort(&mut self, value: u16) -> Result { self.write_prim(value) }
	pub fn write_int(&mut self, value: i32) -> Result { self.write_prim(value) }
	pub fn write_uint(&mut self, value: u32) -> Result { self.write_prim(value) }
	pub fn write_long(&mut self, value: i64) -> Result { self.write_prim(value) }
	pub fn write_ulong(&mut self, value: u64) -> Result { self.write_prim(value) }
	pub fn write_float(&mut self, value: f32) -> Result { self.write_prim(value.to_bits()) }
	pub fn write_double(&mut self, value: f64) -> Result { self.write_prim(value.to_bits()) }

	/// Relative bulk write: copies all of `src` and advances `position` by `src.len()`.
	pub fn write_bytes(&mut self, src: &[u8]) -> Result {
		if self.remaining() < src.len() {
			return Err(Error::buffer_overflow(self.remaining()));
		}
		self.storage[self.position..self.position + src.len()].copy_from_slice(src);
		self.position += src.len();
		Ok(())
	}

	/// Relative bulk read: fills `dst` entirely and advances `position` by `dst.len()`.
	pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result {
		if self.remaining() < dst.len() {
			return Err(Error::underflow(dst.len(), self.remaining()));
		}
		dst.copy_from_slice(&self.storage[self.position..self.position + dst.len()]);
		self.position += dst.len();
		Ok(())
	}

	/// Copies `other.remaining()` bytes from `other` into `self`, advancing both
	/// cursors. Bytes are copied verbatim; no byte-order conversion is applied even if
	/// the two buffers disagree, since this moves raw wire bytes, not typed values.
	pub fn write_buffer(&mut self, other: &mut Buffer) -> Result {
		let count = other.remaining();
		self.write_bytes(&other.storage[other.position..other.position + count])?;
		other.position += count;
		Ok(())
	}

	// -- Absolute typed I/O ---------------------------------------------------

	fn get_prim<T: PrimInt + Pod>(&self, index: usize) -> Result<T> {
		self.check_index(index, size_of::<T>())?;
		let mut value = T::zeroed();
		bytes_of_mut(&mut value).copy_from_slice(&self.storage[index..index + size_of::<T>()]);
		Ok(self.order.load(value))
	}

	fn set_prim<T: PrimInt + Pod>(&mut self, index: usize, value: T) -> Result {
		self.check_index(index, size_of::<T>())?;
		let value = self.order.store(value);
		self.storage[index..index + size_of::<T>()].copy_from_slice(bytes_of(&value));
		Ok(())
	}

	pub fn get(&self, index: usize) -> Result<u8> {
		self.check_index(index, 1)?;
		Ok(self.storage[index])
	}
	pub fn set(&mut self, index: usize, value: u8) -> Result {
		self.check_index(index, 1)?;
		self.storage[index] = value;
		Ok(())
	}
	pub fn get_short(&self, index: usize) -> Result<i16> { self.get_prim(index) }
	pub fn set_short(&mut self, index: usize, value: i16) -> Result { self.set_prim(index, value) }
	pub fn get_int(&self, index: usize) -> Result<i32> { self.get_prim(index) }
	pub fn set_int(&mut self, index: usize, value: i32) -> Result { self.set_prim(index, value) }
	pub fn get_long(&self, index: usize) -> Result<i64> { self.get_prim(index) }
	pub fn set_long(&mut self, index: usize, value: i64) -> Result { self.set_prim(index, value) }
	pub fn get_float(&self, index: usize) -> Result<f32> { self.get_prim::<u32>(index).map(f32::from_bits) }
	pub fn set_float(&mut self, index: usize, value: f32) -> Result { self.set_prim(index, value.to_bits()) }
	pub fn get_double(&self, index: usize) -> Result<f64> { self.get_prim::<u64>(index).map(f64::from_bits) }
	pub fn set_double(&mut self, index: usize, value: f64) -> Result { self.set_prim(index, value.to_bits()) }

	// -- Slicing ---------------------------------------------------------------

	/// Returns a child Buffer exposing `[position, limit)` as `[0, remaining)`. Does not
	/// change `self`'s position. The child's byte order equals the parent's.
	///
	/// This implementation copies rather than aliases storage (see the crate's design
	/// notes): the two Buffers are fully independent afterward, trading the zero-copy
	/// fast path for a `Buffer` that is trivially `Send`/`Sync` and safe to hand to a
	/// [`Pool`](crate::pool::Pool) across threads without any aliasing discipline to
	/// maintain.
	pub fn slice(&self) -> Buffer {
		Buffer {
			storage: self.storage[self.position..self.limit].to_vec().into_boxed_slice(),
			position: 0,
			limit: self.remaining(),
			order: self.order,
		}
	}

	// -- Bulk operations ---------------------------------------------------------

	/// True iff `self.remaining() == other.remaining()` and every corresponding byte is
	/// equal. Neither cursor is advanced.
	pub fn content_equals(&self, other: &Buffer) -> bool {
		self.remaining() == other.remaining()
			&& self.remaining_slice() == other.remaining_slice()
	}

	/// Index (into the shorter remaining range) of the first differing byte, or `None`
	/// if one is a prefix of the other and the lengths are equal (i.e. they're
	/// identical). When lengths differ and the shorter is a prefix of the longer,
	/// returns the shorter length. Neither cursor is advanced.
	pub fn mismatch(&self, other: &Buffer) -> Option<usize> {
		let a = self.remaining_slice();
		let b = other.remaining_slice();
		let min_len = a.len().min(b.len());
		for i in 0..min_len {
			if a[i] != b[i] {
				return Some(i);
			}
		}
		if a.len() == b.len() {
			None
		} else {
			Some(min_len)
		}
	}

	pub(crate) fn remaining_slice(&self) -> &[u8] {
		&self.storage[self.position..self.limit]
	}

	fn remaining_slice_mut(&mut self) -> &mut [u8] {
		&mut self.storage[self.position..self.limit]
	}

	/// Raw bytes at `[start, start + len)`, ignoring `position`/`limit`. Used by the
	/// stream processor to peek across chunk boundaries without consuming.
	pub(crate) fn bytes_in_range(&self, start: usize, len: usize) -> &[u8] {
		&self.storage[start..start + len]
	}

	/// Byte offset from `position` of the first occurrence of `needle` within
	/// `remaining`, or `None`. An empty needle matches at offset `0`.
	pub fn index_of(&self, needle: &[u8]) -> Option<usize> {
		if needle.is_empty() {
			return Some(0);
		}
		self.remaining_slice()
			.windows(needle.len())
			.position(|window| window == needle)
	}

	/// As [`index_of`](Self::index_of), for a single byte.
	pub fn index_of_byte(&self, byte: u8) -> Option<usize> {
		self.remaining_slice().iter().position(|&b| b == byte)
	}

	/// Searches for a multi-byte numeric value, serialized per this Buffer's byte order.
	/// When `aligned` is true, only offsets that are a multiple of the value's width
	/// (measured from `position`) are considered.
	pub fn index_of_int<T: PrimInt + Pod>(&self, value: T, aligned: bool) -> Option<usize> {
		let width = size_of::<T>();
		let wire = self.order.store(value);
		let needle = bytes_of(&wire);
		let haystack = self.remaining_slice();
		if haystack.len() < width {
			return None;
		}
		(0..=haystack.len() - width)
			.step_by(if aligned { width } else { 1 })
			.find(|&offset| &haystack[offset..offset + width] == needle)
	}

	/// Writes the repeating byte pattern `v` across `[position, limit)` and advances
	/// `position` to `limit`. If `remaining() % width != 0`, the trailing partial
	/// pattern is written as the corresponding prefix bytes of the pattern.
	pub fn fill<T: PrimInt + Pod>(&mut self, v: T) {
		let width = size_of::<T>();
		let pattern = bytes_of(&self.order.store(v)).to_vec();
		let dst = self.remaining_slice_mut();
		for (i, byte) in dst.iter_mut().enumerate() {
			*byte = pattern[i % width];
		}
		self.position = self.limit;
	}

	/// XORs every byte in `[position, limit)` with `mask`, serialized big-endian and
	/// repeated every 4 bytes starting at `position`. Does not advance `position`.
	/// `mask == 0` is a no-op.
	pub fn xor_mask(&mut self, mask: u32) {
		if mask == 0 {
			return;
		}
		let pattern = ByteOrder::mask_bytes(mask);
		for (i, byte) in self.remaining_slice_mut().iter_mut().enumerate() {
			*byte ^= pattern[i % 4];
		}
	}

	/// Equivalent to [`write_buffer`](Self::write_buffer) followed by
	/// [`xor_mask`](Self::xor_mask) over the newly written range.
	pub fn xor_mask_copy(&mut self, src: &mut Buffer, mask: u32) -> Result {
		let start = self.position;
		self.write_buffer(src)?;
		let end = self.position;
		if mask != 0 {
			let pattern = ByteOrder::mask_bytes(mask);
			for (i, byte) in self.storage[start..end].iter_mut().enumerate() {
				*byte ^= pattern[i % 4];
			}
		}
		Ok(())
	}

	// -- Strings -----------------------------------------------------------------

	/// Consumes exactly `length` bytes and decodes them per `charset`, advancing
	/// `position` by `length`. Malformed input is handled per `policy.on_malformed_input`.
	#[cfg(feature = "alloc")]
	pub fn read_string(&mut self, length: usize, charset: Charset, policy: CodecPolicy) -> Result<String> {
		if self.remaining() < length {
			return Err(Error::underflow(length, self.remaining()));
		}
		let start = self.position;
		self.position += length;
		decode_one_shot(&self.storage[start..start + length], charset, policy)
	}

	/// Encodes `text` in `charset` and advances `position` by the number of bytes
	/// written. Fails with `BufferOverflow` if that exceeds `remaining`.
	#[cfg(feature = "alloc")]
	pub fn write_string(&mut self, text: &str, charset: Charset) -> Result {
		let encoded = encode_one_shot(text, charset)?;
		self.write_bytes(&encoded)
	}

	/// Reads until a `\n` or `\r\n` terminator, or the end of the buffer, consuming the
	/// terminator and returning the text before it. A lone `\r` is not a terminator and
	/// is included in the returned text.
	#[cfg(feature = "alloc")]
	pub fn read_utf8_line(&mut self) -> Result<String> {
		let data = self.remaining_slice();
		let mut end = data.len();
		let mut consumed = data.len();
		for (i, &byte) in data.iter().enumerate() {
			if byte == b'\n' {
				end = if i > 0 && data[i - 1] == b'\r' { i - 1 } else { i };
				consumed = i + 1;
				break;
			}
		}
		let line = &self.storage[self.position..self.position + end];
		let text = decode_one_shot(line, Charset::Utf8, CodecPolicy::REPORT)?;
		self.position += consumed;
		Ok(text)
	}
}

#[cfg(feature = "alloc")]
fn decode_one_shot(bytes: &[u8], charset: Charset, policy: CodecPolicy) -> Result<String> {
	use crate::decoder::StreamingStringDecoder;
	let mut decoder = StreamingStringDecoder::new(charset, policy);
	let mut out = String::new();
	decoder.decode_bytes(bytes, &mut out)?;
	decoder.finish(&mut out)?;
	Ok(out)
}

#[cfg(feature = "alloc")]
fn encode_one_shot(text: &str, charset: Charset) -> Result<Vec<u8>> {
	// Unqualified Utf16/Utf32 encode the same as their BE variants; the BOM is only
	// sniffed on decode.
	if charset == Charset::Utf16 {
		return encode_one_shot(text, Charset::Utf16Be);
	}
	if charset == Charset::Utf32 {
		return encode_one_shot(text, Charset::Utf32Be);
	}
	let mut out = Vec::with_capacity(text.len());
	match charset {
		Charset::Utf8 => out.extend_from_slice(text.as_bytes()),
		Charset::Utf16 | Charset::Utf32 => unreachable!(),
		Charset::Utf16Be | Charset::Utf16Le => {
			for unit in text.encode_utf16() {
				let bytes = if charset == Charset::Utf16Be { unit.to_be_bytes() } else { unit.to_le_bytes() };
				out.extend_from_slice(&bytes);
			}
		}
		Charset::Utf32Be | Charset::Utf32Le => {
			for ch in text.chars() {
				let scalar = ch as u32;
				let bytes = if charset == Charset::Utf32Be { scalar.to_be_bytes() } else { scalar.to_le_bytes() };
				out.extend_from_slice(&bytes);
			}
		}
		Charset::Ascii => {
			for byte in text.bytes() {
				if byte >= 0x80 {
					return Err(Error::Encoding { codepoint: byte as u32 });
				}
				out.push(byte);
			}
		}
		Charset::Latin1 => {
			for ch in text.chars() {
				let scalar = ch as u32;
				if scalar > 0xFF {
					return Err(Error::Encoding { codepoint: scalar });
				}
				out.push(scalar as u8);
			}
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn round_trip_big_endian_int() {
		let mut b = Buffer::new(4);
		b.write_int(0x1234_5678).unwrap();
		b.reset_for_read();
		assert_eq!(b.read_int().unwrap(), 0x1234_5678);
		assert_eq!(b.position(), 4);
		assert_eq!(b.limit(), 4);
	}

	#[test]
	fn round_trip_little_endian_long() {
		let mut b = Buffer::with_order(8, ByteOrder::LittleEndian);
		b.write_long(0x0123_4567_89AB_CDEFu64 as i64).unwrap();
		b.reset_for_read();
		assert_eq!(b.read_byte().unwrap() as u8, 0xEF);
	}

	#[test]
	fn utf8_line_reading() {
		let mut b = Buffer::wrap(b"\nhello\r\n\nhello\n\nhello\r\n".to_vec());
		let mut lines = Vec::new();
		while b.has_remaining() {
			lines.push(b.read_utf8_line().unwrap());
		}
		assert_eq!(lines, ["", "hello", "", "hello", "", "hello", ""]);
		assert_eq!(b.remaining(), 0);
	}

	#[test]
	fn utf8_line_without_terminator_consumes_to_limit() {
		let mut b = Buffer::wrap(b"trailing".to_vec());
		assert_eq!(b.read_utf8_line().unwrap(), "trailing");
		assert_eq!(b.position(), b.limit());
	}

	#[test]
	fn xor_mask_round_trip() {
		let mut b = Buffer::new(100);
		for i in 0..100u8 {
			b.set(i as usize, i).unwrap();
		}
		b.xor_mask(0xDEAD_BEEF);
		b.xor_mask(0xDEAD_BEEF);
		for i in 0..100u8 {
			assert_eq!(b.get(i as usize).unwrap(), i);
		}
	}

	#[test]
	fn empty_buffer_boundary_behaviors() {
		let mut b = Buffer::new(0);
		assert_eq!(b.remaining(), 0);
		assert!(matches!(b.read_byte(), Err(Error::BufferUnderflow { .. })));
		assert!(matches!(b.write_byte(1), Err(Error::BufferOverflow { .. })));
		assert!(b.content_equals(&Buffer::new(0)));
	}

	#[test]
	fn index_of_empty_needle_returns_zero() {
		let b = Buffer::wrap(b"abc".to_vec());
		assert_eq!(b.index_of(&[]), Some(0));
	}

	#[test]
	fn fill_with_remainder_writes_pattern_prefix() {
		let mut b = Buffer::new(5);
		b.fill(0x1122_3344u32 as i32);
		assert_eq!(b.storage.to_vec(), vec![0x11, 0x22, 0x33, 0x44, 0x11]);
		assert_eq!(b.position(), b.limit());
	}

	#[test]
	fn absolute_accessors_do_not_move_position() {
		let mut b = Buffer::new(8);
		b.set_int(0, 42).unwrap();
		assert_eq!(b.position(), 0);
		assert_eq!(b.get_int(0).unwrap(), 42);
		assert_eq!(b.position(), 0);
	}

	#[test]
	fn slice_isolates_cursor() {
		let mut parent = Buffer::new(8);
		parent.set_position(3).unwrap();
		let child = parent.slice();
		assert_eq!(parent.position(), 3);
		assert_eq!(child.position(), 0);
		assert_eq!(child.limit(), parent.limit() - 3);
	}

	proptest! {
		#[test]
		fn byte_order_consistency(value in any::<i32>()) {
			let mut b = Buffer::new(4);
			b.write_int(value).unwrap();
			let expected = value.to_be_bytes();
			b.reset_for_read();
			for expected_byte in expected {
				prop_assert_eq!(b.read_byte().unwrap() as u8, expected_byte);
			}
		}

		#[test]
		fn write_read_round_trip(value in any::<i32>()) {
			let mut b = Buffer::new(4);
			b.reset_for_write();
			b.write_int(value).unwrap();
			b.reset_for_read();
			prop_assert_eq!(b.read_int().unwrap(), value);
			prop_assert_eq!(b.remaining(), 0);
		}
	}
}
