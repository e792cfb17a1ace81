// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! The two-valued byte order a [`Buffer`](crate::buffer::Buffer) is tagged with at
//! construction. Rather than branching on the tag at every typed read/write, each
//! primitive load/store goes through [`ByteOrder::read`]/[`ByteOrder::write`], which
//! resolve to a direct load or a byte-reverse depending on the tag versus the target's
//! native endianness; `num_traits::PrimInt::to_be`/`to_le` already compile this down to a
//! no-op or a single `bswap` instruction, so there's no need for two parallel code paths.

use bytemuck::Pod;
use num_traits::PrimInt;

/// The order in which a Buffer serializes multi-byte primitives. Fixed for the lifetime
/// of a Buffer; there is no per-call override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
	/// Most significant byte first. The default for a newly constructed Buffer.
	BigEndian,
	/// Least significant byte first.
	LittleEndian,
}

impl Default for ByteOrder {
	fn default() -> Self {
		Self::BigEndian
	}
}

impl ByteOrder {
	/// Reinterprets `bytes` as `T`, applying a byte-reverse if this order disagrees with
	/// `T`'s native representation.
	#[inline]
	pub fn load<T: PrimInt + Pod>(self, bytes: T) -> T {
		match self {
			Self::BigEndian => T::from_be(bytes),
			Self::LittleEndian => T::from_le(bytes),
		}
	}

	/// Prepares `value` for storage as raw bytes, applying a byte-reverse if this order
	/// disagrees with `T`'s native representation.
	#[inline]
	pub fn store<T: PrimInt + Pod>(self, value: T) -> T {
		match self {
			Self::BigEndian => value.to_be(),
			Self::LittleEndian => value.to_le(),
		}
	}

	/// Serializes a 32-bit mask the way [`Buffer::xor_mask`](crate::buffer::Buffer::xor_mask)
	/// requires: always big-endian, independent of the Buffer's own order.
	pub(crate) fn mask_bytes(mask: u32) -> [u8; 4] {
		mask.to_be_bytes()
	}
}
