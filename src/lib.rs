// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! `octeto` is a portable byte-buffer engine: a position/limit cursor over a mutable byte
//! region ([`buffer::Buffer`]), a reuse pool for those regions ([`pool::Pool`]), a
//! fragment-aware stream cursor ([`stream::StreamProcessor`]), and an incremental string
//! decoder that survives arbitrary chunk boundaries ([`decoder::StreamingStringDecoder`]).
//!
//! The lower layer is a pair of extension traits, [`DataSource`] and [`DataSink`], that
//! read and write primitive values over any stream-like type: bytes, little- or
//! big-endian integers, and UTF-8 strings. [`Buffer`](buffer::Buffer) is built on top of
//! these rather than duplicating their typed-I/O logic.
//!
//! Implementations for byte slices and `std::io`'s buffered readers and writers are
//! provided, but it's easy to write your own:
//!
//! ```ignore
//! # use octeto::{DataSource, DataSink, Result};
//!
//! struct MySource {
//!     buffer: Vec<u8>,
//!     // ...
//! }
//!
//! impl DataSource for MySource {
//!     fn available(&self) -> usize {
//!         self.buffer.len()
//!     }
//!
//!     fn request(&mut self, count: usize) -> Result<bool> {
//!         if self.available() < count {
//!             // Fill the buffer...
//!         }
//!
//!         Ok(self.available() >= count)
//!     }
//!
//!     fn read_bytes<'a>(&mut self, buf: &'a mut [u8]) -> Result<&'a [u8]> {
//!         let count = self.available().min(buf.len());
//!         buf[..count].copy_from_slice(&self.buffer);
//!         self.buffer.drain(..count);
//!         Ok(&buf[..count])
//!     }
//!
//!     fn read_utf8_to_end<'a>(&mut self, buf: &'a mut String) -> Result<&'a str> {
//!         self.read_utf8(self.available(), buf)
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod slice;
mod std_io;
mod source;
mod sink;
mod vec;
mod wrappers;
pub mod error;
pub mod byte_order;
#[cfg(feature = "alloc")]
pub mod charset;
#[cfg(feature = "alloc")]
pub mod buffer;
#[cfg(feature = "alloc")]
pub mod pool;
#[cfg(feature = "alloc")]
pub mod stream;
#[cfg(feature = "alloc")]
pub mod decoder;

#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};
pub use error::{Error, Result};
pub use sink::{DataSink, GenericDataSink, VecSink};
pub use source::{DataSource, BufferAccess};
pub use byte_order::ByteOrder;
#[cfg(feature = "alloc")]
pub use buffer::Buffer;
#[cfg(feature = "alloc")]
pub use pool::Pool;
#[cfg(feature = "alloc")]
pub use stream::StreamProcessor;
#[cfg(feature = "alloc")]
pub use decoder::StreamingStringDecoder;

#[cfg(feature = "alloc")]
pub(crate) unsafe fn append_utf8<R>(buf: &mut String, read: R) -> Result<&str>
where
	R: FnOnce(&mut Vec<u8>) -> Result<usize> {
	use simdutf8::compat::from_utf8;

	// A drop guard which ensures the string is truncated to valid UTF-8 when out
	// of scope. Starts by truncating to its original length, only allowing the
	// string to grow after the new bytes are checked to be valid UTF-8.
	struct Guard<'a> {
		len: usize,
		buf: &'a mut Vec<u8>
	}

	impl Drop for Guard<'_> {
		fn drop(&mut self) {
			unsafe {
				self.buf.set_len(self.len);
			}
		}
	}

	let start;
	{
		let mut guard = Guard { len: buf.len(), buf: unsafe { buf.as_mut_vec() } };
		let count = read(guard.buf)?;
		from_utf8(&guard.buf[guard.len..][..count])?;
		start = guard.len;
		guard.len += count;
	}
	Ok(&buf[start..])
}
