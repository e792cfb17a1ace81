// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! The error taxonomy shared by every module: [`Buffer`](crate::buffer::Buffer) cursor
//! violations, [`Pool`](crate::pool::Pool) bookkeeping, stream-processor signalling, and
//! decoder failures all surface through the same [`Error`] enum so a caller only has to
//! match one type regardless of which layer raised it.

#[cfg(feature = "alloc")]
use alloc::collections::TryReserveError;
#[cfg(feature = "alloc")]
use simdutf8::compat::Utf8Error;
use core::fmt::{Display, Formatter, Result as FmtResult};

/// Offset, in the original logical stream, at which a decoding error begins.
///
/// For a one-shot decode this is simply the byte index into the input. For a streaming
/// decode it's relative to the first byte ever fed to the decoder, so an error raised on
/// the third `decode` call still reports a position a caller can map back to the original
/// source.
pub type StreamOffset = u64;

/// A stream error.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
	/// An IO error.
	#[cfg(feature = "std")]
	Io(std::io::Error),
	/// An invalid ASCII byte was encountered.
	#[cfg(feature = "alloc")]
	Ascii(u8),
	/// Invalid UTF-8 bytes were encountered in a one-shot (non-streaming) decode.
	#[cfg(feature = "alloc")]
	Utf8(Utf8Error),
	/// Error while attempting to reserve capacity.
	#[cfg(feature = "alloc")]
	Allocation(TryReserveError),
	/// A relative write would advance `position` past `limit`.
	BufferOverflow { remaining: usize },
	/// A relative read would advance `position` past `limit`.
	BufferUnderflow { required: usize, remaining: usize },
	/// An absolute index, or a `position`/`limit` setter argument, violated
	/// `0 <= position <= limit <= capacity`.
	IndexError { index: usize, bound: usize },
	/// A stream processor is `finished` and a read/peek needs more data than is queued.
	EndOfStream { required_count: usize },
	/// A stream processor is not finished, but doesn't yet have the bytes a peek/read
	/// needs. Recoverable: state is unchanged, retry after more `append`.
	NeedMore { required_count: usize, available: usize },
	/// A malformed or unmappable character was found while the active error policy is
	/// `Report`.
	Decoding(DecodingError),
	/// A character could not be encoded in the destination charset.
	Encoding { codepoint: u32 },
	/// Operation attempted on a released, closed, or otherwise dead resource.
	Closed,
	/// A `SingleThreaded` pool detected concurrent use from more than one caller.
	/// Best-effort: not every misuse is guaranteed to be caught.
	ConcurrentMisuse,
	/// A sink reached a hard storage limit, causing an overflow while writing. An
	/// example is a mutable slice, which can't write more bytes than its length.
	Overflow {
		/// The byte count remaining in the attempted read operation.
		remaining: usize
	},
	/// Premature end-of-stream.
	End {
		/// The total required byte count.
		required_count: usize
	},
	/// A "read to end" method was called on a source with no defined end.
	NoEnd,
	/// Buffer size is insufficient to buffer a read operation.
	InsufficientBuffer {
		/// The buffer's spare capacity.
		spare_capacity: usize,
		/// The total required byte count.
		required_count: usize
	},
}

/// Detail carried by [`Error::Decoding`]: where the malformed or unmappable sequence
/// begins and how many bytes it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodingError {
	pub offset: StreamOffset,
	pub length: u8,
	pub kind: DecodingErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingErrorKind {
	/// The byte or code-unit sequence is not valid in the source charset: an overlong
	/// UTF-8 encoding, a lone surrogate, an out-of-range UTF-32 scalar value, or a
	/// sequence truncated at `finish`.
	MalformedSequence,
	/// The sequence is well-formed but doesn't map to a Unicode scalar value. Reserved
	/// for charsets with unmappable ranges; none of the UTF encodings raise this.
	UnmappableCharacter,
}

impl Error {
	/// Create an overflow error.
	#[inline]
	pub const fn overflow(remaining: usize) -> Self {
		Self::Overflow { remaining }
	}
	/// Create an end-of-stream error.
	#[inline]
	pub const fn end(required_count: usize) -> Self {
		Self::End { required_count }
	}
	/// Create an insufficient buffer capacity error.
	#[inline]
	pub const fn insufficient_buffer(spare_capacity: usize, required_count: usize) -> Self {
		Self::InsufficientBuffer { spare_capacity, required_count }
	}
	#[inline]
	pub const fn index(index: usize, bound: usize) -> Self {
		Self::IndexError { index, bound }
	}
	#[inline]
	pub const fn underflow(required: usize, remaining: usize) -> Self {
		Self::BufferUnderflow { required, remaining }
	}
	#[inline]
	pub const fn buffer_overflow(remaining: usize) -> Self {
		Self::BufferOverflow { remaining }
	}
	#[inline]
	pub const fn malformed(offset: StreamOffset, length: u8) -> Self {
		Self::Decoding(DecodingError { offset, length, kind: DecodingErrorKind::MalformedSequence })
	}
	/// True for the one variant a caller is expected to recover from by retrying after
	/// more input, rather than treating as terminal.
	pub const fn is_recoverable(&self) -> bool {
		matches!(self, Self::NeedMore { .. })
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(error) => Some(error),
			#[cfg(feature = "alloc")]
			Self::Utf8(error) => Some(error),
			#[cfg(feature = "alloc")]
			Self::Allocation(error) => Some(error),
			_ => None,
		}
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			#[cfg(feature = "std")]
			Self::Io(error) => Display::fmt(error, f),
			#[cfg(feature = "alloc")]
			Self::Ascii(byte) => write!(f, "cannot read non-ASCII byte {byte:#X} into a UTF-8 string"),
			#[cfg(feature = "alloc")]
			Self::Utf8(error) => Display::fmt(error, f),
			#[cfg(feature = "alloc")]
			Self::Allocation(error) => Display::fmt(error, f),
			Self::BufferOverflow { remaining } => write!(f, "buffer overflow with {remaining} bytes remaining"),
			Self::BufferUnderflow { required, remaining } =>
				write!(f, "buffer underflow: needed {required} bytes, {remaining} remaining"),
			Self::IndexError { index, bound } => write!(f, "index {index} out of range for bound {bound}"),
			Self::EndOfStream { required_count } =>
				write!(f, "end of stream reached needing {required_count} more bytes"),
			Self::NeedMore { required_count, available } =>
				write!(f, "need {required_count} bytes, only {available} available"),
			Self::Decoding(error) => write!(
				f,
				"{} at offset {}, length {}",
				match error.kind {
					DecodingErrorKind::MalformedSequence => "malformed sequence",
					DecodingErrorKind::UnmappableCharacter => "unmappable character",
				},
				error.offset,
				error.length,
			),
			Self::Encoding { codepoint } => write!(f, "character U+{codepoint:04X} is not encodable in this charset"),
			Self::Closed => write!(f, "operation on a closed or released resource"),
			Self::ConcurrentMisuse => write!(f, "concurrent use of a single-threaded pool detected"),
			Self::Overflow { remaining } => write!(f, "sink overflowed with {remaining} bytes remaining to write"),
			Self::End { required_count } => write!(f, "premature end-of-stream when reading {required_count} bytes"),
			Self::NoEnd => write!(f, "cannot read to end of infinite source"),
			Self::InsufficientBuffer {
				spare_capacity, required_count
			} => write!(f, "insufficient buffer capacity ({spare_capacity}) to read {required_count} bytes"),
		}
	}
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
	#[inline]
	fn from(value: std::io::Error) -> Self {
		Self::Io(value)
	}
}

#[cfg(feature = "alloc")]
impl From<Utf8Error> for Error {
	#[inline]
	fn from(value: Utf8Error) -> Self {
		Self::Utf8(value)
	}
}

#[cfg(feature = "alloc")]
impl From<TryReserveError> for Error {
	#[inline]
	fn from(value: TryReserveError) -> Self {
		Self::Allocation(value)
	}
}

pub type Result<T = (), E = Error> = core::result::Result<T, E>;
