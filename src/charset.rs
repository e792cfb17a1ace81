// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! The fixed set of character encodings the engine understands: the six Unicode
//! Transformation Formats this crate supports plus two fixed-width legacy encodings.
//! This is deliberately closed — there is no registry, no `iconv` shell-out, no charset
//! negotiation. Protocol stacks that need more should decode outside this crate and feed
//! this engine raw bytes or UTF-8 text.

use core::fmt;

/// A supported character encoding.
///
/// `Utf16`/`Utf32` (no suffix) honor a byte-order mark at the start of input and default
/// to big-endian when none is present; the `Be`/`Le` variants never look for a BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
	Utf8,
	Utf16,
	Utf16Be,
	Utf16Le,
	Utf32,
	Utf32Be,
	Utf32Le,
	/// 7-bit ASCII. Bytes `>= 0x80` are malformed.
	Ascii,
	/// ISO-8859-1. Every byte maps to the codepoint of the same value; never malformed.
	Latin1,
}

impl Charset {
	/// Minimum number of bytes a complete sequence in this charset can occupy; used to
	/// size a streaming decoder's pending-byte buffer ahead of time.
	pub const fn min_unit_width(self) -> usize {
		match self {
			Self::Utf8 | Self::Ascii | Self::Latin1 => 1,
			Self::Utf16 | Self::Utf16Be | Self::Utf16Le => 2,
			Self::Utf32 | Self::Utf32Be | Self::Utf32Le => 4,
		}
	}

	/// Maximum number of bytes a single complete sequence in this charset can occupy.
	/// This bounds a streaming decoder's pending buffer: it never needs to hold more than
	/// `max_unit_width - 1` trailing bytes between feeds.
	pub const fn max_unit_width(self) -> usize {
		match self {
			Self::Utf8 => 4,
			Self::Ascii | Self::Latin1 => 1,
			Self::Utf16 | Self::Utf16Be | Self::Utf16Le => 4, // surrogate pair
			Self::Utf32 | Self::Utf32Be | Self::Utf32Le => 4,
		}
	}

	pub const fn has_bom_sniffing(self) -> bool {
		matches!(self, Self::Utf16 | Self::Utf32)
	}
}

impl fmt::Display for Charset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Utf8 => "UTF-8",
			Self::Utf16 => "UTF-16",
			Self::Utf16Be => "UTF-16BE",
			Self::Utf16Le => "UTF-16LE",
			Self::Utf32 => "UTF-32",
			Self::Utf32Be => "UTF-32BE",
			Self::Utf32Le => "UTF-32LE",
			Self::Ascii => "ASCII",
			Self::Latin1 => "ISO-8859-1",
		})
	}
}

/// What to do when a decoder or encoder hits a sequence it can't represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorAction {
	/// Surface a `DecodingError`/`EncodingError` to the caller and stop at the offending
	/// sequence.
	#[default]
	Report,
	/// Emit U+FFFD (the replacement character) and resume just past the offending byte
	/// sequence.
	Replace,
}

/// The two independent error policies a [`StreamingStringDecoder`](crate::decoder::StreamingStringDecoder)
/// is configured with, matching `onMalformedInput`/`onUnmappableCharacter` in the cursor
/// model this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecPolicy {
	pub on_malformed_input: ErrorAction,
	pub on_unmappable_character: ErrorAction,
}

impl Default for CodecPolicy {
	fn default() -> Self {
		Self {
			on_malformed_input: ErrorAction::Report,
			on_unmappable_character: ErrorAction::Report,
		}
	}
}

impl CodecPolicy {
	pub const REPORT: Self = Self {
		on_malformed_input: ErrorAction::Report,
		on_unmappable_character: ErrorAction::Report,
	};

	pub const REPLACE: Self = Self {
		on_malformed_input: ErrorAction::Replace,
		on_unmappable_character: ErrorAction::Replace,
	};
}

/// The Unicode replacement character, emitted in place of a malformed sequence under
/// [`ErrorAction::Replace`].
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';
