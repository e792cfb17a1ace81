// Copyright 2024 - Strixpyrr
// SPDX-License-Identifier: Apache-2.0

//! [`StreamingStringDecoder`]: converts a stream of byte chunks into characters appended
//! to a `String`, carrying incomplete trailing sequences across calls. For any chunking
//! of a byte stream, feeding the chunks in order and calling `finish` must produce the
//! same text as decoding the whole stream at once — that invariant is what the `pending`
//! buffer exists to uphold.

use alloc::string::String;
use alloc::vec::Vec;
use crate::charset::{Charset, CodecPolicy, ErrorAction, REPLACEMENT_CHARACTER};
use crate::error::StreamOffset;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolvedOrder {
	Big,
	Little,
}

/// Converts a byte stream in one [`Charset`] into text, one `decode` call at a time.
///
/// Not thread-safe: one instance per logical stream. After [`close`](Self::close) every
/// method but a fresh construction returns [`Error::Closed`].
pub struct StreamingStringDecoder {
	charset: Charset,
	policy: CodecPolicy,
	/// Bytes of an incomplete trailing sequence from the previous feed, bounded by
	/// `charset.max_unit_width() - 1`.
	pending: Vec<u8>,
	/// Total bytes ever passed to `decode`, used to position `DecodingError`s relative
	/// to the start of the logical stream rather than the current call's input.
	consumed: StreamOffset,
	/// Resolved byte order for `Utf16`/`Utf32` after BOM sniffing; fixed immediately for
	/// every other charset.
	order: Option<ResolvedOrder>,
	bom_checked: bool,
	closed: bool,
}

impl StreamingStringDecoder {
	pub fn new(charset: Charset, policy: CodecPolicy) -> Self {
		let order = match charset {
			Charset::Utf16Be | Charset::Utf32Be => Some(ResolvedOrder::Big),
			Charset::Utf16Le | Charset::Utf32Le => Some(ResolvedOrder::Little),
			_ => None,
		};
		Self {
			charset,
			policy,
			pending: Vec::with_capacity(charset.max_unit_width().saturating_sub(1)),
			consumed: 0,
			order,
			bom_checked: !charset.has_bom_sniffing(),
			closed: false,
		}
	}

	pub fn charset(&self) -> Charset { self.charset }
	pub fn policy(&self) -> CodecPolicy { self.policy }

	fn check_open(&self) -> Result {
		if self.closed { Err(Error::Closed) } else { Ok(()) }
	}

	/// Consumes all of `input`, appending decoded characters to `out`. Returns the
	/// number of UTF-16 code units appended (matching the width a `char::encode_utf16`
	/// would occupy, regardless of this decoder's source charset).
	pub fn decode_bytes(&mut self, input: &[u8], out: &mut String) -> Result<usize> {
		self.check_open()?;
		if input.is_empty() {
			return Ok(0);
		}
		let window_start = self.consumed - self.pending.len() as StreamOffset;
		self.consumed += input.len() as StreamOffset;

		let mut work = Vec::with_capacity(self.pending.len() + input.len());
		work.extend_from_slice(&self.pending);
		work.extend_from_slice(input);
		self.pending.clear();

		match self.charset {
			Charset::Utf8 => self.decode_utf8(&work, window_start, out),
			Charset::Utf16 | Charset::Utf16Be | Charset::Utf16Le => self.decode_utf16(&work, window_start, out),
			Charset::Utf32 | Charset::Utf32Be | Charset::Utf32Le => self.decode_utf32(&work, window_start, out),
			Charset::Ascii => self.decode_ascii(&work, window_start, out),
			Charset::Latin1 => self.decode_latin1(&work, out),
		}
	}

	/// Declares end-of-input and flushes any pending state. If the pending bytes don't
	/// form a complete sequence, applies `on_malformed_input`.
	pub fn finish(&mut self, out: &mut String) -> Result<usize> {
		self.check_open()?;
		if self.pending.is_empty() {
			return Ok(0);
		}
		let offset = self.consumed - self.pending.len() as StreamOffset;
		let length = self.pending.len() as u8;
		self.pending.clear();
		match self.policy.on_malformed_input {
			ErrorAction::Report => Err(Error::malformed(offset, length)),
			ErrorAction::Replace => {
				out.push(REPLACEMENT_CHARACTER);
				Ok(REPLACEMENT_CHARACTER.len_utf16())
			}
		}
	}

	/// Returns to the initial state, discarding pending bytes without raising an error.
	/// Indistinguishable afterward from a freshly constructed decoder for the same
	/// charset and policy.
	pub fn reset(&mut self) -> Result {
		self.check_open()?;
		self.pending.clear();
		self.consumed = 0;
		self.order = match self.charset {
			Charset::Utf16Be | Charset::Utf32Be => Some(ResolvedOrder::Big),
			Charset::Utf16Le | Charset::Utf32Le => Some(ResolvedOrder::Little),
			_ => None,
		};
		self.bom_checked = !self.charset.has_bom_sniffing();
		Ok(())
	}

	/// Releases internal state; the decoder is unusable afterward.
	pub fn close(&mut self) {
		self.pending.clear();
		self.pending.shrink_to_fit();
		self.closed = true;
	}

	// -- UTF-8 --------------------------------------------------------------------

	fn decode_utf8(&mut self, work: &[u8], window_start: StreamOffset, out: &mut String) -> Result<usize> {
		let mut i = 0;
		let mut units = 0;
		while i < work.len() {
			let seq_len = utf8_sequence_len(work[i]);
			if seq_len == 0 {
				units += self.handle_malformed_utf8(work, &mut i, window_start, out)?;
				continue;
			}
			if i + seq_len > work.len() {
				// Only a genuine partial sequence if every byte seen so far is a valid
				// continuation byte; otherwise it's malformed, not merely incomplete.
				if work[i + 1..].iter().all(|&b| b & 0xC0 == 0x80) {
					self.pending.extend_from_slice(&work[i..]);
					return Ok(units);
				}
				units += self.handle_malformed_utf8(work, &mut i, window_start, out)?;
				continue;
			}
			let seq = &work[i..i + seq_len];
			if !seq[1..].iter().all(|&b| b & 0xC0 == 0x80) {
				units += self.handle_malformed_utf8(work, &mut i, window_start, out)?;
				continue;
			}
			let scalar = decode_utf8_scalar(seq);
			let valid = scalar >= utf8_min_scalar(seq_len)
				&& !(0xD800..=0xDFFF).contains(&scalar)
				&& scalar <= 0x10FFFF;
			if !valid {
				units += self.handle_malformed_utf8(work, &mut i, window_start, out)?;
				continue;
			}
			let ch = char::from_u32(scalar).expect("validated above");
			out.push(ch);
			units += ch.len_utf16();
			i += seq_len;
		}
		Ok(units)
	}

	fn handle_malformed_utf8(
		&mut self,
		work: &[u8],
		i: &mut usize,
		window_start: StreamOffset,
		out: &mut String,
	) -> Result<usize> {
		match self.policy.on_malformed_input {
			ErrorAction::Report => Err(Error::malformed(window_start + *i as StreamOffset, 1)),
			ErrorAction::Replace => {
				*i += 1;
				while *i < work.len() && work[*i] & 0xC0 == 0x80 {
					*i += 1;
				}
				out.push(REPLACEMENT_CHARACTER);
				Ok(REPLACEMENT_CHARACTER.len_utf16())
			}
		}
	}

	// -- UTF-16 -------------------------------------------------------------------

	fn decode_utf16(&mut self, work: &[u8], window_start: StreamOffset, out: &mut String) -> Result<usize> {
		let mut i = 0;
		let mut units = 0;

		if !self.bom_checked {
			if work.len() < 2 {
				self.pending.extend_from_slice(work);
				return Ok(0);
			}
			match [work[0], work[1]] {
				[0xFE, 0xFF] => { self.order = Some(ResolvedOrder::Big); i = 2; }
				[0xFF, 0xFE] => { self.order = Some(ResolvedOrder::Little); i = 2; }
				_ => self.order = Some(ResolvedOrder::Big),
			}
			self.bom_checked = true;
		}
		let order = self.order.expect("resolved above or at construction");

		while i < work.len() {
			if i + 2 > work.len() {
				self.pending.extend_from_slice(&work[i..]);
				return Ok(units);
			}
			let hi_unit = read_u16(&work[i..i + 2], order);
			if (0xD800..=0xDBFF).contains(&hi_unit) {
				if i + 4 > work.len() {
					self.pending.extend_from_slice(&work[i..]);
					return Ok(units);
				}
				let lo_unit = read_u16(&work[i + 2..i + 4], order);
				if (0xDC00..=0xDFFF).contains(&lo_unit) {
					let scalar = 0x10000
						+ ((hi_unit as u32 - 0xD800) << 10)
						+ (lo_unit as u32 - 0xDC00);
					out.push(char::from_u32(scalar).expect("valid surrogate pair"));
					units += 2;
					i += 4;
				} else {
					units += self.handle_malformed_unit(window_start + i as StreamOffset, 2, out)?;
					i += 2;
				}
			} else if (0xDC00..=0xDFFF).contains(&hi_unit) {
				// Lone low surrogate.
				units += self.handle_malformed_unit(window_start + i as StreamOffset, 2, out)?;
				i += 2;
			} else {
				out.push(char::from_u32(hi_unit as u32).expect("BMP scalar"));
				units += 1;
				i += 2;
			}
		}
		Ok(units)
	}

	// -- UTF-32 -------------------------------------------------------------------

	fn decode_utf32(&mut self, work: &[u8], window_start: StreamOffset, out: &mut String) -> Result<usize> {
		let mut i = 0;
		let mut units = 0;

		if !self.bom_checked {
			if work.len() < 4 {
				self.pending.extend_from_slice(work);
				return Ok(0);
			}
			match &work[..4] {
				[0x00, 0x00, 0xFE, 0xFF] => { self.order = Some(ResolvedOrder::Big); i = 4; }
				[0xFF, 0xFE, 0x00, 0x00] => { self.order = Some(ResolvedOrder::Little); i = 4; }
				_ => self.order = Some(ResolvedOrder::Big),
			}
			self.bom_checked = true;
		}
		let order = self.order.expect("resolved above or at construction");

		while i < work.len() {
			if i + 4 > work.len() {
				self.pending.extend_from_slice(&work[i..]);
				return Ok(units);
			}
			let scalar = read_u32(&work[i..i + 4], order);
			if scalar > 0x10FFFF || (0xD800..=0xDFFF).contains(&scalar) {
				units += self.handle_malformed_unit(window_start + i as StreamOffset, 4, out)?;
			} else {
				let ch = char::from_u32(scalar).expect("validated above");
				out.push(ch);
				units += ch.len_utf16();
			}
			i += 4;
		}
		Ok(units)
	}

	fn handle_malformed_unit(&mut self, offset: StreamOffset, length: u8, out: &mut String) -> Result<usize> {
		match self.policy.on_malformed_input {
			ErrorAction::Report => Err(Error::malformed(offset, length)),
			ErrorAction::Replace => {
				out.push(REPLACEMENT_CHARACTER);
				Ok(REPLACEMENT_CHARACTER.len_utf16())
			}
		}
	}

	// -- ASCII / Latin-1 -----------------------------------------------------------

	fn decode_ascii(&mut self, work: &[u8], window_start: StreamOffset, out: &mut String) -> Result<usize> {
		let mut units = 0;
		for (i, &byte) in work.iter().enumerate() {
			if byte >= 0x80 {
				units += self.handle_malformed_unit(window_start + i as StreamOffset, 1, out)?;
			} else {
				out.push(byte as char);
				units += 1;
			}
		}
		Ok(units)
	}

	fn decode_latin1(&mut self, work: &[u8], out: &mut String) -> Result<usize> {
		for &byte in work {
			out.push(byte as char);
		}
		Ok(work.len())
	}
}

fn utf8_sequence_len(lead: u8) -> usize {
	if lead & 0x80 == 0 {
		1
	} else if lead & 0xE0 == 0xC0 {
		2
	} else if lead & 0xF0 == 0xE0 {
		3
	} else if lead & 0xF8 == 0xF0 {
		4
	} else {
		0
	}
}

fn utf8_min_scalar(len: usize) -> u32 {
	match len {
		1 => 0,
		2 => 0x80,
		3 => 0x800,
		4 => 0x10000,
		_ => unreachable!("seq_len is always 1..=4"),
	}
}

fn decode_utf8_scalar(seq: &[u8]) -> u32 {
	match seq.len() {
		1 => seq[0] as u32,
		2 => (u32::from(seq[0] & 0x1F) << 6) | u32::from(seq[1] & 0x3F),
		3 => (u32::from(seq[0] & 0x0F) << 12) | (u32::from(seq[1] & 0x3F) << 6) | u32::from(seq[2] & 0x3F),
		4 => (u32::from(seq[0] & 0x07) << 18)
			| (u32::from(seq[1] & 0x3F) << 12)
			| (u32::from(seq[2] & 0x3F) << 6)
			| u32::from(seq[3] & 0x3F),
		_ => unreachable!("seq_len is always 1..=4"),
	}
}

fn read_u16(bytes: &[u8], order: ResolvedOrder) -> u16 {
	match order {
		ResolvedOrder::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
		ResolvedOrder::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
	}
}

fn read_u32(bytes: &[u8], order: ResolvedOrder) -> u32 {
	let array = [bytes[0], bytes[1], bytes[2], bytes[3]];
	match order {
		ResolvedOrder::Big => u32::from_be_bytes(array),
		ResolvedOrder::Little => u32::from_le_bytes(array),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DecodingError;

	#[test]
	fn splits_four_byte_code_point_across_feeds() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
		let mut out = String::new();

		let appended = decoder.decode_bytes(&[0xF0, 0x9F], &mut out).unwrap();
		assert_eq!(appended, 0);
		assert!(out.is_empty());

		let appended = decoder.decode_bytes(&[0x98, 0x80], &mut out).unwrap();
		assert_eq!(appended, 2);
		assert_eq!(out, "\u{1F600}");

		assert_eq!(decoder.finish(&mut out).unwrap(), 0);
	}

	#[test]
	fn decodes_identically_regardless_of_chunking() {
		let text = "hello, \u{1F600} world \u{00e9}!";
		for chunk_size in 1..=text.len() {
			let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
			let mut out = String::new();
			for chunk in text.as_bytes().chunks(chunk_size) {
				decoder.decode_bytes(chunk, &mut out).unwrap();
			}
			decoder.finish(&mut out).unwrap();
			assert_eq!(out, text, "chunk_size = {chunk_size}");
		}
	}

	#[test]
	fn malformed_sequence_reports_offset() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(b"ok ", &mut out).unwrap();
		let err = decoder.decode_bytes(&[0xFF], &mut out).unwrap_err();
		assert!(matches!(err, Error::Decoding(DecodingError { offset: 3, .. })));
	}

	#[test]
	fn malformed_sequence_replaced_with_u_fffd() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPLACE);
		let mut out = String::new();
		decoder.decode_bytes(&[0xFF, b'x'], &mut out).unwrap();
		assert_eq!(out, "\u{FFFD}x");
	}

	#[test]
	fn truncated_tail_reported_on_finish() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(&[0xF0, 0x9F], &mut out).unwrap();
		assert!(matches!(decoder.finish(&mut out), Err(Error::Decoding(_))));
	}

	#[test]
	fn reset_returns_to_fresh_state() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(&[0xF0, 0x9F], &mut out).unwrap();
		decoder.reset().unwrap();
		assert_eq!(decoder.decode_bytes(b"abc", &mut out).unwrap(), 3);
		assert_eq!(out, "abc");
	}

	#[test]
	fn utf16_bom_defaults_big_endian() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf16, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(&[0x00, 0x41], &mut out).unwrap();
		assert_eq!(out, "A");
	}

	#[test]
	fn utf16_bom_little_endian_sniffed() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf16, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(&[0xFF, 0xFE, 0x41, 0x00], &mut out).unwrap();
		assert_eq!(out, "A");
	}

	#[test]
	fn ascii_rejects_high_bytes() {
		let mut decoder = StreamingStringDecoder::new(Charset::Ascii, CodecPolicy::REPORT);
		let mut out = String::new();
		assert!(decoder.decode_bytes(&[0x80], &mut out).is_err());
	}

	#[test]
	fn latin1_maps_every_byte() {
		let mut decoder = StreamingStringDecoder::new(Charset::Latin1, CodecPolicy::REPORT);
		let mut out = String::new();
		decoder.decode_bytes(&[0xE9], &mut out).unwrap();
		assert_eq!(out, "\u{00E9}");
	}

	#[test]
	fn closed_decoder_rejects_use() {
		let mut decoder = StreamingStringDecoder::new(Charset::Utf8, CodecPolicy::REPORT);
		decoder.close();
		let mut out = String::new();
		assert!(matches!(decoder.decode_bytes(b"x", &mut out), Err(Error::Closed)));
	}
}
