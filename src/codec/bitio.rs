// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Bit-level I/O for the text bitstream.
//!
//! The stream stores every field and every coded block as a token of ASCII
//! `0`/`1` characters. [`BitWriter`] builds one such token MSB-first and
//! [`BitReader`] consumes one, bit by bit or as fixed-width fields.

use super::error::{CodecError, Result};

/// Two's-complement style field encoding used for motion vectors and
/// escaped coefficient values: the low `width` bits of `value`.
pub fn bias_encode(value: i32, width: u8) -> u32 {
    (value as u32) & ((1u32 << width) - 1)
}

/// Inverse of [`bias_encode`]: raw values above `2^(width-1)` are negative.
///
/// The representable range is therefore `-(2^(width-1) - 1) ..= 2^(width-1)`,
/// e.g. `-15..=16` for a 5-bit motion vector component.
pub fn bias_decode(raw: u32, width: u8) -> i32 {
    let half = 1i32 << (width - 1);
    let raw = raw as i32;
    if raw > half {
        raw - (1i32 << width)
    } else {
        raw
    }
}

/// Bit writer producing one ASCII token.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    token: String,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { token: String::new() }
    }

    /// Write `count` bits (1–32) from the low bits of `value`, MSB first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!((1..=32).contains(&count));
        for i in (0..count).rev() {
            self.token.push(if (value >> i) & 1 == 1 { '1' } else { '0' });
        }
    }

    /// Write a signed value as a `width`-bit biased field.
    pub fn write_signed(&mut self, value: i32, width: u8) {
        self.write_bits(bias_encode(value, width), width);
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    pub fn finish(self) -> String {
        self.token
    }
}

/// Bit reader over one ASCII token.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader over `token`. Any character other than `0`/`1`
    /// is a format error.
    pub fn new(token: &'a str) -> Result<Self> {
        if let Some(bad) = token.bytes().find(|b| *b != b'0' && *b != b'1') {
            return Err(CodecError::format(format!(
                "unexpected character {:?} in bit token",
                bad as char
            )));
        }
        Ok(Self { data: token.as_bytes(), pos: 0 })
    }

    /// Read one bit.
    pub fn read_bit(&mut self) -> Result<u32> {
        match self.data.get(self.pos) {
            Some(b) => {
                self.pos += 1;
                Ok(u32::from(*b == b'1'))
            }
            None => Err(CodecError::decode("token ended inside a codeword")),
        }
    }

    /// Read `count` bits (1–32) and return them right-aligned.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!((1..=32).contains(&count));
        if self.remaining() < count as usize {
            return Err(CodecError::decode(format!(
                "need {count} bits for a fixed-width field, only {} left",
                self.remaining()
            )));
        }
        let mut val = 0u32;
        for _ in 0..count {
            val = (val << 1) | self.read_bit()?;
        }
        Ok(val)
    }

    /// Read a `width`-bit biased signed field.
    pub fn read_signed(&mut self, width: u8) -> Result<i32> {
        Ok(bias_decode(self.read_bits(width)?, width))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current bit position within the token.
    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_basic() {
        let mut w = BitWriter::new();
        w.write_bits(0b1010, 4);
        w.write_bits(0b0101, 4);
        assert_eq!(w.finish(), "10100101");
    }

    #[test]
    fn write_keeps_leading_zeros() {
        let mut w = BitWriter::new();
        w.write_bits(3, 12);
        assert_eq!(w.finish(), "000000000011");
    }

    #[test]
    fn read_basic_bits() {
        let mut r = BitReader::new("10100101").unwrap();
        assert_eq!(r.read_bits(4).unwrap(), 0b1010);
        assert_eq!(r.read_bits(4).unwrap(), 0b0101);
        assert!(r.is_exhausted());
    }

    #[test]
    fn short_field_is_decode_error() {
        let mut r = BitReader::new("101").unwrap();
        let err = r.read_bits(6).unwrap_err();
        assert_eq!(err.kind(), crate::codec::error::ErrorKind::Decode);
        // Nothing consumed on failure
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn rejects_non_binary_text() {
        assert!(BitReader::new("01x1").is_err());
    }

    #[test]
    fn bias_motion_vector_range() {
        // 5-bit fields: -15..=16
        assert_eq!(bias_encode(-1, 5), 0b11111);
        assert_eq!(bias_decode(0b11111, 5), -1);
        assert_eq!(bias_decode(16, 5), 16);
        assert_eq!(bias_decode(17, 5), -15);
        for v in -15..=16 {
            assert_eq!(bias_decode(bias_encode(v, 5), 5), v);
        }
    }

    #[test]
    fn bias_value_widths() {
        // 8-bit: -127..=128, 9-bit: -255..=256
        assert_eq!(bias_decode(bias_encode(128, 8), 8), 128);
        assert_eq!(bias_decode(bias_encode(-127, 8), 8), -127);
        assert_eq!(bias_decode(bias_encode(-255, 9), 9), -255);
        assert_eq!(bias_decode(bias_encode(256, 9), 9), 256);
    }

    #[test]
    fn signed_field_roundtrip() {
        let mut w = BitWriter::new();
        w.write_signed(-3, 5);
        w.write_signed(7, 5);
        let token = w.finish();
        let mut r = BitReader::new(&token).unwrap();
        assert_eq!(r.read_signed(5).unwrap(), -3);
        assert_eq!(r.read_signed(5).unwrap(), 7);
    }
}
