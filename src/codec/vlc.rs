// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Static run/value variable-length code table.
//!
//! The table maps a `(run, value)` pair to a prefix-free codeword. Each
//! entry is listed once for the positive magnitude; the last bit of the
//! codeword is the sign (`0` positive, `1` negative). One reserved symbol,
//! ESCAPE, announces a pair written with fixed-width fields instead.
//!
//! The table is built once on first use and shared read-only.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::bitio::{BitReader, BitWriter};
use super::error::{CodecError, Result};

/// Codeword announcing an escaped pair.
pub const ESCAPE_CODE: &str = "000001";

/// Width of the run field after ESCAPE (and in fixed-length pairs).
pub const RUN_BITS: u8 = 6;

/// `(run, magnitude, codeword without sign bit)`.
#[rustfmt::skip]
const ENTRIES: &[(u8, u8, &str)] = &[
    (0, 1, "11"), (0, 2, "0100"), (0, 3, "00101"), (0, 4, "0000110"),
    (0, 5, "00100110"), (0, 6, "00100001"), (0, 7, "0000001010"),
    (0, 8, "000000011101"), (0, 9, "000000011000"), (0, 10, "000000010011"),
    (0, 11, "000000010000"), (0, 12, "0000000011010"), (0, 13, "0000000011001"),
    (0, 14, "0000000011000"), (0, 15, "0000000010111"),
    (1, 1, "011"), (1, 2, "000110"), (1, 3, "00100101"), (1, 4, "0000001100"),
    (1, 5, "000000011011"), (1, 6, "0000000010110"), (1, 7, "0000000010101"),
    (2, 1, "0101"), (2, 2, "0000100"), (2, 3, "0000001011"), (2, 4, "000000010100"),
    (2, 5, "0000000010100"),
    (3, 1, "00111"), (3, 2, "00100100"), (3, 3, "000000011100"), (3, 4, "0000000010011"),
    (4, 1, "00110"), (4, 2, "0000001111"), (4, 3, "000000010010"),
    (5, 1, "000111"), (5, 2, "0000001001"), (5, 3, "0000000010010"),
    (6, 1, "000101"), (6, 2, "000000011110"),
    (7, 1, "000100"), (7, 2, "000000010101"),
    (8, 1, "0000111"), (8, 2, "000000010001"),
    (9, 1, "0000101"), (9, 2, "0000000010001"),
    (10, 1, "00100111"), (10, 2, "0000000010000"),
    (11, 1, "00100011"),
    (12, 1, "00100010"),
    (13, 1, "00100000"),
    (14, 1, "0000001110"),
    (15, 1, "0000001101"),
    (16, 1, "0000001000"),
    (17, 1, "000000011111"),
    (18, 1, "000000011010"),
    (19, 1, "000000011001"),
    (20, 1, "000000010111"),
    (21, 1, "000000010110"),
    (22, 1, "0000000011111"),
    (23, 1, "0000000011110"),
    (24, 1, "0000000011101"),
    (25, 1, "0000000011100"),
    (26, 1, "0000000011011"),
];

/// A codeword: `len` bits, right-aligned in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codeword {
    pub bits: u32,
    pub len: u8,
}

impl Codeword {
    fn parse(text: &str) -> Self {
        let bits = text.bytes().fold(0u32, |acc, b| (acc << 1) | u32::from(b == b'1'));
        Self { bits, len: text.len() as u8 }
    }

    fn with_sign(self, negative: bool) -> Self {
        Self { bits: (self.bits << 1) | u32::from(negative), len: self.len + 1 }
    }

    pub fn write(&self, writer: &mut BitWriter) {
        writer.write_bits(self.bits, self.len);
    }

    /// True if `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }
}

/// A decoded table symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Pair { run: u8, value: i32 },
    Escape,
}

/// Bidirectional VLC table.
pub struct VlcTable {
    encode: HashMap<(u8, i32), Codeword>,
    decode: HashMap<Codeword, Symbol>,
    escape: Codeword,
    max_len: u8,
}

static TABLE: OnceLock<VlcTable> = OnceLock::new();

impl VlcTable {
    /// The shared table instance.
    pub fn get() -> &'static VlcTable {
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut encode = HashMap::with_capacity(ENTRIES.len() * 2);
        let mut decode = HashMap::with_capacity(ENTRIES.len() * 2 + 1);
        let mut max_len = 0u8;

        for &(run, magnitude, text) in ENTRIES {
            let base = Codeword::parse(text);
            for negative in [false, true] {
                let code = base.with_sign(negative);
                let value = if negative { -i32::from(magnitude) } else { i32::from(magnitude) };
                encode.insert((run, value), code);
                decode.insert(code, Symbol::Pair { run, value });
                max_len = max_len.max(code.len);
            }
        }

        let escape = Codeword::parse(ESCAPE_CODE);
        decode.insert(escape, Symbol::Escape);
        max_len = max_len.max(escape.len);

        Self { encode, decode, escape, max_len }
    }

    /// Codeword for `(run, value)`, or `None` if the pair must be escaped.
    pub fn lookup(&self, run: u8, value: i32) -> Option<Codeword> {
        self.encode.get(&(run, value)).copied()
    }

    pub fn escape(&self) -> Codeword {
        self.escape
    }

    /// Longest codeword in the table.
    pub fn max_len(&self) -> u8 {
        self.max_len
    }

    /// Number of codewords including ESCAPE.
    pub fn len(&self) -> usize {
        self.decode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decode.is_empty()
    }

    /// All codewords with their symbols, in no particular order.
    pub fn codewords(&self) -> impl Iterator<Item = (&Codeword, &Symbol)> {
        self.decode.iter()
    }

    /// Decode one symbol by growing a prefix bit by bit until it matches.
    ///
    /// Fails with a decode error if the token runs out, or the prefix grows
    /// past the longest codeword, before anything matches.
    pub fn decode_symbol(&self, reader: &mut BitReader) -> Result<Symbol> {
        let mut code = Codeword { bits: 0, len: 0 };
        while code.len < self.max_len {
            if reader.is_exhausted() {
                return Err(CodecError::decode(format!(
                    "token ended after {}-bit partial codeword",
                    code.len
                )));
            }
            code.bits = (code.bits << 1) | reader.read_bit()?;
            code.len += 1;
            if let Some(symbol) = self.decode.get(&code) {
                return Ok(*symbol);
            }
        }
        Err(CodecError::decode(format!(
            "no codeword matches prefix of {} bits ending at bit {}",
            code.len,
            reader.position()
        )))
    }
}
