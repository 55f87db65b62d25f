// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Run-length + VLC coding of one coefficient block.
//!
//! A block is walked in zigzag order. Every non-zero coefficient becomes a
//! `(run, value)` pair, where `run` counts the zeros skipped since the last
//! pair. The coefficient at (0, 0) always produces a pair, even when zero,
//! so every coded block holds at least one pair. The block's token ends
//! with its last pair; trailing zeros are implicit.

use super::bitio::{BitReader, BitWriter};
use super::dct::CoeffBlock;
use super::error::{CodecError, Result};
use super::profile::{PairCoding, ValueWidth};
use super::vlc::{Symbol, VlcTable, RUN_BITS};
use super::zigzag::ZigzagScan;

/// Entropy-coded block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedBlock {
    /// ASCII bit token.
    pub token: String,
    /// Pairs written through the ESCAPE path.
    pub escapes: usize,
}

/// Pair encoder/decoder for one coding mode and value width.
#[derive(Debug, Clone, Copy)]
pub struct PairCoder {
    coding: PairCoding,
    width: ValueWidth,
}

impl PairCoder {
    pub fn new(coding: PairCoding, width: ValueWidth) -> Self {
        Self { coding, width }
    }

    /// Encode a block of quantized coefficients.
    ///
    /// Every coefficient must fit the value width; an out-of-range value is
    /// a configuration error.
    pub fn encode_block(&self, block: &CoeffBlock) -> Result<CodedBlock> {
        let mut writer = BitWriter::new();
        let mut scan = ZigzagScan::new();
        let mut run = 0u8;
        let mut escapes = 0usize;

        for i in 0..64 {
            let value = block[scan.natural_index()];
            if value != 0 || i == 0 {
                if !self.width.contains(value) {
                    return Err(CodecError::configuration(format!(
                        "coefficient {value} does not fit a {}-bit value field",
                        self.width.bits()
                    )));
                }
                if self.write_pair(&mut writer, run, value) {
                    escapes += 1;
                }
                run = 0;
            } else {
                run += 1;
            }
            scan.step();
        }

        Ok(CodedBlock { token: writer.finish(), escapes })
    }

    /// Returns true if the pair went through the escape path.
    fn write_pair(&self, writer: &mut BitWriter, run: u8, value: i32) -> bool {
        match self.coding {
            PairCoding::Fixed => {
                self.write_raw(writer, run, value);
                false
            }
            PairCoding::Variable => {
                let table = VlcTable::get();
                match table.lookup(run, value) {
                    Some(code) => {
                        code.write(writer);
                        false
                    }
                    None => {
                        table.escape().write(writer);
                        self.write_raw(writer, run, value);
                        true
                    }
                }
            }
        }
    }

    fn write_raw(&self, writer: &mut BitWriter, run: u8, value: i32) {
        writer.write_bits(u32::from(run), RUN_BITS);
        writer.write_signed(value, self.width.bits());
    }

    fn read_raw(&self, reader: &mut BitReader) -> Result<(usize, i32)> {
        let run = reader.read_bits(RUN_BITS)? as usize;
        let value = reader.read_signed(self.width.bits())?;
        Ok((run, value))
    }

    fn read_pair(&self, reader: &mut BitReader) -> Result<(usize, i32)> {
        match self.coding {
            PairCoding::Fixed => self.read_raw(reader),
            PairCoding::Variable => match VlcTable::get().decode_symbol(reader)? {
                Symbol::Pair { run, value } => Ok((run as usize, value)),
                Symbol::Escape => self.read_raw(reader),
            },
        }
    }

    /// Decode one token back into a coefficient block.
    pub fn decode_block(&self, token: &str) -> Result<CoeffBlock> {
        let mut reader = BitReader::new(token)?;
        let mut block = [0i32; 64];
        let mut scan = ZigzagScan::new();
        // Number of scan positions already consumed.
        let mut consumed = 0usize;

        if reader.is_exhausted() {
            return Err(CodecError::decode("empty block token"));
        }

        while !reader.is_exhausted() {
            let (run, value) = self.read_pair(&mut reader)?;
            if consumed + run >= 64 {
                return Err(CodecError::decode(format!(
                    "run of {run} from scan position {consumed} overruns the block"
                )));
            }
            for _ in 0..run {
                scan.step();
            }
            block[scan.natural_index()] = value;
            scan.step();
            consumed += run + 1;
        }

        Ok(block)
    }
}
