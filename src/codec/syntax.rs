// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Text framing of the bitstream.
//!
//! Each field is written as an ASCII `0`/`1` token of its exact width on its
//! own line; coded blocks follow their macroblock header as one token each.
//! A frame record is:
//!
//! ```text
//! PN(8) PL(10) PW(10)
//! { MN(12) MTYPE(2) MQUANT(5) MV(10) CBP(6) token* } * macroblock count
//! ```
//!
//! Readers split on any whitespace, so line breaks are not significant.

use std::iter::Peekable;
use std::str::SplitWhitespace;

use super::bitio::{bias_decode, bias_encode};
use super::error::{CodecError, Result};
use super::frame::{check_dimensions, MB_SIZE};
use super::macroblock::{
    CodedBlockPattern, MacroblockHeader, MacroblockType, MotionVector, BLOCK_COUNT,
};

pub const PN_BITS: u8 = 8;
pub const PL_BITS: u8 = 10;
pub const PW_BITS: u8 = 10;
pub const MN_BITS: u8 = 12;
pub const MTYPE_BITS: u8 = 2;
pub const MQUANT_BITS: u8 = 5;
/// Width of each motion vector component; MV is two of them.
pub const MV_COMPONENT_BITS: u8 = 5;
pub const CBP_BITS: u8 = 6;

/// Frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureHeader {
    /// PN, frame number modulo 256.
    pub number: u32,
    /// PL, width in samples.
    pub cols: usize,
    /// PW, height in samples.
    pub rows: usize,
}

impl PictureHeader {
    pub fn macroblock_count(&self) -> usize {
        (self.cols / MB_SIZE) * (self.rows / MB_SIZE)
    }
}

/// One macroblock: header plus a token per coded block, in CBP order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroblockRecord {
    pub header: MacroblockHeader,
    pub tokens: Vec<String>,
}

/// One frame of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub picture: PictureHeader,
    pub macroblocks: Vec<MacroblockRecord>,
}

fn push_field(out: &mut String, value: u32, width: u8) {
    debug_assert!(
        u64::from(value) < 1u64 << width,
        "{value} does not fit a {width}-bit field"
    );
    for i in (0..width).rev() {
        out.push(if (value >> i) & 1 == 1 { '1' } else { '0' });
    }
    out.push('\n');
}

impl FrameRecord {
    /// Append the text form of this record to `out`.
    ///
    /// Dimensions and macroblock numbers must fit their fields; records
    /// produced by the encoder always do.
    pub fn write(&self, out: &mut String) {
        let p = &self.picture;
        push_field(out, p.number % 256, PN_BITS);
        push_field(out, p.cols as u32, PL_BITS);
        push_field(out, p.rows as u32, PW_BITS);
        for mb in &self.macroblocks {
            let h = &mb.header;
            push_field(out, h.index as u32, MN_BITS);
            push_field(out, h.kind.code(), MTYPE_BITS);
            push_field(out, u32::from(h.quant), MQUANT_BITS);
            let mv = (bias_encode(h.motion.horizontal, MV_COMPONENT_BITS) << MV_COMPONENT_BITS)
                | bias_encode(h.motion.vertical, MV_COMPONENT_BITS);
            push_field(out, mv, 2 * MV_COMPONENT_BITS);
            push_field(out, u32::from(h.cbp.bits()), CBP_BITS);
            for token in &mb.tokens {
                out.push_str(token);
                out.push('\n');
            }
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    /// Total bits in block tokens.
    pub fn token_bits(&self) -> usize {
        self.macroblocks.iter().flat_map(|mb| &mb.tokens).map(String::len).sum()
    }
}

/// Whitespace-separated field reader over stream text.
pub struct FieldReader<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
}

impl<'a> FieldReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { tokens: text.split_whitespace().peekable() }
    }

    /// True once every token has been consumed.
    pub fn is_empty(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Next raw token (a coded block), or a format error naming `what`.
    pub fn read_token(&mut self, what: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| CodecError::format(format!("stream ended before {what}")))
    }

    /// Read a fixed-width binary field.
    pub fn read_field(&mut self, name: &str, width: u8) -> Result<u32> {
        let token = self.read_token(name)?;
        if token.len() != width as usize {
            return Err(CodecError::format(format!(
                "{name} field {token:?} is {} bits wide, expected {width}",
                token.len()
            )));
        }
        token.bytes().try_fold(0u32, |acc, b| match b {
            b'0' => Ok(acc << 1),
            b'1' => Ok((acc << 1) | 1),
            _ => Err(CodecError::format(format!("{name} field {token:?} is not binary"))),
        })
    }

    pub fn read_picture_header(&mut self) -> Result<PictureHeader> {
        let number = self.read_field("PN", PN_BITS)?;
        let cols = self.read_field("PL", PL_BITS)? as usize;
        let rows = self.read_field("PW", PW_BITS)? as usize;
        check_dimensions(cols, rows).map_err(|reason| CodecError::format(reason).at_frame(number))?;
        Ok(PictureHeader { number, cols, rows })
    }

    /// Read the macroblock record expected at raster index `expected`.
    pub fn read_macroblock(&mut self, expected: usize) -> Result<MacroblockRecord> {
        let index = self.read_field("MN", MN_BITS)? as usize;
        if index != expected {
            return Err(CodecError::format(format!(
                "macroblock number {index} where {expected} was expected"
            )));
        }

        let code = self.read_field("MTYPE", MTYPE_BITS)?;
        let kind = MacroblockType::from_code(code)
            .ok_or_else(|| CodecError::format(format!("unknown MTYPE {code:02b}")))?;

        let quant = self.read_field("MQUANT", MQUANT_BITS)? as u8;
        if quant == 0 {
            return Err(CodecError::format("MQUANT is zero"));
        }

        let mv = self.read_field("MV", 2 * MV_COMPONENT_BITS)?;
        let mask = (1u32 << MV_COMPONENT_BITS) - 1;
        let motion = MotionVector::new(
            bias_decode(mv >> MV_COMPONENT_BITS, MV_COMPONENT_BITS),
            bias_decode(mv & mask, MV_COMPONENT_BITS),
        );
        if kind == MacroblockType::Intra && !motion.is_zero() {
            return Err(CodecError::format("INTRA macroblock with a non-zero motion vector"));
        }

        let cbp = CodedBlockPattern(self.read_field("CBP", CBP_BITS)? as u8);
        let mut tokens = Vec::with_capacity(cbp.coded_count());
        for block in (0..BLOCK_COUNT).filter(|&b| cbp.is_coded(b)) {
            tokens.push(self.read_token(&format!("coded block {block}"))?.to_string());
        }

        Ok(MacroblockRecord {
            header: MacroblockHeader { index, kind, quant, motion, cbp },
            tokens,
        })
    }

    /// Read a whole frame record.
    pub fn read_frame(&mut self) -> Result<FrameRecord> {
        let picture = self.read_picture_header()?;
        let count = picture.macroblock_count();
        let mut macroblocks = Vec::with_capacity(count);
        for mn in 0..count {
            let mb = self
                .read_macroblock(mn)
                .map_err(|e| e.at_macroblock(mn).at_frame(picture.number))?;
            macroblocks.push(mb);
        }
        Ok(FrameRecord { picture, macroblocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error::ErrorKind;

    fn sample_record() -> FrameRecord {
        FrameRecord {
            picture: PictureHeader { number: 3, cols: 32, rows: 16 },
            macroblocks: vec![
                MacroblockRecord {
                    header: MacroblockHeader {
                        index: 0,
                        kind: MacroblockType::Intra,
                        quant: 16,
                        motion: MotionVector::ZERO,
                        cbp: CodedBlockPattern(0b100000),
                    },
                    tokens: vec!["110".into()],
                },
                MacroblockRecord {
                    header: MacroblockHeader {
                        index: 1,
                        kind: MacroblockType::Inter,
                        quant: 8,
                        motion: MotionVector::new(-1, 16),
                        cbp: CodedBlockPattern(0),
                    },
                    tokens: vec![],
                },
            ],
        }
    }

    #[test]
    fn text_layout() {
        let text = sample_record().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "00000011", "0000100000", "0000010000",
                "000000000000", "01", "10000", "0000000000", "100000", "110",
                "000000000001", "10", "01000", "1111110000", "000000",
            ]
        );
    }

    #[test]
    fn parse_back() {
        let record = sample_record();
        let text = record.to_text();
        let mut reader = FieldReader::new(&text);
        assert_eq!(reader.read_frame().unwrap(), record);
        assert!(reader.is_empty());
    }

    #[test]
    fn frame_number_wraps() {
        let mut record = sample_record();
        record.picture.number = 259;
        let text = record.to_text();
        assert!(text.starts_with("00000011\n"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit a 10-bit field")]
    fn oversized_dimension_is_not_truncated() {
        let mut record = sample_record();
        record.picture.cols = 1024;
        record.to_text();
    }

    #[test]
    fn field_width_is_checked() {
        let mut reader = FieldReader::new("0000011 0000100000 0000010000");
        assert_eq!(reader.read_picture_header().unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn non_binary_field_rejected() {
        let mut reader = FieldReader::new("0000001x");
        assert!(reader.read_field("PN", 8).is_err());
    }

    #[test]
    fn bad_dimensions_are_format_errors() {
        let mut reader = FieldReader::new("00000000 0000011000 0000010000");
        assert_eq!(reader.read_picture_header().unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn wrong_macroblock_number() {
        let text = sample_record().to_text().replacen("000000000001", "000000000010", 1);
        let err = FieldReader::new(&text).read_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.location().macroblock, Some(1));
        assert_eq!(err.location().frame, Some(3));
    }

    #[test]
    fn bad_mtype_and_zero_quant() {
        let text = sample_record().to_text().replacen("\n01\n", "\n11\n", 1);
        assert!(FieldReader::new(&text).read_frame().is_err());
        let text = sample_record().to_text().replacen("\n10000\n", "\n00000\n", 1);
        assert!(FieldReader::new(&text).read_frame().is_err());
    }

    #[test]
    fn missing_block_token() {
        let text = "00000000 0000010000 0000010000 000000000000 01 10000 0000000000 000001";
        let err = FieldReader::new(text).read_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
