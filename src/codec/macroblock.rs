// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Macroblock header fields and sample extraction.
//!
//! A macroblock is 16×16 luma plus one 8×8 block per chroma plane. The
//! chroma blocks pick one sample out of every 2×2 luma group at the
//! position given by the profile's [`ChromaSiting`]. For coding, the luma
//! block is split into four 8×8 quadrants, giving six blocks in the fixed
//! order Y-TL, Y-TR, Y-BL, Y-BR, Cb, Cr.

use super::dct::{inverse_transform, CoeffBlock, SampleBlock};
use super::frame::{Frame, Plane, Window, MB_SIZE};
use super::profile::{ChromaSiting, CodecProfile, PairCoding};
use super::quant::dequantize_block;

/// Blocks per macroblock.
pub const BLOCK_COUNT: usize = 6;

/// Index of the Cb block within a macroblock.
pub const CB_BLOCK: usize = 4;

/// Index of the Cr block within a macroblock.
pub const CR_BLOCK: usize = 5;

/// Largest motion vector component the 5-bit fields can carry.
pub const MV_MAX: i32 = 16;

/// Smallest motion vector component the 5-bit fields can carry.
pub const MV_MIN: i32 = -15;

/// How a macroblock is coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroblockType {
    /// Coded from its own samples.
    Intra,
    /// Coded as a motion-compensated residual against the reference frame.
    Inter,
}

impl MacroblockType {
    /// Two-bit MTYPE code.
    pub fn code(self) -> u32 {
        match self {
            Self::Intra => 0b01,
            Self::Inter => 0b10,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0b01 => Some(Self::Intra),
            0b10 => Some(Self::Inter),
            _ => None,
        }
    }

    /// Pair coding used for this macroblock's blocks.
    pub fn pair_coding(self, profile: &CodecProfile) -> PairCoding {
        match self {
            Self::Intra => profile.intra_pairs,
            Self::Inter => PairCoding::Variable,
        }
    }
}

/// Displacement from a macroblock's own position to its reference window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionVector {
    /// Column delta (MVH).
    pub horizontal: i32,
    /// Row delta (MVV).
    pub vertical: i32,
}

impl MotionVector {
    pub const ZERO: Self = Self { horizontal: 0, vertical: 0 };

    pub fn new(horizontal: i32, vertical: i32) -> Self {
        Self { horizontal, vertical }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// True if both components fit the 5-bit MV fields.
    pub fn fits_field(&self) -> bool {
        (MV_MIN..=MV_MAX).contains(&self.horizontal) && (MV_MIN..=MV_MAX).contains(&self.vertical)
    }
}

/// Six-bit coded block pattern. Bit 5 is Y-TL, bit 0 is Cr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodedBlockPattern(pub u8);

impl CodedBlockPattern {
    pub fn from_flags(flags: [bool; BLOCK_COUNT]) -> Self {
        let bits = flags
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &f)| acc | (u8::from(f) << (BLOCK_COUNT - 1 - i)));
        Self(bits)
    }

    /// Whether block `i` (0 = Y-TL .. 5 = Cr) carries a token.
    pub fn is_coded(&self, block: usize) -> bool {
        (self.0 >> (BLOCK_COUNT - 1 - block)) & 1 == 1
    }

    pub fn coded_count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Fixed header fields of one macroblock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroblockHeader {
    /// MN, raster index within the frame.
    pub index: usize,
    pub kind: MacroblockType,
    /// MQUANT, quantizer step.
    pub quant: u8,
    pub motion: MotionVector,
    pub cbp: CodedBlockPattern,
}

/// Round and clamp a reconstructed value to an 8-bit sample.
#[inline]
pub fn to_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Samples of one macroblock in working precision: 16×16 luma and the
/// two 8×8 chroma blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroblockSamples {
    pub luma: [f64; MB_SIZE * MB_SIZE],
    pub cb: SampleBlock,
    pub cr: SampleBlock,
}

impl MacroblockSamples {
    pub fn zeroed() -> Self {
        Self { luma: [0.0; MB_SIZE * MB_SIZE], cb: [0.0; 64], cr: [0.0; 64] }
    }

    /// Read the 16×16 window of `frame`, picking chroma at the given siting.
    pub fn extract(frame: &Frame, window: Window, siting: ChromaSiting) -> Self {
        let mut out = Self::zeroed();
        for r in 0..MB_SIZE {
            for c in 0..MB_SIZE {
                let (fr, fc) = (window.top + r, window.left + c);
                out.luma[r * MB_SIZE + c] = f64::from(frame.sample(Plane::Luma, fr, fc));
                let sub = (r % 2, c % 2);
                let idx = (r / 2) * 8 + c / 2;
                if sub == (siting.cb.row, siting.cb.col) {
                    out.cb[idx] = f64::from(frame.sample(Plane::ChromaB, fr, fc));
                }
                if sub == (siting.cr.row, siting.cr.col) {
                    out.cr[idx] = f64::from(frame.sample(Plane::ChromaR, fr, fc));
                }
            }
        }
        out
    }

    /// Split into the six 8×8 coding blocks.
    pub fn blocks(&self) -> [SampleBlock; BLOCK_COUNT] {
        let mut out = [[0.0f64; 64]; BLOCK_COUNT];
        for (q, block) in out.iter_mut().take(4).enumerate() {
            let (qr, qc) = ((q / 2) * 8, (q % 2) * 8);
            for r in 0..8 {
                for c in 0..8 {
                    block[r * 8 + c] = self.luma[(qr + r) * MB_SIZE + qc + c];
                }
            }
        }
        out[CB_BLOCK] = self.cb;
        out[CR_BLOCK] = self.cr;
        out
    }

    /// Inverse of [`blocks`](Self::blocks).
    pub fn from_blocks(blocks: &[SampleBlock; BLOCK_COUNT]) -> Self {
        let mut out = Self::zeroed();
        for (q, block) in blocks.iter().take(4).enumerate() {
            let (qr, qc) = ((q / 2) * 8, (q % 2) * 8);
            for r in 0..8 {
                for c in 0..8 {
                    out.luma[(qr + r) * MB_SIZE + qc + c] = block[r * 8 + c];
                }
            }
        }
        out.cb = blocks[CB_BLOCK];
        out.cr = blocks[CR_BLOCK];
        out
    }

    /// Dequantize and inverse-transform six coefficient blocks.
    pub fn from_levels(levels: &[CoeffBlock; BLOCK_COUNT], quant: u8) -> Self {
        let mut blocks = [[0.0f64; 64]; BLOCK_COUNT];
        for (out, lv) in blocks.iter_mut().zip(levels) {
            *out = inverse_transform(&dequantize_block(lv, quant));
        }
        Self::from_blocks(&blocks)
    }

    /// `self - other`, sample by sample.
    pub fn sub(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }

    /// `self + other`, sample by sample.
    pub fn add(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = Self::zeroed();
        for (o, (a, b)) in out.luma.iter_mut().zip(self.luma.iter().zip(&other.luma)) {
            *o = f(*a, *b);
        }
        for (o, (a, b)) in out.cb.iter_mut().zip(self.cb.iter().zip(&other.cb)) {
            *o = f(*a, *b);
        }
        for (o, (a, b)) in out.cr.iter_mut().zip(self.cr.iter().zip(&other.cr)) {
            *o = f(*a, *b);
        }
        out
    }

    /// Write into `frame` at `window`, replicating each chroma sample over
    /// its 2×2 footprint.
    pub fn write_to(&self, frame: &mut Frame, window: Window) {
        for r in 0..MB_SIZE {
            for c in 0..MB_SIZE {
                let (fr, fc) = (window.top + r, window.left + c);
                let idx = (r / 2) * 8 + c / 2;
                frame.set_sample(Plane::Luma, fr, fc, to_sample(self.luma[r * MB_SIZE + c]));
                frame.set_sample(Plane::ChromaB, fr, fc, to_sample(self.cb[idx]));
                frame.set_sample(Plane::ChromaR, fr, fc, to_sample(self.cr[idx]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::profile::SubPosition;

    #[test]
    fn mtype_codes() {
        assert_eq!(MacroblockType::Intra.code(), 1);
        assert_eq!(MacroblockType::Inter.code(), 2);
        assert_eq!(MacroblockType::from_code(0), None);
        assert_eq!(MacroblockType::from_code(3), None);
        assert_eq!(MacroblockType::from_code(2), Some(MacroblockType::Inter));
    }

    #[test]
    fn cbp_bit_order() {
        let cbp = CodedBlockPattern::from_flags([true, false, false, false, false, true]);
        assert_eq!(cbp.bits(), 0b100001);
        assert!(cbp.is_coded(0));
        assert!(!cbp.is_coded(1));
        assert!(cbp.is_coded(CR_BLOCK));
        assert_eq!(cbp.coded_count(), 2);
    }

    #[test]
    fn motion_vector_field_range() {
        assert!(MotionVector::new(16, -15).fits_field());
        assert!(!MotionVector::new(-16, 0).fits_field());
        assert!(!MotionVector::new(0, 17).fits_field());
    }

    #[test]
    fn quadrants_roundtrip() {
        let mut s = MacroblockSamples::zeroed();
        for (i, v) in s.luma.iter_mut().enumerate() {
            *v = i as f64;
        }
        let blocks = s.blocks();
        // Y-TR starts at luma column 8
        assert_eq!(blocks[1][0], 8.0);
        // Y-BL starts at luma row 8
        assert_eq!(blocks[2][0], 128.0);
        assert_eq!(MacroblockSamples::from_blocks(&blocks), s);
    }

    #[test]
    fn chroma_is_picked_at_siting() {
        let mut frame = Frame::new(16, 16).unwrap();
        frame.set_sample(Plane::ChromaB, 0, 0, 10);
        frame.set_sample(Plane::ChromaB, 1, 1, 99);
        frame.set_sample(Plane::ChromaR, 1, 0, 20);
        frame.set_sample(Plane::ChromaR, 0, 0, 77);
        let window = Window::macroblock(0, 1);

        let s = MacroblockSamples::extract(&frame, window, ChromaSiting::default());
        assert_eq!(s.cb[0], 10.0);
        assert_eq!(s.cr[0], 20.0);

        let siting = ChromaSiting { cb: SubPosition::BOTTOM_RIGHT, cr: SubPosition::TOP_LEFT };
        let s = MacroblockSamples::extract(&frame, window, siting);
        assert_eq!(s.cb[0], 99.0);
        assert_eq!(s.cr[0], 77.0);
    }

    #[test]
    fn write_replicates_and_clamps() {
        let mut s = MacroblockSamples::zeroed();
        s.luma[0] = 300.4;
        s.luma[1] = -5.0;
        s.cb[0] = 42.6;
        let mut frame = Frame::new(16, 16).unwrap();
        s.write_to(&mut frame, Window::macroblock(0, 1));
        assert_eq!(frame.sample(Plane::Luma, 0, 0), 255);
        assert_eq!(frame.sample(Plane::Luma, 0, 1), 0);
        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(frame.sample(Plane::ChromaB, r, c), 43);
        }
        assert_eq!(frame.sample(Plane::ChromaB, 2, 0), 0);
    }
}
