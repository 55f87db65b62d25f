// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Stream profile and encoder settings.
//!
//! A [`CodecProfile`] fixes every bit-level convention that is not written
//! into the stream itself: how wide an escaped coefficient value is, where
//! the chroma samples sit inside each 2×2 luma group, and how INTRA blocks
//! code their run/value pairs. Encoder and decoder of one stream must use
//! the same profile.

use super::error::{CodecError, Result};

/// Default MQUANT written by the encoder.
pub const DEFAULT_QUANT: u8 = 16;

/// Largest quantizer step the 5-bit MQUANT field can carry.
pub const MAX_QUANT: u8 = 31;

/// Largest DC coefficient of an 8×8 block of 8-bit samples (255 · 64 / 8).
pub const MAX_DC_COEFF: u32 = 2040;

/// Bit width of the value half of an escaped (or fixed-length) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueWidth {
    /// Values in -127..=128.
    Eight,
    /// Values in -255..=256.
    #[default]
    Nine,
}

impl ValueWidth {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Nine => 9,
        }
    }

    /// Smallest representable value.
    pub const fn min_value(self) -> i32 {
        -((1i32 << (self.bits() - 1)) - 1)
    }

    /// Largest representable value.
    pub const fn max_value(self) -> i32 {
        1i32 << (self.bits() - 1)
    }

    pub fn contains(self, value: i32) -> bool {
        (self.min_value()..=self.max_value()).contains(&value)
    }

    /// Smallest quantizer step whose INTRA DC level always fits the field.
    pub const fn min_quant(self) -> u8 {
        let max = self.max_value() as u32;
        let mut step = 1u32;
        // round(MAX_DC_COEFF / step), half away from zero
        while (2 * MAX_DC_COEFF + step) / (2 * step) > max {
            step += 1;
        }
        step as u8
    }
}

/// Position of a chroma sample inside its 2×2 luma footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPosition {
    /// 0 = upper row, 1 = lower row.
    pub row: usize,
    /// 0 = left column, 1 = right column.
    pub col: usize,
}

impl SubPosition {
    pub const TOP_LEFT: Self = Self { row: 0, col: 0 };
    pub const TOP_RIGHT: Self = Self { row: 0, col: 1 };
    pub const BOTTOM_LEFT: Self = Self { row: 1, col: 0 };
    pub const BOTTOM_RIGHT: Self = Self { row: 1, col: 1 };
}

/// Where each chroma plane is sampled. Samples are picked, not averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaSiting {
    pub cb: SubPosition,
    pub cr: SubPosition,
}

impl Default for ChromaSiting {
    fn default() -> Self {
        Self { cb: SubPosition::TOP_LEFT, cr: SubPosition::BOTTOM_LEFT }
    }
}

/// How run/value pairs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairCoding {
    /// VLC codeword, or ESCAPE + 6-bit run + value for pairs not in the table.
    #[default]
    Variable,
    /// Always a plain 6-bit run followed by the value field.
    Fixed,
}

/// Bit-level conventions shared by encoder and decoder of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecProfile {
    pub value_width: ValueWidth,
    pub chroma: ChromaSiting,
    /// Pair coding for INTRA macroblocks. INTER macroblocks always use VLC.
    pub intra_pairs: PairCoding,
}

impl CodecProfile {
    /// Profile of the historical text streams: 8-bit values and
    /// fixed-length pairs for INTRA blocks.
    pub fn legacy() -> Self {
        Self {
            value_width: ValueWidth::Eight,
            chroma: ChromaSiting::default(),
            intra_pairs: PairCoding::Fixed,
        }
    }

    pub fn with_value_width(mut self, value_width: ValueWidth) -> Self {
        self.value_width = value_width;
        self
    }

    pub fn with_chroma(mut self, chroma: ChromaSiting) -> Self {
        self.chroma = chroma;
        self
    }

    pub fn with_intra_pairs(mut self, intra_pairs: PairCoding) -> Self {
        self.intra_pairs = intra_pairs;
        self
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub profile: CodecProfile,
    /// Quantizer step written as MQUANT for every macroblock.
    pub quant: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { profile: CodecProfile::default(), quant: DEFAULT_QUANT }
    }
}

impl EncoderConfig {
    pub fn new(profile: CodecProfile) -> Self {
        Self { profile, ..Self::default() }
    }

    pub fn with_quant(mut self, quant: u8) -> Self {
        self.quant = quant;
        self
    }

    pub fn with_profile(mut self, profile: CodecProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Check that the settings can be expressed in the stream.
    pub fn validate(&self) -> Result<()> {
        if self.quant == 0 || self.quant > MAX_QUANT {
            return Err(CodecError::configuration(format!(
                "quantizer step {} outside 1..={MAX_QUANT}",
                self.quant
            )));
        }
        let width = self.profile.value_width;
        if self.quant < width.min_quant() {
            return Err(CodecError::configuration(format!(
                "quantizer step {} is below {}, the smallest step whose levels fit a {}-bit value field",
                self.quant,
                width.min_quant(),
                width.bits()
            )));
        }
        Ok(())
    }
}
