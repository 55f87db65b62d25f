// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Uniform scalar quantization with a single per-macroblock step.

use super::dct::{CoeffBlock, SampleBlock};
use super::error::{CodecError, Result};
use super::profile::ValueWidth;

/// Quantize one coefficient: round half away from zero.
pub fn quantize(coeff: f64, step: u8) -> i32 {
    debug_assert!(step > 0);
    (coeff / f64::from(step)).round() as i32
}

/// Reconstruct one coefficient.
pub fn dequantize(level: i32, step: u8) -> f64 {
    f64::from(level) * f64::from(step)
}

/// Quantize a transformed block.
///
/// A level the profile's value field cannot carry is a configuration error;
/// levels are never clipped.
pub fn quantize_block(coeffs: &SampleBlock, step: u8, width: ValueWidth) -> Result<CoeffBlock> {
    let mut out = [0i32; 64];
    for (i, (q, &c)) in out.iter_mut().zip(coeffs.iter()).enumerate() {
        *q = quantize(c, step);
        if !width.contains(*q) {
            return Err(CodecError::configuration(format!(
                "level {} at coefficient {i} does not fit a {}-bit value field at step {step}",
                *q,
                width.bits()
            )));
        }
    }
    Ok(out)
}

pub fn dequantize_block(levels: &CoeffBlock, step: u8) -> SampleBlock {
    let mut out = [0.0f64; 64];
    for (c, &q) in out.iter_mut().zip(levels.iter()) {
        *c = dequantize(q, step);
    }
    out
}
