// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! 8×8 block types and the orthonormal DCT-II / DCT-III pair.
//!
//! Blocks are stored in natural (row-major) order, index = row * 8 + col.
//! The transform is applied to raw samples or residuals as they are, with no
//! level shift, so INTRA and INTER blocks go through the same code.

use std::sync::OnceLock;

/// Spatial-domain 8×8 block (samples or residuals).
pub type SampleBlock = [f64; 64];

/// Quantized transform coefficients of one 8×8 block.
pub type CoeffBlock = [i32; 64];

/// Pre-computed 8×8 cosine table.
/// `COSINE[u][x] = cos((2*x + 1) * u * PI / 16)`
static COSINE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();

/// Normalization constants: C(0) = 1/sqrt(8), C(u>0) = 1/2.
static NORM: OnceLock<[f64; 8]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; 8]; 8] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

fn norm_table() -> &'static [f64; 8] {
    NORM.get_or_init(|| {
        let mut n = [0.5f64; 8];
        n[0] = 1.0 / (8.0f64).sqrt();
        n
    })
}

/// Forward 8×8 DCT.
pub fn forward_transform(block: &SampleBlock) -> SampleBlock {
    let cos = cosine_table();
    let c = norm_table();

    // Separable: rows then columns.
    let mut temp = [0.0f64; 64];
    for row in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for x in 0..8 {
                sum += block[row * 8 + x] * cos[u][x];
            }
            temp[row * 8 + u] = c[u] * sum;
        }
    }

    let mut coeffs = [0.0f64; 64];
    for col in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                sum += temp[y * 8 + col] * cos[v][y];
            }
            coeffs[v * 8 + col] = c[v] * sum;
        }
    }
    coeffs
}

/// Inverse 8×8 DCT.
pub fn inverse_transform(coeffs: &SampleBlock) -> SampleBlock {
    let cos = cosine_table();
    let c = norm_table();

    // Separable: columns then rows.
    let mut temp = [0.0f64; 64];
    for col in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0;
            for v in 0..8 {
                sum += c[v] * coeffs[v * 8 + col] * cos[v][y];
            }
            temp[y * 8 + col] = sum;
        }
    }

    let mut samples = [0.0f64; 64];
    for row in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += c[u] * temp[row * 8 + u] * cos[u][x];
            }
            samples[row * 8 + x] = sum;
        }
    }
    samples
}

/// True if any coefficient is non-zero.
pub fn has_nonzero(block: &CoeffBlock) -> bool {
    block.iter().any(|&c| c != 0)
}
