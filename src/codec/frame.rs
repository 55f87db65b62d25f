// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! YCbCr frame buffer and window descriptors.
//!
//! A [`Frame`] owns three full-resolution 8-bit planes. Chroma is stored at
//! luma resolution; the 4:1:1 reduction happens when a macroblock is
//! extracted, and reconstruction replicates each chroma sample over its 2×2
//! footprint before writing it back.

use super::error::{CodecError, Result};

/// Macroblock edge length in luma samples.
pub const MB_SIZE: usize = 16;

/// Largest frame dimension the 10-bit PL/PW fields can carry, aligned down
/// to a whole macroblock.
pub const MAX_DIMENSION: usize = 1008;

/// One of the three colour planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Luma = 0,
    ChromaB = 1,
    ChromaR = 2,
}

/// Check that a frame of `cols × rows` can be coded. Returns the reason on
/// failure; callers decide which error kind it becomes.
pub fn check_dimensions(cols: usize, rows: usize) -> std::result::Result<(), String> {
    for (name, dim) in [("width", cols), ("height", rows)] {
        if dim == 0 || dim % MB_SIZE != 0 {
            return Err(format!("{name} {dim} is not a positive multiple of {MB_SIZE}"));
        }
        if dim > MAX_DIMENSION {
            return Err(format!("{name} {dim} exceeds {MAX_DIMENSION}"));
        }
    }
    Ok(())
}

/// Square region of a frame: top-left corner plus edge length.
///
/// A window never owns samples; it only addresses them in a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub top: usize,
    pub left: usize,
    pub size: usize,
}

impl Window {
    /// The 16×16 window of macroblock `index` in raster order.
    pub fn macroblock(index: usize, mb_cols: usize) -> Self {
        Self {
            top: (index / mb_cols) * MB_SIZE,
            left: (index % mb_cols) * MB_SIZE,
            size: MB_SIZE,
        }
    }

    /// The 16×16 window whose center is (`row`, `col`), or `None` if it
    /// would reach outside a `rows × cols` frame.
    pub fn centered(row: i32, col: i32, rows: usize, cols: usize) -> Option<Self> {
        let half = (MB_SIZE / 2) as i32;
        if row < half || col < half || row > rows as i32 - half || col > cols as i32 - half {
            return None;
        }
        Some(Self {
            top: (row - half) as usize,
            left: (col - half) as usize,
            size: MB_SIZE,
        })
    }

    /// Center of a 16×16 window.
    pub fn center(&self) -> (i32, i32) {
        let half = (self.size / 2) as i32;
        (self.top as i32 + half, self.left as i32 + half)
    }
}

/// Three-plane YCbCr picture with dimensions in whole macroblocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    cols: usize,
    rows: usize,
    planes: [Vec<u8>; 3],
}

impl Frame {
    /// Black frame (all planes zero).
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Self::filled(cols, rows, [0, 0, 0])
    }

    /// Frame with every sample of each plane set to `[y, cb, cr]`.
    pub fn filled(cols: usize, rows: usize, value: [u8; 3]) -> Result<Self> {
        check_dimensions(cols, rows).map_err(CodecError::configuration)?;
        let len = cols * rows;
        Ok(Self {
            cols,
            rows,
            planes: [vec![value[0]; len], vec![value[1]; len], vec![value[2]; len]],
        })
    }

    /// Wrap existing row-major planes.
    pub fn from_planes(cols: usize, rows: usize, y: Vec<u8>, cb: Vec<u8>, cr: Vec<u8>) -> Result<Self> {
        check_dimensions(cols, rows).map_err(CodecError::configuration)?;
        let len = cols * rows;
        for (name, plane) in [("Y", &y), ("Cb", &cb), ("Cr", &cr)] {
            if plane.len() != len {
                return Err(CodecError::configuration(format!(
                    "{name} plane has {} samples, expected {len}",
                    plane.len()
                )));
            }
        }
        Ok(Self { cols, rows, planes: [y, cb, cr] })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Macroblocks per row.
    pub fn mb_cols(&self) -> usize {
        self.cols / MB_SIZE
    }

    /// Macroblocks per column.
    pub fn mb_rows(&self) -> usize {
        self.rows / MB_SIZE
    }

    pub fn macroblock_count(&self) -> usize {
        self.mb_cols() * self.mb_rows()
    }

    pub fn plane(&self, plane: Plane) -> &[u8] {
        &self.planes[plane as usize]
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut [u8] {
        &mut self.planes[plane as usize]
    }

    #[inline]
    pub fn sample(&self, plane: Plane, row: usize, col: usize) -> u8 {
        self.planes[plane as usize][row * self.cols + col]
    }

    #[inline]
    pub fn set_sample(&mut self, plane: Plane, row: usize, col: usize, value: u8) {
        self.planes[plane as usize][row * self.cols + col] = value;
    }

    /// Consume the frame and return its `[Y, Cb, Cr]` planes.
    pub fn into_planes(self) -> [Vec<u8>; 3] {
        self.planes
    }

    /// Peak signal-to-noise ratio of the luma plane against `other`, in dB.
    ///
    /// Identical planes give `f64::INFINITY`.
    pub fn psnr(&self, other: &Frame) -> Result<f64> {
        if self.cols != other.cols || self.rows != other.rows {
            return Err(CodecError::configuration(format!(
                "cannot compare {}x{} with {}x{}",
                self.cols, self.rows, other.cols, other.rows
            )));
        }
        let a = self.plane(Plane::Luma);
        let b = other.plane(Plane::Luma);
        let sse: f64 = a
            .iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = f64::from(x) - f64::from(y);
                d * d
            })
            .sum();
        if sse == 0.0 {
            return Ok(f64::INFINITY);
        }
        let mse = sse / a.len() as f64;
        Ok(10.0 * (255.0 * 255.0 / mse).log10())
    }
}
