// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Motion estimation and compensation against the reference frame.
//!
//! Estimation is a 2-D logarithmic search on luma: from the macroblock's own
//! center, evaluate the center and its eight compass neighbours at the
//! current step, move to the best, halve the step, and finish with one pass
//! at step 1. Only candidates whose 16×16 window lies fully inside the
//! reference frame are considered, so every returned vector is usable.

use log::trace;

use super::error::{CodecError, Result};
use super::frame::{Frame, Plane, Window, MB_SIZE};
use super::macroblock::{MacroblockSamples, MotionVector};
use super::profile::ChromaSiting;

/// First search step: half the ±15 search range.
pub const INITIAL_STEP: i32 = 7;

/// Candidate directions as `(row, col)` unit offsets, zero offset last.
/// Ties keep the earliest entry.
const DIRECTIONS: [(i32, i32); 9] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, 0),
];

/// Mean absolute luma difference between `luma` and the reference window.
pub fn mad(luma: &[f64; MB_SIZE * MB_SIZE], reference: &Frame, window: Window) -> f64 {
    let mut sum = 0.0;
    for r in 0..MB_SIZE {
        for c in 0..MB_SIZE {
            let refv = f64::from(reference.sample(Plane::Luma, window.top + r, window.left + c));
            sum += (luma[r * MB_SIZE + c] - refv).abs();
        }
    }
    sum / (MB_SIZE * MB_SIZE) as f64
}

/// One search pass: best of the nine candidates around `center`.
fn refine(
    luma: &[f64; MB_SIZE * MB_SIZE],
    reference: &Frame,
    center: (i32, i32),
    step: i32,
) -> (i32, i32) {
    let mut best = center;
    let mut best_mad = f64::MAX;
    for (dr, dc) in DIRECTIONS {
        let candidate = (center.0 + dr * step, center.1 + dc * step);
        let Some(window) =
            Window::centered(candidate.0, candidate.1, reference.rows(), reference.cols())
        else {
            continue;
        };
        let cost = mad(luma, reference, window);
        if cost < best_mad {
            best_mad = cost;
            best = candidate;
        }
    }
    best
}

/// Find the motion vector for the macroblock whose 16×16 luma is `luma`
/// and whose own window is centered at `origin` (row, col).
pub fn estimate(luma: &[f64; MB_SIZE * MB_SIZE], reference: &Frame, origin: (i32, i32)) -> MotionVector {
    let mut center = origin;
    let mut step = INITIAL_STEP;
    loop {
        center = refine(luma, reference, center, step);
        if step == 1 {
            break;
        }
        step /= 2;
    }
    let mv = MotionVector::new(center.1 - origin.1, center.0 - origin.0);
    trace!("origin {:?}: motion vector ({}, {})", origin, mv.horizontal, mv.vertical);
    mv
}

/// Reference window addressed by `mv` from `origin`.
///
/// A vector outside the 5-bit field range, or one that would reach outside
/// the reference frame, is a configuration error.
pub fn reference_window(reference: &Frame, origin: (i32, i32), mv: MotionVector) -> Result<Window> {
    if !mv.fits_field() {
        return Err(CodecError::configuration(format!(
            "motion vector ({}, {}) outside the 5-bit field range",
            mv.horizontal, mv.vertical
        )));
    }
    let (row, col) = (origin.0 + mv.vertical, origin.1 + mv.horizontal);
    Window::centered(row, col, reference.rows(), reference.cols()).ok_or_else(|| {
        CodecError::configuration(format!(
            "motion vector ({}, {}) leaves the reference frame interior",
            mv.horizontal, mv.vertical
        ))
    })
}

/// Motion-compensated prediction: the reference window addressed by `mv`,
/// subsampled the same way as the current macroblock.
pub fn predict(
    reference: &Frame,
    origin: (i32, i32),
    mv: MotionVector,
    siting: ChromaSiting,
) -> Result<MacroblockSamples> {
    let window = reference_window(reference, origin, mv)?;
    Ok(MacroblockSamples::extract(reference, window, siting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn textured(cols: usize, rows: usize, seed: u64) -> Frame {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut f = Frame::filled(cols, rows, [0, 128, 128]).unwrap();
        for v in f.plane_mut(Plane::Luma) {
            *v = rng.gen();
        }
        f
    }

    fn luma_at(frame: &Frame, window: Window) -> [f64; MB_SIZE * MB_SIZE] {
        MacroblockSamples::extract(frame, window, ChromaSiting::default()).luma
    }

    #[test]
    fn identical_content_gives_zero_vector() {
        let f = textured(64, 64, 1);
        for index in 0..16 {
            let w = Window::macroblock(index, 4);
            let mv = estimate(&luma_at(&f, w), &f, w.center());
            assert!(mv.is_zero(), "macroblock {index}: {mv:?}");
        }
    }

    #[test]
    fn finds_a_shift_reachable_by_the_search() {
        // Content of the macroblock at (24, 24) sits at (31, 24) in the
        // reference: one step-7 move south.
        let reference = textured(64, 64, 2);
        let target = Window::centered(31, 24, 64, 64).unwrap();
        let luma = luma_at(&reference, target);
        let mv = estimate(&luma, &reference, (24, 24));
        assert_eq!(mv, MotionVector::new(0, 7));
    }

    #[test]
    fn vectors_stay_inside_the_frame() {
        for seed in 0..4 {
            let reference = textured(48, 32, 10 + seed);
            let current = textured(48, 32, 20 + seed);
            for index in 0..6 {
                let w = Window::macroblock(index, 3);
                let mv = estimate(&luma_at(&current, w), &reference, w.center());
                assert!(mv.fits_field());
                assert!(reference_window(&reference, w.center(), mv).is_ok());
            }
        }
    }

    #[test]
    fn out_of_frame_vector_rejected() {
        let reference = textured(32, 32, 4);
        let err = predict(&reference, (8, 8), MotionVector::new(-1, 0), ChromaSiting::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::codec::error::ErrorKind::Configuration);
        assert!(reference_window(&reference, (8, 8), MotionVector::new(16, 16)).is_ok());
        assert!(reference_window(&reference, (8, 8), MotionVector::new(17, 0)).is_err());
    }

    #[test]
    fn ties_prefer_first_direction() {
        // Uniform reference: every candidate has the same cost, the first
        // listed direction (west) wins at each pass where it is available.
        let reference = Frame::filled(64, 64, [50, 128, 128]).unwrap();
        let luma = [50.0; MB_SIZE * MB_SIZE];
        let mv = estimate(&luma, &reference, (40, 40));
        assert_eq!(mv.vertical, 0);
        assert!(mv.horizontal < 0);
    }
}
