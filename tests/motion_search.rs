// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Motion search properties over random frames.

use minimpeg::codec::frame::Window;
use minimpeg::codec::macroblock::MacroblockSamples;
use minimpeg::codec::motion::{estimate, mad, reference_window};
use minimpeg::{ChromaSiting, Encoder, EncoderConfig, Frame, MacroblockType, Plane};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_frame(rng: &mut ChaCha20Rng, cols: usize, rows: usize) -> Frame {
    let mut frame = Frame::filled(cols, rows, [0, 128, 128]).unwrap();
    for v in frame.plane_mut(Plane::Luma) {
        *v = rng.gen();
    }
    frame
}

#[test]
fn vectors_keep_the_window_inside_the_frame() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    for _ in 0..20 {
        let cols = 16 * rng.gen_range(2..=6);
        let rows = 16 * rng.gen_range(2..=5);
        let reference = random_frame(&mut rng, cols, rows);
        let current = random_frame(&mut rng, cols, rows);
        let mb_cols = cols / 16;
        for index in 0..current.macroblock_count() {
            let own = Window::macroblock(index, mb_cols);
            let luma = MacroblockSamples::extract(&current, own, ChromaSiting::default()).luma;
            let mv = estimate(&luma, &reference, own.center());
            assert!(mv.fits_field(), "{cols}x{rows} mb {index}: {mv:?}");
            let window = reference_window(&reference, own.center(), mv)
                .unwrap_or_else(|e| panic!("{cols}x{rows} mb {index}: {e}"));
            assert!(window.top + 16 <= rows && window.left + 16 <= cols);
        }
    }
}

#[test]
fn search_never_worsens_the_zero_vector() {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let reference = random_frame(&mut rng, 64, 64);
    // Smooth current frame so costs vary gently
    let mut current = Frame::filled(64, 64, [0, 128, 128]).unwrap();
    for r in 0..64 {
        for c in 0..64 {
            current.set_sample(Plane::Luma, r, c, ((r * 3 + c * 2) % 256) as u8);
        }
    }
    for index in 0..16 {
        let own = Window::macroblock(index, 4);
        let luma = MacroblockSamples::extract(&current, own, ChromaSiting::default()).luma;
        let mv = estimate(&luma, &reference, own.center());
        let chosen = reference_window(&reference, own.center(), mv).unwrap();
        assert!(mad(&luma, &reference, chosen) <= mad(&luma, &reference, own));
    }
}

#[test]
fn encoder_vectors_are_decodable() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut encoder = Encoder::new(EncoderConfig::default()).unwrap();
    encoder
        .encode_record(0, &random_frame(&mut rng, 48, 48), MacroblockType::Intra)
        .unwrap();
    // Frame 1 is searched against frame 0's reconstruction
    let searched = encoder.reference().unwrap().clone();
    let record = encoder
        .encode_record(1, &random_frame(&mut rng, 48, 48), MacroblockType::Inter)
        .unwrap();
    assert_ne!(encoder.reference(), Some(&searched));
    for mb in &record.macroblocks {
        let own = Window::macroblock(mb.header.index, 3);
        let window = reference_window(&searched, own.center(), mb.header.motion)
            .unwrap_or_else(|e| panic!("mb {}: {e}", mb.header.index));
        assert!(window.top + 16 <= 48 && window.left + 16 <= 48);
    }
}
