// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Example: encode a synthetic moving sequence, one text file per frame,
//! then decode the files back and report PSNR.
//!
//! Usage: synthetic_roundtrip [out_dir] [frames]
//! Run with `RUST_LOG=debug` to see per-frame statistics.
use std::fs;
use std::path::Path;
use std::time::Instant;

use minimpeg::{CodecProfile, Decoder, Encoder, EncoderConfig, Frame, MacroblockType, Plane};

const COLS: usize = 176;
const ROWS: usize = 144;

fn synthetic_frame(t: usize) -> Frame {
    let mut frame = Frame::new(COLS, ROWS).expect("Frame dimensions must be multiples of 16");
    // Bright square sliding over a gradient
    let (sq_r, sq_c) = (40 + t, 30 + 3 * t);
    for r in 0..ROWS {
        for c in 0..COLS {
            let inside = (sq_r..sq_r + 32).contains(&r) && (sq_c..sq_c + 32).contains(&c);
            let y = if inside { 230 } else { ((r + c) / 2 + 20) as u8 };
            frame.set_sample(Plane::Luma, r, c, y);
            frame.set_sample(Plane::ChromaB, r, c, if inside { 90 } else { 128 });
            frame.set_sample(Plane::ChromaR, r, c, if inside { 200 } else { 128 });
        }
    }
    frame
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(String::as_str).unwrap_or("code");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(12);
    fs::create_dir_all(out_dir).expect("Could not create output directory");

    let config = EncoderConfig::default();
    let mut encoder = Encoder::new(config).expect("Invalid encoder config");
    let frames: Vec<Frame> = (0..count).map(synthetic_frame).collect();

    let start = Instant::now();
    let mut total_bits = 0;
    for (i, frame) in frames.iter().enumerate() {
        // Every 4th frame is INTRA
        let kind = if i % 4 == 0 { MacroblockType::Intra } else { MacroblockType::Inter };
        let text = encoder.encode_frame(i as u32, frame, kind).expect("Encode failed");
        fs::write(Path::new(out_dir).join(format!("{i:04}.txt")), &text)
            .expect("Could not write frame record");
        total_bits += encoder.last_stats().token_bits;
    }
    println!(
        "Encoded {count} frames of {COLS}x{ROWS} in {:.1?} ({total_bits} block bits)",
        start.elapsed()
    );

    let mut decoder = Decoder::new(CodecProfile::default());
    for (i, original) in frames.iter().enumerate() {
        let text = fs::read_to_string(Path::new(out_dir).join(format!("{i:04}.txt")))
            .expect("Could not read frame record");
        match decoder.decode_frame(&text) {
            Ok(decoded) => {
                let psnr = decoded.frame.psnr(original).expect("Size mismatch");
                println!("  frame {:3}: PSNR {:6.2} dB", decoded.number, psnr);
            }
            Err(e) => {
                eprintln!("Decode failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
