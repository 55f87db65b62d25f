// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Example: encode planar YCbCr 4:4:4 raw video into a text stream, or
//! decode a stream back into raw video.
//!
//! Usage: raw_codec <input.yuv> <cols> <rows> <output.txt> [--legacy]
//!        raw_codec --decode <input.txt> <output.yuv> [--legacy]
use std::fs;

use minimpeg::{encode_sequence, CodecProfile, Decoder, EncoderConfig, Frame, MacroblockType};

fn profile(args: &[String]) -> CodecProfile {
    if args.iter().any(|a| a == "--legacy") {
        CodecProfile::legacy()
    } else {
        CodecProfile::default()
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: raw_codec <input.yuv> <cols> <rows> <output.txt> [--legacy]");
        eprintln!("       raw_codec --decode <input.txt> <output.yuv> [--legacy]");
        std::process::exit(1);
    }

    if args[1] == "--decode" {
        let text = fs::read_to_string(&args[2]).expect("Could not read stream");
        let mut decoder = Decoder::new(profile(&args));
        let frames = match decoder.decode_stream(&text) {
            Ok(frames) => frames,
            Err(e) => {
                eprintln!("Decode failed: {e}");
                std::process::exit(1);
            }
        };
        let mut raw = Vec::new();
        for decoded in &frames {
            for plane in decoded.frame.clone().into_planes() {
                raw.extend_from_slice(&plane);
            }
        }
        fs::write(&args[3], &raw).expect("Could not write output");
        println!("Decoded {} frames to {}", frames.len(), args[3]);
    } else {
        if args.len() < 5 {
            eprintln!("Missing output path");
            std::process::exit(1);
        }
        let raw = fs::read(&args[1]).expect("Could not read input");
        let cols: usize = args[2].parse().expect("Bad column count");
        let rows: usize = args[3].parse().expect("Bad row count");
        let plane_len = cols * rows;
        let frame_len = 3 * plane_len;

        let frames: Vec<Frame> = raw
            .chunks_exact(frame_len)
            .map(|chunk| {
                let (y, rest) = chunk.split_at(plane_len);
                let (cb, cr) = rest.split_at(plane_len);
                Frame::from_planes(cols, rows, y.to_vec(), cb.to_vec(), cr.to_vec())
                    .expect("Frame dimensions must be multiples of 16")
            })
            .collect();

        let config = EncoderConfig::new(profile(&args));
        let kinds = (0..frames.len())
            .map(|i| if i % 4 == 0 { MacroblockType::Intra } else { MacroblockType::Inter });
        let text = encode_sequence(frames.iter().zip(kinds), config).expect("Encode failed");
        fs::write(&args[4], &text).expect("Could not write output");
        println!(
            "Encoded {} frames: {} raw bytes -> {} stream characters",
            frames.len(),
            raw.len(),
            text.len()
        );
    }
}
