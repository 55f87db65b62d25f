// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! MPEG-style frame codec.
//!
//! Frames are coded as 16×16 macroblocks in raster order. Each macroblock is
//! either INTRA (its own samples) or INTER (a residual against the previous
//! reconstructed frame, addressed by a motion vector from a 2-D logarithmic
//! search). Luma is split into four 8×8 blocks, chroma is subsampled 4:1:1
//! by picking one sample per 2×2 group, and every block goes through an 8×8
//! DCT, uniform quantization, zigzag scan and run-length + VLC coding.
//!
//! The stream is text: fixed-width header fields and coded blocks written as
//! ASCII `0`/`1` tokens (see [`syntax`]).
//!
//! Supports:
//! - INTRA and INTER macroblocks, frame type chosen by the caller
//! - 8-bit and 9-bit escape value widths via [`profile::CodecProfile`]
//! - VLC or fixed-length pair coding for INTRA blocks
//! - Configurable chroma siting
//! - Parallel macroblock encoding (`parallel` feature)
//!
//! Does NOT support:
//! - B-frames, rate control, adaptive quantization or deblocking

pub mod error;
pub mod bitio;
pub mod zigzag;
pub mod vlc;
pub mod entropy;
pub mod quant;
pub mod dct;
pub mod profile;
pub mod frame;
pub mod macroblock;
pub mod motion;
pub mod syntax;
pub mod encoder;
pub mod decoder;

pub use decoder::{DecodedFrame, Decoder};
pub use encoder::{encode_sequence, Encoder, FrameStats};
