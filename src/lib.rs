// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! # minimpeg
//!
//! Small MPEG-style video codec. The encoder turns a sequence of YCbCr
//! frames into a text bitstream of macroblock records; the decoder rebuilds
//! approximate frames from it. INTER frames are coded as motion-compensated
//! residuals against the previous reconstruction, so frames must be encoded
//! and decoded strictly in order.
//!
//! Image file I/O and colour conversion are left to the caller: frames are
//! handed over as three 8-bit planes.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use minimpeg::{Decoder, Encoder, EncoderConfig, Frame, MacroblockType};
//!
//! let frame = Frame::filled(32, 32, [120, 128, 128]).unwrap();
//! let mut encoder = Encoder::new(EncoderConfig::default()).unwrap();
//! let text = encoder.encode_frame(0, &frame, MacroblockType::Intra).unwrap();
//!
//! let mut decoder = Decoder::new(encoder.config().profile);
//! let decoded = decoder.decode_frame(&text).unwrap();
//! assert_eq!(decoded.frame.cols(), 32);
//! ```

pub mod codec;

pub use codec::error::{CodecError, ErrorKind, Location, Result};
pub use codec::frame::{Frame, Plane, MAX_DIMENSION};
pub use codec::macroblock::{MacroblockType, MotionVector};
pub use codec::profile::{
    ChromaSiting, CodecProfile, EncoderConfig, PairCoding, SubPosition, ValueWidth, DEFAULT_QUANT,
};
pub use codec::{encode_sequence, DecodedFrame, Decoder, Encoder, FrameStats};
