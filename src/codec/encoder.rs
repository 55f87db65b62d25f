// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Frame encoder.
//!
//! Per macroblock: extract samples, (INTER) estimate motion and subtract the
//! prediction, transform and quantize the six blocks, entropy-code the
//! non-zero ones, then dequantize and inverse-transform to rebuild exactly
//! what the decoder will see. The rebuilt frame becomes the reference for
//! the next call.
//!
//! Macroblocks of one frame only read the previous reference, so with the
//! `parallel` feature they are processed concurrently and merged back in
//! raster order.

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::dct::{forward_transform, has_nonzero, CoeffBlock};
use super::entropy::PairCoder;
use super::error::{CodecError, Result};
use super::frame::{Frame, Window};
use super::macroblock::{
    CodedBlockPattern, MacroblockHeader, MacroblockSamples, MacroblockType, MotionVector,
    BLOCK_COUNT,
};
use super::motion;
use super::profile::EncoderConfig;
use super::quant::quantize_block;
use super::syntax::{FrameRecord, MacroblockRecord, PictureHeader};

/// Result of coding one macroblock.
struct CodedMacroblock {
    record: MacroblockRecord,
    reconstruction: MacroblockSamples,
    escapes: usize,
}

/// Per-frame statistics, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub macroblocks: usize,
    pub coded_blocks: usize,
    pub escapes: usize,
    pub token_bits: usize,
}

/// Sequential frame encoder holding the reconstructed reference frame.
pub struct Encoder {
    config: EncoderConfig,
    reference: Option<Frame>,
    last_stats: FrameStats,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reference: None, last_stats: FrameStats::default() })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The reconstruction of the last encoded frame.
    pub fn reference(&self) -> Option<&Frame> {
        self.reference.as_ref()
    }

    /// Statistics of the last successfully encoded frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Encode one frame and return its text record.
    pub fn encode_frame(&mut self, number: u32, frame: &Frame, kind: MacroblockType) -> Result<String> {
        Ok(self.encode_record(number, frame, kind)?.to_text())
    }

    /// Encode one frame into a structured record.
    ///
    /// On error the reference frame is left untouched.
    pub fn encode_record(&mut self, number: u32, frame: &Frame, kind: MacroblockType) -> Result<FrameRecord> {
        info!("encoding picture {number} ({kind:?})");

        let reference = match (kind, &self.reference) {
            (MacroblockType::Inter, None) => {
                return Err(CodecError::configuration("INTER frame without a reference frame")
                    .at_frame(number));
            }
            (MacroblockType::Inter, Some(r)) => {
                if r.cols() != frame.cols() || r.rows() != frame.rows() {
                    return Err(CodecError::configuration(format!(
                        "frame is {}x{} but the reference is {}x{}",
                        frame.cols(),
                        frame.rows(),
                        r.cols(),
                        r.rows()
                    ))
                    .at_frame(number));
                }
                Some(r)
            }
            (MacroblockType::Intra, _) => None,
        };

        let ctx = MacroblockContext { config: &self.config, frame, reference, kind };
        let count = frame.macroblock_count();
        let encode_one = |index: usize| ctx.encode(index).map_err(|e| e.at_macroblock(index));

        #[cfg(feature = "parallel")]
        let results: Vec<Result<CodedMacroblock>> = (0..count).into_par_iter().map(encode_one).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<CodedMacroblock>> = (0..count).map(encode_one).collect();

        let mut reconstructed = Frame::new(frame.cols(), frame.rows())?;
        let mut macroblocks = Vec::with_capacity(count);
        let mut stats = FrameStats { macroblocks: count, ..FrameStats::default() };
        for (index, result) in results.into_iter().enumerate() {
            let coded = result.map_err(|e| e.at_frame(number))?;
            coded
                .reconstruction
                .write_to(&mut reconstructed, Window::macroblock(index, frame.mb_cols()));
            stats.coded_blocks += coded.record.header.cbp.coded_count();
            stats.escapes += coded.escapes;
            macroblocks.push(coded.record);
        }

        let record = FrameRecord {
            picture: PictureHeader { number: number % 256, cols: frame.cols(), rows: frame.rows() },
            macroblocks,
        };
        stats.token_bits = record.token_bits();
        debug!(
            "picture {number}: {} macroblocks, {} coded blocks, {} escapes, {} token bits",
            stats.macroblocks, stats.coded_blocks, stats.escapes, stats.token_bits
        );

        self.reference = Some(reconstructed);
        self.last_stats = stats;
        Ok(record)
    }
}

/// Read-only state shared by all macroblocks of one frame.
struct MacroblockContext<'a> {
    config: &'a EncoderConfig,
    frame: &'a Frame,
    reference: Option<&'a Frame>,
    kind: MacroblockType,
}

impl MacroblockContext<'_> {
    fn encode(&self, index: usize) -> Result<CodedMacroblock> {
        let profile = &self.config.profile;
        let quant = self.config.quant;
        let window = Window::macroblock(index, self.frame.mb_cols());
        let samples = MacroblockSamples::extract(self.frame, window, profile.chroma);

        let (motion, prediction) = match self.reference {
            Some(reference) => {
                let mv = motion::estimate(&samples.luma, reference, window.center());
                let prediction = motion::predict(reference, window.center(), mv, profile.chroma)?;
                (mv, Some(prediction))
            }
            None => (MotionVector::ZERO, None),
        };
        let residual = match &prediction {
            Some(p) => samples.sub(p),
            None => samples,
        };

        let coder = PairCoder::new(self.kind.pair_coding(profile), profile.value_width);
        let mut levels: [CoeffBlock; BLOCK_COUNT] = [[0; 64]; BLOCK_COUNT];
        let mut flags = [false; BLOCK_COUNT];
        let mut tokens = Vec::new();
        let mut escapes = 0;
        for (i, block) in residual.blocks().iter().enumerate() {
            levels[i] = quantize_block(&forward_transform(block), quant, profile.value_width)?;
            flags[i] = has_nonzero(&levels[i]);
            if flags[i] {
                let coded = coder.encode_block(&levels[i])?;
                escapes += coded.escapes;
                tokens.push(coded.token);
            }
        }

        let decoded = MacroblockSamples::from_levels(&levels, quant);
        let reconstruction = match &prediction {
            Some(p) => decoded.add(p),
            None => decoded,
        };

        Ok(CodedMacroblock {
            record: MacroblockRecord {
                header: MacroblockHeader {
                    index,
                    kind: self.kind,
                    quant,
                    motion,
                    cbp: CodedBlockPattern::from_flags(flags),
                },
                tokens,
            },
            reconstruction,
            escapes,
        })
    }
}

/// Encode `frames` in order, numbering them from 0, and return the
/// concatenated text records.
pub fn encode_sequence<'a, I>(frames: I, config: EncoderConfig) -> Result<String>
where
    I: IntoIterator<Item = (&'a Frame, MacroblockType)>,
{
    let mut encoder = Encoder::new(config)?;
    let mut out = String::new();
    for (number, (frame, kind)) in frames.into_iter().enumerate() {
        encoder.encode_record(number as u32, frame, kind)?.write(&mut out);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error::ErrorKind;
    use crate::codec::profile::CodecProfile;

    #[test]
    fn inter_without_reference_is_rejected() {
        let frame = Frame::filled(32, 32, [10, 20, 30]).unwrap();
        let mut enc = Encoder::new(EncoderConfig::default()).unwrap();
        let err = enc.encode_frame(0, &frame, MacroblockType::Inter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.location().frame, Some(0));
        assert!(enc.reference().is_none());
    }

    #[test]
    fn invalid_quant_is_rejected() {
        assert!(Encoder::new(EncoderConfig::default().with_quant(0)).is_err());
        // A bright DC would need level 400 at step 4
        let err = Encoder::new(EncoderConfig::default().with_quant(4)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn bright_block_at_the_smallest_step() {
        let frame = Frame::filled(32, 32, [200, 128, 128]).unwrap();
        let mut enc = Encoder::new(EncoderConfig::default().with_quant(8)).unwrap();
        enc.encode_frame(0, &frame, MacroblockType::Intra).unwrap();
        assert_eq!(enc.reference().unwrap(), &frame);
    }

    #[test]
    fn unrepresentable_level_is_reported() {
        // 8-bit field: a full-swing negative residual needs level -128
        let config = EncoderConfig::new(CodecProfile::legacy());
        let mut enc = Encoder::new(config).unwrap();
        let white = Frame::filled(32, 32, [255, 128, 128]).unwrap();
        enc.encode_frame(0, &white, MacroblockType::Intra).unwrap();

        let black = Frame::filled(32, 32, [0, 128, 128]).unwrap();
        let err = enc.encode_frame(1, &black, MacroblockType::Inter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.location().frame, Some(1));
        assert_eq!(err.location().macroblock, Some(0));
        assert_eq!(enc.reference().unwrap(), &white);
    }

    #[test]
    fn reference_size_must_match() {
        let mut enc = Encoder::new(EncoderConfig::default()).unwrap();
        enc.encode_frame(0, &Frame::new(32, 32).unwrap(), MacroblockType::Intra).unwrap();
        let err = enc
            .encode_frame(1, &Frame::new(48, 32).unwrap(), MacroblockType::Inter)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(enc.reference().unwrap().cols(), 32);
    }

    #[test]
    fn intra_record_shape() {
        let frame = Frame::filled(32, 16, [200, 128, 128]).unwrap();
        let mut enc = Encoder::new(EncoderConfig::default()).unwrap();
        let record = enc.encode_record(7, &frame, MacroblockType::Intra).unwrap();
        assert_eq!(record.picture, PictureHeader { number: 7, cols: 32, rows: 16 });
        assert_eq!(record.macroblocks.len(), 2);
        for (i, mb) in record.macroblocks.iter().enumerate() {
            assert_eq!(mb.header.index, i);
            assert_eq!(mb.header.quant, 16);
            assert!(mb.header.motion.is_zero());
            // DC-only luma (1600 / 16 = 100) and chroma (1024 / 16 = 64)
            assert_eq!(mb.header.cbp.bits(), 0b111111);
            assert_eq!(mb.tokens.len(), 6);
        }
        assert_eq!(enc.last_stats().coded_blocks, 12);
        assert_eq!(enc.reference().unwrap(), &frame);
    }
}
