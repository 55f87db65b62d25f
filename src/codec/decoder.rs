// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Frame decoder.
//!
//! Parses one frame record, decodes each coded block, rebuilds the six
//! blocks of every macroblock and adds the motion-compensated prediction
//! for INTER macroblocks. The decoded frame replaces the reference only when
//! the whole record decoded cleanly.

use log::{debug, info};

use super::dct::CoeffBlock;
use super::entropy::PairCoder;
use super::error::{CodecError, Result};
use super::frame::{check_dimensions, Frame, Window};
use super::macroblock::{MacroblockSamples, MacroblockType, BLOCK_COUNT};
use super::motion;
use super::profile::CodecProfile;
use super::syntax::{FieldReader, FrameRecord, MacroblockRecord};

/// A decoded frame with its picture number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// PN as written in the stream (0..=255).
    pub number: u32,
    pub frame: Frame,
}

/// Sequential frame decoder holding the last decoded frame as reference.
pub struct Decoder {
    profile: CodecProfile,
    reference: Option<Frame>,
}

impl Decoder {
    pub fn new(profile: CodecProfile) -> Self {
        Self { profile, reference: None }
    }

    pub fn profile(&self) -> &CodecProfile {
        &self.profile
    }

    pub fn reference(&self) -> Option<&Frame> {
        self.reference.as_ref()
    }

    /// Decode exactly one frame record from `text`. Trailing tokens after
    /// the record are a format error.
    pub fn decode_frame(&mut self, text: &str) -> Result<DecodedFrame> {
        let mut reader = FieldReader::new(text);
        let decoded = self.decode_next(&mut reader)?;
        if !reader.is_empty() {
            return Err(CodecError::format("trailing data after the frame record")
                .at_frame(decoded.number));
        }
        self.reference = Some(decoded.frame.clone());
        Ok(decoded)
    }

    /// Decode every frame record in `text`, in order.
    pub fn decode_stream(&mut self, text: &str) -> Result<Vec<DecodedFrame>> {
        let mut reader = FieldReader::new(text);
        let mut frames = Vec::new();
        while !reader.is_empty() {
            let decoded = self.decode_next(&mut reader)?;
            self.reference = Some(decoded.frame.clone());
            frames.push(decoded);
        }
        Ok(frames)
    }

    /// Parse and rebuild the next record without touching the reference.
    fn decode_next(&self, reader: &mut FieldReader<'_>) -> Result<DecodedFrame> {
        let record = reader.read_frame()?;
        let number = record.picture.number;
        info!("decoding picture {number}");
        let frame = self.reconstruct(&record).map_err(|e| e.at_frame(number))?;
        Ok(DecodedFrame { number, frame })
    }

    /// Rebuild a frame from a parsed record against the current reference.
    pub fn reconstruct(&self, record: &FrameRecord) -> Result<Frame> {
        let picture = &record.picture;
        check_dimensions(picture.cols, picture.rows).map_err(CodecError::format)?;
        let mut frame = Frame::new(picture.cols, picture.rows)?;
        if record.macroblocks.len() != frame.macroblock_count() {
            return Err(CodecError::format(format!(
                "{} macroblocks for a {}x{} frame",
                record.macroblocks.len(),
                picture.cols,
                picture.rows
            )));
        }

        // A reference of another size cannot serve INTER macroblocks.
        let reference = self
            .reference
            .as_ref()
            .filter(|r| r.cols() == picture.cols && r.rows() == picture.rows);

        let mut coded_blocks = 0;
        for (index, mb) in record.macroblocks.iter().enumerate() {
            if mb.header.index != index {
                return Err(CodecError::format(format!(
                    "macroblock number {} where {index} was expected",
                    mb.header.index
                ))
                .at_macroblock(index));
            }
            let window = Window::macroblock(index, frame.mb_cols());
            let samples = self
                .decode_macroblock(mb, window, reference)
                .map_err(|e| e.at_macroblock(index))?;
            samples.write_to(&mut frame, window);
            coded_blocks += mb.header.cbp.coded_count();
        }
        debug!(
            "picture {}: {} macroblocks, {} coded blocks",
            picture.number,
            record.macroblocks.len(),
            coded_blocks
        );
        Ok(frame)
    }

    fn decode_macroblock(
        &self,
        mb: &MacroblockRecord,
        window: Window,
        reference: Option<&Frame>,
    ) -> Result<MacroblockSamples> {
        let header = &mb.header;
        let coder = PairCoder::new(header.kind.pair_coding(&self.profile), self.profile.value_width);

        if mb.tokens.len() != header.cbp.coded_count() {
            return Err(CodecError::format(format!(
                "{} block tokens for coded block pattern {:06b}",
                mb.tokens.len(),
                header.cbp.bits()
            )));
        }

        let mut levels: [CoeffBlock; BLOCK_COUNT] = [[0; 64]; BLOCK_COUNT];
        let mut tokens = mb.tokens.iter();
        for (block, lv) in levels.iter_mut().enumerate() {
            if !header.cbp.is_coded(block) {
                continue;
            }
            let token = tokens
                .next()
                .ok_or_else(|| CodecError::format(format!("missing token for block {block}")))?;
            *lv = coder.decode_block(token)?;
        }
        let residual = MacroblockSamples::from_levels(&levels, header.quant);

        match header.kind {
            MacroblockType::Intra => Ok(residual),
            MacroblockType::Inter => {
                let reference = reference.ok_or_else(|| {
                    CodecError::configuration("INTER macroblock without a matching reference frame")
                })?;
                let prediction =
                    motion::predict(reference, window.center(), header.motion, self.profile.chroma)?;
                Ok(residual.add(&prediction))
            }
        }
    }
}
