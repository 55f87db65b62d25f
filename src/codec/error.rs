// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Error types for encoding and decoding.
//!
//! Every failure falls into one of three kinds (see [`ErrorKind`]). None of
//! them is recoverable for the frame being processed: the pipeline aborts and
//! the error carries the frame number and macroblock index where it happened.

use std::fmt;

use thiserror::Error;

/// Where in the stream an error was raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    /// Frame (picture) number as written in the PN field.
    pub frame: Option<u32>,
    /// Macroblock index in raster order.
    pub macroblock: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.frame, self.macroblock) {
            (Some(fr), Some(mb)) => write!(f, " (frame {fr}, macroblock {mb})"),
            (Some(fr), None) => write!(f, " (frame {fr})"),
            (None, Some(mb)) => write!(f, " (macroblock {mb})"),
            (None, None) => Ok(()),
        }
    }
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Header fields missing, malformed, or inconsistent with the frame size.
    Format,
    /// Entropy-coded data could not be decoded.
    Decode,
    /// The caller asked for something the codec cannot do.
    Configuration,
}

/// Errors that can occur while encoding or decoding a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A header field is missing, unparsable, or the macroblock layout does
    /// not match the declared dimensions.
    #[error("malformed stream{location}: {reason}")]
    Format { reason: String, location: Location },
    /// No codeword matched before the token ran out, or a fixed-width field
    /// was cut short.
    #[error("undecodable block data{location}: {reason}")]
    Decode { reason: String, location: Location },
    /// INTER coding without a reference frame, an out-of-range motion vector,
    /// or an unusable encoder setting.
    #[error("invalid configuration{location}: {reason}")]
    Configuration { reason: String, location: Location },
}

impl CodecError {
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format { reason: reason.into(), location: Location::default() }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode { reason: reason.into(), location: Location::default() }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into(), location: Location::default() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::Format { location, .. }
            | Self::Decode { location, .. }
            | Self::Configuration { location, .. } => *location,
        }
    }

    fn location_mut(&mut self) -> &mut Location {
        match self {
            Self::Format { location, .. }
            | Self::Decode { location, .. }
            | Self::Configuration { location, .. } => location,
        }
    }

    /// Attach the frame number. An already recorded frame is kept.
    pub fn at_frame(mut self, frame: u32) -> Self {
        let loc = self.location_mut();
        loc.frame.get_or_insert(frame);
        self
    }

    /// Attach the macroblock index. An already recorded index is kept.
    pub fn at_macroblock(mut self, mn: usize) -> Self {
        let loc = self.location_mut();
        loc.macroblock.get_or_insert(mn);
        self
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = CodecError::decode("no codeword matched").at_macroblock(5).at_frame(2);
        assert_eq!(
            err.to_string(),
            "undecodable block data (frame 2, macroblock 5): no codeword matched"
        );
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn inner_location_wins() {
        let err = CodecError::format("bad MTYPE").at_macroblock(3).at_macroblock(9);
        assert_eq!(err.location().macroblock, Some(3));
        assert_eq!(err.location().frame, None);
    }

    #[test]
    fn display_without_location() {
        let err = CodecError::configuration("quantizer step must be 1..=31");
        assert_eq!(err.to_string(), "invalid configuration: quantizer step must be 1..=31");
    }
}
