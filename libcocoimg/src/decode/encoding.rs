use std::{fmt::Display, str::FromStr};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{all_consuming, map, value},
    sequence::preceded,
    IResult,
};

use super::Phase;
use crate::{
    error::Error,
    parse::{byte_value, usize_value},
};

/// Grammar of an image's pixel stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// One packed byte per step
    Raw,
    /// `(count, packed)` pairs writing `count + 1` groups
    CountPairs,
    /// Literal bytes, with `escape` introducing a `(count, packed)` pair
    Escaped {
        /// Byte value that starts a run
        escape: u8,
    },
    /// Per-row blocks of literal and repeat packets
    Packets {
        /// Packed bytes in one row of the image
        row_bytes: usize,
    },
}

impl Encoding {
    /// Returns the phase reported when decoding this stream fails
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Raw => Phase::Uncompressed,
            _ => Phase::Compressed,
        }
    }
}

fn encoding(input: &str) -> IResult<&str, Encoding> {
    alt((
        map(preceded(tag("escape:"), byte_value), |escape| {
            Encoding::Escaped { escape }
        }),
        map(preceded(tag("packets:"), usize_value), |row_bytes| {
            Encoding::Packets { row_bytes }
        }),
        value(Encoding::Raw, tag("raw")),
        value(Encoding::CountPairs, tag("pairs")),
    ))(input)
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(encoding)(s.trim())
            .map(|(_, encoding)| encoding)
            .map_err(|e| Error::InvalidArgument(format!("invalid encoding {s:?}: {e}")))
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::CountPairs => write!(f, "pairs"),
            Self::Escaped { escape } => write!(f, "escape:{escape:#04x}"),
            Self::Packets { row_bytes } => write!(f, "packets:{row_bytes}"),
        }
    }
}
