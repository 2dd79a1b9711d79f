use std::fmt;
use std::str::FromStr;

/// A `Content-Range` header value in the two shapes the handshake uses.
///
/// A status request probes with `bytes */<total>`; the upload request
/// declares the whole body with `bytes 0-<total-1>/<total>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRange {
    /// `bytes */<total>`: asks the server which bytes it still needs.
    Probe { total: u64 },
    /// `bytes 0-<total-1>/<total>`: announces a full, single-shot body.
    Full { total: u64 },
}

impl ContentRange {
    /// Range for a status request probing an open session.
    pub fn probe(total: u64) -> Self {
        ContentRange::Probe { total }
    }

    /// Range for a full-body upload request.
    ///
    /// `total` must be non-zero; `bytes 0--1/0` is not representable in
    /// the wire grammar. The uploader rejects empty payloads before a
    /// range is ever built.
    pub fn full(total: u64) -> Self {
        ContentRange::Full { total }
    }

    /// Total number of payload bytes the range refers to.
    pub fn total(&self) -> u64 {
        match self {
            ContentRange::Probe { total } | ContentRange::Full { total } => *total,
        }
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRange::Probe { total } => write!(f, "bytes */{total}"),
            ContentRange::Full { total } => {
                write!(f, "bytes 0-{}/{total}", total.saturating_sub(1))
            }
        }
    }
}

/// Errors from parsing a `Content-Range` value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("missing 'bytes ' unit prefix")]
    MissingUnit,

    #[error("malformed range spec: {0}")]
    Malformed(String),

    #[error("range {first}-{last} does not cover total {total}")]
    Incomplete { first: u64, last: u64, total: u64 },
}

impl FromStr for ContentRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.strip_prefix("bytes ").ok_or(RangeParseError::MissingUnit)?;
        let (range, total) = spec
            .split_once('/')
            .ok_or_else(|| RangeParseError::Malformed(spec.into()))?;
        let total: u64 = total
            .parse()
            .map_err(|_| RangeParseError::Malformed(spec.into()))?;

        if range == "*" {
            return Ok(ContentRange::Probe { total });
        }

        let (first, last) = range
            .split_once('-')
            .ok_or_else(|| RangeParseError::Malformed(spec.into()))?;
        let first: u64 = first
            .parse()
            .map_err(|_| RangeParseError::Malformed(spec.into()))?;
        let last: u64 = last
            .parse()
            .map_err(|_| RangeParseError::Malformed(spec.into()))?;

        // Only the full single-shot shape is part of the handshake.
        if first != 0 || total == 0 || last != total - 1 {
            return Err(RangeParseError::Incomplete { first, last, total });
        }
        Ok(ContentRange::Full { total })
    }
}
