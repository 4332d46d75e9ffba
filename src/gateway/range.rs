//! `Range` header parsing.
//!
//! Only the single-range form `bytes=<start>-<end>` is accepted, with either
//! bound optional. An omitted start means 0 and an omitted end means the
//! last byte. Anything else (other units, multiple ranges, junk) is an
//! error, which the gateway answers with 416.

use crate::store::ByteRange;

/// A syntactically valid range whose bounds have not been checked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

/// Why a `Range` header could not be honored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range unit must be 'bytes'")]
    UnsupportedUnit,

    #[error("multiple ranges are not supported")]
    MultipleRanges,

    #[error("malformed range: {0}")]
    Malformed(String),

    #[error("range not satisfiable for object of {size} bytes")]
    Unsatisfiable { size: u64 },
}

/// Parses a `Range` header value.
///
/// # Errors
///
/// Returns an error for anything other than one `bytes=<start>-<end>` range.
///
/// # Examples
///
/// ```
/// use mediagate::gateway::{RangeSpec, parse_range_header};
///
/// assert_eq!(
///     parse_range_header("bytes=500-").unwrap(),
///     RangeSpec { start: Some(500), end: None }
/// );
/// assert!(parse_range_header("bytes=0-10,20-30").is_err());
/// ```
pub fn parse_range_header(value: &str) -> Result<RangeSpec, RangeError> {
    let Some((unit, set)) = value.trim().split_once('=') else {
        return Err(RangeError::Malformed(format!("missing '=' in {value:?}")));
    };
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(RangeError::UnsupportedUnit);
    }
    if set.contains(',') {
        return Err(RangeError::MultipleRanges);
    }
    let Some((start, end)) = set.split_once('-') else {
        return Err(RangeError::Malformed(format!("missing '-' in {value:?}")));
    };

    Ok(RangeSpec {
        start: parse_bound(start)?,
        end: parse_bound(end)?,
    })
}

fn parse_bound(raw: &str) -> Result<Option<u64>, RangeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(format!("invalid bound {raw:?}")));
    }
    raw.parse()
        .map(Some)
        .map_err(|_| RangeError::Malformed(format!("bound out of range {raw:?}")))
}

impl RangeSpec {
    /// Applies the defaults and checks `0 <= start <= end < size`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Unsatisfiable`] when the range does not fit the
    /// object, including every range against an empty object.
    pub fn resolve(self, size: u64) -> Result<ByteRange, RangeError> {
        let unsatisfiable = RangeError::Unsatisfiable { size };
        let last = size.checked_sub(1).ok_or_else(|| unsatisfiable.clone())?;

        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(last);
        if start > end || end > last {
            return Err(unsatisfiable);
        }

        Ok(ByteRange { start, end })
    }
}
