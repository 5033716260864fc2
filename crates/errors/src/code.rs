//! The structured error code value type.
//!
//! A code is a plain value compared by its three segments; it has no
//! identity and never changes after construction.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Flow id reserved for codes owned by no specific flow.
pub const COMMON_FLOW_ID: u32 = 0;

/// Local code reserved for codes owned by no specific flow.
pub const COMMON_LOCAL_CODE: u32 = 0;

/// Three-part structured error code `flowId.httpStatus.localCode`.
///
/// The flow id names the owning subsystem, the HTTP status drives the
/// response status line, and the local code distinguishes the condition from
/// its siblings within the flow. Composition is deterministic and pure: the
/// same three inputs always yield the same code and the same string.
///
/// Non-negativity is carried by the integer types; the HTTP status is taken
/// as the caller supplies it (custom/extended statuses included).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AppErrorCode {
    flow_id: u32,
    http_status: u16,
    local_code: u32,
}

impl AppErrorCode {
    /// Compose a flow-scoped code from its three segments.
    pub fn new(flow_id: u32, http_status: u16, local_code: u32) -> Self {
        Self {
            flow_id,
            http_status,
            local_code,
        }
    }

    /// Compose a common code from a bare HTTP status.
    ///
    /// Common codes are for generic, cross-cutting errors (malformed bodies,
    /// unmatched routes) that no flow owns: the status alone is the signal.
    /// Never use this for an error a flow has registered.
    pub fn common(http_status: u16) -> Self {
        Self::new(COMMON_FLOW_ID, http_status, COMMON_LOCAL_CODE)
    }

    pub fn flow_id(&self) -> u32 {
        self.flow_id
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn local_code(&self) -> u32 {
        self.local_code
    }

    /// Whether this is a common (flowless) code.
    pub fn is_common(&self) -> bool {
        self.flow_id == COMMON_FLOW_ID && self.local_code == COMMON_LOCAL_CODE
    }
}

impl fmt::Display for AppErrorCode {
    /// Canonical dot-delimited rendering, always exactly three plain decimal
    /// segments.
    ///
    /// Flow-scoped codes render `flowId.httpStatus.localCode`. The common
    /// sentinel shape renders `httpStatus.0.0`, the wire form clients already
    /// match on for flowless errors.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_common() {
            write!(f, "{}.0.0", self.http_status)
        } else {
            write!(f, "{}.{}.{}", self.flow_id, self.http_status, self.local_code)
        }
    }
}

/// Failure to parse a code string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCodeError {
    /// The string did not have exactly three dot-delimited segments.
    #[error("expected three dot-delimited segments, got {0}")]
    SegmentCount(usize),

    /// A segment was not a non-negative integer in range.
    #[error("invalid code segment '{0}'")]
    InvalidSegment(String),
}

impl FromStr for AppErrorCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').collect();
        let [first, second, third] = segments[..] else {
            return Err(ParseCodeError::SegmentCount(segments.len()));
        };

        let parse_u32 = |seg: &str| {
            seg.parse::<u32>()
                .map_err(|_| ParseCodeError::InvalidSegment(seg.to_string()))
        };

        // The common wire shape carries the status in the first segment.
        if second == "0" && third == "0" {
            if let Ok(status) = first.parse::<u16>() {
                return Ok(Self::common(status));
            }
        }

        let flow_id = parse_u32(first)?;
        let http_status = second
            .parse::<u16>()
            .map_err(|_| ParseCodeError::InvalidSegment(second.to_string()))?;
        let local_code = parse_u32(third)?;
        Ok(Self::new(flow_id, http_status, local_code))
    }
}

impl Serialize for AppErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
