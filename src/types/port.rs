//! Port types with validation and selector parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` turns a user selector ("all", "1-1024", "80,443") into the
//! concrete, ordered list of ports a scan will attempt.

use crate::services;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Parse a decimal token, returning None for anything outside 1-65535.
    pub fn parse_lenient(token: &str) -> Option<Self> {
        token
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| u16::try_from(n).ok())
            .and_then(Self::new)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A range of ports (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Build a range from raw bounds, validating both ends.
    pub fn from_bounds(start: u16, end: u16) -> Result<Self, PortError> {
        let start_port = Port::new(start).ok_or(PortError::OutOfRange(start))?;
        let end_port = Port::new(end).ok_or(PortError::OutOfRange(end))?;
        Self::new(start_port, end_port)
    }

    /// IANA well-known ports, 1-1024.
    pub const fn well_known() -> Self {
        Self {
            start: Port(1),
            end: Port(1024),
        }
    }

    /// IANA registered ports, 1025-49151.
    pub const fn registered() -> Self {
        Self {
            start: Port(1025),
            end: Port(49151),
        }
    }

    /// Dynamic/private ports, 49152-65535.
    pub const fn dynamic() -> Self {
        Self {
            start: Port(49152),
            end: Port(65535),
        }
    }

    /// Every valid port.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Ports added to the well-known service table when scanning "all".
pub const EXTRA_COMMON_PORTS: [u16; 6] = [8000, 8008, 8888, 9090, 9200, 9300];

/// The resolved form of a port selector.
///
/// Selector grammar, first match wins:
/// - `""` or `"all"`: the curated well-known set, ascending
/// - `"a-b"`: every port from `a` to `b` inclusive
/// - `"80,443,8080"`: the listed ports in input order, invalid entries dropped
/// - `"22"`: a single port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// Resolve a selector. Never fails; a malformed selector yields an empty
    /// spec, which callers treat as a configuration error.
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();

        if selector.is_empty() || selector.eq_ignore_ascii_case("all") {
            return Self::common();
        }

        if selector.contains('-') {
            let bounds: Vec<&str> = selector.split('-').collect();
            let range = match bounds.as_slice() {
                [start, end] => parse_bound(start)
                    .zip(parse_bound(end))
                    .and_then(|(s, e)| PortRange::from_bounds(s, e).ok()),
                _ => None,
            };
            return range.map(Self::from).unwrap_or_default();
        }

        if selector.contains(',') {
            let mut ports: Vec<Port> = Vec::new();
            for port in selector.split(',').filter_map(Port::parse_lenient) {
                if !ports.contains(&port) {
                    ports.push(port);
                }
            }
            return Self { ports };
        }

        Self {
            ports: Port::parse_lenient(selector).into_iter().collect(),
        }
    }

    /// The curated set used for an empty or "all" selector.
    pub fn common() -> Self {
        let mut ports: Vec<Port> = services::WELL_KNOWN_PORTS
            .iter()
            .chain(EXTRA_COMMON_PORTS.iter())
            .filter_map(|&p| Port::new(p))
            .collect();
        ports.sort_unstable();
        ports.dedup();
        Self { ports }
    }

    /// The resolved ports, in scan order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn into_ports(self) -> Vec<Port> {
        self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl From<PortRange> for PortSpec {
    fn from(range: PortRange) -> Self {
        Self {
            ports: range.iter().collect(),
        }
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = Self::parse(s);
        if spec.is_empty() {
            return Err(PortError::Empty);
        }
        Ok(spec)
    }
}

/// Range bounds are parsed wider than u16 so "0-70000" is rejected by the
/// range check rather than by the integer parse.
fn parse_bound(token: &str) -> Option<u16> {
    let n: u32 = token.trim().parse().ok()?;
    u16::try_from(n).ok()
}
