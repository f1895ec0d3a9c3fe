//! Target types: CIDR expansion and single-address validation.
//!
//! A [`NetworkTarget`] holds the concrete host addresses of a CIDR block in
//! address order, with the network and broadcast addresses removed for any
//! block larger than two addresses.

use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u128, u128),
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
}

/// An expanded CIDR block.
#[derive(Debug, Clone)]
pub struct NetworkTarget {
    network: IpNetwork,
    hosts: Vec<IpAddr>,
}

impl NetworkTarget {
    /// Maximum number of addresses a block may hold (a /8 for IPv4).
    pub const MAX_HOSTS: u128 = 1 << 24;

    /// Parse and expand a CIDR string such as `"192.168.1.0/24"`.
    ///
    /// Host bits in the address part are ignored: `"10.0.0.5/30"` expands the
    /// same block as `"10.0.0.0/30"`.
    pub fn parse(cidr: &str) -> Result<Self, TargetError> {
        let cidr = cidr.trim();
        // Prefix length only; netmask notation is not CIDR.
        let numeric_prefix = cidr
            .split_once('/')
            .is_some_and(|(_, prefix)| !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()));
        if !numeric_prefix {
            return Err(TargetError::InvalidCidr(cidr.to_string()));
        }

        let network: IpNetwork = cidr
            .parse()
            .map_err(|_| TargetError::InvalidCidr(cidr.to_string()))?;

        let size = block_size(&network);
        if size > Self::MAX_HOSTS {
            return Err(TargetError::CidrTooLarge(size, Self::MAX_HOSTS));
        }

        // The iterator starts at the masked network address and walks the
        // block in big-endian order.
        let mut hosts: Vec<IpAddr> = network.iter().collect();
        if hosts.len() > 2 {
            hosts.pop();
            hosts.remove(0);
        }

        Ok(Self { network, hosts })
    }

    /// The parsed block.
    pub fn network(&self) -> IpNetwork {
        self.network
    }

    /// Usable host addresses in ascending order.
    pub fn hosts(&self) -> &[IpAddr] {
        &self.hosts
    }

    pub fn into_hosts(self) -> Vec<IpAddr> {
        self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl FromStr for NetworkTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

/// Validate a single IP address string.
pub fn parse_target_ip(s: &str) -> Result<IpAddr, TargetError> {
    s.trim()
        .parse::<IpAddr>()
        .map_err(|_| TargetError::InvalidAddress(s.to_string()))
}

fn block_size(network: &IpNetwork) -> u128 {
    match network {
        IpNetwork::V4(net) => 1u128 << (32 - u32::from(net.prefix())),
        IpNetwork::V6(net) => {
            let prefix = u32::from(net.prefix());
            if prefix == 0 {
                u128::MAX
            } else {
                1u128 << (128 - prefix)
            }
        }
    }
}
