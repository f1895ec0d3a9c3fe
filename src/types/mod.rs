//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod port;
mod target;

pub use port::{Port, PortError, PortRange, PortSpec, EXTRA_COMMON_PORTS};
pub use target::{parse_target_ip, NetworkTarget, TargetError};
