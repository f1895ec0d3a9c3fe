//! JSON output formatting.

use serde::Serialize;
use std::io::{self, Write};

/// Write any serializable result as pretty JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortProbeOutcome, PortState};
    use crate::types::Port;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    #[test]
    fn test_outcome_shape() {
        let outcome = PortProbeOutcome::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            Port::new(22).unwrap(),
            PortState::Open,
            "ssh",
            "syn-ack",
        )
        .with_latency(Duration::from_millis(12));

        let mut buf = Vec::new();
        write_json(&mut buf, &[outcome]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let first = &value[0];
        assert_eq!(first["port"], 22);
        assert_eq!(first["state"], "open");
        assert_eq!(first["open"], true);
        assert_eq!(first["latency_ms"], 12);
        assert_eq!(first["reason"], "syn-ack");
        assert!(first.get("banner").is_none());
    }
}
