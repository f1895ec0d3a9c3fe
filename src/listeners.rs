//! Local listening TCP sockets.
//!
//! Reads the OS socket table on every call; nothing is cached between calls.

use crate::error::{ListenerError, ListenerResult};
use netstat2::{
    get_sockets_info, AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState,
};
use serde::Serialize;
use std::net::IpAddr;
use sysinfo::{Pid, System};
use tracing::debug;

/// Process name used when the owner of a socket cannot be determined.
pub const UNKNOWN_PROCESS: &str = "unknown";

/// Connection state reported for every entry.
pub const LISTEN_STATE: &str = "LISTEN";

/// A TCP socket in the LISTEN state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListeningPort {
    pub address: IpAddr,
    pub port: u16,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub process: String,
}

/// Source of listening sockets.
pub trait ListenerSource {
    /// All listening TCP sockets, ordered by port then address.
    fn listening_ports(&self) -> ListenerResult<Vec<ListeningPort>>;

    /// Number of listening sockets.
    fn count(&self) -> ListenerResult<usize> {
        Ok(self.listening_ports()?.len())
    }

    fn is_listening(&self, port: u16) -> ListenerResult<bool> {
        Ok(self.listening_ports()?.iter().any(|l| l.port == port))
    }

    /// Name of the process listening on `port`.
    fn process_for_port(&self, port: u16) -> ListenerResult<String> {
        self.listening_ports()?
            .into_iter()
            .find(|l| l.port == port)
            .map(|l| l.process)
            .ok_or(ListenerError::NotListening(port))
    }
}

/// Reads the live socket table via `netstat2` and resolves owners via `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemListeners;

impl SystemListeners {
    pub fn new() -> Self {
        Self
    }
}

impl ListenerSource for SystemListeners {
    fn listening_ports(&self) -> ListenerResult<Vec<ListeningPort>> {
        let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let sockets = get_sockets_info(af_flags, ProtocolFlags::TCP)
            .map_err(|e| ListenerError::SocketTable(e.to_string()))?;
        let system = System::new_all();

        let mut listeners: Vec<ListeningPort> = sockets
            .into_iter()
            .filter_map(|socket| {
                let ProtocolSocketInfo::Tcp(tcp) = &socket.protocol_socket_info else {
                    return None;
                };
                if !matches!(tcp.state, TcpState::Listen) {
                    return None;
                }

                let pid = socket.associated_pids.first().copied();
                let process = pid
                    .and_then(|pid| system.process(Pid::from_u32(pid)))
                    .map(|p| p.name().to_string())
                    .unwrap_or_else(|| UNKNOWN_PROCESS.to_string());

                Some(ListeningPort {
                    address: tcp.local_addr,
                    port: tcp.local_port,
                    state: LISTEN_STATE.to_string(),
                    pid,
                    process,
                })
            })
            .collect();

        sort_listeners(&mut listeners);
        debug!(count = listeners.len(), "read listening sockets");
        Ok(listeners)
    }
}

fn sort_listeners(listeners: &mut [ListeningPort]) {
    listeners.sort_by(|a, b| a.port.cmp(&b.port).then(a.address.cmp(&b.address)));
}
