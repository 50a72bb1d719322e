//! UdpBackend - one datagram per message

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use contracts::{BackendKind, ContractError, SinkBackend};
use tracing::debug;

use super::gather;

/// Largest UDP payload over IPv4
const MAX_DATAGRAM: usize = 65_507;

/// Configuration for UdpBackend
#[derive(Debug, Clone)]
pub struct UdpBackendConfig {
    pub addr: SocketAddr,
    /// Datagrams are cut to this size in addition to the caller's `max_len`
    pub max_datagram: usize,
}

impl UdpBackendConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let addr = params
            .get("addr")
            .ok_or_else(|| ContractError::config_validation("params.addr", "missing 'addr' param"))?
            .parse::<SocketAddr>()
            .map_err(|e| ContractError::config_validation("params.addr", format!("invalid address: {}", e)))?;

        let max_datagram = params
            .get("max_datagram")
            .and_then(|s| s.parse().ok())
            .unwrap_or(MAX_DATAGRAM)
            .min(MAX_DATAGRAM);

        Ok(Self { addr, max_datagram })
    }
}

/// Backend sending each message to a connected peer
#[derive(Debug)]
pub struct UdpBackend {
    config: UdpBackendConfig,
    socket: UdpSocket,
}

impl UdpBackend {
    pub fn connect(config: UdpBackendConfig) -> std::io::Result<Self> {
        let bind = if config.addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind)?;
        socket.connect(config.addr)?;

        debug!(target_addr = %config.addr, "UdpBackend connected");
        Ok(Self { config, socket })
    }

    /// Create from params (for registry)
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let config = UdpBackendConfig::from_params(params)?;
        Self::connect(config).map_err(ContractError::Io)
    }
}

impl SinkBackend for UdpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Other
    }

    fn write(&self, parts: &[&[u8]], max_len: usize) -> Result<usize, ContractError> {
        let datagram = gather(parts, max_len.min(self.config.max_datagram));
        if datagram.is_empty() {
            return Ok(0);
        }
        Ok(self.socket.send(&datagram)?)
    }
}
