//! Reference backend implementations

mod fd;
mod ring;
mod udp;

use std::collections::HashMap;

use contracts::{ContractError, SinkBackend, SinkType};

pub use fd::{FdBackend, FdTarget};
pub use ring::RingBackend;
pub use udp::UdpBackend;

/// Concatenate `parts` in order, keeping at most `max_len` bytes.
pub(crate) fn gather(parts: &[&[u8]], max_len: usize) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total.min(max_len));
    for part in parts {
        let room = max_len - out.len();
        if room == 0 {
            break;
        }
        out.extend_from_slice(&part[..part.len().min(room)]);
    }
    out
}

/// Build a backend from a configured `sink_type` and its params.
///
/// Ring backends are built by the registry, which keeps a handle for
/// inspection; this covers every type anyway for callers that do not.
pub fn backend_from_params(
    sink_type: SinkType,
    params: &HashMap<String, String>,
) -> Result<Box<dyn SinkBackend>, ContractError> {
    let backend: Box<dyn SinkBackend> = match sink_type {
        SinkType::Fd => Box::new(FdBackend::from_params(params)?),
        SinkType::Ring => Box::new(RingBackend::from_params(params)?),
        SinkType::Udp => Box::new(UdpBackend::from_params(params)?),
    };
    Ok(backend)
}
