//! RingBackend - byte-budgeted in-memory ring of records

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use contracts::{BackendKind, ContractError, SinkBackend};
use parking_lot::Mutex;

use super::gather;

#[derive(Debug, Default)]
struct RingInner {
    records: VecDeque<Bytes>,
    used: usize,
    evicted: u64,
}

/// In-memory ring holding at most `size` bytes of records.
///
/// Cloning yields another handle to the same ring, which is how the
/// registry keeps the contents readable after the backend moves into a sink.
#[derive(Debug, Clone)]
pub struct RingBackend {
    size: usize,
    overwrite: bool,
    inner: Arc<Mutex<RingInner>>,
}

impl RingBackend {
    /// Ring that evicts its oldest records when full
    pub fn new(size: usize) -> Self {
        Self::with_overwrite(size, true)
    }

    /// With `overwrite = false` a full ring refuses new records instead
    pub fn with_overwrite(size: usize, overwrite: bool) -> Self {
        Self {
            size,
            overwrite,
            inner: Arc::new(Mutex::new(RingInner::default())),
        }
    }

    /// Create from params: `size` (required), `overwrite` (default true)
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let size = params
            .get("size")
            .ok_or_else(|| ContractError::config_validation("params.size", "ring requires a size"))?
            .parse::<usize>()
            .map_err(|e| ContractError::config_validation("params.size", format!("invalid ring size: {}", e)))?;
        if size == 0 {
            return Err(ContractError::config_validation("params.size", "ring size must be > 0"));
        }

        let overwrite = match params.get("overwrite") {
            Some(v) => v.parse::<bool>().map_err(|e| {
                ContractError::config_validation("params.overwrite", format!("invalid overwrite flag: {}", e))
            })?,
            None => true,
        };

        Ok(Self::with_overwrite(size, overwrite))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Snapshot of the records, oldest first
    pub fn records(&self) -> Vec<Bytes> {
        self.inner.lock().records.iter().cloned().collect()
    }

    /// Remove and return every record, oldest first
    pub fn drain(&self) -> Vec<Bytes> {
        let mut inner = self.inner.lock();
        inner.used = 0;
        inner.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Bytes currently held
    pub fn used(&self) -> usize {
        self.inner.lock().used
    }

    /// Records evicted to make room
    pub fn evicted(&self) -> u64 {
        self.inner.lock().evicted
    }
}

impl SinkBackend for RingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ring
    }

    fn write(&self, parts: &[&[u8]], max_len: usize) -> Result<usize, ContractError> {
        let record = gather(parts, max_len);
        let len = record.len();
        if len == 0 {
            return Ok(0);
        }
        if len > self.size {
            return Err(ContractError::backend_refused(
                "ring",
                format!("record of {} bytes exceeds ring size {}", len, self.size),
            ));
        }

        let mut inner = self.inner.lock();
        if inner.used + len > self.size {
            if !self.overwrite {
                return Err(ContractError::backend_refused("ring", "ring full"));
            }
            while inner.used + len > self.size {
                match inner.records.pop_front() {
                    Some(old) => {
                        inner.used -= old.len();
                        inner.evicted += 1;
                    }
                    None => break,
                }
            }
        }

        inner.used += len;
        inner.records.push_back(Bytes::from(record));
        Ok(len)
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let ring = RingBackend::new(64);
        ring.write(&[b"one"], 16).unwrap();
        ring.write(&[b"t", b"wo"], 16).unwrap();

        assert_eq!(ring.records(), vec![Bytes::from("one"), Bytes::from("two")]);
        assert_eq!(ring.used(), 6);
    }

    #[test]
    fn test_evicts_oldest() {
        let ring = RingBackend::new(10);
        ring.write(&[b"aaaa"], 16).unwrap();
        ring.write(&[b"bbbb"], 16).unwrap();
        ring.write(&[b"cccc"], 16).unwrap();

        assert_eq!(ring.records(), vec![Bytes::from("bbbb"), Bytes::from("cccc")]);
        assert_eq!(ring.evicted(), 1);
        assert!(ring.used() <= 10);
    }

    #[test]
    fn test_refuses_when_full_without_overwrite() {
        let ring = RingBackend::with_overwrite(8, false);
        ring.write(&[b"aaaa"], 16).unwrap();
        ring.write(&[b"bbbb"], 16).unwrap();

        assert!(ring.write(&[b"c"], 16).is_err());
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_refuses_oversized_record() {
        let ring = RingBackend::new(4);
        assert!(ring.write(&[b"abcdef"], 16).is_err());
        // Truncation to max_len happens first
        assert_eq!(ring.write(&[b"abcdef"], 4).unwrap(), 4);
    }

    #[test]
    fn test_drain_empties() {
        let ring = RingBackend::new(16);
        ring.write(&[b"x"], 16).unwrap();
        let handle = ring.clone();

        assert_eq!(handle.drain(), vec![Bytes::from("x")]);
        assert!(ring.is_empty());
        assert_eq!(ring.used(), 0);
    }

    #[test]
    fn test_from_params() {
        let params = HashMap::from([
            ("size".to_string(), "32".to_string()),
            ("overwrite".to_string(), "false".to_string()),
        ]);
        let ring = RingBackend::from_params(&params).unwrap();
        assert_eq!(ring.capacity(), Some(32));

        let params = HashMap::from([("size".to_string(), "lots".to_string())]);
        assert!(RingBackend::from_params(&params).is_err());

        let params = HashMap::from([("size".to_string(), "0".to_string())]);
        assert!(RingBackend::from_params(&params).is_err());
    }
}
