//! Drop announcement protocol
//!
//! When a sink has lost messages, a synthetic `"<N> events dropped"` record
//! at level `Notice` is written before any further normal traffic. It runs
//! under exclusive access so no producer write can interleave with it.

use contracts::{ContractError, Facility, Level};
use tracing::{debug, warn};

use crate::error::{DispatcherError, DropReason};
use crate::sink::Sink;
use crate::state::ExclusiveAccess;

/// Announcements are small and bounded by the backend itself.
const ANNOUNCEMENT_MAX_LEN: usize = usize::MAX;

/// Announcement that could not be written; the drop counter is untouched.
#[derive(Debug)]
pub(crate) struct AnnounceFailure {
    pub(crate) pending: u32,
    pub(crate) source: ContractError,
}

/// Announcement text for `dropped` lost messages
pub fn announcement_text(dropped: u32) -> String {
    if dropped == 1 {
        "1 event dropped".to_string()
    } else {
        format!("{} events dropped", dropped)
    }
}

impl Sink {
    /// Announce pending drops now.
    ///
    /// Returns `Ok(0)` without touching the backend when nothing is pending,
    /// otherwise the number of announcement bytes written.
    ///
    /// # Errors
    /// [`DispatcherError::AnnouncementFailed`] when the backend refuses the
    /// announcement. The drop counter is left as it was and the failed
    /// announcement is not counted as a drop.
    pub fn announce_dropped(&self, facility: Facility) -> Result<usize, DispatcherError> {
        let access = self.state.exclusive();
        self.announce_locked(&access, facility)
            .map_err(|failure| DispatcherError::AnnouncementFailed {
                sink: self.name.clone(),
                pending: failure.pending,
                source: failure.source,
            })
    }

    /// Announce until the counter reads zero under the held exclusive access.
    ///
    /// Each round subtracts exactly what it announced, so increments from
    /// producers failing concurrently are never lost.
    pub(crate) fn announce_locked(
        &self,
        access: &ExclusiveAccess<'_>,
        facility: Facility,
    ) -> Result<usize, AnnounceFailure> {
        let mut sent = 0;
        loop {
            let pending = self.state.dropped();
            if pending == 0 {
                return Ok(sent);
            }

            let text = announcement_text(pending);
            let written = self
                .write_locked(
                    access,
                    ANNOUNCEMENT_MAX_LEN,
                    &[text.as_bytes()],
                    Level::Notice,
                    facility,
                    None,
                )
                .map_err(|reason| {
                    debug!(sink = %self.name, pending, error = %reason, "drop announcement failed");
                    AnnounceFailure {
                        pending,
                        source: into_contract_error(reason, &self.name),
                    }
                })?;

            self.state.settle(access, pending);
            sent += written;

            self.metrics.inc_announcement(pending, written);
            observability::record_announcement(&self.name, pending);
            observability::record_pending_drops(&self.name, self.state.dropped());
            warn!(sink = %self.name, dropped = pending, "announced dropped events");
        }
    }
}

fn into_contract_error(reason: DropReason, sink: &str) -> ContractError {
    match reason {
        DropReason::Refused(source) => source,
        DropReason::NothingWritten => ContractError::backend_refused(sink, "accepted zero bytes"),
        DropReason::AnnouncementFailed { source, .. } => source,
    }
}
