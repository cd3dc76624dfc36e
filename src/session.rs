//! Review session state: the pending queue, the gallery, and the phase that
//! keeps them in lockstep.
//!
//! The session never does image work itself. Callers decode batches and render
//! crops (synchronously via [`crate::pipeline`] or on background workers) and
//! report the results back through [`ReviewSession::install_batch`] and
//! [`ReviewSession::complete_accept`].

use std::{collections::VecDeque, sync::Arc};

use image::DynamicImage;

use tracing::{debug, info, warn};

use crate::{
    error::{AcceptError, SessionError},
    image_utils::{CropRegion, DecodedImage, ProcessedImage},
};

/// Where the review loop currently stands.
///
/// `Idle` iff the pending queue is empty. `Accepting` marks a crop of the head
/// image in flight; no other accept or dismiss may start until it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Reviewing,
    Accepting { ticket: u64 },
}

/// Work handed out by [`ReviewSession::begin_accept`].
#[derive(Debug, Clone)]
pub struct AcceptJob {
    pub ticket: u64,
    pub name: String,
    pub image: Arc<DynamicImage>,
    pub region: CropRegion,
}

#[derive(Debug)]
pub struct ReviewSession {
    pending: VecDeque<DecodedImage>,
    gallery: VecDeque<ProcessedImage>,
    phase: Phase,
    next_ticket: u64,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            gallery: VecDeque::new(),
            phase: Phase::Idle,
            next_ticket: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dialog_open(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_accepting(&self) -> bool {
        matches!(self.phase, Phase::Accepting { .. })
    }

    pub fn pending(&self) -> &VecDeque<DecodedImage> {
        &self.pending
    }

    /// Most recent first.
    pub fn gallery(&self) -> &VecDeque<ProcessedImage> {
        &self.gallery
    }

    /// The image on the crop surface.
    pub fn head(&self) -> Option<&DecodedImage> {
        self.pending.front()
    }

    /// Append a fully decoded batch to the tail of the queue.
    ///
    /// An unfinished review keeps its order; the new images are reviewed after it.
    /// Returns the number of images added.
    pub fn install_batch(&mut self, batch: Vec<DecodedImage>) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let added = batch.len();
        let queued_before = self.pending.len();
        self.pending.extend(batch);
        self.sync_phase(false);
        if queued_before > 0 {
            info!(added, queued = self.pending.len(), "appended batch to unfinished review");
        } else {
            info!(added, "started review");
        }
        added
    }

    /// Lock the head image for cropping. Fails with [`SessionError::Busy`] while
    /// a previous accept has not settled.
    pub fn begin_accept(&mut self, region: CropRegion) -> Result<AcceptJob, SessionError> {
        match self.phase {
            Phase::Idle => return Err(SessionError::NothingPending),
            Phase::Accepting { .. } => return Err(SessionError::Busy),
            Phase::Reviewing => {}
        }
        let head = self.pending.front().ok_or(SessionError::NothingPending)?;
        let job = AcceptJob {
            ticket: self.next_ticket,
            name: head.name.clone(),
            image: Arc::clone(&head.image),
            region,
        };
        self.next_ticket += 1;
        self.phase = Phase::Accepting { ticket: job.ticket };
        debug!(ticket = job.ticket, name = %job.name, ?region, "accept started");
        Ok(job)
    }

    /// Settle the accept identified by `ticket`.
    ///
    /// On success the processed image is prepended to the gallery and the head is
    /// popped. On failure the head stays in place for a retry. Completions for
    /// anything but the in-flight ticket are ignored and reported as `false`.
    pub fn complete_accept(
        &mut self,
        ticket: u64,
        result: Result<ProcessedImage, AcceptError>,
    ) -> Result<bool, AcceptError> {
        if self.phase != (Phase::Accepting { ticket }) {
            warn!(ticket, phase = ?self.phase, "ignoring stale accept completion");
            return Ok(false);
        }
        match result {
            Ok(processed) => {
                let source = self.pending.pop_front();
                debug_assert!(source.is_some(), "accepting with an empty queue");
                info!(
                    name = %processed.source_name,
                    width = processed.image.width(),
                    height = processed.image.height(),
                    remaining = self.pending.len(),
                    "accepted crop"
                );
                self.gallery.push_front(processed);
                self.sync_phase(true);
                Ok(true)
            }
            Err(err) => {
                warn!(ticket, "accept failed: {err}");
                self.sync_phase(true);
                Err(err)
            }
        }
    }

    /// Close the dialog, discarding every image still waiting for review.
    pub fn dismiss(&mut self) -> Result<usize, SessionError> {
        if self.is_accepting() {
            return Err(SessionError::Busy);
        }
        let discarded = self.pending.len();
        self.pending.clear();
        self.sync_phase(false);
        if discarded > 0 {
            info!(discarded, "review dismissed");
        }
        Ok(discarded)
    }

    /// The only place the phase is derived from the queue. An in-flight accept
    /// survives unless `settled` says it just finished.
    fn sync_phase(&mut self, settled: bool) {
        self.phase = match self.phase {
            Phase::Accepting { .. } if !settled && !self.pending.is_empty() => self.phase,
            _ if self.pending.is_empty() => Phase::Idle,
            _ => Phase::Reviewing,
        };
        debug_assert_eq!(self.dialog_open(), !self.pending.is_empty());
    }
}
