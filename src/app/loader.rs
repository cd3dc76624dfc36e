use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::{
    error::DecodeError,
    image_utils::{DecodedImage, SourceFile},
    pipeline::{decode_batch, PipelineConfig},
};

struct BatchRequest {
    batch_id: u64,
    files: Vec<SourceFile>,
}

pub struct BatchOutcome {
    pub batch_id: u64,
    pub file_count: usize,
    pub result: Result<Vec<DecodedImage>, DecodeError>,
}

/// Decodes submitted batches on a background thread.
///
/// Batches are handled one after another in submission order, so their
/// outcomes arrive in that order too.
pub struct BatchLoader {
    request_tx: Sender<BatchRequest>,
    outcome_rx: Receiver<BatchOutcome>,
    next_batch_id: u64,
    pub in_flight: usize,
}

impl BatchLoader {
    pub fn new(config: PipelineConfig) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self::spawn_decoder(config, request_rx, outcome_tx);
        Self {
            request_tx,
            outcome_rx,
            next_batch_id: 1,
            in_flight: 0,
        }
    }

    fn spawn_decoder(config: PipelineConfig, rx: Receiver<BatchRequest>, tx: Sender<BatchOutcome>) {
        thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                debug!(batch_id = request.batch_id, files = request.files.len(), "decoding batch");
                let result = decode_batch(&request.files, &config);
                let outcome = BatchOutcome {
                    batch_id: request.batch_id,
                    file_count: request.files.len(),
                    result,
                };
                if tx.send(outcome).is_err() {
                    break;
                }
            }
        });
    }

    /// Queue a batch for decoding. Empty batches are ignored and yield `None`.
    pub fn submit(&mut self, files: Vec<SourceFile>) -> Result<Option<u64>> {
        if files.is_empty() {
            return Ok(None);
        }
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;
        self.request_tx
            .send(BatchRequest { batch_id, files })
            .map_err(|e| anyhow!("Failed to send batch to decoder: {}", e))?;
        self.in_flight += 1;
        Ok(Some(batch_id))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn check_completions(&mut self) -> Vec<BatchOutcome> {
        let mut completed = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.in_flight == 0 {
                warn!(batch_id = outcome.batch_id, "unexpected batch completion");
            }
            self.in_flight = self.in_flight.saturating_sub(1);
            completed.push(outcome);
        }
        completed
    }
}
