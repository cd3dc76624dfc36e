use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use anyhow::{anyhow, Result};

use crate::{
    error::AcceptError,
    image_utils::ProcessedImage,
    pipeline::render_accept,
    session::AcceptJob,
};

struct ProcessRequest {
    job: AcceptJob,
    max_dimension: u32,
}

pub struct ProcessOutcome {
    pub ticket: u64,
    pub result: Result<ProcessedImage, AcceptError>,
}

/// Crops and resizes accepted images off the UI thread.
pub struct Processor {
    request_tx: Sender<ProcessRequest>,
    outcome_rx: Receiver<ProcessOutcome>,
    pub in_flight: Option<u64>,
}

impl Processor {
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self::spawn_worker(request_rx, outcome_tx);
        Self {
            request_tx,
            outcome_rx,
            in_flight: None,
        }
    }

    fn spawn_worker(rx: Receiver<ProcessRequest>, tx: Sender<ProcessOutcome>) {
        thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let result = render_accept(&request.job, request.max_dimension);
                let outcome = ProcessOutcome {
                    ticket: request.job.ticket,
                    result,
                };
                if tx.send(outcome).is_err() {
                    break;
                }
            }
        });
    }

    pub fn queue(&mut self, job: AcceptJob, max_dimension: u32) -> Result<()> {
        let ticket = job.ticket;
        self.request_tx
            .send(ProcessRequest { job, max_dimension })
            .map_err(|e| anyhow!("Failed to send accept job: {}", e))?;
        self.in_flight = Some(ticket);
        Ok(())
    }

    pub fn check_completions(&mut self) -> Vec<ProcessOutcome> {
        let mut completed = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.in_flight == Some(outcome.ticket) {
                self.in_flight = None;
            }
            completed.push(outcome);
        }
        completed
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}
