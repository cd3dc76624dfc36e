//! The two stage sequences of the intake queue:
//! decode → await all → install, and crop → resize → append → pop.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Instant,
};

use tracing::{debug, info};

use crate::{
    error::{AcceptError, DecodeError, SessionError},
    image_utils::{
        crop_and_resize, decode_source, CropRegion, DecodedImage, ProcessedImage, SourceFile,
        DEFAULT_MAX_DIMENSION, WORKING_LIMIT,
    },
    session::{AcceptJob, ReviewSession},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Longest side of an accepted image.
    pub max_dimension: u32,
    /// Upper bound on threads decoding one batch.
    pub decode_threads: usize,
    /// Inputs larger than this are scaled down right after decoding.
    pub working_limit: (u32, u32),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            decode_threads: 4,
            working_limit: WORKING_LIMIT,
        }
    }
}

/// Decode every file of a batch, in parallel, keeping input order.
///
/// Either every file decodes or the first failure (in input order) is returned
/// and nothing else is kept.
pub fn decode_batch(files: &[SourceFile], config: &PipelineConfig) -> Result<Vec<DecodedImage>, DecodeError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    let start = Instant::now();
    let threads = config.decode_threads.clamp(1, files.len());
    let chunk_size = files.len().div_ceil(threads);
    let failed = AtomicBool::new(false);

    let chunks: Vec<Vec<Result<DecodedImage, DecodeError>>> = thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                let failed = &failed;
                scope.spawn(move || {
                    let mut decoded = Vec::with_capacity(chunk.len());
                    for file in chunk {
                        if failed.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = decode_source(file, config.working_limit);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        decoded.push(result);
                    }
                    decoded
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let mut batch = Vec::with_capacity(files.len());
    for result in chunks.into_iter().flatten() {
        batch.push(result?);
    }
    debug!(files = files.len(), threads, elapsed = ?start.elapsed(), "decoded batch");
    Ok(batch)
}

/// Decode `files` and append them to the review queue.
///
/// An empty batch leaves the session untouched. A decode failure anywhere in
/// the batch leaves the session untouched too.
pub fn submit_batch(
    session: &mut ReviewSession,
    files: &[SourceFile],
    config: &PipelineConfig,
) -> Result<usize, DecodeError> {
    if files.is_empty() {
        return Ok(0);
    }
    info!(files = files.len(), "submitting batch");
    let batch = decode_batch(files, config)?;
    Ok(session.install_batch(batch))
}

/// Crop and resize the image captured in `job`.
pub fn render_accept(job: &AcceptJob, max_dimension: u32) -> Result<ProcessedImage, AcceptError> {
    let start = Instant::now();
    let image = crop_and_resize(&job.image, job.region, max_dimension)?;
    debug!(ticket = job.ticket, elapsed = ?start.elapsed(), "rendered crop");
    Ok(ProcessedImage::new(job.name.clone(), image))
}

/// Accept the crop of the head image: render it, prepend it to the gallery and
/// advance the queue. On failure the head stays in place.
pub fn accept_current<'a>(
    session: &'a mut ReviewSession,
    region: CropRegion,
    config: &PipelineConfig,
) -> Result<&'a ProcessedImage, AcceptError> {
    let job = session.begin_accept(region)?;
    let result = render_accept(&job, config.max_dimension);
    session.complete_accept(job.ticket, result)?;
    session
        .gallery()
        .front()
        .ok_or(AcceptError::Session(SessionError::NothingPending))
}
