//! Pipeline execution implementation.

use crate::core::comparator::{
    find_near_duplicate_pairs_with_events, DuplicateGroup, LshConfig, LshIndexStats, NearDuplicate,
    ThresholdStrategy, TransitiveGrouper,
};
use crate::core::hasher::{is_valid_hash_size, Fingerprint, HasherConfig};
use crate::core::scanner::{FileScanner, ImageFile, ScanConfig, WalkDirScanner};
use crate::error::{ConfigError, DuplicateFinderError, ScanError};
use crate::events::{
    null_sender, CompareEvent, Event, EventSender, HashEvent, HashProgress, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A file that was listed but could not be fingerprinted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    /// Why decoding or hashing failed
    pub reason: String,
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Near-duplicate pairs, most similar first
    pub near_duplicates: Vec<NearDuplicate>,
    /// Clusters built from the pairs
    pub groups: Vec<DuplicateGroup>,
    /// Files listed in the directory
    pub total_files: usize,
    /// Files that produced a fingerprint
    pub fingerprinted: usize,
    /// Files that could not be decoded (non-fatal)
    pub skipped: Vec<SkippedFile>,
    /// Subdirectories that could not be listed during a recursive walk
    pub scan_warnings: Vec<ScanError>,
    /// Candidate search statistics, absent when nothing was fingerprinted
    pub lsh_stats: Option<LshIndexStats>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub directory: PathBuf,
    /// Pairs must score strictly above this similarity, in `(0, 1)`
    pub threshold: f64,
    /// Side of the dHash grid; fingerprints have `hash_size²` bits
    pub hash_size: u32,
    /// Number of LSH bands
    pub bands: usize,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            threshold: ThresholdStrategy::DEFAULT_THRESHOLD,
            hash_size: 16,
            bands: LshConfig::default().bands,
            scan_config: ScanConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Fingerprint length implied by `hash_size`
    pub fn bit_len(&self) -> usize {
        let side = self.hash_size as usize;
        side.saturating_mul(side)
    }

    /// Reject parameters that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if !is_valid_hash_size(self.hash_size) {
            return Err(ConfigError::InvalidHashSize {
                value: self.hash_size,
            });
        }
        LshConfig::new(self.bands).rows_for(self.bit_len())?;
        Ok(())
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the directory to scan
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the similarity threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the dHash grid size
    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    /// Set the number of LSH bands
    pub fn bands(mut self, bands: usize) -> Self {
        self.config.bands = bands;
        self
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Validate and build the pipeline
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        self.config.validate()?;
        Ok(Pipeline {
            config: self.config,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The near-duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The validated configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, DuplicateFinderError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, DuplicateFinderError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));
        info!(
            directory = %self.config.directory.display(),
            threshold = self.config.threshold,
            hash_size = self.config.hash_size,
            bands = self.config.bands,
            recursive = self.config.scan_config.recursive,
            "Starting near-duplicate detection"
        );

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = match scanner.scan_with_events(&self.config.directory, events) {
            Ok(result) => result,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };
        let total_files = scan_result.files.len();

        // Phase 2: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let (fingerprints, skipped) = self.fingerprint_all(&scan_result.files, events)?;
        let fingerprinted = fingerprints.len();

        // Phase 3: Comparing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Comparing,
        }));

        let strategy = ThresholdStrategy::new(self.config.threshold);
        let (near_duplicates, stats) = find_near_duplicate_pairs_with_events(
            fingerprints,
            &strategy,
            LshConfig::new(self.config.bands),
            events,
        )?;
        if fingerprinted > 0 {
            debug!("{}", stats);
        }

        // Phase 4: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));

        let groups = TransitiveGrouper::new().group(&near_duplicates);
        events.send(Event::Compare(CompareEvent::Grouped {
            groups: groups.len(),
        }));

        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            total_files,
            fingerprinted,
            skipped = skipped.len(),
            near_duplicates = near_duplicates.len(),
            groups = groups.len(),
            duration_ms,
            "Detection complete"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files,
                fingerprinted,
                near_duplicates: near_duplicates.len(),
                groups: groups.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            near_duplicates,
            groups,
            total_files,
            fingerprinted,
            skipped,
            scan_warnings: scan_result.warnings,
            lsh_stats: (fingerprinted > 0).then_some(stats),
            duration_ms,
        })
    }

    /// Fingerprint every file in parallel, keeping failures apart
    fn fingerprint_all(
        &self,
        files: &[ImageFile],
        events: &EventSender,
    ) -> Result<(Vec<(PathBuf, Fingerprint)>, Vec<SkippedFile>), ConfigError> {
        let total = files.len();
        events.send(Event::Hash(HashEvent::Started { total_files: total }));

        let hasher = HasherConfig::new().hash_size(self.config.hash_size).build()?;
        let completed = AtomicUsize::new(0);

        let outcomes: Vec<(PathBuf, Result<Fingerprint, String>)> = files
            .par_iter()
            .map(|file| {
                let outcome = hasher.hash_file(&file.path).map_err(|e| {
                    warn!(path = %file.path.display(), error = %e, "Skipping file");
                    events.send(Event::Hash(HashEvent::Error {
                        path: file.path.clone(),
                        message: e.to_string(),
                    }));
                    e.to_string()
                });

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: done,
                    total,
                    current_path: file.path.clone(),
                })));

                (file.path.clone(), outcome)
            })
            .collect();

        let mut fingerprints = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(fingerprint) => fingerprints.push((path, fingerprint)),
                Err(reason) => skipped.push(SkippedFile { path, reason }),
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            fingerprinted: fingerprints.len(),
            skipped: skipped.len(),
        }));

        Ok((fingerprints, skipped))
    }
}

/// Find near-duplicate pairs among the images in `directory`.
///
/// Pairs are `(path_a, path_b)` in path order with `similarity` strictly
/// above `threshold`, most similar first. Files that cannot be decoded are
/// skipped. Fails if the parameters are invalid or `directory` cannot be
/// listed.
pub fn find_near_duplicates(
    directory: impl AsRef<Path>,
    threshold: f64,
    hash_size: u32,
    bands: usize,
    recurse_subfolders: bool,
) -> Result<Vec<NearDuplicate>, DuplicateFinderError> {
    let pipeline = Pipeline::builder()
        .directory(directory.as_ref())
        .threshold(threshold)
        .hash_size(hash_size)
        .bands(bands)
        .recursive(recurse_subfolders)
        .build()?;

    Ok(pipeline.run()?.near_duplicates)
}

/// Cluster near-duplicate pairs transitively
pub fn group_similar_images(near_duplicates: &[NearDuplicate]) -> Vec<DuplicateGroup> {
    TransitiveGrouper::new().group(near_duplicates)
}
