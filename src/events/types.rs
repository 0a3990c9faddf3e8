//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Fingerprinting events
    Hash(HashEvent),
    /// Banding, scoring and grouping events
    Compare(CompareEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { path: PathBuf, recursive: bool },
    /// A subdirectory could not be read but listing continues
    Error { path: PathBuf, message: String },
    /// Listing completed
    Completed { total_files: usize },
}

/// Events during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Fingerprinting has started
    Started { total_files: usize },
    /// Progress update during fingerprinting
    Progress(HashProgress),
    /// A file could not be decoded and was skipped
    Error { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed { fingerprinted: usize, skipped: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files processed so far
    pub completed: usize,
    /// Total number of files to process
    pub total: usize,
    /// File that was just processed
    pub current_path: PathBuf,
}

/// Events during banding, scoring and grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Band buckets are built and candidates generated
    CandidatesFound {
        candidate_pairs: usize,
        naive_comparisons: usize,
    },
    /// Candidates scored against the threshold
    Scored { near_duplicates: usize },
    /// Clusters formed
    Grouped { groups: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Comparing,
    Grouping,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files found in the directory
    pub total_files: usize,
    /// Files successfully fingerprinted
    pub fingerprinted: usize,
    /// Number of near-duplicate pairs retained
    pub near_duplicates: usize,
    /// Number of clusters
    pub groups: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
        }
    }
}
