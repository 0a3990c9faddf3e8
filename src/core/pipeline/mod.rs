//! # Pipeline Module
//!
//! Orchestrates the full near-duplicate detection workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - List the files in the input directory
//! 2. **Hash** - Fingerprint every file; undecodable files are skipped
//! 3. **Compare** - LSH candidate search, then exact scoring
//! 4. **Group** - Transitive clustering of the near-duplicate pairs
//!
//! ## Parallelism
//! Uses rayon for parallel hashing across multiple CPU cores. Everything
//! after hashing runs on the calling thread.

mod executor;

pub use executor::{
    find_near_duplicates, group_similar_images, Pipeline, PipelineBuilder, PipelineConfig,
    PipelineResult, SkippedFile,
};
