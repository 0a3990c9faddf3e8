//! # Core Module
//!
//! The GUI-agnostic near-duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Lists the files in the input directory
//! - `hasher` - Computes difference-hash fingerprints
//! - `comparator` - LSH candidate search, scoring and grouping
//! - `pipeline` - Orchestrates the full workflow
//! - `remover` - Deletes files chosen by the user

pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod remover;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{DuplicateGroup, NearDuplicate};
pub use hasher::{Fingerprint, PerceptualHash};
pub use pipeline::{find_near_duplicates, group_similar_images, Pipeline, PipelineResult};
pub use remover::{delete_files, DeletionReport};
pub use scanner::ImageFile;
